//! Notification and navigation sinks that remember what they were given.

use std::sync::Mutex;

use gateway::{Level, Navigator, Notification, Notifier};

/// Records notifications instead of showing them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Every notification, oldest first.
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }

    /// The messages of every error notification, oldest first.
    pub fn errors(&self) -> Vec<String> {
        self.messages(Level::Error)
    }

    /// The messages of every success notification, oldest first.
    pub fn successes(&self) -> Vec<String> {
        self.messages(Level::Success)
    }

    fn messages(&self, level: Level) -> Vec<String> {
        self.notifications
            .lock()
            .unwrap()
            .iter()
            .filter(|notification| notification.level == level)
            .map(|notification| notification.message.clone())
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

/// Records navigation targets instead of following them.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    targets: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    /// Every navigation target, oldest first.
    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &str) {
        self.targets.lock().unwrap().push(target.to_string());
    }
}
