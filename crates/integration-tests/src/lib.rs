//! Test harness for the Campus client: a mock Campus API plus recording sinks.

pub mod api;
pub mod sinks;

use std::sync::Arc;

use config::Config;
use gateway::{Gateway, Navigator, Notifier, SessionStore};
use indoc::formatdoc;
use secrecy::{ExposeSecret, SecretString};
use services::Services;
use tokio::net::TcpListener;

pub use api::{MockApi, MockServer, RecordedForm, RecordedRequest};
pub use sinks::{RecordingNavigator, RecordingNotifier};

/// A client wired to a running mock API.
pub struct TestCampus {
    /// The mock API the client talks to.
    pub api: MockServer,
    /// Domain services over the gateway under test.
    pub services: Services,
    /// Every notification shown so far.
    pub notifier: Arc<RecordingNotifier>,
    /// Every navigation so far.
    pub navigator: Arc<RecordingNavigator>,
}

impl TestCampus {
    /// Spawns the mock API and builds a logged-out client for it.
    pub async fn start(api: MockApi) -> Self {
        let api = api.spawn().await.unwrap();
        let (services, notifier, navigator) = client(&api.base_url());

        Self {
            api,
            services,
            notifier,
            navigator,
        }
    }

    /// Spawns the mock API and builds a client whose session holds `token`.
    pub async fn with_token(api: MockApi, token: &str) -> Self {
        let campus = Self::start(api).await;

        campus
            .gateway()
            .session()
            .replace_credential(SecretString::from(token.to_string()), None)
            .await;

        campus
    }

    /// The gateway under test.
    pub fn gateway(&self) -> &Gateway {
        self.services.gateway()
    }

    /// The token currently held by the session.
    pub async fn token(&self) -> Option<String> {
        self.gateway()
            .session()
            .current_token()
            .await
            .map(|token| token.expose_secret().to_string())
    }
}

/// A gateway whose API address refuses connections.
pub async fn unreachable_gateway() -> (Gateway, Arc<RecordingNotifier>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let (services, notifier, _) = client(&format!("http://{address}/api"));

    (services.gateway().clone(), notifier)
}

/// A gateway for `api` that reports to the given sinks instead of recording ones.
pub fn gateway_for(api: &MockServer, notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Gateway {
    build_gateway(&api.base_url(), notifier, navigator)
}

fn client(base_url: &str) -> (Services, Arc<RecordingNotifier>, Arc<RecordingNavigator>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let navigator = Arc::new(RecordingNavigator::default());

    let gateway = build_gateway(base_url, notifier.clone(), navigator.clone());

    (Services::new(gateway), notifier, navigator)
}

fn build_gateway(base_url: &str, notifier: Arc<dyn Notifier>, navigator: Arc<dyn Navigator>) -> Gateway {
    let config = formatdoc! {r#"
        [api]
        base_url = "{base_url}"
        timeout = "5s"
    "#};

    let config: Config = toml::from_str(&config).unwrap();

    Gateway::builder(&config)
        .session(SessionStore::new())
        .notifier(notifier)
        .navigator(navigator)
        .build()
        .unwrap()
}
