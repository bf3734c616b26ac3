//! Domain services of the Campus client.
//!
//! Each service builds request bodies for one area of the API (authentication, courses,
//! tasks and submissions, users), sends them through the [`Gateway`], and interprets the
//! endpoint-specific success statuses. Generic failure notifications are already shown by
//! the gateway; services add the contextual ones and navigate after successful changes.

#![deny(missing_docs)]

mod auth;
mod courses;
mod de;
mod error;
mod tasks;
mod users;

pub use auth::{AuthService, LoginRequest, RegisterRequest};
pub use courses::{
    Course, CourseService, CourseStatus, CreateCourse, Instructor, InstructorPermissions, NewInstructor, ScheduleEntry,
};
pub use error::ServiceError;
pub use gateway::{FileUpload, Gateway, User};
pub use tasks::{CreateTask, EditTask, MaterialFile, MaterialType, Task, TaskReview, TaskService, TaskSubmission};
pub use users::UserService;

use gateway::{ApiResponse, GatewayError, Notification, StatusCode, classify};

/// Result type of every service operation.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Entry point to the domain services, sharing one gateway.
#[derive(Clone)]
pub struct Services {
    gateway: Gateway,
}

impl Services {
    /// Creates the services on top of a gateway.
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// The underlying gateway.
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// Login, registration and logout.
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(&self.gateway)
    }

    /// Course catalog and course management.
    pub fn courses(&self) -> CourseService<'_> {
        CourseService::new(&self.gateway)
    }

    /// Tasks, submissions and reviews.
    pub fn tasks(&self) -> TaskService<'_> {
        TaskService::new(&self.gateway)
    }

    /// User profiles.
    pub fn users(&self) -> UserService<'_> {
        UserService::new(&self.gateway)
    }
}

/// Fails with [`ServiceError::UnexpectedStatus`] unless the response has one of `expected`.
fn expect_status(response: ApiResponse, expected: &[StatusCode]) -> Result<ApiResponse> {
    if expected.contains(&response.status()) {
        Ok(response)
    } else {
        log::warn!("Unexpected status {} from the API", response.status());
        Err(ServiceError::UnexpectedStatus(response.status()))
    }
}

/// Shows the contextual failure message of a change operation.
///
/// Statuses the gateway already reported, and ended sessions, are not reported twice.
fn report_failure(gateway: &Gateway, error: &GatewayError) {
    if error.is_session_terminated() {
        return;
    }

    let message = match error {
        GatewayError::Status { status, .. } if classify(*status, false).is_some() => return,
        GatewayError::Status { message: Some(message), .. } => message.clone(),
        GatewayError::Status { body, .. } if !body.trim().is_empty() => body.clone(),
        _ => "Unexpected error occurred.".to_string(),
    };

    gateway.notifier().notify(Notification::error(message));
}
