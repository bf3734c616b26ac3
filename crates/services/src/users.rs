//! User profiles.

use gateway::{ApiPath, ApiRequest, FileUpload, FormData, Gateway, Notification, StatusCode, User};

use crate::{expect_status, report_failure};

/// User profile operations.
pub struct UserService<'a> {
    gateway: &'a Gateway,
}

impl<'a> UserService<'a> {
    pub(crate) fn new(gateway: &'a Gateway) -> Self {
        Self { gateway }
    }

    /// The profile of a user.
    pub async fn user(&self, user_name: &str) -> crate::Result<User> {
        let request = ApiRequest::get(ApiPath::new("/users").segment(user_name));

        let response = self.gateway.send(request).await?;
        Ok(expect_status(response, &[StatusCode::OK])?.json()?)
    }

    /// Replaces the current user's profile photo.
    ///
    /// When the API answers with the updated profile, the session's user snapshot is
    /// replaced by it. A body without a user name is not a profile and leaves the
    /// snapshot alone.
    pub async fn upload_photo(&self, photo: FileUpload) -> crate::Result<()> {
        let request = ApiRequest::put("/users/upload-photo").form(FormData::new().file("photo", photo));

        let response = self.gateway.send(request).await.inspect_err(|e| report_failure(self.gateway, e))?;
        let response = expect_status(response, &[StatusCode::OK, StatusCode::NO_CONTENT])?;

        match response.json::<User>() {
            Ok(user) if !user.user_name.is_empty() => self.gateway.session().update_user(user).await,
            _ => log::debug!("Photo upload response did not carry a profile"),
        }

        self.gateway
            .notifier()
            .notify(Notification::success("Photo updated successfully"));

        Ok(())
    }

    /// Users whose name or email matches `query`.
    pub async fn search_users(&self, query: &str) -> crate::Result<Vec<User>> {
        let request = ApiRequest::get("/users/search").query("query", query);

        let response = self.gateway.send(request).await?;
        Ok(expect_status(response, &[StatusCode::OK])?.json()?)
    }
}
