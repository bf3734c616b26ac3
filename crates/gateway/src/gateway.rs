use std::sync::Arc;

use config::Config;
use reqwest::{Client, StatusCode, header::AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tokio::sync::{Mutex, oneshot};
use url::Url;

use crate::{
    ApiRequest, ApiResponse, AuthRoutes, Credential, GatewayError, LogNavigator, LogNotifier, Navigator, Notification,
    Notifier, RequestBody, SessionStore, classify,
    refresh::{Admission, RefreshState},
};

const SESSION_LOST_MESSAGE: &str = "Some error occurred. Please login again.";

/// The single entry point for calls to the remote API.
///
/// Cloning is cheap and clones share the session, the refresh state and the HTTP client.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<Inner>,
}

struct Inner {
    client: Client,
    base_url: Url,
    routes: AuthRoutes,
    session: SessionStore,
    refresh: Mutex<RefreshState<ParkedRequest>>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

/// A caller waiting for the in-flight refresh, with the request it wants to replay.
struct ParkedRequest {
    request: ApiRequest,
    reply: oneshot::Sender<crate::Result<ApiResponse>>,
}

/// Builder for [`Gateway`].
pub struct GatewayBuilder {
    config: Config,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl GatewayBuilder {
    /// Uses an existing session instead of an empty one.
    pub fn session(mut self, session: SessionStore) -> Self {
        self.session = session;
        self
    }

    /// Sets where user-facing notifications go. Defaults to the log.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Sets what handles navigation. Defaults to the log.
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    /// Creates the gateway and its HTTP client.
    pub fn build(self) -> crate::Result<Gateway> {
        let api = &self.config.api;

        let client = Client::builder()
            .timeout(api.timeout)
            .cookie_store(api.cookies)
            .build()
            .map_err(|e| {
                log::error!("Failed to create HTTP client for the API gateway: {e}");
                GatewayError::Client(e.to_string())
            })?;

        Ok(Gateway {
            inner: Arc::new(Inner {
                client,
                base_url: api.base_url.clone(),
                routes: AuthRoutes::from(&self.config.auth),
                session: self.session,
                refresh: Mutex::new(RefreshState::default()),
                notifier: self.notifier,
                navigator: self.navigator,
            }),
        })
    }
}

impl Gateway {
    /// Starts building a gateway for the configured API.
    pub fn builder(config: &Config) -> GatewayBuilder {
        GatewayBuilder {
            config: config.clone(),
            session: SessionStore::new(),
            notifier: Arc::new(LogNotifier),
            navigator: Arc::new(LogNavigator),
        }
    }

    /// The session this gateway authenticates with.
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// The authentication endpoints.
    pub fn routes(&self) -> &AuthRoutes {
        &self.inner.routes
    }

    /// The notification sink shared with the domain services.
    pub fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }

    /// The navigation sink shared with the domain services.
    pub fn navigator(&self) -> &dyn Navigator {
        self.inner.navigator.as_ref()
    }

    /// Returns true while a credential refresh is in flight.
    pub async fn is_refreshing(&self) -> bool {
        self.inner.refresh.lock().await.is_refreshing()
    }

    /// Sends a request, recovering from an expired credential if needed.
    ///
    /// Success statuses are returned as `Ok`. Any other status becomes
    /// [`GatewayError::Status`] after the generic notification for it has been shown.
    /// A first `401` on a non-auth route starts, or waits for, a credential refresh and
    /// the request is replayed with the new token.
    pub async fn send(&self, request: ApiRequest) -> crate::Result<ApiResponse> {
        let token = if self.inner.routes.stamps_credential(request.path()) {
            self.inner.session.current_token().await
        } else {
            None
        };

        let response = self.dispatch(&request, token.as_ref()).await?;

        if response.status() == StatusCode::UNAUTHORIZED
            && !request.is_retried()
            && !self.inner.routes.is_auth_route(request.path())
        {
            log::debug!("Request to '{}' was rejected as unauthorized", request.path());
            return self.recover(request.mark_retried()).await;
        }

        self.finish(&request, response)
    }

    /// Waits for a refresh, leading one if none is running, then replays the request.
    async fn recover(&self, request: ApiRequest) -> crate::Result<ApiResponse> {
        let (reply, outcome) = oneshot::channel();
        let admission = self.inner.refresh.lock().await.admit(ParkedRequest { request, reply });

        let request = match admission {
            Admission::Parked => {
                log::debug!("Credential refresh already in flight, parking request");
                return outcome.await.unwrap_or(Err(GatewayError::RefreshAborted));
            }
            Admission::Lead(ParkedRequest { request, .. }) => request,
        };

        // The refresh runs detached so that dropping this caller cannot strand the parked ones.
        let token = match tokio::spawn(self.clone().supervise_refresh()).await {
            Ok(result) => result?,
            Err(e) => {
                log::error!("Credential refresh supervisor failed: {e}");
                return Err(GatewayError::RefreshAborted);
            }
        };

        self.replay(&request, &token).await
    }

    /// Runs the refresh in its own task. If that task dies without settling, the state
    /// goes back to idle and every parked caller is rejected with `RefreshAborted`.
    async fn supervise_refresh(self) -> crate::Result<SecretString> {
        let refresh = tokio::spawn(self.clone().refresh_session());

        match refresh.await {
            Ok(result) => result,
            Err(e) => {
                log::error!("Credential refresh task failed: {e}");

                let parked = self.inner.refresh.lock().await.settle();

                for ParkedRequest { reply, .. } in parked {
                    let _ = reply.send(Err(GatewayError::RefreshAborted));
                }

                Err(GatewayError::RefreshAborted)
            }
        }
    }

    /// Runs the refresh call and settles every parked caller with its outcome.
    async fn refresh_session(self) -> crate::Result<SecretString> {
        let current = self.inner.session.current_token().await;

        log::info!("Refreshing session credential");

        match self.request_refresh(current).await {
            Ok(credential) => {
                let token = credential.token.clone();
                self.inner.session.replace(credential).await;

                let parked = self.inner.refresh.lock().await.settle();
                log::info!("Session credential refreshed, replaying {} parked request(s)", parked.len());

                for ParkedRequest { request, reply } in parked {
                    let gateway = self.clone();
                    let token = token.clone();

                    tokio::spawn(async move {
                        let result = gateway.replay(&request, &token).await;

                        if reply.send(result).is_err() {
                            log::debug!("Caller of '{}' went away before its replay finished", request.path());
                        }
                    });
                }

                Ok(token)
            }
            Err(error) => {
                log::warn!("Credential refresh failed, ending the session: {error}");

                self.inner.session.clear().await;
                self.inner.notifier.notify(Notification::error(SESSION_LOST_MESSAGE));
                self.inner.navigator.navigate(self.inner.routes.login_redirect());

                let error = GatewayError::RefreshFailed(Box::new(error));
                let parked = self.inner.refresh.lock().await.settle();

                for ParkedRequest { reply, .. } in parked {
                    let _ = reply.send(Err(error.clone()));
                }

                Err(error)
            }
        }
    }

    async fn request_refresh(&self, current: Option<SecretString>) -> crate::Result<Credential> {
        let token = current.as_ref().map(|t| t.expose_secret()).unwrap_or_default();
        let request = ApiRequest::post(self.inner.routes.refresh()).json(&json!({ "token": token }))?;

        let response = self.dispatch(&request, None).await?;

        if !response.status().is_success() {
            return Err(response.into_error(request.path()));
        }

        response.json()
    }

    async fn replay(&self, request: &ApiRequest, token: &SecretString) -> crate::Result<ApiResponse> {
        log::debug!("Replaying request to '{}' with the refreshed credential", request.path());

        let response = self.dispatch(request, Some(token)).await?;
        self.finish(request, response)
    }

    /// Turns a non-success response into an error, showing its generic notification.
    fn finish(&self, request: &ApiRequest, response: ApiResponse) -> crate::Result<ApiResponse> {
        if response.status().is_success() {
            return Ok(response);
        }

        let auth_route = self.inner.routes.is_auth_route(request.path());
        let error = response.into_error(request.path());

        if let Some(status) = error.status()
            && let Some(category) = classify(status, auth_route)
        {
            self.inner
                .notifier
                .notify(Notification::error(category.message(error.server_message())));
        }

        Err(error)
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&SecretString>) -> crate::Result<ApiResponse> {
        let url = self.url(request.segments())?;
        log::debug!("{} {url}", request.method());

        let mut builder = self.inner.client.request(request.method().clone(), url);

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }

        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        builder = match request.body() {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Form(form) => builder.multipart(form.to_multipart()?),
        };

        let response = builder.send().await.map_err(|e| {
            log::warn!("No response from '{}': {e}", request.path());
            GatewayError::from(e)
        })?;

        ApiResponse::read(response).await
    }

    fn url(&self, segments: &[String]) -> crate::Result<Url> {
        if let Some(dots) = segments.iter().find(|segment| matches!(segment.as_str(), "." | "..")) {
            return Err(GatewayError::InvalidUrl(format!("'{dots}' is not a valid path segment")));
        }

        let mut url = self.inner.base_url.clone();

        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidUrl(format!("{} cannot be a base URL", self.inner.base_url)))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }
}
