use std::borrow::Cow;

use reqwest::{StatusCode, header::HeaderMap};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::GatewayError;

/// A fully read response from the remote API.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    pub(crate) async fn read(response: reqwest::Response) -> crate::Result<Self> {
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(Self { status, headers, body })
    }

    /// The response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The raw body.
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> crate::Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            log::debug!("Response body did not match the expected shape: {e}");
            GatewayError::Decode(e.to_string())
        })
    }

    /// The `message` field of a JSON body, which the API uses to explain failures.
    pub fn server_message(&self) -> Option<String> {
        let value: Value = serde_json::from_slice(&self.body).ok()?;

        value
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
    }

    pub(crate) fn into_error(self, path: &str) -> GatewayError {
        GatewayError::Status {
            status: self.status,
            path: path.to_string(),
            message: self.server_message(),
            body: self.text().into_owned(),
        }
    }

    #[cfg(test)]
    pub(crate) fn from_parts(status: StatusCode, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}
