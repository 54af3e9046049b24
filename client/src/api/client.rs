//! Generic authenticated API client

use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::config::ApiConfig;
use crate::session::SessionManager;

/// Errors surfaced by API calls
#[derive(Debug, Error)]
pub enum ApiError {
    /// No access token at call time; distinct from HTTP failures so callers
    /// can gate on "please log in" instead of showing a request error
    #[error("Access token not available; user might not be authenticated")]
    MissingToken,

    #[error("API request failed with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Bearer-authenticated JSON client for the versioned backend API.
///
/// Every call obtains a fresh token through the session manager, so token
/// refresh stays transparent to callers.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<SessionManager>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: format!("{}{}", config.base_url, config.prefix),
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token, send, and map non-2xx responses to
    /// `ApiError::Status` with the message from the JSON error body's
    /// `detail` field, or a generic status-coded message if absent.
    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ApiError> {
        let token = self.session.get_token().await.ok_or(ApiError::MissingToken)?;

        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let generic = format!("API request failed with status {}", status.as_u16());
        let message = match response.json::<serde_json::Value>().await {
            Ok(body) => match body.get("detail") {
                Some(serde_json::Value::String(detail)) => detail.clone(),
                Some(detail) => detail.to_string(),
                None => generic,
            },
            Err(_) => generic,
        };

        debug!(status = status.as_u16(), "API request failed: {}", message);
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.execute(self.http.get(self.url(path))).await?;
        Self::decode(response).await
    }

    /// Raw body fetch for authenticated binary content (file downloads)
    pub async fn get_bytes(&self, path: &str) -> Result<Bytes, ApiError> {
        let response = self.execute(self.http.get(self.url(path))).await?;
        Ok(response.bytes().await?)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .execute(self.http.post(self.url(path)).json(body))
            .await?;
        Self::decode(response).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .execute(self.http.put(self.url(path)).json(body))
            .await?;
        Self::decode(response).await
    }

    /// DELETE; the backend returns no useful body for deletes
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(self.http.delete(self.url(path))).await?;
        Ok(())
    }
}
