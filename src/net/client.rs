//! Typed JSON client on top of a transport pipeline.
//!
//! `ApiClient` is the only place where a non-2xx status turns into an
//! [`ApiError`]; everything below it treats statuses as data. Endpoint
//! methods live in `api.rs` as further `impl` blocks on the same type.

#[cfg(test)]
#[path = "client_test.rs"]
mod client_test;

use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::refresh::RefreshOnUnauthorized;
use super::transport::{ApiRequest, ApiResponse, Transport, WithBearer};
use crate::config::ClientConfig;
use crate::session::SessionHandle;

pub struct ApiClient<T> {
    transport: T,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `request` and fail on any non-2xx status.
    ///
    /// # Errors
    ///
    /// Transport failures pass through; non-2xx statuses map through
    /// [`ApiError::from_status`].
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.send(request).await?;
        if response.is_success() {
            return Ok(response);
        }
        let error = ApiError::from_status(response.status, &response.body);
        tracing::debug!(%method, %path, status = response.status, error = %error, "api error");
        Err(error)
    }

    /// Send `request` and decode the 2xx body as `R`.
    ///
    /// # Errors
    ///
    /// As [`Self::send`], plus [`ApiError::Decode`] when the body does not fit `R`.
    pub async fn json<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        let response = self.send(request).await?;
        decode(&response.body)
    }

    /// Send `request` and discard the 2xx body.
    ///
    /// # Errors
    ///
    /// As [`Self::send`].
    pub async fn empty(&self, request: ApiRequest) -> Result<(), ApiError> {
        self.send(request).await.map(drop)
    }
}

fn decode<R: DeserializeOwned>(body: &str) -> Result<R, ApiError> {
    // 204 and empty 200s decode as JSON null.
    let body = if body.trim().is_empty() { "null" } else { body };
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

// =============================================================================
// DEFAULT STACKS
// =============================================================================

/// The full native pipeline.
#[cfg(not(target_arch = "wasm32"))]
pub type NativeClient = ApiClient<RefreshOnUnauthorized<WithBearer<super::http::ReqwestTransport>>>;

/// Build the native pipeline for `session`.
///
/// # Errors
///
/// Returns [`ApiError::Network`] if the HTTP client cannot be built.
#[cfg(not(target_arch = "wasm32"))]
pub fn connect(config: &ClientConfig, session: &SessionHandle) -> Result<NativeClient, ApiError> {
    let http = super::http::ReqwestTransport::new(config)?;
    Ok(layer(http, config, session))
}

/// The full browser pipeline.
#[cfg(feature = "hydrate")]
pub type BrowserClient = ApiClient<RefreshOnUnauthorized<WithBearer<super::http::GlooTransport>>>;

#[cfg(feature = "hydrate")]
#[must_use]
pub fn connect_browser(config: &ClientConfig, session: &SessionHandle) -> BrowserClient {
    layer(super::http::GlooTransport::new(config), config, session)
}

/// Wrap any transport with bearer attachment and refresh coordination.
pub fn layer<T: Transport>(
    transport: T,
    config: &ClientConfig,
    session: &SessionHandle,
) -> ApiClient<RefreshOnUnauthorized<WithBearer<T>>> {
    let bearer = WithBearer::new(transport, session.clone());
    let refresh = RefreshOnUnauthorized::new(bearer, session.clone()).with_refresh_timeout(config.refresh_timeout());
    ApiClient::new(refresh)
}
