//! Concrete transports: `reqwest` natively, `gloo-net` in the browser.
//!
//! Both only move bytes. A non-2xx status comes back as an [`ApiResponse`];
//! connection failures and client-side timeouts become [`ApiError::Network`].

use super::error::ApiError;
use super::transport::{ApiRequest, ApiResponse, Transport};
use crate::config::ClientConfig;

#[cfg(not(target_arch = "wasm32"))]
const CONNECT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// NATIVE
// =============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub struct ReqwestTransport {
    http: reqwest::Client,
    config: ClientConfig,
}

#[cfg(not(target_arch = "wasm32"))]
impl ReqwestTransport {
    /// Build a client bound to `config.api_url`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if the TLS backend cannot be initialized.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::Network(format!("http client build failed: {e}")))?;
        Ok(Self { http, config: config.clone() })
    }

    fn method(request: &ApiRequest) -> reqwest::Method {
        use super::transport::Method;
        match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait::async_trait(?Send)]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.config.url_for(&request.path);
        let mut builder = self.http.request(Self::method(&request), &url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, method = %request.method, path = %request.path, "request failed");
            ApiError::Network(e.to_string())
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
        tracing::debug!(method = %request.method, path = %request.path, status, "api response");
        Ok(ApiResponse::new(status, body))
    }
}

// =============================================================================
// BROWSER
// =============================================================================

#[cfg(feature = "hydrate")]
pub struct GlooTransport {
    config: ClientConfig,
}

#[cfg(feature = "hydrate")]
impl GlooTransport {
    /// Target `config.api_url`, an absolute http(s) base URL.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        Self { config: config.clone() }
    }
}

#[cfg(feature = "hydrate")]
#[async_trait::async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        use gloo_net::http::Request;

        use super::transport::Method;

        let url = self.config.url_for(&request.path);
        let mut builder = match request.method {
            Method::Get => Request::get(&url),
            Method::Post => Request::post(&url),
            Method::Put => Request::put(&url),
            Method::Patch => Request::patch(&url),
            Method::Delete => Request::delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        if let Some(token) = &request.bearer {
            builder = builder.header("Authorization", &format!("Bearer {token}"));
        }
        let prepared = match &request.body {
            Some(body) => builder.json(body),
            None => builder.build(),
        }
        .map_err(|e| ApiError::invalid_input("body", &e.to_string()))?;

        let response = prepared.send().await.map_err(|e| {
            tracing::warn!(error = %e, method = %request.method, path = %request.path, "request failed");
            ApiError::Network(e.to_string())
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(ApiResponse::new(status, body))
    }
}
