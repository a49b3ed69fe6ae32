//! Request/response model and the composable transport seam.
//!
//! DESIGN
//! ======
//! Cross-cutting behavior is layered as decorators around a [`Transport`]
//! instead of global interceptors, so the full pipeline is visible where it
//! is built:
//!
//! ```text
//! RefreshOnUnauthorized<WithBearer<ReqwestTransport>>
//! ```
//!
//! At this level a non-2xx status is a normal [`ApiResponse`]; only "no
//! response at all" is an error. Status mapping happens in `ApiClient`.
//!
//! Futures are `?Send`: the reference execution model is the browser's single
//! event loop, where the underlying fetch futures are not `Send`.

#[cfg(test)]
#[path = "transport_test.rs"]
mod transport_test;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::error::ApiError;
use crate::session::SessionHandle;

// =============================================================================
// REQUEST
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as it travels through the pipeline.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path below the API base URL, e.g. `/api/v1/doctors`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
    /// Bearer credential attached by [`WithBearer`].
    pub bearer: Option<String>,
    /// Never carries credentials and never triggers a token refresh
    /// (login, registration, the refresh call itself).
    pub anonymous: bool,
    /// Set once the request has been replayed after a refresh.
    pub retried: bool,
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("has_body", &self.body.is_some())
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("anonymous", &self.anonymous)
            .field("retried", &self.retried)
            .finish()
    }
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            anonymous: false,
            retried: false,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Append a query parameter.
    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Append a query parameter only when `value` is present.
    #[must_use]
    pub fn query_opt(self, key: &str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidInput`] if `body` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::invalid_input("body", &e.to_string()))?;
        self.body = Some(value);
        Ok(self)
    }

    #[must_use]
    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Status and raw body of a received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// One hop of the request pipeline.
#[async_trait::async_trait(?Send)]
pub trait Transport {
    /// Send `request` and return whatever response arrives.
    ///
    /// # Errors
    ///
    /// Returns an error only when no usable response was produced
    /// (network failure, or a failure raised by a decorator such as a
    /// failed token refresh).
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

#[async_trait::async_trait(?Send)]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        (**self).send(request).await
    }
}

/// Attaches the session's current access token to every non-anonymous request.
///
/// The token is read at send time, so a replay after a refresh carries the
/// rotated credential.
pub struct WithBearer<T> {
    inner: T,
    session: SessionHandle,
}

impl<T> WithBearer<T> {
    pub fn new(inner: T, session: SessionHandle) -> Self {
        Self { inner, session }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait::async_trait(?Send)]
impl<T: Transport> Transport for WithBearer<T> {
    async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        request.bearer = if request.anonymous { None } else { self.session.access_token() };
        self.inner.send(request).await
    }
}
