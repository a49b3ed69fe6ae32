//! Error taxonomy for the request pipeline.
//!
//! DESIGN
//! ======
//! At the transport level a non-2xx status is still a response; it becomes an
//! [`ApiError`] only once the typed client maps it. Each HTTP category gets
//! its own variant so callers can branch without inspecting status codes, and
//! the FastAPI error body (`{"detail": "..."}` or
//! `{"detail": [{"loc": [...], "msg": "..."}]}`) is decoded once into an
//! [`ErrorBody`].
//!
//! `ApiError` is `Clone` because a single refresh failure is delivered to the
//! originating request and to every request queued behind it.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

// =============================================================================
// USER-FACING MESSAGES
// =============================================================================

pub const MSG_NETWORK: &str = "Erro ao conectar com o servidor. Verifique sua conexão.";
pub const MSG_UNAUTHORIZED: &str = "Email ou senha incorretos.";
pub const MSG_FORBIDDEN: &str = "Você não tem permissão para realizar esta ação.";
pub const MSG_NOT_FOUND: &str = "Recurso não encontrado.";
pub const MSG_VALIDATION: &str = "Erro de validação. Verifique os campos.";
pub const MSG_CONFLICT: &str = "Já existe um registro com estes dados.";
pub const MSG_SERVER: &str = "Erro no servidor. Tente novamente mais tarde.";
pub const MSG_SESSION_EXPIRED: &str = "Sua sessão expirou. Faça login novamente.";
pub const MSG_UNKNOWN: &str = "Erro desconhecido. Tente novamente.";

/// Fallback message for a status code when the server sent no `detail`.
#[must_use]
pub fn message_for_status(status: Option<u16>) -> &'static str {
    match status {
        None => MSG_NETWORK,
        Some(400) => MSG_CONFLICT,
        Some(401) => MSG_UNAUTHORIZED,
        Some(403) => MSG_FORBIDDEN,
        Some(404) => MSG_NOT_FOUND,
        Some(422) => MSG_VALIDATION,
        Some(500 | 502 | 503) => MSG_SERVER,
        Some(_) => MSG_UNKNOWN,
    }
}

// =============================================================================
// ERROR BODY
// =============================================================================

/// Decoded non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: u16,
    /// Server-provided message: the `detail` string, or the first validation message.
    pub detail: Option<String>,
    /// Field name -> validation message, from `detail[].loc` / `detail[].msg`.
    pub fields: BTreeMap<String, String>,
}

impl ErrorBody {
    /// Decode a FastAPI-style error body. Unknown shapes keep only the status.
    #[must_use]
    pub fn parse(status: u16, body: &str) -> Self {
        let mut parsed = Self { status, detail: None, fields: BTreeMap::new() };
        let Ok(wire) = serde_json::from_str::<WireErrorBody>(body) else {
            return parsed;
        };
        match wire.detail {
            Some(WireDetail::Message(message)) => parsed.detail = Some(message),
            Some(WireDetail::Validation(items)) => {
                parsed.detail = items.first().map(|item| item.msg.clone());
                for item in items {
                    // `loc` looks like ["body", "email"]; the last string segment names the field.
                    if let Some(serde_json::Value::String(field)) = item.loc.last() {
                        parsed.fields.insert(field.clone(), item.msg);
                    }
                }
            }
            None => {}
        }
        parsed
    }

    #[must_use]
    pub fn message(&self) -> &str {
        self.detail.as_deref().unwrap_or_else(|| message_for_status(Some(self.status)))
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}: {}", self.status, self.message())
    }
}

#[derive(Deserialize)]
struct WireErrorBody {
    detail: Option<WireDetail>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireDetail {
    Message(String),
    Validation(Vec<WireValidationItem>),
}

#[derive(Deserialize)]
struct WireValidationItem {
    #[serde(default)]
    loc: Vec<serde_json::Value>,
    msg: String,
}

// =============================================================================
// API ERROR
// =============================================================================

/// Every failure a caller of the request pipeline can observe.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// No response was received.
    #[error("network failure: {0}")]
    Network(String),

    /// 401; the pipeline already tried to recover once.
    #[error("unauthorized ({0})")]
    Unauthorized(ErrorBody),

    /// 422 with field-level errors.
    #[error("validation failed ({0})")]
    Validation(ErrorBody),

    /// 400, used by the backend for duplicates and rule violations.
    #[error("conflict ({0})")]
    Conflict(ErrorBody),

    /// 403.
    #[error("forbidden ({0})")]
    Forbidden(ErrorBody),

    /// 404.
    #[error("not found ({0})")]
    NotFound(ErrorBody),

    /// 5xx.
    #[error("server failure ({0})")]
    Server(ErrorBody),

    /// Any other non-2xx status.
    #[error("unexpected response ({0})")]
    Unexpected(ErrorBody),

    /// The refresh endpoint failed; the session has been cleared.
    #[error("token refresh failed: {0}")]
    RefreshFailed(Box<ApiError>),

    /// The refresh call exceeded its time bound.
    #[error("timed out after {0} ms")]
    Timeout(u64),

    /// The session was logged out while the request was waiting on a refresh.
    #[error("session ended while the request was in flight")]
    LoggedOut,

    /// The request driving a refresh was dropped before the refresh settled.
    #[error("request cancelled before the token refresh settled")]
    Cancelled,

    /// A 2xx body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// Input rejected before any request was issued.
    #[error("invalid {field}: {message}")]
    InvalidInput { field: String, message: String },
}

impl ApiError {
    /// Map a non-2xx status and body into the taxonomy.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed = ErrorBody::parse(status, body);
        match status {
            400 => Self::Conflict(parsed),
            401 => Self::Unauthorized(parsed),
            403 => Self::Forbidden(parsed),
            404 => Self::NotFound(parsed),
            422 => Self::Validation(parsed),
            500..=599 => Self::Server(parsed),
            _ => Self::Unexpected(parsed),
        }
    }

    #[must_use]
    pub fn invalid_input(field: &str, message: &str) -> Self {
        Self::InvalidInput { field: field.to_owned(), message: message.to_owned() }
    }

    fn body(&self) -> Option<&ErrorBody> {
        match self {
            Self::Unauthorized(body)
            | Self::Validation(body)
            | Self::Conflict(body)
            | Self::Forbidden(body)
            | Self::NotFound(body)
            | Self::Server(body)
            | Self::Unexpected(body) => Some(body),
            _ => None,
        }
    }

    /// HTTP status behind this error, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RefreshFailed(inner) => inner.status(),
            other => other.body().map(|body| body.status),
        }
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Network(_) | Self::Timeout(_) => MSG_NETWORK.to_owned(),
            Self::RefreshFailed(_) | Self::LoggedOut => MSG_SESSION_EXPIRED.to_owned(),
            Self::Decode(_) | Self::Cancelled => MSG_UNKNOWN.to_owned(),
            Self::InvalidInput { message, .. } => message.clone(),
            other => other.body().map_or(MSG_UNKNOWN, ErrorBody::message).to_owned(),
        }
    }

    /// Field-level validation messages (empty unless the server sent them).
    #[must_use]
    pub fn field_errors(&self) -> BTreeMap<String, String> {
        match self {
            Self::InvalidInput { field, message } => BTreeMap::from([(field.clone(), message.clone())]),
            other => other.body().map(|body| body.fields.clone()).unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidInput { .. })
    }

    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden(_))
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }

    /// True when the session was cleared as a consequence of this error.
    #[must_use]
    pub fn ends_session(&self) -> bool {
        matches!(self, Self::RefreshFailed(_) | Self::LoggedOut)
    }
}
