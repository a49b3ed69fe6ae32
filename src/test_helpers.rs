//! Shared fixtures for unit tests.

use std::sync::{Mutex, PoisonError};

use uuid::Uuid;

use crate::net::error::ApiError;
use crate::net::transport::{ApiRequest, ApiResponse, Transport};
use crate::net::types::{Role, User};

/// Build a user with a deterministic id per role.
#[must_use]
pub fn sample_user(role: Role) -> User {
    let (id, name, email) = match role {
        Role::Admin => ("00000000-0000-4000-8000-000000000001", "Ana Admin", "admin@clinica.test"),
        Role::Doctor => ("00000000-0000-4000-8000-000000000002", "Dr. Bruno", "bruno@clinica.test"),
        Role::Patient => ("00000000-0000-4000-8000-000000000003", "Carla Paciente", "carla@clinica.test"),
    };
    User {
        id: Uuid::parse_str(id).expect("fixture uuid"),
        name: name.to_owned(),
        email: email.to_owned(),
        role,
        cpf: None,
        phone: None,
        birth_date: None,
        active: Some(true),
        created_at: None,
        updated_at: None,
    }
}

/// JSON body of a token pair response.
#[must_use]
pub fn token_pair_body(access: &str, refresh: &str) -> String {
    serde_json::json!({ "access_token": access, "refresh_token": refresh, "token_type": "bearer" }).to_string()
}

/// What the scripted server does with one request.
pub enum Reply {
    Respond(ApiResponse),
    Fail(ApiError),
    /// Never settle.
    Hang,
}

impl Reply {
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Respond(ApiResponse::new(status, body))
    }

    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::status(status, value.to_string())
    }
}

type Handler = Box<dyn Fn(&ApiRequest) -> Reply>;

/// In-process fake server: records every request and answers through a handler.
///
/// Each send yields to the executor once before answering, so requests
/// driven together with `join_all` genuinely interleave.
pub struct ScriptedTransport {
    handler: Handler,
    log: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&ApiRequest) -> Reply + 'static,
    {
        Self { handler: Box::new(handler), log: Mutex::new(Vec::new()) }
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of requests received for `path`.
    pub fn count(&self, path: &str) -> usize {
        self.requests().iter().filter(|r| r.path == path).count()
    }
}

#[async_trait::async_trait(?Send)]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).push(request.clone());
        tokio::task::yield_now().await;
        match (self.handler)(&request) {
            Reply::Respond(response) => Ok(response),
            Reply::Fail(error) => Err(error),
            Reply::Hang => futures::future::pending().await,
        }
    }
}
