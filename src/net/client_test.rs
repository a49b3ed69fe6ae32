use std::sync::Arc;

use serde_json::json;

use super::*;
use crate::net::refresh::REFRESH_PATH;
use crate::net::types::{Role, User};
use crate::test_helpers::{Reply, ScriptedTransport, sample_user, token_pair_body};

fn client_answering(reply: fn(&ApiRequest) -> Reply) -> ApiClient<Arc<ScriptedTransport>> {
    ApiClient::new(Arc::new(ScriptedTransport::new(reply)))
}

// =============================================================
// Status mapping
// =============================================================

#[tokio::test]
async fn success_returns_response() {
    let client = client_answering(|_| Reply::status(201, "{}"));
    let response = client.send(ApiRequest::post("/api/v1/appointments")).await.unwrap();
    assert_eq!(response.status, 201);
}

#[tokio::test]
async fn not_found_maps_to_variant_with_server_message() {
    let client = client_answering(|_| Reply::status(404, r#"{"detail":"Médico não encontrado"}"#));
    let err = client.send(ApiRequest::get("/api/v1/doctors/x")).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.message(), "Médico não encontrado");
}

#[tokio::test]
async fn validation_errors_expose_fields() {
    let client = client_answering(|_| {
        Reply::json(
            422,
            &json!({ "detail": [{ "loc": ["body", "email"], "msg": "value is not a valid email address" }] }),
        )
    });
    let err = client.send(ApiRequest::post("/api/v1/users")).await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(
        err.field_errors().get("email").map(String::as_str),
        Some("value is not a valid email address")
    );
}

#[tokio::test]
async fn network_failure_passes_through() {
    let client = client_answering(|_| Reply::Fail(ApiError::Network("connection refused".to_owned())));
    let err = client.send(ApiRequest::get("/api/v1/doctors")).await.unwrap_err();
    assert!(err.is_network());
}

// =============================================================
// Decoding
// =============================================================

#[tokio::test]
async fn json_decodes_typed_body() {
    let client = client_answering(|_| Reply::json(200, &serde_json::to_value(sample_user(Role::Doctor)).unwrap()));
    let user: User = client.json(ApiRequest::get("/api/v1/auth/me")).await.unwrap();
    assert_eq!(user, sample_user(Role::Doctor));
}

#[tokio::test]
async fn json_reports_shape_mismatch_as_decode() {
    let client = client_answering(|_| Reply::json(200, &json!({ "unexpected": true })));
    let err = client.json::<User>(ApiRequest::get("/api/v1/auth/me")).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn empty_accepts_no_content() {
    let client = client_answering(|_| Reply::status(204, ""));
    client.empty(ApiRequest::delete("/api/v1/users/1")).await.unwrap();
}

#[tokio::test]
async fn json_reads_empty_body_as_null() {
    let client = client_answering(|_| Reply::status(204, ""));
    let value: Option<User> = client.json(ApiRequest::delete("/api/v1/users/1")).await.unwrap();
    assert!(value.is_none());
}

// =============================================================
// Layered pipeline
// =============================================================

#[tokio::test]
async fn layered_client_refreshes_and_maps_final_status() {
    let server = Arc::new(ScriptedTransport::new(|req| match (req.path.as_str(), req.bearer.as_deref()) {
        (REFRESH_PATH, _) => Reply::status(200, token_pair_body("fresh", "refresh-2")),
        (_, Some("fresh")) => Reply::status(403, r#"{"detail":"Acesso negado"}"#),
        _ => Reply::status(401, ""),
    }));
    let session = SessionHandle::in_memory();
    session.set_tokens("stale", "refresh-1");
    let client = layer(Arc::clone(&server), &ClientConfig::default(), &session);

    let err = client.send(ApiRequest::get("/api/v1/users")).await.unwrap_err();

    assert!(err.is_forbidden());
    assert_eq!(err.message(), "Acesso negado");
    assert_eq!(server.count(REFRESH_PATH), 1);
    assert_eq!(session.access_token().as_deref(), Some("fresh"));
}
