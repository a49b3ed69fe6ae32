use super::*;

#[test]
fn detail_string_becomes_message() {
    let err = ApiError::from_status(401, r#"{"detail":"Email ou senha incorretos"}"#);
    assert!(err.is_auth());
    assert_eq!(err.message(), "Email ou senha incorretos");
    assert_eq!(err.status(), Some(401));
}

#[test]
fn validation_detail_collects_field_errors() {
    let body = r#"{"detail":[
        {"loc":["body","email"],"msg":"value is not a valid email address","type":"value_error"},
        {"loc":["body","cpf"],"msg":"CPF deve conter apenas dígitos","type":"value_error"}
    ]}"#;
    let err = ApiError::from_status(422, body);
    assert!(err.is_validation());
    assert_eq!(err.message(), "value is not a valid email address");
    let fields = err.field_errors();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields["cpf"], "CPF deve conter apenas dígitos");
}

#[test]
fn validation_item_with_numeric_tail_is_not_a_field() {
    let body = r#"{"detail":[{"loc":["body","items",0],"msg":"bad item"}]}"#;
    let err = ApiError::from_status(422, body);
    assert!(err.field_errors().is_empty());
    assert_eq!(err.message(), "bad item");
}

#[test]
fn unparseable_body_falls_back_to_status_message() {
    let err = ApiError::from_status(503, "<html>bad gateway</html>");
    assert!(matches!(err, ApiError::Server(_)));
    assert_eq!(err.message(), MSG_SERVER);
}

#[test]
fn statuses_map_to_categories() {
    assert!(ApiError::from_status(400, "").is_conflict());
    assert!(ApiError::from_status(403, "").is_forbidden());
    assert!(ApiError::from_status(404, "").is_not_found());
    assert!(matches!(ApiError::from_status(418, ""), ApiError::Unexpected(_)));
}

#[test]
fn refresh_failure_reports_inner_status_and_session_message() {
    let err = ApiError::RefreshFailed(Box::new(ApiError::from_status(401, "")));
    assert_eq!(err.status(), Some(401));
    assert_eq!(err.message(), MSG_SESSION_EXPIRED);
    assert!(err.ends_session());
    assert!(!err.is_auth());
}

#[test]
fn network_errors_have_no_status() {
    let err = ApiError::Network("connection refused".to_owned());
    assert_eq!(err.status(), None);
    assert!(err.is_network());
    assert_eq!(err.message(), MSG_NETWORK);
}

#[test]
fn invalid_input_surfaces_as_field_error() {
    let err = ApiError::invalid_input("email", "Email inválido");
    assert!(err.is_validation());
    assert_eq!(err.message(), "Email inválido");
    assert_eq!(err.field_errors()["email"], "Email inválido");
}

#[test]
fn message_for_status_table() {
    assert_eq!(message_for_status(None), MSG_NETWORK);
    assert_eq!(message_for_status(Some(400)), MSG_CONFLICT);
    assert_eq!(message_for_status(Some(502)), MSG_SERVER);
    assert_eq!(message_for_status(Some(504)), MSG_UNKNOWN);
}
