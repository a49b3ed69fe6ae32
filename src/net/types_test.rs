use super::*;
use serde_json::json;

const USER_ID: &str = "6f1d8f4e-58a6-4d2c-9a51-1c3e2f7f0a11";

fn wire_user(role: &str) -> serde_json::Value {
    json!({
        "id": USER_ID,
        "nome": "Maria Souza",
        "email": "maria@clinica.test",
        "cpf": "12345678901",
        "role": role,
        "ativo": true,
        "created_at": "2025-01-10T12:00:00",
        "updated_at": "2025-01-10T12:00:00"
    })
}

// =============================================================
// Role
// =============================================================

#[test]
fn role_uses_portuguese_wire_names() {
    assert_eq!(serde_json::to_value(Role::Doctor).unwrap(), json!("MEDICO"));
    assert_eq!(serde_json::from_value::<Role>(json!("PACIENTE")).unwrap(), Role::Patient);
}

#[test]
fn role_parses_english_and_wire_spellings() {
    assert_eq!("doctor".parse::<Role>(), Ok(Role::Doctor));
    assert_eq!("MEDICO".parse::<Role>(), Ok(Role::Doctor));
    assert_eq!(" Paciente ".parse::<Role>(), Ok(Role::Patient));
    assert!("nurse".parse::<Role>().is_err());
}

#[test]
fn role_display_matches_wire() {
    assert_eq!(Role::Admin.to_string(), "ADMIN");
}

// =============================================================
// Users and doctors
// =============================================================

#[test]
fn user_decodes_wire_fields() {
    let user: User = serde_json::from_value(wire_user("ADMIN")).unwrap();
    assert_eq!(user.name, "Maria Souza");
    assert_eq!(user.role, Role::Admin);
    assert_eq!(user.active, Some(true));
    assert!(user.phone.is_none());
}

#[test]
fn user_serializes_without_absent_optionals() {
    let mut user: User = serde_json::from_value(wire_user("PACIENTE")).unwrap();
    user.cpf = None;
    let value = serde_json::to_value(&user).unwrap();
    assert_eq!(value["nome"], "Maria Souza");
    assert!(value.get("cpf").is_none());
    assert!(value.get("telefone").is_none());
}

#[test]
fn doctor_flattens_user_and_reads_profile() {
    let mut value = wire_user("MEDICO");
    value["doctor_profile"] = json!({
        "crm_crp": "CRM-SP 1234",
        "especialidade": "Cardiologia",
        "valor_padrao_consulta": "250.00"
    });
    let doctor: Doctor = serde_json::from_value(value).unwrap();
    assert_eq!(doctor.user.role, Role::Doctor);
    assert_eq!(doctor.specialty(), Some("Cardiologia"));
    assert_eq!(doctor.default_fee(), Some(250.0));
}

#[test]
fn doctor_without_profile_has_no_fee() {
    let doctor: Doctor = serde_json::from_value(wire_user("MEDICO")).unwrap();
    assert!(doctor.doctor_profile.is_none());
    assert_eq!(doctor.default_fee(), None);
}

// =============================================================
// Money
// =============================================================

#[test]
fn payment_amount_accepts_decimal_string() {
    let payment: Payment = serde_json::from_value(json!({
        "id": USER_ID,
        "appointment_id": USER_ID,
        "valor": "150.50",
        "metodo": "PIX",
        "status": "APROVADO",
        "nsu_fake": "000123"
    }))
    .unwrap();
    assert!((payment.amount - 150.5).abs() < f64::EPSILON);
    assert_eq!(payment.method, PaymentMethod::Pix);
    assert_eq!(payment.nsu.as_deref(), Some("000123"));
}

#[test]
fn payment_amount_rejects_garbage_string() {
    let result = serde_json::from_value::<Payment>(json!({
        "id": USER_ID,
        "appointment_id": USER_ID,
        "valor": "abc",
        "metodo": "PIX",
        "status": "APROVADO"
    }));
    assert!(result.is_err());
}

#[test]
fn kpis_default_missing_fields() {
    let kpis: DashboardKpis = serde_json::from_value(json!({
        "total_consultas_mes": 4,
        "faturamento_mes": 600,
        "taxa_ocupacao": 42.5
    }))
    .unwrap();
    assert_eq!(kpis.appointments_this_month, 4);
    assert!((kpis.revenue_this_month - 600.0).abs() < f64::EPSILON);
    assert!(kpis.upcoming.is_empty());
    assert_eq!(kpis.active_users, 0);
}

// =============================================================
// Parsing helpers
// =============================================================

#[test]
fn payment_method_parses_aliases() {
    assert_eq!("card".parse::<PaymentMethod>(), Ok(PaymentMethod::Card));
    assert_eq!("CARTAO_FAKE".parse::<PaymentMethod>(), Ok(PaymentMethod::Card));
    assert_eq!("dinheiro".parse::<PaymentMethod>(), Ok(PaymentMethod::Cash));
    assert!("boleto".parse::<PaymentMethod>().is_err());
}

#[test]
fn appointment_status_parses_aliases() {
    assert_eq!("canceled".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Cancelled));
    assert_eq!("REALIZADA".parse::<AppointmentStatus>(), Ok(AppointmentStatus::Completed));
}

#[test]
fn update_user_request_reports_empty() {
    assert!(UpdateUserRequest::default().is_empty());
    let update = UpdateUserRequest { active: Some(false), ..UpdateUserRequest::default() };
    assert!(!update.is_empty());
    assert_eq!(serde_json::to_value(&update).unwrap(), json!({ "ativo": false }));
}

#[test]
fn token_pair_debug_redacts_tokens() {
    let pair = TokenPair {
        access_token: "secret-access".to_owned(),
        refresh_token: "secret-refresh".to_owned(),
        token_type: "bearer".to_owned(),
    };
    let rendered = format!("{pair:?}");
    assert!(!rendered.contains("secret"));
}

#[test]
fn token_pair_defaults_token_type() {
    let pair: TokenPair =
        serde_json::from_value(json!({ "access_token": "a", "refresh_token": "r" })).unwrap();
    assert_eq!(pair.token_type, "bearer");
}
