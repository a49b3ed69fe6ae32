//! Wire types for the clinic REST API.
//!
//! DESIGN
//! ======
//! The backend speaks Portuguese field and enum names. Rust-side names are
//! English and mapped with `serde(rename)`; optional fields default so that
//! responses from older and newer backend revisions both decode.
//!
//! Money arrives either as a JSON number or as a decimal string (the backend
//! serializes `Decimal` as text), so every amount goes through
//! [`deserialize_money`].

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

// =============================================================================
// ROLES
// =============================================================================

/// Account role. Drives route protection and post-login navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "ADMIN")]
    Admin,
    #[serde(rename = "MEDICO")]
    Doctor,
    #[serde(rename = "PACIENTE")]
    Patient,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Doctor, Role::Patient];

    /// Name used on the wire.
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Doctor => "MEDICO",
            Self::Patient => "PACIENTE",
        }
    }

    /// Human-readable label shown in the UI.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrador",
            Self::Doctor => "Médico",
            Self::Patient => "Paciente",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "doctor" | "medico" => Ok(Self::Doctor),
            "patient" | "paciente" => Ok(Self::Patient),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

// =============================================================================
// USERS
// =============================================================================

/// Authenticated user profile, as returned by `/auth/me` and `/users`.
///
/// This is also the shape persisted with the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(rename = "telefone", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "data_nascimento", default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(rename = "ativo", default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Professional details attached to a doctor account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    /// Council registration number (CRM/CRP).
    #[serde(rename = "crm_crp", default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(rename = "especialidade", default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(
        rename = "valor_padrao_consulta",
        default,
        deserialize_with = "deserialize_optional_money",
        skip_serializing_if = "Option::is_none"
    )]
    pub default_fee: Option<f64>,
}

/// A doctor listing entry: the user record plus its optional profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(flatten)]
    pub user: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_profile: Option<DoctorProfile>,
}

impl Doctor {
    #[must_use]
    pub fn specialty(&self) -> Option<&str> {
        self.doctor_profile.as_ref().and_then(|p| p.specialty.as_deref())
    }

    #[must_use]
    pub fn default_fee(&self) -> Option<f64> {
        self.doctor_profile.as_ref().and_then(|p| p.default_fee)
    }
}

// =============================================================================
// AGENDA
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotStatus {
    #[serde(rename = "LIVRE")]
    Open,
    #[serde(rename = "RESERVADO")]
    Reserved,
    #[serde(rename = "CONCLUIDO")]
    Completed,
    #[serde(rename = "CANCELADO")]
    Cancelled,
}

/// A bookable time window in a doctor's agenda.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaSlot {
    pub id: Uuid,
    pub doctor_id: Uuid,
    #[serde(rename = "inicio")]
    pub start: String,
    #[serde(rename = "fim")]
    pub end: String,
    pub status: SlotStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl AgendaSlot {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == SlotStatus::Open
    }
}

// =============================================================================
// APPOINTMENTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[serde(rename = "AGENDADA")]
    Scheduled,
    #[serde(rename = "REALIZADA")]
    Completed,
    #[serde(rename = "CANCELADA")]
    Cancelled,
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "scheduled" | "agendada" => Ok(Self::Scheduled),
            "completed" | "realizada" => Ok(Self::Completed),
            "cancelled" | "canceled" | "cancelada" => Ok(Self::Cancelled),
            other => Err(format!("unknown appointment status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub slot_id: Uuid,
    pub patient_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<Uuid>,
    pub status: AppointmentStatus,
    #[serde(rename = "observacoes", default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<AgendaSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<User>,
}

// =============================================================================
// PAYMENTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Simulated card authorization.
    #[serde(rename = "CARTAO_FAKE")]
    Card,
    #[serde(rename = "DINHEIRO")]
    Cash,
    #[serde(rename = "PIX")]
    Pix,
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "card" | "cartao" | "cartao_fake" => Ok(Self::Card),
            "cash" | "dinheiro" => Ok(Self::Cash),
            "pix" => Ok(Self::Pix),
            other => Err(format!("unknown payment method: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "APROVADO")]
    Approved,
    #[serde(rename = "PENDENTE")]
    Pending,
    #[serde(rename = "RECUSADO")]
    Declined,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub appointment_id: Uuid,
    #[serde(rename = "valor", deserialize_with = "deserialize_money")]
    pub amount: f64,
    #[serde(rename = "metodo")]
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Simulated acquirer sequence number.
    #[serde(rename = "nsu_fake", default, skip_serializing_if = "Option::is_none")]
    pub nsu: Option<String>,
    #[serde(rename = "data_pagamento", default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment: Option<Appointment>,
}

// =============================================================================
// DASHBOARD & REPORTS
// =============================================================================

/// Role-scoped headline numbers for the dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardKpis {
    #[serde(rename = "total_consultas_mes", default)]
    pub appointments_this_month: u64,
    #[serde(rename = "faturamento_mes", default, deserialize_with = "deserialize_money")]
    pub revenue_this_month: f64,
    /// Percentage in `0.0..=100.0`.
    #[serde(rename = "taxa_ocupacao", default)]
    pub occupancy_rate: f64,
    #[serde(rename = "proximos_atendimentos", default)]
    pub upcoming: Vec<UpcomingVisit>,
    #[serde(rename = "total_usuarios_ativos", default)]
    pub active_users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpcomingVisit {
    pub id: Uuid,
    #[serde(rename = "data_hora")]
    pub starts_at: String,
    #[serde(rename = "paciente", default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(rename = "medico", default, skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentsReport {
    #[serde(rename = "periodo")]
    pub period: String,
    pub total: u64,
    #[serde(rename = "agendadas")]
    pub scheduled: u64,
    #[serde(rename = "realizadas")]
    pub completed: u64,
    #[serde(rename = "canceladas")]
    pub cancelled: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentsReport {
    #[serde(rename = "periodo")]
    pub period: String,
    pub total: u64,
    #[serde(rename = "valor_total", deserialize_with = "deserialize_money")]
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyReport {
    pub doctor_id: Uuid,
    #[serde(rename = "doctor_nome")]
    pub doctor_name: String,
    pub total_slots: u64,
    #[serde(rename = "slots_livres")]
    pub open_slots: u64,
    #[serde(rename = "slots_reservados")]
    pub reserved_slots: u64,
    #[serde(rename = "slots_concluidos")]
    pub completed_slots: u64,
    #[serde(rename = "taxa_ocupacao")]
    pub occupancy_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`.
    #[serde(rename = "mes")]
    pub month: String,
    #[serde(rename = "total_consultas")]
    pub appointments: u64,
    #[serde(rename = "valor_total", deserialize_with = "deserialize_money")]
    pub amount: f64,
}

/// Offset-paginated listing envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

// =============================================================================
// REQUEST BODIES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token pair issued by `/auth/login` and `/auth/refresh`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

// Tokens stay out of logs and panic messages.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

fn default_token_type() -> String {
    "bearer".to_owned()
}

#[derive(Serialize)]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Patient self-registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub password: String,
    #[serde(rename = "telefone", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "data_nascimento", default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
}

/// Admin-side account creation, with optional doctor profile fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    pub password: String,
    pub role: Role,
    #[serde(rename = "telefone", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "crm_crp", default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(rename = "especialidade", default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<String>,
    #[serde(rename = "valor_padrao_consulta", default, skip_serializing_if = "Option::is_none")]
    pub default_fee: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(rename = "nome", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "telefone", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "ativo", default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl UpdateUserRequest {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none() && self.active.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSlotRequest {
    #[serde(rename = "inicio")]
    pub start: String,
    #[serde(rename = "fim")]
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub slot_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateAppointmentStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub appointment_id: Uuid,
    #[serde(rename = "valor")]
    pub amount: f64,
    #[serde(rename = "metodo")]
    pub method: PaymentMethod,
}

// =============================================================================
// MONEY
// =============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum MoneyRepr {
    Number(f64),
    Text(String),
}

impl MoneyRepr {
    fn into_f64<E: serde::de::Error>(self) -> Result<f64, E> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid money amount: {s:?}"))),
        }
    }
}

/// Accept an amount as a JSON number or a decimal string.
///
/// # Errors
///
/// Fails when the value is neither a number nor a parseable decimal string.
pub fn deserialize_money<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    MoneyRepr::deserialize(deserializer)?.into_f64()
}

fn deserialize_optional_money<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<MoneyRepr>::deserialize(deserializer)?
        .map(MoneyRepr::into_f64)
        .transpose()
}
