//! Clinic REST endpoints under `/api/v1`.
//!
//! One method per endpoint, grouped the way the backend groups its routers.
//! Role enforcement is the backend's job; these methods only shape requests.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use uuid::Uuid;

use super::client::ApiClient;
use super::error::ApiError;
use super::transport::{ApiRequest, Transport};
use super::types::{
    AgendaSlot, Appointment, AppointmentStatus, AppointmentsReport, CreateAppointmentRequest, CreatePaymentRequest,
    CreateSlotRequest, CreateUserRequest, DashboardKpis, Doctor, LoginRequest, MonthlyRevenue, OccupancyReport, Page,
    Payment, PaymentsReport, RegisterRequest, TokenPair, UpdateAppointmentStatusRequest, UpdateUserRequest, User,
};

pub const API_PREFIX: &str = "/api/v1";

/// Default page size used by the listing pages.
pub const DEFAULT_PAGE_LIMIT: u32 = 50;

/// Optional `start_date` / `end_date` filter (`YYYY-MM-DD`) for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange<'a> {
    pub start: Option<&'a str>,
    pub end: Option<&'a str>,
}

fn path(suffix: &str) -> String {
    format!("{API_PREFIX}{suffix}")
}

impl DateRange<'_> {
    fn apply(self, request: ApiRequest) -> ApiRequest {
        request.query_opt("start_date", self.start).query_opt("end_date", self.end)
    }
}

// =============================================================================
// AUTH
// =============================================================================

impl<T: Transport> ApiClient<T> {
    /// `POST /auth/login`. Sent without credentials and never refreshed:
    /// a 401 here means wrong email or password.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] on bad credentials, otherwise as [`ApiClient::json`].
    pub async fn login(&self, body: &LoginRequest) -> Result<TokenPair, ApiError> {
        self.json(ApiRequest::post(path("/auth/login")).json(body)?.anonymous()).await
    }

    /// `POST /auth/register` (patient self-registration).
    ///
    /// # Errors
    ///
    /// [`ApiError::Conflict`] when the email or CPF is taken.
    pub async fn register(&self, body: &RegisterRequest) -> Result<User, ApiError> {
        self.json(ApiRequest::post(path("/auth/register")).json(body)?.anonymous()).await
    }

    /// `GET /auth/me`.
    ///
    /// # Errors
    ///
    /// As [`ApiClient::json`].
    pub async fn me(&self) -> Result<User, ApiError> {
        self.json(ApiRequest::get(path("/auth/me"))).await
    }
}

// =============================================================================
// USERS (ADMIN)
// =============================================================================

impl<T: Transport> ApiClient<T> {
    pub async fn list_users(&self, skip: u32, limit: u32) -> Result<Page<User>, ApiError> {
        self.json(ApiRequest::get(path("/users")).query("skip", skip).query("limit", limit)).await
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, ApiError> {
        self.json(ApiRequest::get(path(&format!("/users/{id}")))).await
    }

    pub async fn create_user(&self, body: &CreateUserRequest) -> Result<User, ApiError> {
        self.json(ApiRequest::post(path("/users")).json(body)?).await
    }

    pub async fn update_user(&self, id: Uuid, body: &UpdateUserRequest) -> Result<User, ApiError> {
        if body.is_empty() {
            return Err(ApiError::invalid_input("body", "Nenhum campo para atualizar."));
        }
        self.json(ApiRequest::put(path(&format!("/users/{id}"))).json(body)?).await
    }

    pub async fn delete_user(&self, id: Uuid) -> Result<(), ApiError> {
        self.empty(ApiRequest::delete(path(&format!("/users/{id}")))).await
    }
}

// =============================================================================
// DOCTORS & AGENDA
// =============================================================================

impl<T: Transport> ApiClient<T> {
    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, ApiError> {
        self.json(ApiRequest::get(path("/doctors"))).await
    }

    pub async fn get_doctor(&self, id: Uuid) -> Result<Doctor, ApiError> {
        self.json(ApiRequest::get(path(&format!("/doctors/{id}")))).await
    }

    pub async fn get_doctor_profile(&self, id: Uuid) -> Result<Doctor, ApiError> {
        self.json(ApiRequest::get(path(&format!("/doctors/{id}/profile")))).await
    }

    /// Slots for `doctor_id`, optionally bounded by ISO timestamps.
    pub async fn get_agenda(
        &self,
        doctor_id: Uuid,
        start: Option<&str>,
        end: Option<&str>,
    ) -> Result<Vec<AgendaSlot>, ApiError> {
        let request = ApiRequest::get(path(&format!("/doctors/{doctor_id}/agenda")))
            .query_opt("start", start)
            .query_opt("end", end);
        self.json(request).await
    }

    pub async fn create_slot(&self, doctor_id: Uuid, body: &CreateSlotRequest) -> Result<AgendaSlot, ApiError> {
        self.json(ApiRequest::post(path(&format!("/doctors/{doctor_id}/agenda/slots"))).json(body)?)
            .await
    }

    pub async fn delete_slot(&self, slot_id: Uuid) -> Result<(), ApiError> {
        self.empty(ApiRequest::delete(path(&format!("/agenda/slots/{slot_id}")))).await
    }
}

// =============================================================================
// APPOINTMENTS & PAYMENTS
// =============================================================================

impl<T: Transport> ApiClient<T> {
    /// Appointments visible to the caller (own for patients/doctors, all for admins).
    pub async fn list_appointments(&self, skip: u32, limit: u32) -> Result<Page<Appointment>, ApiError> {
        self.json(ApiRequest::get(path("/appointments")).query("skip", skip).query("limit", limit)).await
    }

    pub async fn create_appointment(&self, slot_id: Uuid) -> Result<Appointment, ApiError> {
        let body = CreateAppointmentRequest { slot_id };
        self.json(ApiRequest::post(path("/appointments")).json(&body)?).await
    }

    pub async fn update_appointment_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, ApiError> {
        let body = UpdateAppointmentStatusRequest { status };
        self.json(ApiRequest::patch(path(&format!("/appointments/{id}/status"))).json(&body)?).await
    }

    pub async fn list_payments(&self, skip: u32, limit: u32) -> Result<Page<Payment>, ApiError> {
        self.json(ApiRequest::get(path("/payments")).query("skip", skip).query("limit", limit)).await
    }

    pub async fn get_payment(&self, id: Uuid) -> Result<Payment, ApiError> {
        self.json(ApiRequest::get(path(&format!("/payments/{id}")))).await
    }

    /// Simulated payment; amounts must be positive.
    pub async fn create_payment(&self, body: &CreatePaymentRequest) -> Result<Payment, ApiError> {
        if !(body.amount.is_finite() && body.amount > 0.0) {
            return Err(ApiError::invalid_input("valor", "O valor deve ser maior que zero."));
        }
        self.json(ApiRequest::post(path("/payments")).json(body)?).await
    }
}

// =============================================================================
// DASHBOARD & REPORTS
// =============================================================================

impl<T: Transport> ApiClient<T> {
    pub async fn dashboard_kpis(&self) -> Result<DashboardKpis, ApiError> {
        self.json(ApiRequest::get(path("/dashboard/kpis"))).await
    }

    pub async fn patient_appointments_report(&self, range: DateRange<'_>) -> Result<AppointmentsReport, ApiError> {
        self.json(range.apply(ApiRequest::get(path("/reports/patient/appointments")))).await
    }

    pub async fn patient_payments_report(&self, range: DateRange<'_>) -> Result<PaymentsReport, ApiError> {
        self.json(range.apply(ApiRequest::get(path("/reports/patient/payments")))).await
    }

    pub async fn doctor_occupancy_report(&self, range: DateRange<'_>) -> Result<OccupancyReport, ApiError> {
        self.json(range.apply(ApiRequest::get(path("/reports/doctor/occupancy")))).await
    }

    pub async fn monthly_revenue(&self, year: i32) -> Result<Vec<MonthlyRevenue>, ApiError> {
        self.json(ApiRequest::get(path("/reports/admin/monthly-revenue")).query("year", year)).await
    }
}
