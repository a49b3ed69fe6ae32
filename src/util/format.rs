//! Display formatting for timestamps, money and statuses.
//!
//! All timestamps are shown in the clinic's zone, `America/Sao_Paulo`,
//! which has had no daylight saving since 2019 and is applied as a fixed
//! UTC−03:00 offset. Timestamps without an offset are taken as clinic-local.
//! Invalid input never fails: each formatter has a fixed fallback string.

#[cfg(test)]
#[path = "format_test.rs"]
mod format_test;

use time::format_description::BorrowedFormatItem;
use time::format_description::well_known::Rfc3339;
use time::macros::{format_description, offset};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

use crate::net::types::{AppointmentStatus, PaymentMethod, PaymentStatus, SlotStatus};

pub const CLINIC_OFFSET: UtcOffset = offset!(-3);

pub const INVALID_DATE: &str = "Data inválida";
pub const INVALID_DATE_TIME: &str = "Data/hora inválida";
pub const INVALID_TIME: &str = "--:--";

const NAIVE_DATE_TIME: &[BorrowedFormatItem<'_>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]");
const DATE_ONLY: &[BorrowedFormatItem<'_>] = format_description!("[year]-[month]-[day]");

const SHOW_DATE: &[BorrowedFormatItem<'_>] = format_description!("[day]/[month]/[year]");
const SHOW_DATE_TIME: &[BorrowedFormatItem<'_>] = format_description!("[day]/[month]/[year] [hour]:[minute]");
const SHOW_TIME: &[BorrowedFormatItem<'_>] = format_description!("[hour]:[minute]");

// =============================================================================
// TIMESTAMPS
// =============================================================================

/// Parse a wire timestamp into clinic-local time.
///
/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM[:SS[.fff]]` (a space may replace
/// the `T`) and bare `YYYY-MM-DD` (clinic-local midnight).
#[must_use]
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed.to_offset(CLINIC_OFFSET));
    }
    let naive = raw.replacen(' ', "T", 1);
    if let Ok(parsed) = PrimitiveDateTime::parse(&naive, NAIVE_DATE_TIME) {
        return Some(parsed.assume_offset(CLINIC_OFFSET));
    }
    Date::parse(raw, DATE_ONLY)
        .ok()
        .map(|date| PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_offset(CLINIC_OFFSET))
}

fn show(raw: &str, layout: &[BorrowedFormatItem<'_>], fallback: &str) -> String {
    let formatted = parse_timestamp(raw).and_then(|at| at.format(layout).ok());
    formatted.unwrap_or_else(|| {
        tracing::debug!(raw, "unparseable timestamp");
        fallback.to_owned()
    })
}

/// `DD/MM/YYYY`, or `Data inválida`.
#[must_use]
pub fn format_date(raw: &str) -> String {
    show(raw, SHOW_DATE, INVALID_DATE)
}

/// `DD/MM/YYYY HH:mm`, or `Data/hora inválida`.
#[must_use]
pub fn format_date_time(raw: &str) -> String {
    show(raw, SHOW_DATE_TIME, INVALID_DATE_TIME)
}

/// `HH:mm`, or `--:--`.
#[must_use]
pub fn format_time(raw: &str) -> String {
    show(raw, SHOW_TIME, INVALID_TIME)
}

// =============================================================================
// NUMBERS
// =============================================================================

/// Brazilian real with `.` thousands and `,` decimals: `R$ 1.234,56`.
#[must_use]
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return "R$ --".to_owned();
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    let digits = (cents / 100).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{sign}R$ {grouped},{:02}", cents % 100)
}

/// One decimal and a percent sign; zero shows as `0%`.
#[must_use]
pub fn format_percent(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0%".to_owned();
    }
    format!("{value:.1}%")
}

// =============================================================================
// STATUSES
// =============================================================================

/// Visual weight of a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Default,
    Secondary,
    Outline,
    Destructive,
}

/// Label and badge tone for a status value.
pub trait StatusDisplay: Copy {
    fn label(self) -> &'static str;
    fn tone(self) -> BadgeTone;
}

impl StatusDisplay for SlotStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Open => "Livre",
            Self::Reserved => "Reservado",
            Self::Completed => "Concluído",
            Self::Cancelled => "Cancelado",
        }
    }

    fn tone(self) -> BadgeTone {
        match self {
            Self::Open => BadgeTone::Outline,
            Self::Reserved => BadgeTone::Default,
            Self::Completed => BadgeTone::Secondary,
            Self::Cancelled => BadgeTone::Destructive,
        }
    }
}

impl StatusDisplay for AppointmentStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "Agendada",
            Self::Completed => "Realizada",
            Self::Cancelled => "Cancelada",
        }
    }

    fn tone(self) -> BadgeTone {
        match self {
            Self::Scheduled => BadgeTone::Default,
            Self::Completed => BadgeTone::Outline,
            Self::Cancelled => BadgeTone::Destructive,
        }
    }
}

impl StatusDisplay for PaymentStatus {
    fn label(self) -> &'static str {
        match self {
            Self::Approved => "Aprovado",
            Self::Pending => "Pendente",
            Self::Declined => "Recusado",
        }
    }

    fn tone(self) -> BadgeTone {
        match self {
            Self::Approved => BadgeTone::Default,
            Self::Pending => BadgeTone::Secondary,
            Self::Declined => BadgeTone::Destructive,
        }
    }
}

#[must_use]
pub fn payment_method_label(method: PaymentMethod) -> &'static str {
    match method {
        PaymentMethod::Card => "Cartão de Crédito",
        PaymentMethod::Cash => "Dinheiro",
        PaymentMethod::Pix => "PIX",
    }
}
