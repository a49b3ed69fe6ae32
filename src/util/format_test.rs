use super::*;

// =============================================================
// Timestamps
// =============================================================

#[test]
fn utc_timestamps_shift_to_clinic_time() {
    assert_eq!(format_date_time("2025-03-01T12:30:00Z"), "01/03/2025 09:30");
    assert_eq!(format_date_time("2025-03-01T12:30:00+00:00"), "01/03/2025 09:30");
}

#[test]
fn utc_shift_can_cross_midnight() {
    assert_eq!(format_date("2025-03-01T01:00:00Z"), "28/02/2025");
    assert_eq!(format_time("2025-03-01T01:00:00Z"), "22:00");
}

#[test]
fn naive_timestamps_are_clinic_local() {
    assert_eq!(format_time("2025-03-01T14:05:00"), "14:05");
    assert_eq!(format_time("2025-03-01 14:05"), "14:05");
    assert_eq!(format_date_time("2025-03-01T14:05:00.123456"), "01/03/2025 14:05");
}

#[test]
fn bare_dates_are_local_midnight() {
    assert_eq!(format_date("2025-03-01"), "01/03/2025");
    assert_eq!(format_time("2025-03-01"), "00:00");
}

#[test]
fn unparseable_input_uses_fallbacks() {
    assert_eq!(format_date("garbage"), INVALID_DATE);
    assert_eq!(format_date_time(""), INVALID_DATE_TIME);
    assert_eq!(format_time("2025-13-01T10:00"), INVALID_TIME);
}

#[test]
fn parse_timestamp_reports_clinic_offset() {
    let at = parse_timestamp("2025-03-01T12:30:00Z").unwrap();
    assert_eq!(at.offset(), CLINIC_OFFSET);
    assert_eq!(at.hour(), 9);
}

// =============================================================
// Numbers
// =============================================================

#[test]
fn currency_groups_thousands_with_dots() {
    assert_eq!(format_currency(1234.56), "R$ 1.234,56");
    assert_eq!(format_currency(1_000_000.0), "R$ 1.000.000,00");
    assert_eq!(format_currency(150.0), "R$ 150,00");
}

#[test]
fn currency_edge_values() {
    assert_eq!(format_currency(0.0), "R$ 0,00");
    assert_eq!(format_currency(-5.5), "-R$ 5,50");
    assert_eq!(format_currency(-0.001), "R$ 0,00");
    assert_eq!(format_currency(f64::NAN), "R$ --");
}

#[test]
fn percent_has_one_decimal() {
    assert_eq!(format_percent(87.5), "87.5%");
    assert_eq!(format_percent(100.0), "100.0%");
    assert_eq!(format_percent(0.0), "0%");
    assert_eq!(format_percent(f64::INFINITY), "0%");
}

// =============================================================
// Statuses
// =============================================================

#[test]
fn slot_labels_and_tones() {
    assert_eq!(SlotStatus::Open.label(), "Livre");
    assert_eq!(SlotStatus::Open.tone(), BadgeTone::Outline);
    assert_eq!(SlotStatus::Cancelled.tone(), BadgeTone::Destructive);
}

#[test]
fn appointment_and_payment_labels() {
    assert_eq!(AppointmentStatus::Completed.label(), "Realizada");
    assert_eq!(AppointmentStatus::Scheduled.tone(), BadgeTone::Default);
    assert_eq!(PaymentStatus::Pending.label(), "Pendente");
    assert_eq!(PaymentStatus::Declined.tone(), BadgeTone::Destructive);
    assert_eq!(payment_method_label(PaymentMethod::Pix), "PIX");
}
