//! Tests for the booking flow: validation, fail-closed planning, and the
//! commit-time re-check.

use booking_engine::booking::{
    booking_window, check_professional, check_slot, commit_booking, edit_booking, plan_day,
    upcoming_for_client, BookingEdit, BookingRequest, DayPlan,
};
use booking_engine::model::{Booking, Professional, ScheduleEntry, Service, ServiceDuration, SlotTime};
use booking_engine::store::{BookingStore, Collection, MemoryStore};
use booking_engine::{EngineConfig, EngineError, ValidationIssue};
use chrono::NaiveDate;
use serde_json::Value;

// ── Helpers ─────────────────────────────────────────────────────────────────

const SHEET: &str = r#"{
    "agendabeta": [
        {"id": 2, "nome": "Bia", "data": "2026-03-16", "hora": "10:00", "email": "bia@example.com",
         "servico": "Corte", "valor": 50, "telefone": "11987654321", "profissional": "Ana"}
    ],
    "horabeta": [
        {"diasemana": "segunda", "hora": "09:00", "ativo": true},
        {"diasemana": "segunda", "hora": "10:00", "ativo": true},
        {"diasemana": "segunda", "hora": "11:00", "ativo": true},
        {"diasemana": "segunda", "hora": "12:00", "ativo": false}
    ],
    "servicobeta": [
        {"servico": "Corte", "duracao": 60, "valor": 50},
        {"servico": "Coloração", "duracao": 120, "valor": 150}
    ],
    "profissional": [
        {"profissional": "Ana", "de": "2026-01-01", "ate": "2026-12-31"},
        {"profissional": "Carla", "de": "2026-04-01"}
    ]
}"#;

// Friday before the 2026-03-16 Monday.
const TODAY: &str = "2026-03-13";
const MONDAY: &str = "2026-03-16";

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn time(s: &str) -> SlotTime {
    s.parse().unwrap()
}

fn store() -> MemoryStore {
    MemoryStore::from_json(SHEET).unwrap()
}

fn request(service: &str, at: &str) -> BookingRequest {
    BookingRequest {
        client_name: "Duda Lima".to_string(),
        phone: "(11) 91111-2222".to_string(),
        email: "duda@example.com".to_string(),
        service: service.to_string(),
        professional: "Ana".to_string(),
        date: date(MONDAY),
        time: time(at),
    }
}

fn rendered(slots: &[SlotTime]) -> Vec<String> {
    slots.iter().map(|t| t.to_string()).collect()
}

/// A store whose every call fails, as when the network is down.
struct UnreachableStore;

impl BookingStore for UnreachableStore {
    fn list_bookings(&self) -> booking_engine::error::Result<Vec<Booking>> {
        Err(EngineError::Store("connection refused".to_string()))
    }
    fn list_professionals(&self) -> booking_engine::error::Result<Vec<Professional>> {
        Err(EngineError::Store("connection refused".to_string()))
    }
    fn list_schedule_template(&self) -> booking_engine::error::Result<Vec<ScheduleEntry>> {
        Err(EngineError::Store("connection refused".to_string()))
    }
    fn list_services(&self) -> booking_engine::error::Result<Vec<Service>> {
        Err(EngineError::Store("connection refused".to_string()))
    }
    fn insert_row(&self, _: Collection, _: Value) -> booking_engine::error::Result<Value> {
        Err(EngineError::Store("connection refused".to_string()))
    }
    fn update_row(&self, _: Collection, _: u64, _: Value) -> booking_engine::error::Result<Value> {
        Err(EngineError::Store("connection refused".to_string()))
    }
    fn delete_row(&self, _: Collection, _: u64) -> booking_engine::error::Result<()> {
        Err(EngineError::Store("connection refused".to_string()))
    }
}

// ── Validation ──────────────────────────────────────────────────────────────

#[test]
fn valid_request_passes() {
    let config = EngineConfig::default();
    request("Corte", "09:00").validate(date(TODAY), &config).unwrap();
}

#[test]
fn all_problems_are_reported_together() {
    let config = EngineConfig::default();
    let bad = BookingRequest {
        client_name: "A".to_string(),
        phone: "1234".to_string(),
        email: "not-an-email".to_string(),
        service: " ".to_string(),
        professional: "Ana".to_string(),
        date: date("2026-03-12"),
        time: time("09:00"),
    };
    let Err(EngineError::Validation(issues)) = bad.validate(date(TODAY), &config) else {
        panic!("expected validation failure");
    };
    assert_eq!(
        issues,
        vec![
            ValidationIssue::MissingField("service"),
            ValidationIssue::NameTooShort(2),
            ValidationIssue::InvalidPhone,
            ValidationIssue::InvalidEmail,
            ValidationIssue::DateOutOfRange {
                date: date("2026-03-12"),
                earliest: date(TODAY),
                latest: date("2026-06-13"),
            },
        ]
    );
}

#[test]
fn booking_window_spans_configured_months() {
    let config = EngineConfig {
        months_ahead: 1,
        ..EngineConfig::default()
    };
    assert_eq!(
        booking_window(date("2026-01-31"), &config),
        (date("2026-01-31"), date("2026-02-28"))
    );
}

// ── Planning ────────────────────────────────────────────────────────────────

#[test]
fn plan_day_lists_open_slots_for_service_length() {
    let config = EngineConfig::default();
    let plan = plan_day(&store(), date(MONDAY), "Ana", Some("Corte"), &config);
    assert_eq!(rendered(plan.slots()), ["09:00", "11:00"]);

    // Two-hour colour: 09:00 needs 10:00 (taken); 11:00 needs 12:00 (free, not offered but not booked).
    let plan = plan_day(&store(), date(MONDAY), "Ana", Some("Coloração"), &config);
    assert_eq!(rendered(plan.slots()), ["11:00"]);
}

#[test]
fn plan_day_uses_default_duration_for_unknown_service() {
    let config = EngineConfig::default();
    let plan = plan_day(&store(), date(MONDAY), "Ana", Some("Inexistente"), &config);
    assert_eq!(plan, DayPlan::Open(vec![time("09:00"), time("11:00")]));
}

#[test]
fn plan_day_reports_professional_outside_window() {
    let config = EngineConfig::default();
    let plan = plan_day(&store(), date(MONDAY), "Carla", None, &config);
    assert_eq!(plan, DayPlan::ProfessionalUnavailable);
    assert!(plan.slots().is_empty());
    assert!(plan.notice().is_some());
}

#[test]
fn plan_day_reports_fully_booked() {
    let config = EngineConfig::default();
    // 2026-03-17 is a Tuesday with no template entries.
    let plan = plan_day(&store(), date("2026-03-17"), "Ana", None, &config);
    assert_eq!(plan, DayPlan::FullyBooked);
}

#[test]
fn unreachable_store_fails_closed() {
    let config = EngineConfig::default();
    let plan = plan_day(&UnreachableStore, date(MONDAY), "Ana", Some("Corte"), &config);
    assert_eq!(plan, DayPlan::StoreUnavailable);
    assert!(plan.slots().is_empty());

    let hour = ServiceDuration::from_minutes(60).unwrap();
    assert!(!check_slot(&UnreachableStore, date(MONDAY), time("09:00"), "Ana", hour));
    assert!(!check_professional(&UnreachableStore, "Ana", date(MONDAY)));
}

#[test]
fn check_slot_reads_fresh_bookings() {
    let hour = ServiceDuration::from_minutes(60).unwrap();
    assert!(check_slot(&store(), date(MONDAY), time("09:00"), "Ana", hour));
    assert!(!check_slot(&store(), date(MONDAY), time("10:00"), "Ana", hour));
}

#[test]
fn day_plan_serializes_with_status_tag() {
    let json = serde_json::to_value(DayPlan::Open(vec![time("09:00")])).unwrap();
    assert_eq!(json, serde_json::json!({"status": "open", "slots": ["09:00"]}));
    let json = serde_json::to_value(DayPlan::FullyBooked).unwrap();
    assert_eq!(json, serde_json::json!({"status": "fully_booked"}));
}

// ── Commit ──────────────────────────────────────────────────────────────────

#[test]
fn commit_creates_booking_with_service_price() {
    let store = store();
    let config = EngineConfig::default();
    let created = commit_booking(&store, &request("Coloração", "11:00"), date(TODAY), &config).unwrap();

    assert_eq!(created.id, Some(3));
    assert_eq!(created.phone, "11911112222");
    assert_eq!(created.price, 150.0);
    assert_eq!(created.service, "Coloração");
    assert_eq!(store.list_bookings().unwrap().len(), 2);
}

#[test]
fn commit_rejects_a_slot_taken_since_it_was_offered() {
    let store = store();
    let config = EngineConfig::default();

    let offered = plan_day(&store, date(MONDAY), "Ana", Some("Corte"), &config);
    assert!(offered.slots().contains(&time("09:00")));

    // Someone else books 09:00 first.
    commit_booking(&store, &request("Corte", "09:00"), date(TODAY), &config).unwrap();

    let mut late = request("Corte", "09:00");
    late.phone = "11933334444".to_string();
    let err = commit_booking(&store, &late, date(TODAY), &config).unwrap_err();
    assert!(matches!(err, EngineError::SlotTaken { .. }), "got {err:?}");

    let fresh = plan_day(&store, date(MONDAY), "Ana", Some("Corte"), &config);
    assert_eq!(rendered(fresh.slots()), ["11:00"]);
}

#[test]
fn commit_rejects_when_a_later_block_is_taken() {
    let config = EngineConfig::default();
    let err = commit_booking(&store(), &request("Coloração", "09:00"), date(TODAY), &config).unwrap_err();
    assert!(matches!(err, EngineError::SlotTaken { .. }));
}

#[test]
fn commit_rejects_unknown_service() {
    let config = EngineConfig::default();
    let err = commit_booking(&store(), &request("Massagem", "09:00"), date(TODAY), &config).unwrap_err();
    assert!(matches!(err, EngineError::UnknownService(name) if name == "Massagem"));
}

#[test]
fn commit_rejects_professional_outside_window() {
    let config = EngineConfig::default();
    let mut req = request("Corte", "09:00");
    req.professional = "Carla".to_string();
    let err = commit_booking(&store(), &req, date(TODAY), &config).unwrap_err();
    assert!(matches!(err, EngineError::ProfessionalUnavailable { .. }));
}

#[test]
fn commit_rejects_time_not_offered_that_day() {
    let config = EngineConfig::default();
    let err = commit_booking(&store(), &request("Corte", "12:00"), date(TODAY), &config).unwrap_err();
    assert!(matches!(err, EngineError::InvalidTime(_)));
}

#[test]
fn commit_enforces_future_appointment_limit() {
    let store = store();
    let config = EngineConfig {
        max_future_appointments: 1,
        ..EngineConfig::default()
    };
    commit_booking(&store, &request("Corte", "09:00"), date(TODAY), &config).unwrap();
    let err = commit_booking(&store, &request("Corte", "11:00"), date(TODAY), &config).unwrap_err();
    assert!(matches!(err, EngineError::TooManyAppointments { count: 1, limit: 1 }));
}

#[test]
fn commit_surfaces_store_failure() {
    let config = EngineConfig::default();
    let err = commit_booking(&UnreachableStore, &request("Corte", "09:00"), date(TODAY), &config).unwrap_err();
    assert!(matches!(err, EngineError::Store(_)));
}

// ── Client history ──────────────────────────────────────────────────────────

#[test]
fn upcoming_for_client_matches_normalized_phone_from_today() {
    let bookings = store().list_bookings().unwrap();
    let found = upcoming_for_client(&bookings, "(11) 98765-4321", date(TODAY));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].client_name, "Bia");

    assert!(upcoming_for_client(&bookings, "11987654321", date("2026-03-17")).is_empty());
    assert!(upcoming_for_client(&bookings, "", date(TODAY)).is_empty());
}

// ── Edit ────────────────────────────────────────────────────────────────────

#[test]
fn edit_contact_fields_only() {
    let store = store();
    let config = EngineConfig::default();
    let edit = BookingEdit {
        client_name: Some("Bia Souza".to_string()),
        phone: Some("(11) 95555-6666".to_string()),
        ..BookingEdit::default()
    };
    assert!(!edit.moves_slot());

    let updated = edit_booking(&store, 2, &edit, &config).unwrap();
    assert_eq!(updated.client_name, "Bia Souza");
    assert_eq!(updated.phone, "11955556666");
    assert_eq!(updated.time, time("10:00"));
    assert_eq!(store.list_bookings().unwrap(), vec![updated]);
}

#[test]
fn edit_moves_booking_and_frees_the_old_slot() {
    let store = store();
    let config = EngineConfig::default();
    let edit = BookingEdit {
        time: Some(time("09:00")),
        ..BookingEdit::default()
    };
    edit_booking(&store, 2, &edit, &config).unwrap();

    let plan = plan_day(&store, date(MONDAY), "Ana", Some("Corte"), &config);
    assert_eq!(rendered(plan.slots()), ["10:00", "11:00"]);
}

#[test]
fn edit_does_not_conflict_with_itself() {
    let store = store();
    let config = EngineConfig::default();
    // Growing the 10:00 booking to two hours overlaps only its own first block.
    let edit = BookingEdit {
        service: Some("Coloração".to_string()),
        ..BookingEdit::default()
    };
    let updated = edit_booking(&store, 2, &edit, &config).unwrap();
    assert_eq!(updated.service, "Coloração");
    assert_eq!(updated.price, 150.0);
}

#[test]
fn edit_keeps_explicit_price_over_service_price() {
    let config = EngineConfig::default();
    let edit = BookingEdit {
        service: Some("Coloração".to_string()),
        price: Some(120.0),
        ..BookingEdit::default()
    };
    let updated = edit_booking(&store(), 2, &edit, &config).unwrap();
    assert_eq!(updated.price, 120.0);
}

#[test]
fn edit_into_a_taken_slot_is_refused() {
    let store = store();
    let config = EngineConfig::default();
    commit_booking(&store, &request("Corte", "09:00"), date(TODAY), &config).unwrap();

    let edit = BookingEdit {
        time: Some(time("09:00")),
        ..BookingEdit::default()
    };
    let err = edit_booking(&store, 2, &edit, &config).unwrap_err();
    assert!(matches!(err, EngineError::SlotTaken { .. }), "got {err:?}");
    assert_eq!(store.list_bookings().unwrap()[0].time, time("10:00"));
}

#[test]
fn edit_checks_professional_window_and_service() {
    let config = EngineConfig::default();
    let to_carla = BookingEdit {
        professional: Some("Carla".to_string()),
        ..BookingEdit::default()
    };
    assert!(matches!(
        edit_booking(&store(), 2, &to_carla, &config),
        Err(EngineError::ProfessionalUnavailable { .. })
    ));

    let unknown = BookingEdit {
        service: Some("Massagem".to_string()),
        ..BookingEdit::default()
    };
    assert!(matches!(
        edit_booking(&store(), 2, &unknown, &config),
        Err(EngineError::UnknownService(_))
    ));
}

#[test]
fn edit_validates_fields_and_id() {
    let config = EngineConfig::default();
    let bad = BookingEdit {
        email: Some("nope".to_string()),
        price: Some(-1.0),
        ..BookingEdit::default()
    };
    let Err(EngineError::Validation(issues)) = edit_booking(&store(), 2, &bad, &config) else {
        panic!("expected validation failure");
    };
    assert_eq!(issues, vec![ValidationIssue::InvalidEmail, ValidationIssue::InvalidPrice]);

    assert!(matches!(
        edit_booking(&store(), 99, &BookingEdit::default(), &config),
        Err(EngineError::NotFound { id: 99, .. })
    ));
}
