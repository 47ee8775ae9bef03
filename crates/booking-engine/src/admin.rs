//! Sheet maintenance behind the admin dashboard: services, professionals, and
//! the weekly schedule template.
//!
//! Each operation reads the current tab, validates against it, and writes one
//! row. Names must stay unique within their tab, since bookings and lookups
//! refer to services and professionals by name.

use chrono::{NaiveDate, Weekday};
use tracing::info;

use crate::error::{EngineError, Result, ValidationIssue};
use crate::model::{Professional, ScheduleEntry, Service, ServiceDuration, SlotTime};
use crate::store::{insert_record, update_record, BookingStore, Collection};

fn not_found(collection: Collection, id: u64) -> EngineError {
    EngineError::NotFound {
        collection: collection.tab(),
        id,
    }
}

fn check(issues: Vec<ValidationIssue>) -> Result<()> {
    if issues.is_empty() {
        Ok(())
    } else {
        Err(EngineError::Validation(issues))
    }
}

/// Add a service to the catalogue.
pub fn add_service<S: BookingStore + ?Sized>(
    store: &S,
    name: &str,
    minutes: u32,
    price: f64,
) -> Result<Service> {
    let name = name.trim();
    let mut issues = Vec::new();
    if name.is_empty() {
        issues.push(ValidationIssue::MissingField("service"));
    }
    if !price.is_finite() || price < 0.0 {
        issues.push(ValidationIssue::InvalidPrice);
    }
    let existing = store.list_services()?;
    if !name.is_empty() && existing.iter().any(|s| s.name == name) {
        issues.push(ValidationIssue::AlreadyExists {
            field: "service",
            value: name.to_string(),
        });
    }
    check(issues)?;

    let service = Service {
        id: None,
        name: name.to_string(),
        duration: ServiceDuration::from_minutes(minutes)?,
        price,
    };
    let stored = insert_record(store, Collection::Services, &service)?;
    info!(id = ?stored.id, service = %stored.name, "service added");
    Ok(stored)
}

/// Change the length and price of service `id`; the name stays.
pub fn update_service<S: BookingStore + ?Sized>(
    store: &S,
    id: u64,
    minutes: Option<u32>,
    price: Option<f64>,
) -> Result<Service> {
    if price.is_some_and(|p| !p.is_finite() || p < 0.0) {
        return Err(EngineError::Validation(vec![ValidationIssue::InvalidPrice]));
    }
    let mut service = store
        .list_services()?
        .into_iter()
        .find(|s| s.id == Some(id))
        .ok_or_else(|| not_found(Collection::Services, id))?;
    if let Some(minutes) = minutes {
        service.duration = ServiceDuration::from_minutes(minutes)?;
    }
    if let Some(price) = price {
        service.price = price;
    }
    update_record(store, Collection::Services, id, &service)
}

pub fn remove_service<S: BookingStore + ?Sized>(store: &S, id: u64) -> Result<()> {
    store.delete_row(Collection::Services, id)?;
    info!(id, "service removed");
    Ok(())
}

/// Add a professional, optionally bounded by an inclusive working window.
pub fn add_professional<S: BookingStore + ?Sized>(
    store: &S,
    name: &str,
    active_from: Option<NaiveDate>,
    active_until: Option<NaiveDate>,
) -> Result<Professional> {
    let name = name.trim();
    let mut issues = window_issues(active_from, active_until);
    if name.is_empty() {
        issues.push(ValidationIssue::MissingField("professional"));
    }
    let roster = store.list_professionals()?;
    if !name.is_empty() && roster.iter().any(|p| p.name == name) {
        issues.push(ValidationIssue::AlreadyExists {
            field: "professional",
            value: name.to_string(),
        });
    }
    check(issues)?;

    let professional = Professional {
        id: None,
        name: name.to_string(),
        active_from,
        active_until,
    };
    let stored = insert_record(store, Collection::Professionals, &professional)?;
    info!(id = ?stored.id, professional = %stored.name, "professional added");
    Ok(stored)
}

/// Replace the working window of professional `id`.
pub fn set_professional_window<S: BookingStore + ?Sized>(
    store: &S,
    id: u64,
    active_from: Option<NaiveDate>,
    active_until: Option<NaiveDate>,
) -> Result<Professional> {
    check(window_issues(active_from, active_until))?;
    let mut professional = store
        .list_professionals()?
        .into_iter()
        .find(|p| p.id == Some(id))
        .ok_or_else(|| not_found(Collection::Professionals, id))?;
    professional.active_from = active_from;
    professional.active_until = active_until;
    update_record(store, Collection::Professionals, id, &professional)
}

pub fn remove_professional<S: BookingStore + ?Sized>(store: &S, id: u64) -> Result<()> {
    store.delete_row(Collection::Professionals, id)?;
    info!(id, "professional removed");
    Ok(())
}

fn window_issues(from: Option<NaiveDate>, until: Option<NaiveDate>) -> Vec<ValidationIssue> {
    match (from, until) {
        (Some(from), Some(until)) if from > until => {
            vec![ValidationIssue::WindowReversed { from, until }]
        }
        _ => Vec::new(),
    }
}

/// Offer `time` on every `weekday`. New entries start enabled.
pub fn add_schedule_entry<S: BookingStore + ?Sized>(
    store: &S,
    weekday: Weekday,
    time: SlotTime,
) -> Result<ScheduleEntry> {
    let template = store.list_schedule_template()?;
    if template
        .iter()
        .any(|e| e.weekday == weekday && e.time == time)
    {
        return Err(EngineError::Validation(vec![
            ValidationIssue::AlreadyExists {
                field: "schedule entry",
                value: format!("{} {time}", crate::wire::weekday_name(weekday)),
            },
        ]));
    }
    let entry = ScheduleEntry {
        id: None,
        weekday,
        time,
        enabled: true,
    };
    let stored = insert_record(store, Collection::Schedule, &entry)?;
    info!(id = ?stored.id, %weekday, %time, "schedule entry added");
    Ok(stored)
}

/// Flip the `ativo` flag of schedule entry `id`.
pub fn toggle_schedule_entry<S: BookingStore + ?Sized>(
    store: &S,
    id: u64,
) -> Result<ScheduleEntry> {
    let mut entry = store
        .list_schedule_template()?
        .into_iter()
        .find(|e| e.id == Some(id))
        .ok_or_else(|| not_found(Collection::Schedule, id))?;
    entry.enabled = !entry.enabled;
    let stored = update_record(store, Collection::Schedule, id, &entry)?;
    info!(id, enabled = stored.enabled, "schedule entry toggled");
    Ok(stored)
}

pub fn remove_schedule_entry<S: BookingStore + ?Sized>(store: &S, id: u64) -> Result<()> {
    store.delete_row(Collection::Schedule, id)?;
    info!(id, "schedule entry removed");
    Ok(())
}
