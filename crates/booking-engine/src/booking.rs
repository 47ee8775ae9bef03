//! The public booking flow: offer slots for a day, then commit a request.
//!
//! Nothing reserves a slot between the offer and the commit. The commit
//! re-reads the store and re-checks; a slot lost in between surfaces as
//! [`EngineError::SlotTaken`] and the caller offers a fresh list.
//!
//! Reads fail closed: an unreachable store yields "no slots", never "all free".

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::availability::{available_slots, is_slot_available};
use crate::config::EngineConfig;
use crate::contact::{is_valid_email, is_valid_phone, normalize_phone};
use crate::error::{EngineError, Result, ValidationIssue};
use crate::model::{Booking, ServiceDuration, SlotTime};
use crate::roster::is_professional_available;
use crate::schedule::candidate_times;
use crate::store::{BookingStore, Snapshot, BOOKINGS};

/// What a client submits from the booking form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub client_name: String,
    pub phone: String,
    pub email: String,
    pub service: String,
    pub professional: String,
    pub date: NaiveDate,
    pub time: SlotTime,
}

impl BookingRequest {
    /// Check every form rule and report all failures at once.
    pub fn validate(&self, today: NaiveDate, config: &EngineConfig) -> Result<()> {
        let mut issues = Vec::new();

        let required = [
            ("name", &self.client_name),
            ("phone", &self.phone),
            ("email", &self.email),
            ("service", &self.service),
            ("professional", &self.professional),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                issues.push(ValidationIssue::MissingField(field));
            }
        }

        let name = self.client_name.trim();
        if !name.is_empty() && name.chars().count() < config.min_name_length {
            issues.push(ValidationIssue::NameTooShort(config.min_name_length));
        }
        if !self.phone.trim().is_empty() && !is_valid_phone(&self.phone) {
            issues.push(ValidationIssue::InvalidPhone);
        }
        if !self.email.trim().is_empty() && !is_valid_email(&self.email) {
            issues.push(ValidationIssue::InvalidEmail);
        }

        let (earliest, latest) = booking_window(today, config);
        if self.date < earliest || self.date > latest {
            issues.push(ValidationIssue::DateOutOfRange {
                date: self.date,
                earliest,
                latest,
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(issues))
        }
    }
}

/// Inclusive range of bookable dates starting `today`.
pub fn booking_window(today: NaiveDate, config: &EngineConfig) -> (NaiveDate, NaiveDate) {
    let latest = today
        .checked_add_months(Months::new(config.months_ahead))
        .unwrap_or(NaiveDate::MAX);
    (today, latest)
}

/// Outcome of asking for a day's open slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "slots", rename_all = "snake_case")]
pub enum DayPlan {
    /// The store could not be read; retry later.
    StoreUnavailable,
    ProfessionalUnavailable,
    FullyBooked,
    Open(Vec<SlotTime>),
}

impl DayPlan {
    pub fn slots(&self) -> &[SlotTime] {
        match self {
            DayPlan::Open(slots) => slots,
            _ => &[],
        }
    }

    /// Message for the user when there is nothing to pick.
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            DayPlan::StoreUnavailable => Some("could not load bookings, please try again"),
            DayPlan::ProfessionalUnavailable => {
                Some("professional is not available on the selected date")
            }
            DayPlan::FullyBooked => Some("no times available for this date and professional"),
            DayPlan::Open(_) => None,
        }
    }
}

/// Duration of `service`, or the configured default when it is unknown.
pub fn resolve_duration(
    snapshot: &Snapshot,
    service: Option<&str>,
    config: &EngineConfig,
) -> ServiceDuration {
    match service.and_then(|name| snapshot.service(name)) {
        Some(found) => found.duration,
        None => {
            if let Some(name) = service {
                debug!(service = name, "unknown service, using default duration");
            }
            config.default_duration()
        }
    }
}

/// Open slots for `professional` on `date` within an already fetched snapshot.
pub fn plan_day_in(
    snapshot: &Snapshot,
    date: NaiveDate,
    professional: &str,
    service: Option<&str>,
    config: &EngineConfig,
) -> DayPlan {
    let duration = resolve_duration(snapshot, service, config);
    plan_day_for(snapshot, date, professional, duration)
}

/// Open slots for an explicit duration within an already fetched snapshot.
pub fn plan_day_for(
    snapshot: &Snapshot,
    date: NaiveDate,
    professional: &str,
    duration: ServiceDuration,
) -> DayPlan {
    if !is_professional_available(professional, date, &snapshot.professionals) {
        return DayPlan::ProfessionalUnavailable;
    }
    let slots = available_slots(
        date,
        professional,
        duration,
        &snapshot.schedule,
        &snapshot.bookings,
    );
    if slots.is_empty() {
        DayPlan::FullyBooked
    } else {
        DayPlan::Open(slots)
    }
}

/// Read the store once and plan the day; a failed read yields
/// [`DayPlan::StoreUnavailable`].
pub fn plan_day<S: BookingStore + ?Sized>(
    store: &S,
    date: NaiveDate,
    professional: &str,
    service: Option<&str>,
    config: &EngineConfig,
) -> DayPlan {
    match Snapshot::fetch(store) {
        Ok(snapshot) => plan_day_in(&snapshot, date, professional, service, config),
        Err(err) => {
            warn!(error = %err, "store read failed, offering no slots");
            DayPlan::StoreUnavailable
        }
    }
}

/// Fail-closed single-slot check against a fresh read of the bookings.
pub fn check_slot<S: BookingStore + ?Sized>(
    store: &S,
    date: NaiveDate,
    time: SlotTime,
    professional: &str,
    duration: ServiceDuration,
) -> bool {
    match store.list_bookings() {
        Ok(bookings) => is_slot_available(date, time, professional, duration, &bookings),
        Err(err) => {
            warn!(error = %err, "store read failed, reporting slot as unavailable");
            false
        }
    }
}

/// Fail-closed professional check against a fresh read of the roster.
pub fn check_professional<S: BookingStore + ?Sized>(
    store: &S,
    professional: &str,
    date: NaiveDate,
) -> bool {
    match store.list_professionals() {
        Ok(roster) => is_professional_available(professional, date, &roster),
        Err(err) => {
            warn!(error = %err, "store read failed, reporting professional as unavailable");
            false
        }
    }
}

/// Bookings for `phone` dated `today` or later, in chronological order.
pub fn upcoming_for_client<'a>(
    bookings: &'a [Booking],
    phone: &str,
    today: NaiveDate,
) -> Vec<&'a Booking> {
    let phone = normalize_phone(phone);
    let mut found: Vec<&Booking> = bookings
        .iter()
        .filter(|b| !phone.is_empty() && normalize_phone(&b.phone) == phone && b.date >= today)
        .collect();
    found.sort_by_key(|b| (b.date, b.time));
    found
}

/// Validate, re-check against a fresh snapshot, and create the booking.
///
/// # Errors
/// - [`EngineError::Validation`] when the form rules fail.
/// - [`EngineError::UnknownService`] when the service is not on the sheet.
/// - [`EngineError::ProfessionalUnavailable`] outside the professional's window.
/// - [`EngineError::InvalidTime`] when the start time is not offered that weekday.
/// - [`EngineError::TooManyAppointments`] when the client is at the limit.
/// - [`EngineError::SlotTaken`] when any block is now occupied.
/// - Store errors from the read or the write.
pub fn commit_booking<S: BookingStore + ?Sized>(
    store: &S,
    request: &BookingRequest,
    today: NaiveDate,
    config: &EngineConfig,
) -> Result<Booking> {
    request.validate(today, config)?;

    let snapshot = Snapshot::fetch(store)?;
    let service = snapshot
        .service(&request.service)
        .ok_or_else(|| EngineError::UnknownService(request.service.clone()))?;

    if !is_professional_available(&request.professional, request.date, &snapshot.professionals) {
        return Err(EngineError::ProfessionalUnavailable {
            professional: request.professional.clone(),
            date: request.date,
        });
    }

    if !candidate_times(&snapshot.schedule, request.date).contains(&request.time) {
        return Err(EngineError::InvalidTime(format!(
            "{} is not offered on {}",
            request.time, request.date
        )));
    }

    let upcoming = upcoming_for_client(&snapshot.bookings, &request.phone, today).len();
    if upcoming >= config.max_future_appointments {
        return Err(EngineError::TooManyAppointments {
            count: upcoming,
            limit: config.max_future_appointments,
        });
    }

    if !is_slot_available(
        request.date,
        request.time,
        &request.professional,
        service.duration,
        &snapshot.bookings,
    ) {
        return Err(EngineError::SlotTaken {
            date: request.date,
            time: request.time,
            professional: request.professional.clone(),
        });
    }

    let booking = Booking {
        id: None,
        client_name: request.client_name.trim().to_string(),
        phone: normalize_phone(&request.phone),
        email: request.email.trim().to_string(),
        service: service.name.clone(),
        professional: request.professional.clone(),
        date: request.date,
        time: request.time,
        price: service.price,
    };
    let created = store.create_booking(&booking)?;
    info!(
        id = ?created.id,
        date = %created.date,
        time = %created.time,
        professional = %created.professional,
        "booking created"
    );
    Ok(created)
}

/// Admin changes to a stored booking; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingEdit {
    pub client_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub service: Option<String>,
    pub professional: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<SlotTime>,
    pub price: Option<f64>,
}

impl BookingEdit {
    /// Whether the edit changes which blocks the booking holds.
    pub fn moves_slot(&self) -> bool {
        self.service.is_some()
            || self.professional.is_some()
            || self.date.is_some()
            || self.time.is_some()
    }

    fn validate(&self, config: &EngineConfig) -> Result<()> {
        let mut issues = Vec::new();
        if let Some(name) = &self.client_name {
            let name = name.trim();
            if name.is_empty() {
                issues.push(ValidationIssue::MissingField("name"));
            } else if name.chars().count() < config.min_name_length {
                issues.push(ValidationIssue::NameTooShort(config.min_name_length));
            }
        }
        if let Some(professional) = &self.professional {
            if professional.trim().is_empty() {
                issues.push(ValidationIssue::MissingField("professional"));
            }
        }
        if self.phone.as_deref().is_some_and(|phone| !is_valid_phone(phone)) {
            issues.push(ValidationIssue::InvalidPhone);
        }
        if self.email.as_deref().is_some_and(|email| !is_valid_email(email)) {
            issues.push(ValidationIssue::InvalidEmail);
        }
        if self.price.is_some_and(|price| !price.is_finite() || price < 0.0) {
            issues.push(ValidationIssue::InvalidPrice);
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(EngineError::Validation(issues))
        }
    }
}

/// Apply an admin edit to booking `id` and write it back.
///
/// Contact fields follow the booking form rules. An edit that moves the
/// booking is re-checked against every other booking for the new slot; the
/// booking never conflicts with itself. A new service re-prices the booking
/// unless the edit also sets `price`.
///
/// # Errors
/// - [`EngineError::Validation`] for bad contact fields or a negative price.
/// - [`EngineError::NotFound`] when no booking has `id`.
/// - [`EngineError::UnknownService`] when the new service is not on the sheet.
/// - [`EngineError::ProfessionalUnavailable`] outside the professional's window.
/// - [`EngineError::SlotTaken`] when the new slot overlaps another booking.
pub fn edit_booking<S: BookingStore + ?Sized>(
    store: &S,
    id: u64,
    edit: &BookingEdit,
    config: &EngineConfig,
) -> Result<Booking> {
    edit.validate(config)?;

    let snapshot = Snapshot::fetch(store)?;
    let current = snapshot
        .bookings
        .iter()
        .find(|b| b.id == Some(id))
        .ok_or(EngineError::NotFound {
            collection: BOOKINGS,
            id,
        })?;

    let mut updated = current.clone();
    if let Some(name) = &edit.client_name {
        updated.client_name = name.trim().to_string();
    }
    if let Some(phone) = &edit.phone {
        updated.phone = normalize_phone(phone);
    }
    if let Some(email) = &edit.email {
        updated.email = email.trim().to_string();
    }
    if let Some(professional) = &edit.professional {
        updated.professional = professional.trim().to_string();
    }
    if let Some(date) = edit.date {
        updated.date = date;
    }
    if let Some(time) = edit.time {
        updated.time = time;
    }
    if let Some(name) = &edit.service {
        let service = snapshot
            .service(name)
            .ok_or_else(|| EngineError::UnknownService(name.clone()))?;
        updated.service = service.name.clone();
        updated.price = service.price;
    }
    if let Some(price) = edit.price {
        updated.price = price;
    }

    if edit.moves_slot() {
        if !is_professional_available(&updated.professional, updated.date, &snapshot.professionals)
        {
            return Err(EngineError::ProfessionalUnavailable {
                professional: updated.professional,
                date: updated.date,
            });
        }
        let duration = resolve_duration(&snapshot, Some(&updated.service), config);
        let others: Vec<Booking> = snapshot
            .bookings
            .iter()
            .filter(|b| b.id != Some(id))
            .cloned()
            .collect();
        if !is_slot_available(
            updated.date,
            updated.time,
            &updated.professional,
            duration,
            &others,
        ) {
            return Err(EngineError::SlotTaken {
                date: updated.date,
                time: updated.time,
                professional: updated.professional,
            });
        }
    }

    let stored = store.update_booking(id, &updated)?;
    info!(
        id,
        date = %stored.date,
        time = %stored.time,
        professional = %stored.professional,
        "booking updated"
    );
    Ok(stored)
}
