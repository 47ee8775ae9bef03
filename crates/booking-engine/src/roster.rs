//! Professional roster lookups.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::model::Professional;

/// Find a professional by exact name.
pub fn find_professional<'a>(name: &str, roster: &'a [Professional]) -> Option<&'a Professional> {
    roster.iter().find(|p| p.name == name)
}

/// Whether `name` takes bookings on `date`.
///
/// Unknown names are unavailable. Known names are available inside their
/// inclusive `[active_from, active_until]` window; a missing bound is open.
pub fn is_professional_available(name: &str, date: NaiveDate, roster: &[Professional]) -> bool {
    find_professional(name, roster).is_some_and(|p| p.is_active_on(date))
}

/// Names of everyone available on `date`, in roster order.
pub fn available_professionals(date: NaiveDate, roster: &[Professional]) -> Vec<&str> {
    roster
        .iter()
        .filter(|p| p.is_active_on(date))
        .map(|p| p.name.as_str())
        .collect()
}

/// Where a professional stands relative to their working window on a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfessionalStatus {
    /// The window has not started yet.
    Upcoming,
    Active,
    /// The window has ended.
    Inactive,
}

impl fmt::Display for ProfessionalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProfessionalStatus::Upcoming => "upcoming",
            ProfessionalStatus::Active => "active",
            ProfessionalStatus::Inactive => "inactive",
        })
    }
}

/// Status of `professional` on `today`; a window that has not started wins
/// over one that has ended.
pub fn professional_status(professional: &Professional, today: NaiveDate) -> ProfessionalStatus {
    if professional.active_from.is_some_and(|from| today < from) {
        ProfessionalStatus::Upcoming
    } else if professional.active_until.is_some_and(|until| today > until) {
        ProfessionalStatus::Inactive
    } else {
        ProfessionalStatus::Active
    }
}
