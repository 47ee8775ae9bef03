//! Error types for booking-engine operations.

use chrono::NaiveDate;
use thiserror::Error;

use crate::model::SlotTime;

/// A single reason a request was rejected before reaching the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("field `{0}` is required")]
    MissingField(&'static str),

    #[error("name must have at least {0} characters")]
    NameTooShort(usize),

    #[error("phone must have 10 or 11 digits")]
    InvalidPhone,

    #[error("email address is not valid")]
    InvalidEmail,

    #[error("date {date} is outside the bookable window {earliest}..={latest}")]
    DateOutOfRange {
        date: NaiveDate,
        earliest: NaiveDate,
        latest: NaiveDate,
    },

    #[error("price must be a non-negative amount")]
    InvalidPrice,

    #[error("start date {from} is after end date {until}")]
    WindowReversed { from: NaiveDate, until: NaiveDate },

    #[error("{field} `{value}` already exists")]
    AlreadyExists { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// The external store could not be reached or answered with an error.
    #[error("Store unavailable: {0}")]
    Store(String),

    #[error("No {collection} row with id {id}")]
    NotFound { collection: &'static str, id: u64 },

    #[error("Unknown service: {0}")]
    UnknownService(String),

    #[error("Professional {professional} is not available on {date}")]
    ProfessionalUnavailable {
        professional: String,
        date: NaiveDate,
    },

    /// The slot was free when offered but is taken now; the caller should
    /// ask the user to pick again from a fresh slot list.
    #[error("Slot {time} on {date} is no longer available for {professional}")]
    SlotTaken {
        date: NaiveDate,
        time: SlotTime,
        professional: String,
    },

    #[error("Client already has {count} upcoming appointments (limit {limit})")]
    TooManyAppointments { count: usize, limit: usize },

    #[error("Invalid request: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::Store(err.to_string())
    }
}

impl From<figment::Error> for EngineError {
    fn from(err: figment::Error) -> Self {
        EngineError::Config(err.to_string())
    }
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type Result<T> = std::result::Result<T, EngineError>;
