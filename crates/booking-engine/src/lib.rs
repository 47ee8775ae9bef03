//! # booking-engine
//!
//! Slot availability and booking-conflict checks for an appointment book kept
//! in a spreadsheet behind a REST API.
//!
//! The engine is stateless: every answer is a pure function of a snapshot of
//! the sheet passed in by the caller. Services longer than one hour take
//! consecutive 60-minute blocks, and each block is checked against the stored
//! bookings for the same professional and date.
//!
//! ## Quick start
//!
//! ```rust
//! use booking_engine::{available_slots, MemoryStore, ServiceDuration, Snapshot};
//! use chrono::NaiveDate;
//!
//! let store = MemoryStore::from_json(r#"{
//!     "horabeta": [
//!         {"diasemana": "segunda", "hora": "09:00", "ativo": true},
//!         {"diasemana": "segunda", "hora": "10:00", "ativo": true}
//!     ],
//!     "agendabeta": [
//!         {"nome": "Bia", "data": "2026-03-16", "hora": "10:00", "profissional": "Ana"}
//!     ]
//! }"#).unwrap();
//!
//! let snapshot = Snapshot::fetch(&store).unwrap();
//! let monday = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();
//! let hour = ServiceDuration::from_minutes(60).unwrap();
//! let free = available_slots(monday, "Ana", hour, &snapshot.schedule, &snapshot.bookings);
//! assert_eq!(free.iter().map(|t| t.to_string()).collect::<Vec<_>>(), ["09:00"]);
//! ```
//!
//! ## Modules
//!
//! - [`availability`]: block-by-block slot checks and free-slot lists
//! - [`schedule`]: weekday template lookups
//! - [`roster`]: professional availability windows
//! - [`booking`]: fail-closed booking flow, commit-time re-check, admin edits
//! - [`admin`]: service, professional, and schedule maintenance
//! - [`report`]: dashboard aggregation
//! - [`store`]: store trait, snapshots, in-memory store
//! - [`sheety`]: HTTP store for Sheety-style sheet APIs
//! - [`model`]: typed records
//! - [`wire`]: lenient cell decoding
//! - [`contact`]: phone/email validation and display formatting
//! - [`config`]: runtime configuration
//! - [`error`]: error types

pub mod admin;
pub mod availability;
pub mod booking;
pub mod config;
pub mod contact;
pub mod error;
pub mod model;
pub mod report;
pub mod roster;
pub mod schedule;
pub mod sheety;
pub mod store;
pub mod wire;

pub use availability::{available_slots, blocks_needed, is_slot_available, BookingIndex};
pub use booking::{commit_booking, edit_booking, plan_day, BookingEdit, BookingRequest, DayPlan};
pub use config::EngineConfig;
pub use error::{EngineError, ValidationIssue};
pub use model::{Booking, Professional, ScheduleEntry, Service, ServiceDuration, SlotTime};
pub use roster::{is_professional_available, professional_status, ProfessionalStatus};
pub use sheety::SheetyStore;
pub use store::{BookingStore, Collection, MemoryStore, SheetDocument, Snapshot};
