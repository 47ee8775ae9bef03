//! The external booking store and its in-memory rendition.
//!
//! The store is the only persistence authority. Everything read from it passes
//! through [`decode_records`](crate::wire::decode_records), so malformed rows
//! are dropped here and never reach the availability engine.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{EngineError, Result};
use crate::model::{Booking, Professional, ScheduleEntry, Service};
use crate::wire::decode_records;

pub const BOOKINGS: &str = "agendabeta";
pub const SCHEDULE: &str = "horabeta";
pub const SERVICES: &str = "servicobeta";
pub const PROFESSIONALS: &str = "profissional";

/// One tab of the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Bookings,
    Schedule,
    Services,
    Professionals,
}

impl Collection {
    /// Tab name on the wire; also the envelope key of request and response bodies.
    pub fn tab(self) -> &'static str {
        match self {
            Collection::Bookings => BOOKINGS,
            Collection::Schedule => SCHEDULE,
            Collection::Services => SERVICES,
            Collection::Professionals => PROFESSIONALS,
        }
    }
}

/// Read access to the sheet collections plus row-level writes.
///
/// Implementations provide the four typed reads and the three raw row
/// operations; the typed booking writes are built on top of those.
pub trait BookingStore {
    fn list_bookings(&self) -> Result<Vec<Booking>>;
    fn list_professionals(&self) -> Result<Vec<Professional>>;
    fn list_schedule_template(&self) -> Result<Vec<ScheduleEntry>>;
    fn list_services(&self) -> Result<Vec<Service>>;

    /// Append a row and return it as stored, with the id the store assigned.
    fn insert_row(&self, collection: Collection, row: Value) -> Result<Value>;

    /// Replace the row with `id`; the stored row keeps that id.
    fn update_row(&self, collection: Collection, id: u64, row: Value) -> Result<Value>;

    fn delete_row(&self, collection: Collection, id: u64) -> Result<()>;

    /// Persist a new booking and return it with the id the store assigned.
    fn create_booking(&self, booking: &Booking) -> Result<Booking> {
        insert_record(self, Collection::Bookings, booking)
    }

    fn update_booking(&self, id: u64, booking: &Booking) -> Result<Booking> {
        update_record(self, Collection::Bookings, id, booking)
    }

    fn delete_booking(&self, id: u64) -> Result<()> {
        self.delete_row(Collection::Bookings, id)
    }
}

/// Insert a typed record into `collection` and decode what the store kept.
pub fn insert_record<S, T>(store: &S, collection: Collection, record: &T) -> Result<T>
where
    S: BookingStore + ?Sized,
    T: Serialize + DeserializeOwned,
{
    let stored = store.insert_row(collection, serde_json::to_value(record)?)?;
    Ok(serde_json::from_value(stored)?)
}

/// Replace row `id` of `collection` with a typed record.
pub fn update_record<S, T>(store: &S, collection: Collection, id: u64, record: &T) -> Result<T>
where
    S: BookingStore + ?Sized,
    T: Serialize + DeserializeOwned,
{
    let stored = store.update_row(collection, id, serde_json::to_value(record)?)?;
    Ok(serde_json::from_value(stored)?)
}

/// Everything read from the store at one instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub bookings: Vec<Booking>,
    pub professionals: Vec<Professional>,
    pub schedule: Vec<ScheduleEntry>,
    pub services: Vec<Service>,
}

impl Snapshot {
    pub fn fetch<S: BookingStore + ?Sized>(store: &S) -> Result<Self> {
        let snapshot = Self {
            bookings: store.list_bookings()?,
            professionals: store.list_professionals()?,
            schedule: store.list_schedule_template()?,
            services: store.list_services()?,
        };
        debug!(
            bookings = snapshot.bookings.len(),
            professionals = snapshot.professionals.len(),
            schedule = snapshot.schedule.len(),
            services = snapshot.services.len(),
            "fetched snapshot"
        );
        Ok(snapshot)
    }

    pub fn service(&self, name: &str) -> Option<&Service> {
        self.services.iter().find(|s| s.name == name)
    }
}

/// The JSON layout of a full sheet export, one array per tab.
///
/// Rows are kept as raw JSON so that a row this crate cannot read survives a
/// load/save cycle untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SheetDocument {
    #[serde(rename = "agendabeta", default)]
    pub bookings: Vec<Value>,
    #[serde(rename = "horabeta", default)]
    pub schedule: Vec<Value>,
    #[serde(rename = "servicobeta", default)]
    pub services: Vec<Value>,
    #[serde(rename = "profissional", default)]
    pub professionals: Vec<Value>,
}

/// A store held entirely in memory, loaded from a sheet export.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: Mutex<SheetDocument>,
}

impl MemoryStore {
    pub fn new(document: SheetDocument) -> Self {
        Self {
            document: Mutex::new(document),
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Current contents, including rows that fail to decode.
    pub fn document(&self) -> Result<SheetDocument> {
        Ok(self.lock()?.clone())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(&*self.lock()?)?;
        std::fs::write(path.as_ref(), json)?;
        info!(path = %path.as_ref().display(), "saved sheet document");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, SheetDocument>> {
        self.document
            .lock()
            .map_err(|_| EngineError::Store("in-memory sheet lock poisoned".to_string()))
    }
}

fn row_id(row: &Value) -> Option<u64> {
    row.get("id").and_then(Value::as_u64)
}

fn with_id(row: Value, id: u64) -> Result<Value> {
    match row {
        Value::Object(mut fields) => {
            fields.insert("id".to_string(), Value::from(id));
            Ok(Value::Object(fields))
        }
        other => Err(EngineError::MalformedRecord(format!(
            "row must be an object, got {other}"
        ))),
    }
}

impl SheetDocument {
    fn rows(&self, collection: Collection) -> &Vec<Value> {
        match collection {
            Collection::Bookings => &self.bookings,
            Collection::Schedule => &self.schedule,
            Collection::Services => &self.services,
            Collection::Professionals => &self.professionals,
        }
    }

    fn rows_mut(&mut self, collection: Collection) -> &mut Vec<Value> {
        match collection {
            Collection::Bookings => &mut self.bookings,
            Collection::Schedule => &mut self.schedule,
            Collection::Services => &mut self.services,
            Collection::Professionals => &mut self.professionals,
        }
    }
}

impl BookingStore for MemoryStore {
    fn list_bookings(&self) -> Result<Vec<Booking>> {
        Ok(decode_records(BOOKINGS, self.lock()?.rows(Collection::Bookings)))
    }

    fn list_professionals(&self) -> Result<Vec<Professional>> {
        Ok(decode_records(PROFESSIONALS, self.lock()?.rows(Collection::Professionals)))
    }

    fn list_schedule_template(&self) -> Result<Vec<ScheduleEntry>> {
        Ok(decode_records(SCHEDULE, self.lock()?.rows(Collection::Schedule)))
    }

    fn list_services(&self) -> Result<Vec<Service>> {
        Ok(decode_records(SERVICES, self.lock()?.rows(Collection::Services)))
    }

    /// Ids follow the sheet convention: the first data row is 2.
    fn insert_row(&self, collection: Collection, row: Value) -> Result<Value> {
        let mut document = self.lock()?;
        let rows = document.rows_mut(collection);
        let id = rows.iter().filter_map(row_id).max().map_or(2, |max| max + 1);
        let stored = with_id(row, id)?;
        rows.push(stored.clone());
        debug!(collection = collection.tab(), id, "inserted row");
        Ok(stored)
    }

    fn update_row(&self, collection: Collection, id: u64, row: Value) -> Result<Value> {
        let mut document = self.lock()?;
        let slot = document
            .rows_mut(collection)
            .iter_mut()
            .find(|existing| row_id(existing) == Some(id))
            .ok_or(EngineError::NotFound {
                collection: collection.tab(),
                id,
            })?;
        *slot = with_id(row, id)?;
        debug!(collection = collection.tab(), id, "updated row");
        Ok(slot.clone())
    }

    fn delete_row(&self, collection: Collection, id: u64) -> Result<()> {
        let mut document = self.lock()?;
        let rows = document.rows_mut(collection);
        let before = rows.len();
        rows.retain(|row| row_id(row) != Some(id));
        if rows.len() == before {
            return Err(EngineError::NotFound {
                collection: collection.tab(),
                id,
            });
        }
        debug!(collection = collection.tab(), id, "deleted row");
        Ok(())
    }
}
