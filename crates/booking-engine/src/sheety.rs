//! HTTP client for a Sheety-style spreadsheet REST API.
//!
//! Each sheet tab is a collection at `{base_url}/{tab}`. Reads return
//! `{"<tab>": [rows]}`; writes send and receive `{"<tab>": row}`. Rows are
//! addressed as `{base_url}/{tab}/{id}` for updates (PUT) and deletes.
//!
//! A read whose body lacks the collection key is an error: an API error
//! payload must never read as an empty tab.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::model::{Booking, Professional, ScheduleEntry, Service};
use crate::store::{BookingStore, Collection, BOOKINGS, PROFESSIONALS, SCHEDULE, SERVICES};
use crate::wire::decode_records;

pub struct SheetyStore {
    client: Client,
    base_url: String,
}

impl SheetyStore {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let url = config
            .store_url
            .as_deref()
            .ok_or_else(|| EngineError::Store("no store URL configured".to_string()))?;
        Self::new(url, Duration::from_secs(config.request_timeout_secs))
    }

    fn endpoint(&self, tab: &str) -> String {
        format!("{}/{}", self.base_url, tab)
    }

    fn fetch_rows(&self, tab: &str) -> Result<Vec<Value>> {
        let url = self.endpoint(tab);
        debug!(%url, "fetching collection");
        let body: Value = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .json()?;
        match body.get(tab) {
            Some(Value::Array(rows)) => Ok(rows.clone()),
            // A body without the collection is an error payload, not an empty tab.
            Some(Value::Null) | None => {
                warn!(tab, %body, "response has no rows for collection");
                Err(EngineError::Store(format!(
                    "response has no `{tab}` collection"
                )))
            }
            Some(other) => Err(EngineError::MalformedRecord(format!(
                "expected an array under `{tab}`, got {other}"
            ))),
        }
    }

    /// Unwrap the `{"<tab>": row}` envelope of a write response.
    fn unwrap_row(tab: &str, mut body: Value) -> Result<Value> {
        match body.get_mut(tab).map(Value::take) {
            Some(row @ Value::Object(_)) => Ok(row),
            _ => Err(EngineError::MalformedRecord(format!(
                "write response has no `{tab}` row"
            ))),
        }
    }

    fn envelope(tab: &str, row: Value) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert(tab.to_string(), row);
        payload
    }

    fn not_found(collection: Collection, id: u64) -> EngineError {
        EngineError::NotFound {
            collection: collection.tab(),
            id,
        }
    }
}

impl BookingStore for SheetyStore {
    fn list_bookings(&self) -> Result<Vec<Booking>> {
        Ok(decode_records(BOOKINGS, &self.fetch_rows(BOOKINGS)?))
    }

    fn list_professionals(&self) -> Result<Vec<Professional>> {
        Ok(decode_records(PROFESSIONALS, &self.fetch_rows(PROFESSIONALS)?))
    }

    fn list_schedule_template(&self) -> Result<Vec<ScheduleEntry>> {
        Ok(decode_records(SCHEDULE, &self.fetch_rows(SCHEDULE)?))
    }

    fn list_services(&self) -> Result<Vec<Service>> {
        Ok(decode_records(SERVICES, &self.fetch_rows(SERVICES)?))
    }

    fn insert_row(&self, collection: Collection, row: Value) -> Result<Value> {
        let tab = collection.tab();
        let body: Value = self
            .client
            .post(self.endpoint(tab))
            .json(&Self::envelope(tab, row))
            .send()?
            .error_for_status()?
            .json()?;
        Self::unwrap_row(tab, body)
    }

    fn update_row(&self, collection: Collection, id: u64, row: Value) -> Result<Value> {
        let tab = collection.tab();
        let response = self
            .client
            .put(format!("{}/{}", self.endpoint(tab), id))
            .json(&Self::envelope(tab, row))
            .send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Self::not_found(collection, id));
        }
        let body: Value = response.error_for_status()?.json()?;
        Self::unwrap_row(tab, body)
    }

    fn delete_row(&self, collection: Collection, id: u64) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/{}", self.endpoint(collection.tab()), id))
            .send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Self::not_found(collection, id));
        }
        response.error_for_status()?;
        debug!(collection = collection.tab(), id, "deleted row");
        Ok(())
    }
}
