//! Runtime configuration.
//!
//! Layered: built-in defaults, then an optional JSON file, then `AGENDA_*`
//! environment variables (`AGENDA_STORE_URL`, `AGENDA_MONTHS_AHEAD`, ...).
//! Every field has a default, so an empty object `{}` is a valid file.

use std::io;
use std::path::Path;

use figment::providers::{Env, Format, Json, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::model::ServiceDuration;

/// Prefix of the environment overrides; the rest of the name is the field.
pub const ENV_PREFIX: &str = "AGENDA_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the sheet API, e.g. `https://api.sheety.co/<id>/agendabeta`.
    pub store_url: Option<String>,
    /// Business WhatsApp number receiving confirmations.
    #[serde(deserialize_with = "crate::wire::text")]
    pub whatsapp_number: String,
    #[serde(deserialize_with = "crate::wire::text")]
    pub business_name: String,
    /// How far ahead clients may book.
    pub months_ahead: u32,
    /// Used when a booking names a service missing from the service sheet.
    pub default_service_duration: u32,
    pub max_future_appointments: usize,
    pub min_name_length: usize,
    pub upcoming_limit: usize,
    pub top_clients: usize,
    pub request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_url: None,
            whatsapp_number: "77999757808".to_string(),
            business_name: "Agenda".to_string(),
            months_ahead: 3,
            default_service_duration: 60,
            max_future_appointments: 5,
            min_name_length: 2,
            upcoming_limit: 5,
            top_clients: 5,
            request_timeout_secs: 10,
        }
    }
}

impl EngineConfig {
    /// The provider stack: defaults, then `path` if given, then the environment.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(EngineConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Json::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load the layered configuration.
    ///
    /// # Errors
    /// - [`EngineError::Io`] when `path` is given but does not exist.
    /// - [`EngineError::Config`] when a layer holds a value of the wrong type,
    ///   e.g. `AGENDA_MONTHS_AHEAD=soon`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            if !path.is_file() {
                return Err(EngineError::Io(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("config file not found: {}", path.display()),
                )));
            }
        }
        let mut config: EngineConfig = Self::figment(path).extract()?;
        if config.store_url.as_deref().is_some_and(|url| url.trim().is_empty()) {
            warn!("store_url is set but empty, ignoring");
            config.store_url = None;
        }
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Load from one JSON file on top of the defaults, ignoring the environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// The fallback duration, or one slot when configured as zero.
    pub fn default_duration(&self) -> ServiceDuration {
        ServiceDuration::from_minutes(self.default_service_duration).unwrap_or_else(|_| {
            warn!("default_service_duration is zero, using one slot");
            ServiceDuration::single_slot()
        })
    }
}
