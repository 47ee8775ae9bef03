//! Typed records for the appointment sheet.
//!
//! Field names on the wire follow the spreadsheet columns (`nome`, `data`,
//! `hora`, ...). Decoding is lenient about cell types (numbers vs. strings)
//! but strict about the fields availability depends on; see [`crate::wire`].

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{EngineError, Result};
use crate::wire;

/// Fixed base granularity of the schedule, in minutes.
pub const SLOT_MINUTES: u32 = 60;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// A wall-clock start time with minute precision, no time zone.
///
/// Stored as minutes since midnight, always before 24:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotTime(u32);

impl SlotTime {
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self> {
        if hour > 23 || minute > 59 {
            return Err(EngineError::InvalidTime(format!("{hour}:{minute:02}")));
        }
        Ok(SlotTime(hour * 60 + minute))
    }

    pub fn minutes_since_midnight(self) -> u32 {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / 60
    }

    pub fn minute(self) -> u32 {
        self.0 % 60
    }

    /// Block starts of a `duration`-long service beginning at `self`.
    ///
    /// Blocks that would start at or after midnight are not yielded: no stored
    /// booking can match them, and a huge duration stops after at most a day.
    pub fn blocks(self, duration: ServiceDuration) -> impl Iterator<Item = SlotTime> {
        let start = self.0;
        (0..duration.blocks_needed())
            .map_while(move |i| {
                i.checked_mul(SLOT_MINUTES)
                    .and_then(|offset| start.checked_add(offset))
            })
            .take_while(|minutes| *minutes < MINUTES_PER_DAY)
            .map(SlotTime)
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for SlotTime {
    type Err = EngineError;

    /// Accepts `H:MM` and `HH:MM`; one trailing `:SS` is tolerated and ignored.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || EngineError::InvalidTime(s.to_string());
        let mut parts = s.trim().split(':');
        let hour = parts.next().ok_or_else(invalid)?;
        let minute = parts.next().ok_or_else(invalid)?;
        let digits = |field: &str, width: std::ops::RangeInclusive<usize>| {
            width.contains(&field.len()) && field.bytes().all(|b| b.is_ascii_digit())
        };
        if !digits(hour, 1..=2) || !digits(minute, 2..=2) {
            return Err(invalid());
        }
        if let Some(second) = parts.next() {
            if !digits(second, 2..=2) || second > "59" || parts.next().is_some() {
                return Err(invalid());
            }
        }
        let hour: u32 = hour.parse().map_err(|_| invalid())?;
        let minute: u32 = minute.parse().map_err(|_| invalid())?;
        SlotTime::from_hm(hour, minute).map_err(|_| invalid())
    }
}

impl Serialize for SlotTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A strictly positive service length in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceDuration(NonZeroU32);

impl ServiceDuration {
    pub fn from_minutes(minutes: u32) -> Result<Self> {
        NonZeroU32::new(minutes)
            .map(ServiceDuration)
            .ok_or_else(|| EngineError::InvalidDuration("duration must be positive".to_string()))
    }

    /// One standard slot.
    pub fn single_slot() -> Self {
        ServiceDuration(NonZeroU32::MIN.saturating_add(SLOT_MINUTES - 1))
    }

    pub fn minutes(self) -> u32 {
        self.0.get()
    }

    /// Number of consecutive slots the service occupies: `ceil(minutes / 60)`.
    pub fn blocks_needed(self) -> u32 {
        self.minutes().div_ceil(SLOT_MINUTES)
    }
}

impl Serialize for ServiceDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.minutes())
    }
}

/// A stored appointment (sheet `agendabeta`).
///
/// Only `profissional`, `data` and `hora` can reject a row. The other columns
/// fall back to blank or zero so a booking with a bad cell still holds its slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    #[serde(
        default,
        deserialize_with = "wire::lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<u64>,
    #[serde(rename = "nome", default, deserialize_with = "wire::text")]
    pub client_name: String,
    #[serde(rename = "telefone", default, deserialize_with = "wire::phone")]
    pub phone: String,
    #[serde(default, deserialize_with = "wire::text")]
    pub email: String,
    #[serde(rename = "servico", default, deserialize_with = "wire::text")]
    pub service: String,
    #[serde(rename = "profissional", deserialize_with = "wire::required_text")]
    pub professional: String,
    #[serde(rename = "data", deserialize_with = "wire::date")]
    pub date: NaiveDate,
    #[serde(rename = "hora")]
    pub time: SlotTime,
    #[serde(rename = "valor", default, deserialize_with = "wire::lenient_price")]
    pub price: f64,
}

impl Booking {
    /// True when this booking holds `time` for `professional` on `date`.
    pub fn occupies(&self, date: NaiveDate, time: SlotTime, professional: &str) -> bool {
        self.date == date && self.time == time && self.professional == professional
    }
}

/// A bookable service (sheet `servicobeta`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    #[serde(
        default,
        deserialize_with = "wire::lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<u64>,
    #[serde(rename = "servico", deserialize_with = "wire::required_text")]
    pub name: String,
    #[serde(rename = "duracao", deserialize_with = "wire::duration")]
    pub duration: ServiceDuration,
    #[serde(rename = "valor", default, deserialize_with = "wire::price")]
    pub price: f64,
}

/// A professional and the window in which they take bookings (sheet `profissional`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Professional {
    #[serde(
        default,
        deserialize_with = "wire::lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<u64>,
    #[serde(rename = "profissional", deserialize_with = "wire::required_text")]
    pub name: String,
    #[serde(rename = "de", default, deserialize_with = "wire::optional_date")]
    pub active_from: Option<NaiveDate>,
    #[serde(rename = "ate", default, deserialize_with = "wire::optional_date")]
    pub active_until: Option<NaiveDate>,
}

impl Professional {
    /// Inclusive on both bounds; a missing bound is open on that side.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.active_from.is_none_or(|from| from <= date)
            && self.active_until.is_none_or(|until| date <= until)
    }
}

/// One recurring candidate start time (sheet `horabeta`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(
        default,
        deserialize_with = "wire::lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<u64>,
    #[serde(
        rename = "diasemana",
        deserialize_with = "wire::weekday",
        serialize_with = "wire::serialize_weekday"
    )]
    pub weekday: Weekday,
    #[serde(rename = "hora")]
    pub time: SlotTime,
    #[serde(rename = "ativo", default, deserialize_with = "wire::flag")]
    pub enabled: bool,
}
