//! Lenient cell decoding for spreadsheet-backed records.
//!
//! Spreadsheet APIs return whatever the cell holds: a phone typed as a number,
//! a price as `"50,00"`, a flag as `"TRUE"`. These helpers accept those shapes
//! and reject only what cannot be interpreted. [`decode_records`] applies them
//! per record so that one bad row never hides the rest of a collection.

use chrono::{NaiveDate, Weekday};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;
use tracing::warn;

use crate::model::ServiceDuration;

#[derive(Deserialize)]
#[serde(untagged)]
enum Cell {
    Bool(bool),
    Num(f64),
    Text(String),
}

/// Any scalar as trimmed text. Arrays and objects read as blank with a warning.
pub(crate) fn text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        other => {
            warn!(cell = %other, "unreadable text cell, reading as blank");
            String::new()
        }
    })
}

pub(crate) fn required_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = text(d)?;
    if value.is_empty() {
        return Err(D::Error::custom("value must not be blank"));
    }
    Ok(value)
}

pub(crate) fn phone<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(crate::contact::normalize_phone(&text(d)?))
}

pub(crate) fn date<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
    let raw = required_text(d)?;
    parse_date(&raw).map_err(D::Error::custom)
}

pub(crate) fn optional_date<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<NaiveDate>, D::Error> {
    let raw = text(d)?;
    if raw.is_empty() {
        return Ok(None);
    }
    parse_date(&raw).map(Some).map_err(D::Error::custom)
}

/// Row id as the sheet API assigns it. Unreadable ids read as `None`.
pub(crate) fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
    let raw = Value::deserialize(d)?;
    let id = match &raw {
        Value::Null => return Ok(None),
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    if id.is_none() {
        warn!(cell = %raw, "unreadable row id, ignoring");
    }
    Ok(id)
}

/// Price of a stored booking: never rejects the row, unreadable values read as zero.
pub(crate) fn lenient_price<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let raw = Value::deserialize(d)?;
    let price = match &raw {
        Value::Null => Some(0.0),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price(s),
        _ => None,
    };
    Ok(price.unwrap_or_else(|| {
        warn!(cell = %raw, "unreadable price, reading as zero");
        0.0
    }))
}

pub(crate) fn price<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    match Option::<Cell>::deserialize(d)? {
        None => Ok(0.0),
        Some(Cell::Num(n)) => Ok(n),
        Some(Cell::Text(s)) => parse_price(&s)
            .ok_or_else(|| D::Error::custom(format!("unreadable price `{s}`"))),
        Some(Cell::Bool(_)) => Err(D::Error::custom("price cannot be a boolean")),
    }
}

pub(crate) fn duration<'de, D: Deserializer<'de>>(d: D) -> Result<ServiceDuration, D::Error> {
    let minutes = match Cell::deserialize(d)? {
        Cell::Num(n) if n.fract() == 0.0 && n > 0.0 && n <= f64::from(u32::MAX) => n as u32,
        Cell::Text(s) => s
            .trim()
            .parse::<u32>()
            .map_err(|_| D::Error::custom(format!("unreadable duration `{s}`")))?,
        _ => return Err(D::Error::custom("duration must be a positive whole number")),
    };
    ServiceDuration::from_minutes(minutes).map_err(D::Error::custom)
}

pub(crate) fn weekday<'de, D: Deserializer<'de>>(d: D) -> Result<Weekday, D::Error> {
    match Cell::deserialize(d)? {
        Cell::Num(n) if n.fract() == 0.0 && (0.0..=6.0).contains(&n) => {
            Ok(weekday_from_sunday(n as u32))
        }
        Cell::Text(s) => {
            parse_weekday(&s).ok_or_else(|| D::Error::custom(format!("unknown weekday `{s}`")))
        }
        _ => Err(D::Error::custom("weekday must be a name or 0..=6")),
    }
}

pub(crate) fn serialize_weekday<S: Serializer>(day: &Weekday, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(weekday_name(*day))
}

pub(crate) fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    match Option::<Cell>::deserialize(d)? {
        None => Ok(false),
        Some(Cell::Bool(b)) => Ok(b),
        Some(Cell::Num(n)) => Ok(n != 0.0),
        Some(Cell::Text(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "sim" | "yes" | "x" => Ok(true),
            "false" | "0" | "nao" | "não" | "no" | "" => Ok(false),
            other => Err(D::Error::custom(format!("unreadable flag `{other}`"))),
        },
    }
}

/// Parse a `YYYY-MM-DD` date; an ISO timestamp suffix (`T...`) is ignored.
pub fn parse_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    let day = raw.trim().split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
}

/// Parse a price cell: plain decimals (`50.5`) or Brazilian currency
/// formatting (`R$ 1.234,50`). Blank reads as zero.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    if cleaned.is_empty() {
        return Some(0.0);
    }
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned
    };
    normalized.parse().ok()
}

/// Day names as the schedule sheet writes them, plus English names.
pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    let lowered = raw.trim().to_lowercase();
    let name = lowered.strip_suffix("-feira").unwrap_or(&lowered);
    let day = match name {
        "domingo" | "sunday" | "sun" | "dom" => Weekday::Sun,
        "segunda" | "monday" | "mon" | "seg" => Weekday::Mon,
        "terça" | "terca" | "tuesday" | "tue" | "ter" => Weekday::Tue,
        "quarta" | "wednesday" | "wed" | "qua" => Weekday::Wed,
        "quinta" | "thursday" | "thu" | "qui" => Weekday::Thu,
        "sexta" | "friday" | "fri" | "sex" => Weekday::Fri,
        "sábado" | "sabado" | "saturday" | "sat" | "sab" | "sáb" => Weekday::Sat,
        other => return other.parse::<u32>().ok().filter(|n| *n <= 6).map(weekday_from_sunday),
    };
    Some(day)
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "domingo",
        Weekday::Mon => "segunda",
        Weekday::Tue => "terça",
        Weekday::Wed => "quarta",
        Weekday::Thu => "quinta",
        Weekday::Fri => "sexta",
        Weekday::Sat => "sábado",
    }
}

/// 0 = Sunday .. 6 = Saturday. Callers guarantee `n <= 6`.
fn weekday_from_sunday(n: u32) -> Weekday {
    match n {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

/// Decode every record of a collection, skipping (and logging) the ones that
/// do not fit `T`.
pub fn decode_records<T: DeserializeOwned>(collection: &str, rows: &[Value]) -> Vec<T> {
    rows.iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value::<T>(row.clone()) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(collection, index, error = %err, "skipping malformed record");
                None
            }
        })
        .collect()
}
