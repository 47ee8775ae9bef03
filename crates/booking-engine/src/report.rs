//! Dashboard aggregation over a booking snapshot: headline numbers, chart
//! series, and period reports.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::model::{Booking, SlotTime};

/// Headline numbers for the dashboard landing view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub today_count: usize,
    pub today_revenue: f64,
    /// Revenue of bookings dated on or after the first day of the month.
    pub month_revenue: f64,
    /// Distinct non-blank phone numbers across the whole snapshot.
    pub unique_clients: usize,
}

impl Overview {
    pub fn compute(bookings: &[Booking], today: NaiveDate) -> Self {
        let month_start = today.with_day(1).unwrap_or(today);
        let todays: Vec<&Booking> = bookings.iter().filter(|b| b.date == today).collect();
        Self {
            today_count: todays.len(),
            today_revenue: todays.iter().map(|b| b.price).sum(),
            month_revenue: bookings
                .iter()
                .filter(|b| b.date >= month_start)
                .map(|b| b.price)
                .sum(),
            unique_clients: bookings
                .iter()
                .map(|b| b.phone.as_str())
                .filter(|phone| !phone.is_empty())
                .collect::<HashSet<_>>()
                .len(),
        }
    }
}

fn starts_at(booking: &Booking) -> NaiveDateTime {
    let time = booking.time;
    booking
        .date
        .and_hms_opt(time.hour(), time.minute(), 0)
        .unwrap_or_else(|| booking.date.and_time(chrono::NaiveTime::MIN))
}

/// The next `limit` bookings starting strictly after `now`.
pub fn upcoming(bookings: &[Booking], now: NaiveDateTime, limit: usize) -> Vec<&Booking> {
    let mut future: Vec<&Booking> = bookings.iter().filter(|b| starts_at(b) > now).collect();
    future.sort_by_key(|b| starts_at(b));
    future.truncate(limit);
    future
}

/// All bookings, most recent first (admin listing order).
pub fn newest_first(bookings: &[Booking]) -> Vec<&Booking> {
    let mut sorted: Vec<&Booking> = bookings.iter().collect();
    sorted.sort_by_key(|b| std::cmp::Reverse(starts_at(b)));
    sorted
}

/// Bookings on `date` with `professional`; a `None` criterion matches everything.
/// Order is preserved.
pub fn filter_bookings<'a>(
    bookings: &'a [Booking],
    date: Option<NaiveDate>,
    professional: Option<&str>,
) -> Vec<&'a Booking> {
    bookings
        .iter()
        .filter(|b| date.is_none_or(|day| b.date == day))
        .filter(|b| professional.is_none_or(|name| b.professional == name))
        .collect()
}

/// Bookings per service name, sorted by name.
pub fn count_by_service(bookings: &[Booking]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for booking in bookings {
        *counts.entry(booking.service.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect()
}

/// Bookings per start time, sorted chronologically.
pub fn count_by_hour(bookings: &[Booking]) -> Vec<(SlotTime, usize)> {
    let mut counts: BTreeMap<SlotTime, usize> = BTreeMap::new();
    for booking in bookings {
        *counts.entry(booking.time).or_default() += 1;
    }
    counts.into_iter().collect()
}

/// Report window selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Today,
    /// Sunday of the current week through today.
    Week,
    /// First of the month through today.
    Month,
    Custom { from: NaiveDate, to: NaiveDate },
}

impl ReportPeriod {
    /// Inclusive `(from, to)` range relative to `today`.
    pub fn resolve(self, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
        let range = match self {
            ReportPeriod::Today => (today, today),
            ReportPeriod::Week => {
                let back = u64::from(today.weekday().num_days_from_sunday());
                (today.checked_sub_days(Days::new(back)).unwrap_or(today), today)
            }
            ReportPeriod::Month => (today.with_day(1).unwrap_or(today), today),
            ReportPeriod::Custom { from, to } => {
                if from > to {
                    return Err(EngineError::InvalidDate(format!(
                        "report starts {from} after it ends {to}"
                    )));
                }
                (from, to)
            }
        };
        Ok(range)
    }
}

/// One client among the most frequent in a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientTally {
    pub name: String,
    pub phone: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub total: usize,
    pub revenue: f64,
    /// Revenue per booking; zero for an empty period.
    pub average_ticket: f64,
    pub top_clients: Vec<ClientTally>,
}

impl PeriodReport {
    pub fn compute(bookings: &[Booking], from: NaiveDate, to: NaiveDate, top_n: usize) -> Self {
        let in_period: Vec<&Booking> = bookings
            .iter()
            .filter(|b| b.date >= from && b.date <= to)
            .collect();
        let total = in_period.len();
        let revenue: f64 = in_period.iter().map(|b| b.price).sum();
        let average_ticket = if total > 0 { revenue / total as f64 } else { 0.0 };

        // Tally in order of first appearance so the stable sort breaks ties
        // by who booked first. Rows without a phone belong to no client.
        let mut order: Vec<ClientTally> = Vec::new();
        let mut position: HashMap<&str, usize> = HashMap::new();
        for booking in in_period.iter().filter(|b| !b.phone.is_empty()) {
            match position.get(booking.phone.as_str()) {
                Some(&i) => order[i].count += 1,
                None => {
                    position.insert(booking.phone.as_str(), order.len());
                    order.push(ClientTally {
                        name: booking.client_name.clone(),
                        phone: booking.phone.clone(),
                        count: 1,
                    });
                }
            }
        }
        order.sort_by(|a, b| b.count.cmp(&a.count));
        order.truncate(top_n);

        Self {
            from,
            to,
            total,
            revenue,
            average_ticket,
            top_clients: order,
        }
    }
}
