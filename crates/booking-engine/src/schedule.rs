//! Recurring schedule template: which start times are offered on which weekday.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::model::{ScheduleEntry, SlotTime};

/// Weekday of `date` as 0 = Sunday .. 6 = Saturday.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_sunday()
}

/// Enabled template times for `weekday`, ascending and deduplicated.
pub fn times_for_weekday(template: &[ScheduleEntry], weekday: Weekday) -> BTreeSet<SlotTime> {
    template
        .iter()
        .filter(|entry| entry.enabled && entry.weekday == weekday)
        .map(|entry| entry.time)
        .collect()
}

/// Candidate start times offered on `date`, independent of professional.
pub fn candidate_times(template: &[ScheduleEntry], date: NaiveDate) -> BTreeSet<SlotTime> {
    times_for_weekday(template, date.weekday())
}

/// The template in display order: Sunday first, then by start time.
/// Disabled entries are kept.
pub fn sorted_template(mut template: Vec<ScheduleEntry>) -> Vec<ScheduleEntry> {
    template.sort_by_key(|entry| (entry.weekday.num_days_from_sunday(), entry.time));
    template
}
