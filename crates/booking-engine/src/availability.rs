//! Slot availability against a snapshot of existing bookings.
//!
//! A service longer than one slot consumes consecutive 60-minute blocks
//! starting at the requested time. A request is free when none of its blocks
//! coincides with a stored booking for the same professional on the same date.
//!
//! Every function here is a pure function of its arguments: the booking
//! snapshot is passed in, never cached, and never mutated.

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::model::{Booking, ScheduleEntry, ServiceDuration, SlotTime};
use crate::schedule::candidate_times;

/// Number of consecutive slots a service of `duration` occupies.
pub fn blocks_needed(duration: ServiceDuration) -> u32 {
    duration.blocks_needed()
}

/// Check whether `professional` can take a `duration`-long service starting at
/// `time` on `date`.
///
/// Each block start `time + i*60` is compared with every booking's stored
/// (date, time, professional). Returns `false` on the first occupied block.
///
/// A stored booking occupies only its own start time, even when its service
/// ran longer than one slot. Blocks past midnight are not checked.
pub fn is_slot_available(
    date: NaiveDate,
    time: SlotTime,
    professional: &str,
    duration: ServiceDuration,
    bookings: &[Booking],
) -> bool {
    time.blocks(duration).all(|block| {
        !bookings
            .iter()
            .any(|booking| booking.occupies(date, block, professional))
    })
}

/// Compute the free start times for `professional` on `date`.
///
/// Candidates come from the enabled schedule-template entries for the date's
/// weekday. The day's bookings for the professional are collected once and
/// reused for every candidate. The result is ascending with no duplicates; an
/// empty result means the day is fully booked.
pub fn available_slots(
    date: NaiveDate,
    professional: &str,
    duration: ServiceDuration,
    template: &[ScheduleEntry],
    bookings: &[Booking],
) -> Vec<SlotTime> {
    let candidates = candidate_times(template, date);
    let occupied = DayOccupancy::collect(bookings, date, professional);

    let free: Vec<SlotTime> = candidates
        .into_iter()
        .filter(|start| occupied.is_free(*start, duration))
        .collect();

    debug!(
        %date,
        professional,
        duration_minutes = duration.minutes(),
        free = free.len(),
        "computed available slots"
    );
    free
}

/// Start times held by one professional on one date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayOccupancy {
    taken: HashSet<SlotTime>,
}

impl DayOccupancy {
    pub fn collect(bookings: &[Booking], date: NaiveDate, professional: &str) -> Self {
        let taken = bookings
            .iter()
            .filter(|b| b.date == date && b.professional == professional)
            .map(|b| b.time)
            .collect();
        Self { taken }
    }

    /// Same rule as [`is_slot_available`], against the pre-collected day.
    pub fn is_free(&self, start: SlotTime, duration: ServiceDuration) -> bool {
        start.blocks(duration).all(|block| !self.taken.contains(&block))
    }

    pub fn taken(&self) -> BTreeSet<SlotTime> {
        self.taken.iter().copied().collect()
    }
}

/// A snapshot pre-indexed by (date, professional).
///
/// Worth building when many days or professionals are queried against the
/// same snapshot; a single [`available_slots`] call does not need it.
#[derive(Debug, Clone, Default)]
pub struct BookingIndex {
    days: HashMap<(NaiveDate, String), DayOccupancy>,
}

impl BookingIndex {
    pub fn build(bookings: &[Booking]) -> Self {
        let mut days: HashMap<(NaiveDate, String), DayOccupancy> = HashMap::new();
        for booking in bookings {
            days.entry((booking.date, booking.professional.clone()))
                .or_default()
                .taken
                .insert(booking.time);
        }
        Self { days }
    }

    pub fn day(&self, date: NaiveDate, professional: &str) -> Option<&DayOccupancy> {
        self.days.get(&(date, professional.to_string()))
    }

    pub fn is_slot_available(
        &self,
        date: NaiveDate,
        time: SlotTime,
        professional: &str,
        duration: ServiceDuration,
    ) -> bool {
        self.day(date, professional)
            .is_none_or(|day| day.is_free(time, duration))
    }

    pub fn available_slots(
        &self,
        date: NaiveDate,
        professional: &str,
        duration: ServiceDuration,
        template: &[ScheduleEntry],
    ) -> Vec<SlotTime> {
        candidate_times(template, date)
            .into_iter()
            .filter(|start| self.is_slot_available(date, *start, professional, duration))
            .collect()
    }
}
