//! Pure query views over an already-transformed schedule.

use crate::types::{DailySchedule, Schedule};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub const DEFAULT_UPCOMING_AMOUNT: usize = 5;

/// Filters to events that have not started yet or are still in progress at
/// `now`, keeping upstream order and stopping after `amount` matches.
/// Relies on the transformer preserving row order: upstream schedules are
/// time-ordered, so the earliest qualifying events win.
pub fn upcoming(schedule: &Schedule, amount: usize, now: DateTime<Utc>) -> Schedule {
    let data = schedule
        .data
        .iter()
        .filter(|event| event.scheduled > now || (event.scheduled <= now && event.end() > now))
        .take(amount)
        .cloned()
        .collect();

    Schedule {
        meta: schedule.meta.clone(),
        data,
    }
}

/// Buckets every event under the calendar date of its scheduled instant in
/// the instant's own offset (local wall-clock date), preserving relative
/// order within each day. Every input event lands in exactly one bucket.
pub fn group_by_day(schedule: &Schedule) -> DailySchedule {
    let mut data: BTreeMap<String, Vec<_>> = BTreeMap::new();
    for event in &schedule.data {
        let key = event.scheduled.format("%Y-%m-%d").to_string();
        data.entry(key).or_default().push(event.clone());
    }

    DailySchedule {
        meta: schedule.meta.clone(),
        data,
    }
}
