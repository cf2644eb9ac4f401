//! Day-by-day queue rows for outstanding review requests
//!
//! Each review request becomes one row per calendar week it spans. Days are
//! UTC calendar days. A row holds a mark for every day of the interval and
//! `None` elsewhere:
//!
//! - `1` while the request is outstanding,
//! - `-1` on the day it is delisted,
//! - `0` when it is requested and delisted on the same day.
//!
//! Requests that are still outstanding run up to today, all `1`.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use common::metrics::{day_index, DayArray, QueueMark, WeekKey};
use tracing::warn;

use crate::timeline::TeamTimeline;

/// Rows for a single request; `delisted` is `None` while still outstanding
pub fn bucketize(
    requested: NaiveDate,
    delisted: Option<NaiveDate>,
    today: NaiveDate,
    max_days: u32,
) -> Vec<(WeekKey, DayArray)> {
    let end = delisted.unwrap_or(today).max(requested);
    let limit = requested
        .checked_add_signed(Duration::days(max_days as i64))
        .unwrap_or(NaiveDate::MAX);
    let last = end.min(limit);
    if last < end {
        warn!(
            "Review request from {} outstanding until {}; only the first {} days are counted",
            requested, end, max_days
        );
    }

    let mut rows: Vec<(WeekKey, DayArray)> = Vec::new();
    for day in requested.iter_days().take_while(|d| *d <= last) {
        let mark = match delisted {
            Some(_) if day == end && day == requested => QueueMark::SameDay,
            Some(_) if day == end => QueueMark::Resolved,
            _ => QueueMark::Waiting,
        };

        let week = WeekKey::containing(day);
        match rows.last_mut() {
            Some((key, row)) if *key == week => row[day_index(day)] = Some(mark),
            _ => {
                let mut row: DayArray = [None; 7];
                row[day_index(day)] = Some(mark);
                rows.push((week, row));
            }
        }
    }

    rows
}

/// Rows for every team request on a PR; re-requests contribute separately
pub fn queue_rows(
    timeline: &TeamTimeline,
    now: DateTime<Utc>,
    max_days: u32,
) -> Vec<(WeekKey, DayArray)> {
    timeline
        .requests
        .iter()
        .flat_map(|&requested_at| {
            let delisted = timeline
                .next_delisting(requested_at)
                .map(|d| d.at.date_naive());
            bucketize(
                requested_at.date_naive(),
                delisted,
                now.date_naive(),
                max_days,
            )
        })
        .collect()
}
