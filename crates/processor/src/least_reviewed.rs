//! Tracking of the PRs that waited longest for a first response

use common::metrics::{LeastReviewedEntry, LeastReviewedMap, WeekKey};

/// Offer PRs that waited `days` to `entry`.
///
/// A longer wait replaces the set, an equal wait joins it, a shorter one is
/// dropped. Sets are never deduplicated.
pub fn offer<I>(entry: &mut LeastReviewedEntry, days: i64, prs: I)
where
    I: IntoIterator<Item = String>,
{
    if days > entry.days {
        entry.days = days;
        entry.prs = prs.into_iter().collect();
    } else if days == entry.days {
        entry.prs.extend(prs);
    }
}

/// Record one PR under the week of its first team review request
pub fn track(map: &mut LeastReviewedMap, week: WeekKey, url: &str, stuck_days: i64) {
    let entry = map.entry(week).or_default();
    offer(entry, stuck_days, std::iter::once(url.to_string()));
}
