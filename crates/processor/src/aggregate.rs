//! Team-wide weekly summary across repositories
//!
//! Folds each repository's core/community maps into totals for two
//! reporting windows: the week containing `now` and the week before it.
//! A repository without data for a week contributes nothing.

use chrono::{DateTime, Utc};
use common::metrics::{DayArray, LeastReviewedEntry, WeekKey, WeekMetrics};
use serde::Serialize;

use crate::analyze::{Group, RepoAnalysis};
use crate::least_reviewed::offer;

/// Net queue counts for one repository and week
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueProfile {
    pub start: i64,
    pub end: i64,
    pub max: i64,
}

/// Per-day sum of `1`s minus `-1`s over all rows; `0` marks count for nothing
pub fn queue_profile(rows: &[DayArray]) -> QueueProfile {
    let mut net = [0i64; 7];
    for row in rows {
        for (day, mark) in row.iter().enumerate() {
            if let Some(mark) = mark {
                net[day] += mark.value() as i64;
            }
        }
    }

    QueueProfile {
        start: net[0],
        end: net[6],
        max: net.iter().copied().max().unwrap_or(0),
    }
}

/// Totals for one group in one window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    pub queue_start: i64,
    pub queue_end: i64,
    pub queue_max: i64,
    pub queue_volume: usize,
    /// `i64::MAX` until a lag sample is seen
    pub lag_min: i64,
    /// `i64::MIN` until a lag sample is seen
    pub lag_max: i64,
    pub least_reviewed: LeastReviewedEntry,
}

impl Default for GroupStats {
    fn default() -> Self {
        Self {
            queue_start: 0,
            queue_end: 0,
            queue_max: 0,
            queue_volume: 0,
            lag_min: i64::MAX,
            lag_max: i64::MIN,
            least_reviewed: LeastReviewedEntry::default(),
        }
    }
}

impl GroupStats {
    /// First-response lag range, if any PR was requested in the window
    pub fn lag_range(&self) -> Option<(i64, i64)> {
        (self.lag_min <= self.lag_max).then_some((self.lag_min, self.lag_max))
    }

    fn absorb(mut self, metrics: Option<&WeekMetrics>, least: Option<&LeastReviewedEntry>) -> Self {
        if let Some(metrics) = metrics {
            let queue = queue_profile(&metrics.queue_size);
            self.queue_start += queue.start;
            self.queue_end += queue.end;
            self.queue_max += queue.max;
            self.queue_volume += metrics.open_to_review_request.len();

            for &lag in &metrics.review_request_to_first {
                self.lag_min = self.lag_min.min(lag);
                self.lag_max = self.lag_max.max(lag);
            }
        }

        if let Some(least) = least {
            offer(&mut self.least_reviewed, least.days, least.prs.iter().cloned());
        }

        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WindowStats {
    pub core: GroupStats,
    pub community: GroupStats,
}

impl WindowStats {
    pub fn group(&self, group: Group) -> &GroupStats {
        match group {
            Group::Core => &self.core,
            Group::Community => &self.community,
        }
    }

    fn absorb(self, week: WeekKey, analysis: &RepoAnalysis) -> Self {
        let part = |group: Group, stats: GroupStats| {
            stats.absorb(
                analysis.group(group).get(&week),
                analysis.least_reviewed(group).get(&week),
            )
        };
        Self {
            core: part(Group::Core, self.core),
            community: part(Group::Community, self.community),
        }
    }
}

/// Two-window summary for a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamSummary {
    pub this_week: WeekKey,
    pub last_week: WeekKey,
    pub stats_this_week: WindowStats,
    pub stats_last_week: WindowStats,
}

impl TeamSummary {
    pub fn new(now: DateTime<Utc>) -> Self {
        let this_week = WeekKey::of(now);
        Self {
            this_week,
            last_week: this_week.previous(),
            stats_this_week: WindowStats::default(),
            stats_last_week: WindowStats::default(),
        }
    }

    /// Fold one more repository into the totals
    pub fn absorb(self, analysis: &RepoAnalysis) -> Self {
        Self {
            stats_this_week: self.stats_this_week.absorb(self.this_week, analysis),
            stats_last_week: self.stats_last_week.absorb(self.last_week, analysis),
            ..self
        }
    }
}

/// Summarize a team's repositories as of `now`
pub fn aggregate<'a, I>(analyses: I, now: DateTime<Utc>) -> TeamSummary
where
    I: IntoIterator<Item = &'a RepoAnalysis>,
{
    analyses
        .into_iter()
        .fold(TeamSummary::new(now), TeamSummary::absorb)
}
