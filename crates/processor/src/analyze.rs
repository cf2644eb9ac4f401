//! Per-repository analysis
//!
//! Runs every PR of a repository snapshot through classification, queue
//! bucketing, lag computation and least-reviewed tracking, and files the
//! results into the eight weekly maps of [`RepoAnalysis`].

use chrono::{DateTime, NaiveDate, Utc};
use common::metrics::{LeastReviewedMap, WeekKey, WeekMap};
use common::models::{PrState, PullRequestRecord, RepoSnapshot};
use serde::Serialize;
use tracing::{debug, info};

use crate::lags::{lag_sample, resolve};
use crate::least_reviewed::track;
use crate::queue::queue_rows;
use crate::timeline::classify;

/// Default bound on days walked per review request
pub const DEFAULT_MAX_QUEUE_DAYS: u32 = 3650;

/// Who a PR is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Core,
    Community,
}

impl Group {
    /// Community only for non-members in repositories that track community PRs
    pub fn of(pr: &PullRequestRecord, has_community: bool) -> Self {
        if pr.author_association.is_member() || !has_community {
            Group::Core
        } else {
            Group::Community
        }
    }
}

/// Weekly maps for one repository and team
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoAnalysis {
    pub all: WeekMap,
    pub core: WeekMap,
    pub community: WeekMap,
    pub incomplete: WeekMap,
    pub core_incomplete: WeekMap,
    pub community_incomplete: WeekMap,
    pub least_reviewed_core: LeastReviewedMap,
    pub least_reviewed_community: LeastReviewedMap,
}

impl RepoAnalysis {
    /// Completed-review map of a group; it also carries the group's queue rows
    pub fn group(&self, group: Group) -> &WeekMap {
        match group {
            Group::Core => &self.core,
            Group::Community => &self.community,
        }
    }

    pub fn least_reviewed(&self, group: Group) -> &LeastReviewedMap {
        match group {
            Group::Core => &self.least_reviewed_core,
            Group::Community => &self.least_reviewed_community,
        }
    }

    fn least_reviewed_mut(&mut self, group: Group) -> &mut LeastReviewedMap {
        match group {
            Group::Core => &mut self.least_reviewed_core,
            Group::Community => &mut self.least_reviewed_community,
        }
    }

    /// Repository-wide and group map for a completion state
    fn maps_mut(&mut self, group: Group, complete: bool) -> (&mut WeekMap, &mut WeekMap) {
        match (group, complete) {
            (Group::Core, true) => (&mut self.all, &mut self.core),
            (Group::Community, true) => (&mut self.all, &mut self.community),
            (Group::Core, false) => (&mut self.incomplete, &mut self.core_incomplete),
            (Group::Community, false) => (&mut self.incomplete, &mut self.community_incomplete),
        }
    }

    /// Copy keeping only weeks starting strictly after `after`
    pub fn since(&self, after: NaiveDate) -> RepoAnalysis {
        fn keep<V: Clone>(
            map: &std::collections::BTreeMap<WeekKey, V>,
            after: NaiveDate,
        ) -> std::collections::BTreeMap<WeekKey, V> {
            map.iter()
                .filter(|(week, _)| week.start() > after)
                .map(|(week, v)| (*week, v.clone()))
                .collect()
        }

        RepoAnalysis {
            all: keep(&self.all, after),
            core: keep(&self.core, after),
            community: keep(&self.community, after),
            incomplete: keep(&self.incomplete, after),
            core_incomplete: keep(&self.core_incomplete, after),
            community_incomplete: keep(&self.community_incomplete, after),
            least_reviewed_core: keep(&self.least_reviewed_core, after),
            least_reviewed_community: keep(&self.least_reviewed_community, after),
        }
    }
}

/// Analyzes repositories for one team as of a fixed `now`
#[derive(Debug, Clone)]
pub struct Analyzer {
    team: String,
    now: DateTime<Utc>,
    max_queue_days: u32,
}

impl Analyzer {
    pub fn new(team: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            team: team.into(),
            now,
            max_queue_days: DEFAULT_MAX_QUEUE_DAYS,
        }
    }

    pub fn max_queue_days(mut self, days: u32) -> Self {
        self.max_queue_days = days;
        self
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn analyze(&self, snapshot: &RepoSnapshot) -> RepoAnalysis {
        info!(
            "Analyzing {} PRs for team {} (community tracked: {})",
            snapshot.prs.len(),
            self.team,
            snapshot.has_community
        );

        let mut analysis = RepoAnalysis::default();
        let mut qualifying = 0usize;
        for (processed, pr) in snapshot.prs.iter().enumerate() {
            if self.analyze_pr(pr, snapshot.has_community, &mut analysis) {
                qualifying += 1;
            }
            if (processed + 1) % 50 == 0 {
                debug!("Progress: {}/{} PRs", processed + 1, snapshot.prs.len());
            }
        }

        info!(
            "Analysis complete: {} of {} PRs requested review from {}",
            qualifying,
            snapshot.prs.len(),
            self.team
        );
        analysis
    }

    /// File one PR into `analysis`; returns false when the team was never requested
    pub fn analyze_pr(
        &self,
        pr: &PullRequestRecord,
        has_community: bool,
        analysis: &mut RepoAnalysis,
    ) -> bool {
        let timeline = classify(pr, &self.team);
        if timeline.is_empty() {
            debug!("{} never requested review from {}", pr.url, self.team);
            return false;
        }
        let Some(outcome) = resolve(pr, &timeline, self.now) else {
            return false;
        };
        let group = Group::of(pr, has_community);

        for (week, row) in queue_rows(&timeline, self.now, self.max_queue_days) {
            let (all, grouped) = analysis.maps_mut(group, true);
            all.entry(week).or_default().queue_size.push(row);
            grouped.entry(week).or_default().queue_size.push(row);
        }

        let week = WeekKey::of(outcome.requested_at);
        let lags = lag_sample(pr, &outcome);
        let (main, grouped) = analysis.maps_mut(group, outcome.complete);
        main.entry(week).or_default().push_lags(&lags);
        grouped.entry(week).or_default().push_lags(&lags);

        if pr.state != PrState::Closed {
            track(
                analysis.least_reviewed_mut(group),
                week,
                &pr.url,
                outcome.stuck_days(),
            );
        }

        true
    }
}
