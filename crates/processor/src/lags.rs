//! Review lag computation
//!
//! Only the first team review request of a PR produces lag samples.
//! Missing responses are substituted in order:
//!
//! 1. With no approval, the last withdrawal of the team's request stands in
//!    for the approval (and for the first response if there was none), as
//!    long as it is later than any real first response.
//! 2. A merged PR still missing either is taken as reviewed on its close
//!    date and counts as complete.
//! 3. Anything still missing is measured up to `now` and the PR counts as
//!    incomplete.

use chrono::{DateTime, Utc};
use common::metrics::LagSample;
use common::models::{Event, PrState, PullRequestRecord};

use crate::timeline::TeamTimeline;

/// Resolved response times for a PR's first team review request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub requested_at: DateTime<Utc>,
    pub first_response: DateTime<Utc>,
    pub approval: DateTime<Utc>,
    /// False when either time is a provisional `now`
    pub complete: bool,
}

impl ReviewOutcome {
    /// Days the PR waited for its first response
    pub fn stuck_days(&self) -> i64 {
        whole_days(self.requested_at, self.first_response)
    }
}

/// Whole days elapsed from `from` to `to`, truncated toward zero
pub fn whole_days(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_days()
}

fn merged_at(pr: &PullRequestRecord) -> Option<DateTime<Utc>> {
    pr.closed_at.or_else(|| {
        pr.timeline.iter().find_map(|e| match e {
            Event::Merged { at } => Some(*at),
            _ => None,
        })
    })
}

/// Apply the substitution rules; `None` when the team was never requested
pub fn resolve(
    pr: &PullRequestRecord,
    timeline: &TeamTimeline,
    now: DateTime<Utc>,
) -> Option<ReviewOutcome> {
    let requested_at = timeline.first_request()?;
    let mut first_response = timeline.first_review();
    let mut approval = timeline.first_approval();

    if approval.is_none() {
        if let Some(removed) = timeline.last_removal() {
            if first_response.map_or(true, |first| removed > first) {
                approval = Some(removed);
                first_response = first_response.or(Some(removed));
            }
        }
    }

    if (first_response.is_none() || approval.is_none()) && pr.state == PrState::Merged {
        if let Some(merged) = merged_at(pr) {
            first_response = first_response.or(Some(merged));
            approval = approval.or(Some(merged));
        }
    }

    let complete = first_response.is_some() && approval.is_some();
    Some(ReviewOutcome {
        requested_at,
        first_response: first_response.unwrap_or(now),
        approval: approval.unwrap_or(now),
        complete,
    })
}

/// The three lag values filed for a PR
pub fn lag_sample(pr: &PullRequestRecord, outcome: &ReviewOutcome) -> LagSample {
    LagSample {
        open_to_review_request: whole_days(pr.created_at, outcome.requested_at),
        review_request_to_first: whole_days(outcome.requested_at, outcome.first_response),
        review_request_to_approved: whole_days(outcome.requested_at, outcome.approval),
    }
}
