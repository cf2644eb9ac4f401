//! Extraction of a team's review requests and delisting events from a PR timeline

use chrono::{DateTime, Utc};
use common::models::{Event, PullRequestRecord, ReviewState};

/// Why a PR left the team's queue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelistKind {
    /// A review submitted on behalf of the team
    Reviewed(ReviewState),
    /// The team's review request was withdrawn
    RequestRemoved,
    Closed,
    Merged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delisting {
    pub at: DateTime<Utc>,
    pub kind: DelistKind,
}

/// A PR's timeline as seen by one team
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamTimeline {
    /// Review requests naming the team, ascending
    pub requests: Vec<DateTime<Utc>>,
    /// Events that take the PR out of the team's queue, ascending
    pub delistings: Vec<Delisting>,
}

impl TeamTimeline {
    /// True when the team was never asked to review; such PRs are skipped
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn first_request(&self) -> Option<DateTime<Utc>> {
        self.requests.first().copied()
    }

    /// First delisting at or after `requested_at`
    pub fn next_delisting(&self, requested_at: DateTime<Utc>) -> Option<&Delisting> {
        self.delistings.iter().find(|d| d.at >= requested_at)
    }

    /// Earliest team review of any state
    pub fn first_review(&self) -> Option<DateTime<Utc>> {
        self.delistings.iter().find_map(|d| match d.kind {
            DelistKind::Reviewed(_) => Some(d.at),
            _ => None,
        })
    }

    /// Earliest approving team review
    pub fn first_approval(&self) -> Option<DateTime<Utc>> {
        self.delistings.iter().find_map(|d| match d.kind {
            DelistKind::Reviewed(ReviewState::Approved) => Some(d.at),
            _ => None,
        })
    }

    /// Latest withdrawal of the team's review request
    pub fn last_removal(&self) -> Option<DateTime<Utc>> {
        self.delistings.iter().rev().find_map(|d| match d.kind {
            DelistKind::RequestRemoved => Some(d.at),
            _ => None,
        })
    }
}

fn names_team(team: &Option<String>, wanted: &str) -> bool {
    team.as_deref() == Some(wanted)
}

/// Split a PR's timeline into the team's requests and delistings
pub fn classify(pr: &PullRequestRecord, team: &str) -> TeamTimeline {
    let mut requests = Vec::new();
    let mut delistings = Vec::new();

    for event in &pr.timeline {
        match event {
            Event::ReviewRequested { team: t, at } if names_team(t, team) => requests.push(*at),
            Event::ReviewRequestRemoved { team: t, at } if names_team(t, team) => {
                delistings.push(Delisting {
                    at: *at,
                    kind: DelistKind::RequestRemoved,
                })
            }
            Event::Review {
                state,
                on_behalf_of_teams,
                at,
            } if on_behalf_of_teams.iter().any(|t| t == team) => delistings.push(Delisting {
                at: *at,
                kind: DelistKind::Reviewed(*state),
            }),
            Event::Closed { at } => delistings.push(Delisting {
                at: *at,
                kind: DelistKind::Closed,
            }),
            Event::Merged { at } => delistings.push(Delisting {
                at: *at,
                kind: DelistKind::Merged,
            }),
            _ => {}
        }
    }

    // Stable sorts keep timeline order for equal timestamps
    requests.sort();
    delistings.sort_by_key(|d| d.at);

    TeamTimeline {
        requests,
        delistings,
    }
}
