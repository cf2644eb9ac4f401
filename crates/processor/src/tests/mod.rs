//! Shared test helpers

use chrono::{DateTime, TimeZone, Utc};
use common::models::{
    AuthorAssociation, Event, PrState, PullRequestRecord, ReviewState,
};

mod pipeline_fixtures;

pub(crate) fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
}

pub(crate) fn pr_url(number: u32) -> String {
    format!("https://github.com/matrix-org/matrix-react-sdk/pull/{}", number)
}

/// Builds PR records with a member author in the open state
pub(crate) struct PrBuilder {
    record: PullRequestRecord,
}

impl PrBuilder {
    pub(crate) fn new(number: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            record: PullRequestRecord {
                id: format!("PR_{}", number),
                url: pr_url(number),
                created_at,
                closed_at: None,
                state: PrState::Open,
                author_association: AuthorAssociation::Member,
                timeline: Vec::new(),
            },
        }
    }

    pub(crate) fn author(mut self, association: AuthorAssociation) -> Self {
        self.record.author_association = association;
        self
    }

    pub(crate) fn requested(mut self, team: &str, at: DateTime<Utc>) -> Self {
        self.record.timeline.push(Event::ReviewRequested {
            team: Some(team.to_string()),
            at,
        });
        self
    }

    pub(crate) fn removed(mut self, team: &str, at: DateTime<Utc>) -> Self {
        self.record.timeline.push(Event::ReviewRequestRemoved {
            team: Some(team.to_string()),
            at,
        });
        self
    }

    pub(crate) fn reviewed(mut self, team: &str, state: ReviewState, at: DateTime<Utc>) -> Self {
        self.record.timeline.push(Event::Review {
            state,
            on_behalf_of_teams: vec![team.to_string()],
            at,
        });
        self
    }

    pub(crate) fn closed(mut self, at: DateTime<Utc>) -> Self {
        self.record.state = PrState::Closed;
        self.record.closed_at = Some(at);
        self.record.timeline.push(Event::Closed { at });
        self
    }

    pub(crate) fn merged(mut self, at: DateTime<Utc>) -> Self {
        self.record.state = PrState::Merged;
        self.record.closed_at = Some(at);
        self.record.timeline.push(Event::Merged { at });
        self
    }

    pub(crate) fn build(self) -> PullRequestRecord {
        self.record
    }
}
