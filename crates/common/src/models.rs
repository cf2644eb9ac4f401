//! Domain models
//!
//! These are the immutable inputs of an analysis run, as handed over by the
//! retrieval layer (or read back from a cached snapshot).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A tracked GitHub repository, written `owner/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepoRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::new(owner, name))
            }
            _ => Err(Error::Parse(format!(
                "expected repository as owner/name, got {:?}",
                s
            ))),
        }
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrState {
    Open,
    Closed,
    Merged,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

/// How the PR author relates to the repository, as GitHub reports it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthorAssociation {
    Owner,
    Member,
    Collaborator,
    Contributor,
    FirstTimer,
    FirstTimeContributor,
    Mannequin,
    None,
}

impl AuthorAssociation {
    /// Only organization members count; owners and collaborators do not.
    pub fn is_member(self) -> bool {
        self == AuthorAssociation::Member
    }
}

/// A timeline event on a pull request
///
/// `team` is `None` when the request targeted a user rather than a team;
/// such events never qualify for team metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum Event {
    ReviewRequested {
        team: Option<String>,
        at: DateTime<Utc>,
    },
    ReviewRequestRemoved {
        team: Option<String>,
        at: DateTime<Utc>,
    },
    Review {
        state: ReviewState,
        #[serde(default)]
        on_behalf_of_teams: Vec<String>,
        at: DateTime<Utc>,
    },
    Closed {
        at: DateTime<Utc>,
    },
    Merged {
        at: DateTime<Utc>,
    },
}


/// A pull request and its timeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestRecord {
    pub id: String,
    /// HTML URL, used to identify the PR in least-reviewed sets
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub state: PrState,
    pub author_association: AuthorAssociation,
    #[serde(default)]
    pub timeline: Vec<Event>,
}

/// All PRs of one repository, plus whether it separates community PRs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RepoSnapshot {
    pub prs: Vec<PullRequestRecord>,
    #[serde(default = "default_has_community")]
    pub has_community: bool,
}

fn default_has_community() -> bool {
    true
}
