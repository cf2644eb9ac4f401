//! GraphQL query and response types for a repository's pull requests

use chrono::{DateTime, Utc};
use common::models::{AuthorAssociation, Event, PrState, PullRequestRecord, ReviewState};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// PRs per page; GitHub's maximum
pub const PAGE_SIZE: u32 = 100;

/// Timeline items fetched per PR; later items are not paged through
pub const TIMELINE_SIZE: u32 = 100;

pub const REPO_PRS_QUERY: &str = r#"
query($owner: String!, $name: String!, $after: String) {
    repository(owner: $owner, name: $name) {
        isPrivate
        pullRequests(first: 100, after: $after) {
            pageInfo {
                hasNextPage
                endCursor
            }
            nodes {
                id
                url
                state
                authorAssociation
                createdAt
                closedAt
                timelineItems(first: 100, itemTypes: [PULL_REQUEST_REVIEW, REVIEW_REQUESTED_EVENT, REVIEW_REQUEST_REMOVED_EVENT, CLOSED_EVENT, MERGED_EVENT]) {
                    pageInfo {
                        hasNextPage
                    }
                    nodes {
                        __typename
                        ... on PullRequestReview {
                            createdAt
                            state
                            onBehalfOf(first: 10) {
                                nodes {
                                    name
                                }
                            }
                        }
                        ... on ReviewRequestedEvent {
                            createdAt
                            requestedReviewer {
                                ... on Team {
                                    name
                                }
                            }
                        }
                        ... on ReviewRequestRemovedEvent {
                            createdAt
                            requestedReviewer {
                                ... on Team {
                                    name
                                }
                            }
                        }
                        ... on ClosedEvent {
                            createdAt
                        }
                        ... on MergedEvent {
                            createdAt
                        }
                    }
                }
            }
        }
    }
}
"#;

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<'a> {
    pub query: &'static str,
    pub variables: RepoPrsVariables<'a>,
}

#[derive(Debug, Serialize)]
pub struct RepoPrsVariables<'a> {
    pub owner: &'a str,
    pub name: &'a str,
    pub after: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    /// e.g. `RATE_LIMITED`, `NOT_FOUND`
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RepoPrsData {
    pub repository: Option<GqlRepository>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlRepository {
    pub is_private: bool,
    pub pull_requests: Connection<GqlPullRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    #[serde(default)]
    pub page_info: Option<PageInfo>,
    pub nodes: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// PR as returned by GitHub GraphQL API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GqlPullRequest {
    pub id: String,
    pub url: String,
    pub state: PrState,
    pub author_association: AuthorAssociation,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub timeline_items: Connection<TimelineItem>,
}

impl GqlPullRequest {
    /// True when GitHub holds more timeline items than were fetched
    pub fn timeline_truncated(&self) -> bool {
        self.timeline_items
            .page_info
            .as_ref()
            .is_some_and(|p| p.has_next_page)
    }
}

#[derive(Debug, Deserialize)]
pub struct NamedNode {
    #[serde(default)]
    pub name: Option<String>,
}

/// Timeline item; any `__typename` outside the requested item types is an error
#[derive(Debug, Deserialize)]
#[serde(tag = "__typename", rename_all_fields = "camelCase")]
pub enum TimelineItem {
    PullRequestReview {
        created_at: DateTime<Utc>,
        state: ReviewState,
        on_behalf_of: Connection<NamedNode>,
    },
    ReviewRequestedEvent {
        created_at: DateTime<Utc>,
        requested_reviewer: Option<NamedNode>,
    },
    ReviewRequestRemovedEvent {
        created_at: DateTime<Utc>,
        requested_reviewer: Option<NamedNode>,
    },
    ClosedEvent {
        created_at: DateTime<Utc>,
    },
    MergedEvent {
        created_at: DateTime<Utc>,
    },
}

fn team_name(reviewer: Option<NamedNode>) -> Option<String> {
    reviewer.and_then(|r| r.name)
}

impl From<TimelineItem> for Event {
    fn from(item: TimelineItem) -> Self {
        match item {
            TimelineItem::PullRequestReview {
                created_at,
                state,
                on_behalf_of,
            } => Event::Review {
                state,
                on_behalf_of_teams: on_behalf_of
                    .nodes
                    .into_iter()
                    .filter_map(|n| n.name)
                    .collect(),
                at: created_at,
            },
            TimelineItem::ReviewRequestedEvent {
                created_at,
                requested_reviewer,
            } => Event::ReviewRequested {
                team: team_name(requested_reviewer),
                at: created_at,
            },
            TimelineItem::ReviewRequestRemovedEvent {
                created_at,
                requested_reviewer,
            } => Event::ReviewRequestRemoved {
                team: team_name(requested_reviewer),
                at: created_at,
            },
            TimelineItem::ClosedEvent { created_at } => Event::Closed { at: created_at },
            TimelineItem::MergedEvent { created_at } => Event::Merged { at: created_at },
        }
    }
}

impl From<GqlPullRequest> for PullRequestRecord {
    fn from(pr: GqlPullRequest) -> Self {
        if pr.timeline_truncated() {
            warn!(
                "{} has more than {} timeline items; later reviews and requests are ignored",
                pr.url, TIMELINE_SIZE
            );
        }
        PullRequestRecord {
            id: pr.id,
            url: pr.url,
            created_at: pr.created_at,
            closed_at: pr.closed_at,
            state: pr.state,
            author_association: pr.author_association,
            timeline: pr
                .timeline_items
                .nodes
                .into_iter()
                .map(Event::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PAGE: &str = r#"{
        "data": {
            "repository": {
                "isPrivate": false,
                "pullRequests": {
                    "pageInfo": { "hasNextPage": true, "endCursor": "Y3Vyc29yOjE=" },
                    "nodes": [{
                        "id": "PR_kwDOA",
                        "url": "https://github.com/matrix-org/matrix-js-sdk/pull/1042",
                        "state": "MERGED",
                        "authorAssociation": "CONTRIBUTOR",
                        "createdAt": "2020-01-01T10:00:00Z",
                        "closedAt": "2020-01-07T12:00:00Z",
                        "timelineItems": {
                            "nodes": [
                                { "__typename": "ReviewRequestedEvent", "createdAt": "2020-01-02T09:00:00Z", "requestedReviewer": { "name": "element-web" } },
                                { "__typename": "ReviewRequestedEvent", "createdAt": "2020-01-02T09:00:00Z", "requestedReviewer": {} },
                                { "__typename": "PullRequestReview", "createdAt": "2020-01-05T09:00:00Z", "state": "APPROVED", "onBehalfOf": { "nodes": [{ "name": "element-web" }] } },
                                { "__typename": "MergedEvent", "createdAt": "2020-01-07T12:00:00Z" },
                                { "__typename": "ClosedEvent", "createdAt": "2020-01-07T12:00:00Z" }
                            ]
                        }
                    }]
                }
            }
        }
    }"#;

    #[test]
    fn test_page_converts_to_records() {
        let resp: GraphQlResponse<RepoPrsData> = serde_json::from_str(PAGE).unwrap();
        let repo = resp.data.unwrap().repository.unwrap();
        let page_info = repo.pull_requests.page_info.as_ref().unwrap();
        assert!(page_info.has_next_page);
        assert_eq!(page_info.end_cursor.as_deref(), Some("Y3Vyc29yOjE="));

        let records: Vec<PullRequestRecord> = repo
            .pull_requests
            .nodes
            .into_iter()
            .map(PullRequestRecord::from)
            .collect();
        assert_eq!(records.len(), 1);

        let pr = &records[0];
        assert_eq!(pr.state, PrState::Merged);
        assert_eq!(pr.author_association, AuthorAssociation::Contributor);
        assert_eq!(pr.timeline.len(), 5);
        assert_eq!(
            pr.timeline[0],
            Event::ReviewRequested {
                team: Some("element-web".to_string()),
                at: Utc.with_ymd_and_hms(2020, 1, 2, 9, 0, 0).unwrap(),
            }
        );
        // A user reviewer carries no team name
        assert!(matches!(
            pr.timeline[1],
            Event::ReviewRequested { team: None, .. }
        ));
        assert!(matches!(
            &pr.timeline[2],
            Event::Review { state: ReviewState::Approved, on_behalf_of_teams, .. }
                if on_behalf_of_teams == &vec!["element-web".to_string()]
        ));
    }

    #[test]
    fn test_long_timeline_is_flagged() {
        let json = r#"{
            "id": "PR_kwDOB",
            "url": "https://github.com/vector-im/element-web/pull/15020",
            "state": "OPEN",
            "authorAssociation": "MEMBER",
            "createdAt": "2020-09-01T10:00:00Z",
            "closedAt": null,
            "timelineItems": {
                "pageInfo": { "hasNextPage": true },
                "nodes": [
                    { "__typename": "ReviewRequestedEvent", "createdAt": "2020-09-02T09:00:00Z", "requestedReviewer": { "name": "element-web" } }
                ]
            }
        }"#;
        let pr: GqlPullRequest = serde_json::from_str(json).unwrap();
        assert!(pr.timeline_truncated());

        let record = PullRequestRecord::from(pr);
        assert_eq!(record.timeline.len(), 1);
    }

    #[test]
    fn test_short_timeline_is_not_flagged() {
        let resp: GraphQlResponse<RepoPrsData> = serde_json::from_str(PAGE).unwrap();
        let repo = resp.data.unwrap().repository.unwrap();
        assert!(!repo.pull_requests.nodes[0].timeline_truncated());
    }

    #[test]
    fn test_unexpected_typename_fails() {
        let json = r#"{ "__typename": "LabeledEvent", "createdAt": "2020-01-02T09:00:00Z" }"#;
        assert!(serde_json::from_str::<TimelineItem>(json).is_err());
    }

    #[test]
    fn test_malformed_created_at_fails() {
        let json = r#"{ "__typename": "ClosedEvent", "createdAt": "not a date" }"#;
        assert!(serde_json::from_str::<TimelineItem>(json).is_err());
    }
}
