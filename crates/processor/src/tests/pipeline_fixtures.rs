//! Tests running cached-snapshot JSON through the whole pipeline
//!
//! The fixture mirrors the shape written by the snapshot cache: three PRs
//! against the `element-web` team in a repository that tracks community
//! contributions.

use chrono::{DateTime, Utc};
use common::models::RepoSnapshot;
use serde_json::json;

use crate::aggregate::aggregate;
use crate::analyze::Analyzer;

const SNAPSHOT: &str = r#"{
    "hasCommunity": true,
    "prs": [
        {
            "id": "PR_1",
            "url": "https://github.com/matrix-org/matrix-react-sdk/pull/4001",
            "createdAt": "2020-01-01T09:00:00Z",
            "closedAt": "2020-01-07T09:00:00Z",
            "state": "MERGED",
            "authorAssociation": "MEMBER",
            "timeline": [
                { "type": "ReviewRequested", "team": "element-web", "at": "2020-01-02T09:00:00Z" },
                { "type": "Review", "state": "COMMENTED", "onBehalfOfTeams": ["element-web"], "at": "2020-01-05T09:00:00Z" },
                { "type": "Review", "state": "APPROVED", "onBehalfOfTeams": ["element-web"], "at": "2020-01-06T09:00:00Z" },
                { "type": "Merged", "at": "2020-01-07T09:00:00Z" },
                { "type": "Closed", "at": "2020-01-07T09:00:00Z" }
            ]
        },
        {
            "id": "PR_2",
            "url": "https://github.com/matrix-org/matrix-react-sdk/pull/4002",
            "createdAt": "2020-02-01T09:00:00+01:00",
            "closedAt": null,
            "state": "OPEN",
            "authorAssociation": "CONTRIBUTOR",
            "timeline": [
                { "type": "ReviewRequested", "team": "element-web", "at": "2020-02-03T10:00:00Z" },
                { "type": "ReviewRequestRemoved", "team": "element-web", "at": "2020-02-03T15:00:00Z" }
            ]
        },
        {
            "id": "PR_3",
            "url": "https://github.com/matrix-org/matrix-react-sdk/pull/4003",
            "createdAt": "2020-02-01T09:00:00Z",
            "closedAt": null,
            "state": "OPEN",
            "authorAssociation": "NONE",
            "timeline": [
                { "type": "ReviewRequested", "team": "Design", "at": "2020-02-03T10:00:00Z" }
            ]
        }
    ]
}"#;

fn now() -> DateTime<Utc> {
    "2020-02-05T12:00:00Z".parse().expect("Invalid date")
}

fn load() -> RepoSnapshot {
    serde_json::from_str(SNAPSHOT).expect("Invalid JSON")
}

#[test]
fn test_merged_member_pr_serializes_with_contract_names() {
    let analysis = Analyzer::new("element-web", now()).analyze(&load());

    let all = serde_json::to_value(&analysis.all).unwrap();
    assert_eq!(
        all["2019-12-29"],
        json!({
            "openToReviewRequest": [1],
            "reviewRequestToFirst": [3],
            "reviewRequestToApproved": [4],
            "queueSize": [[null, null, null, null, 1, 1, 1]],
        })
    );
    assert_eq!(all["2020-01-05"]["queueSize"], json!([[-1, null, null, null, null, null, null]]));

    let least = serde_json::to_value(&analysis.least_reviewed_core).unwrap();
    assert_eq!(
        least,
        json!({
            "2019-12-29": {
                "days": 3,
                "prs": ["https://github.com/matrix-org/matrix-react-sdk/pull/4001"],
            }
        })
    );
}

#[test]
fn test_same_day_removal_is_single_zero() {
    let analysis = Analyzer::new("element-web", now()).analyze(&load());

    let community = serde_json::to_value(&analysis.community).unwrap();
    assert_eq!(
        community["2020-02-02"]["queueSize"],
        json!([[null, 0, null, null, null, null, null]])
    );
    assert_eq!(community["2020-02-02"]["reviewRequestToFirst"], json!([0]));
    // Created 2020-02-01T08:00Z, requested 2020-02-03T10:00Z
    assert_eq!(community["2020-02-02"]["openToReviewRequest"], json!([2]));
}

#[test]
fn test_other_team_pr_is_ignored() {
    let analysis = Analyzer::new("element-web", now()).analyze(&load());
    let urls: Vec<_> = analysis
        .least_reviewed_core
        .values()
        .chain(analysis.least_reviewed_community.values())
        .flat_map(|e| e.prs.iter())
        .collect();
    assert!(!urls.iter().any(|u| u.ends_with("/4003")));
    assert!(analysis.incomplete.is_empty());
}

#[test]
fn test_pipeline_is_idempotent() {
    let snapshot = load();
    let analyzer = Analyzer::new("element-web", now());

    let first = analyzer.analyze(&snapshot);
    let second = analyzer.analyze(&snapshot);
    assert_eq!(first, second);
    assert_eq!(aggregate([&first], now()), aggregate([&second], now()));
}

#[test]
fn test_team_summary_serializes() {
    let analysis = Analyzer::new("element-web", now()).analyze(&load());
    let summary = serde_json::to_value(aggregate([&analysis], now())).unwrap();

    assert_eq!(summary["thisWeek"], json!("2020-02-02"));
    assert_eq!(summary["lastWeek"], json!("2020-01-26"));
    let community = &summary["statsThisWeek"]["community"];
    assert_eq!(community["queueVolume"], json!(1));
    assert_eq!(community["lagMin"], json!(0));
    assert_eq!(community["leastReviewed"]["prs"].as_array().unwrap().len(), 1);
}
