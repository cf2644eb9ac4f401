//! Fetch, analyze and report, one repository at a time

use std::time::Duration;

use anyhow::{Context, Result};
use common::models::{RepoRef, RepoSnapshot};
use github::{ClientError, PrSource};
use processor::{Analyzer, RepoAnalysis, ReportSink};
use tracing::{info, warn};

/// Fetch a snapshot, waiting out a single rate limit before giving up
pub async fn fetch<S: PrSource>(source: &S, repo: &RepoRef) -> Result<RepoSnapshot> {
    match source.snapshot(repo).await {
        Err(ClientError::RateLimited { retry_after }) => {
            warn!(
                "Rate limited while fetching {}. Pausing for {} seconds",
                repo, retry_after
            );
            tokio::time::sleep(Duration::from_secs(retry_after)).await;
            source
                .snapshot(repo)
                .await
                .with_context(|| format!("Failed to fetch PRs for {}", repo))
        }
        other => other.with_context(|| format!("Failed to fetch PRs for {}", repo)),
    }
}

async fn analyze_repo<S: PrSource>(
    source: &S,
    analyzer: &Analyzer,
    repo: &RepoRef,
) -> Result<RepoAnalysis> {
    let snapshot = fetch(source, repo).await?;
    info!(
        "Analyzing {} PRs of {} for team {}",
        snapshot.prs.len(),
        repo,
        analyzer.team()
    );
    Ok(analyzer.analyze(&snapshot))
}

/// `repo` command: write the weekly maps of one repository
pub async fn run_repo<S, K>(
    source: &S,
    sink: &mut K,
    analyzer: &Analyzer,
    repo: &RepoRef,
) -> Result<()>
where
    S: PrSource,
    K: ReportSink,
    K::Error: std::error::Error + Send + Sync + 'static,
{
    let analysis = analyze_repo(source, analyzer, repo).await?;
    sink.repo_report(repo, analyzer.team(), &analysis)
        .with_context(|| format!("Failed to write report for {}", repo))?;
    Ok(())
}

/// `aggregate` command: report every repository, then the team summary
pub async fn run_aggregate<S, K>(
    source: &S,
    sink: &mut K,
    analyzer: &Analyzer,
    repos: &[RepoRef],
) -> Result<()>
where
    S: PrSource,
    K: ReportSink,
    K::Error: std::error::Error + Send + Sync + 'static,
{
    let mut analyses = Vec::with_capacity(repos.len());
    for repo in repos {
        let analysis = analyze_repo(source, analyzer, repo).await?;
        sink.repo_report(repo, analyzer.team(), &analysis)
            .with_context(|| format!("Failed to write report for {}", repo))?;
        analyses.push(analysis);
    }

    let summary = processor::aggregate(&analyses, analyzer.now());
    sink.team_summary(analyzer.team(), &summary)
        .with_context(|| format!("Failed to write summary for {}", analyzer.team()))?;

    info!(
        "Summarized {} repos for {} (week of {})",
        repos.len(),
        analyzer.team(),
        summary.this_week
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{DateTime, Utc};
    use processor::TeamSummary;

    struct FlakySource {
        calls: AtomicUsize,
        limited_calls: usize,
    }

    impl PrSource for FlakySource {
        async fn snapshot(&self, _repo: &RepoRef) -> Result<RepoSnapshot, ClientError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.limited_calls {
                return Err(ClientError::RateLimited { retry_after: 0 });
            }
            Ok(RepoSnapshot {
                prs: Vec::new(),
                has_community: true,
            })
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        repos: Vec<String>,
        summaries: Vec<(String, TeamSummary)>,
    }

    impl ReportSink for RecordingSink {
        type Error = common::Error;

        fn repo_report(
            &mut self,
            repo: &RepoRef,
            team: &str,
            _analysis: &RepoAnalysis,
        ) -> common::Result<()> {
            self.repos.push(format!("{}@{}", repo, team));
            Ok(())
        }

        fn team_summary(&mut self, team: &str, summary: &TeamSummary) -> common::Result<()> {
            self.summaries.push((team.to_string(), summary.clone()));
            Ok(())
        }
    }

    fn now() -> DateTime<Utc> {
        "2020-09-09T12:00:00Z".parse().unwrap()
    }

    #[tokio::test]
    async fn test_rate_limit_is_retried_once() {
        let source = FlakySource {
            calls: AtomicUsize::new(0),
            limited_calls: 1,
        };
        let repo = RepoRef::new("matrix-org", "matrix-js-sdk");

        assert!(fetch(&source, &repo).await.is_ok());
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_second_rate_limit_fails() {
        let source = FlakySource {
            calls: AtomicUsize::new(0),
            limited_calls: 2,
        };
        let repo = RepoRef::new("matrix-org", "matrix-js-sdk");

        let err = fetch(&source, &repo).await.unwrap_err();
        assert!(err.to_string().contains("matrix-org/matrix-js-sdk"));
    }

    #[tokio::test]
    async fn test_aggregate_reports_each_repo_then_summary() {
        let source = FlakySource {
            calls: AtomicUsize::new(0),
            limited_calls: 0,
        };
        let mut sink = RecordingSink::default();
        let analyzer = Analyzer::new("element-web", now());
        let repos = vec![
            RepoRef::new("matrix-org", "matrix-js-sdk"),
            RepoRef::new("vector-im", "element-web"),
        ];

        run_aggregate(&source, &mut sink, &analyzer, &repos)
            .await
            .unwrap();

        assert_eq!(
            sink.repos,
            vec![
                "matrix-org/matrix-js-sdk@element-web".to_string(),
                "vector-im/element-web@element-web".to_string(),
            ]
        );
        assert_eq!(sink.summaries.len(), 1);
        let (team, summary) = &sink.summaries[0];
        assert_eq!(team, "element-web");
        assert_eq!(summary.this_week.to_string(), "2020-09-06");
        assert_eq!(summary.stats_this_week.core.queue_volume, 0);
    }
}
