//! Capability for anything that accepts finished reports

use common::models::RepoRef;

use crate::aggregate::TeamSummary;
use crate::analyze::RepoAnalysis;

/// Receives analysis results; rendering and storage live behind it
pub trait ReportSink {
    type Error;

    fn repo_report(
        &mut self,
        repo: &RepoRef,
        team: &str,
        analysis: &RepoAnalysis,
    ) -> Result<(), Self::Error>;

    fn team_summary(&mut self, team: &str, summary: &TeamSummary) -> Result<(), Self::Error>;
}
