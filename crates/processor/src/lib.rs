//! Review queue and lag metrics computed from PR timelines

pub mod aggregate;
pub mod analyze;
pub mod lags;
pub mod least_reviewed;
pub mod queue;
pub mod sink;
pub mod timeline;

pub use aggregate::{aggregate, GroupStats, TeamSummary, WindowStats};
pub use analyze::{Analyzer, Group, RepoAnalysis};
pub use sink::ReportSink;

#[cfg(test)]
mod tests;
