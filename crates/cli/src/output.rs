//! Report files on disk
//!
//! Layout under the output root:
//!
//! - `<owner>/<name>/<team>/byweek*.json`: the eight weekly maps of a repository
//! - `_weeklysync/<team>/summary.{json,html}`: the two-window team summary

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use common::models::RepoRef;
use processor::{GroupStats, RepoAnalysis, ReportSink, TeamSummary};
use serde::Serialize;
use tracing::{debug, info};

/// Writes reports as JSON files (and the summary as an HTML fragment)
pub struct JsonDirSink {
    root: PathBuf,
    since: Option<NaiveDate>,
}

impl JsonDirSink {
    pub fn new(root: impl Into<PathBuf>, since: Option<NaiveDate>) -> Self {
        Self {
            root: root.into(),
            since,
        }
    }
}

fn write_json<T: Serialize>(dir: &Path, file: &str, value: &T) -> common::Result<()> {
    let path = dir.join(file);
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json)?;
    debug!("Wrote {}", path.display());
    Ok(())
}

impl ReportSink for JsonDirSink {
    type Error = common::Error;

    fn repo_report(
        &mut self,
        repo: &RepoRef,
        team: &str,
        analysis: &RepoAnalysis,
    ) -> common::Result<()> {
        let dir = self.root.join(&repo.owner).join(&repo.name).join(team);
        fs::create_dir_all(&dir)?;

        let limited;
        let analysis = match self.since {
            Some(after) => {
                limited = analysis.since(after);
                &limited
            }
            None => analysis,
        };

        write_json(&dir, "byweek.json", &analysis.all)?;
        write_json(&dir, "byweek.core.json", &analysis.core)?;
        write_json(&dir, "byweek.community.json", &analysis.community)?;
        write_json(&dir, "byweek.incomplete.json", &analysis.incomplete)?;
        write_json(&dir, "byweek.incomplete.core.json", &analysis.core_incomplete)?;
        write_json(
            &dir,
            "byweek.incomplete.community.json",
            &analysis.community_incomplete,
        )?;
        write_json(&dir, "byweek.core.leastreview.json", &analysis.least_reviewed_core)?;
        write_json(
            &dir,
            "byweek.community.leastreview.json",
            &analysis.least_reviewed_community,
        )?;

        info!("Wrote weekly maps for {} @ {} to {}", repo, team, dir.display());
        Ok(())
    }

    fn team_summary(&mut self, team: &str, summary: &TeamSummary) -> common::Result<()> {
        let dir = self.root.join("_weeklysync").join(team);
        fs::create_dir_all(&dir)?;

        write_json(&dir, "summary.json", summary)?;
        fs::write(dir.join("summary.html"), render_summary(summary))?;

        info!("Wrote weekly summary for {} to {}", team, dir.display());
        Ok(())
    }
}

/// `https://github.com/org/repo/pull/12` becomes `repo#12`
pub fn pr_shorthand(url: &str) -> String {
    let path = url.strip_prefix("https://github.com/").unwrap_or(url);
    let without_org = path.split_once('/').map_or(path, |(_, rest)| rest);
    without_org.replacen("/pull/", "#", 1)
}

fn render_section(stats: &GroupStats) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "<li>Queue size: Started at {}, ended at {}. Max {}. Volume {}.</li>",
        stats.queue_start, stats.queue_end, stats.queue_max, stats.queue_volume
    );
    match stats.lag_range() {
        Some((min, max)) => {
            let _ = write!(out, "<li>Review lag: {} - {} calendar days</li>", min, max);
        }
        None => out.push_str("<li>Review lag: No PRs to review.</li>"),
    }

    let least = &stats.least_reviewed;
    if least.has_data() {
        let items: String = least
            .prs
            .iter()
            .map(|pr| format!("<li><a href=\"{}\">{}</a></li>", pr, pr_shorthand(pr)))
            .collect();
        let _ = write!(
            out,
            "<li>Least reviewed PRs: {}-way tie at {} calendar days.<ul>{}</ul></li>",
            least.prs.len(),
            least.days,
            items
        );
    } else {
        out.push_str("<li>Least reviewed PRs: none.</li>");
    }
    out
}

/// HTML fragment listing last and this week for core and community PRs
pub fn render_summary(summary: &TeamSummary) -> String {
    format!(
        "<ul><li>Core team PRs:<ul><li>Last week (finalized):<ul>{}</ul></li>\
         <li>This week (so far):<ul>{}</ul></li></ul></li>\
         <li>Community PRs:<ul><li>Last week (finalized):<ul>{}</ul></li>\
         <li>This week (so far):<ul>{}</ul></li></ul></li></ul>",
        render_section(&summary.stats_last_week.core),
        render_section(&summary.stats_this_week.core),
        render_section(&summary.stats_last_week.community),
        render_section(&summary.stats_this_week.community),
    )
}
