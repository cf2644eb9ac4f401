//! Command line arguments

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use common::models::RepoRef;
use common::Config;

#[derive(Parser, Debug)]
#[command(
    name = "review-health",
    version,
    about = "Weekly code-review health metrics for a GitHub team"
)]
pub struct Cli {
    /// Where reports are written (overrides OUTPUT_DIR)
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Where fetched snapshots are cached (overrides CACHE_DIR)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Fetch from GitHub even when a cached snapshot exists
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Only export weeks starting after this date
    #[arg(long, global = true, value_name = "YYYY-MM-DD")]
    pub since: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write the weekly maps of one repository for a team
    Repo {
        owner: String,
        name: String,
        team: String,
    },
    /// Summarize a team's last and current week across repositories
    Aggregate {
        team: String,
        /// Repositories as owner/name
        #[arg(required = true)]
        repos: Vec<RepoRef>,
    },
}

impl Cli {
    /// Apply flag overrides on top of the environment configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
    }
}
