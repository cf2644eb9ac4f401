//! Application configuration

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{Error, Result};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: Option<String>,
    /// Directory holding `tmp.<owner>.<name>.json` snapshots
    pub cache_dir: PathBuf,
    /// Root directory for generated reports
    pub output_dir: PathBuf,
    /// Upper bound on days walked for a single review request
    pub max_queue_days: u32,
    /// Pagination safety limit when fetching PRs
    pub max_pages: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            cache_dir: PathBuf::from("tmp"),
            output_dir: PathBuf::from("html"),
            max_queue_days: 3650,
            max_pages: 50,
        }
    }
}

/// Parse an optional numeric setting; unset or empty keeps the default
fn parse_var<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|_| {
            Error::Config(format!(
                "{} must be a non-negative integer, got {:?}",
                name, value
            ))
        }),
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            github_token: env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty()),
            cache_dir: env::var("CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.cache_dir),
            output_dir: env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            max_queue_days: parse_var(
                "MAX_QUEUE_DAYS",
                env::var("MAX_QUEUE_DAYS").ok(),
                defaults.max_queue_days,
            )?,
            max_pages: parse_var("MAX_PAGES", env::var("MAX_PAGES").ok(), defaults.max_pages)?,
        })
    }
}
