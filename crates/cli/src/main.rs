//! Review health reporter

use chrono::Utc;
use clap::Parser;
use common::models::RepoRef;
use github::{CachedSource, GitHubClient};
use processor::Analyzer;
use tracing::{info, warn};

mod cli;
mod output;
mod run;

use cli::{Cli, Command};
use output::JsonDirSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cli=info".parse()?)
                .add_directive("github=info".parse()?)
                .add_directive("processor=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let mut config = common::Config::from_env()?;
    cli.apply(&mut config);

    if config.github_token.is_none() {
        warn!("GITHUB_TOKEN not set, only cached snapshots will work");
    }

    let now = Utc::now();
    info!("📊 Starting review-health (week of {})", now.date_naive());

    let client = GitHubClient::new(config.github_token.clone(), config.max_pages);
    let source = CachedSource::new(client, &config.cache_dir).refresh(cli.no_cache);
    let mut sink = JsonDirSink::new(&config.output_dir, cli.since);

    match cli.command {
        Command::Repo { owner, name, team } => {
            let analyzer = Analyzer::new(team, now).max_queue_days(config.max_queue_days);
            let repo = RepoRef::new(owner, name);
            run::run_repo(&source, &mut sink, &analyzer, &repo).await?;
        }
        Command::Aggregate { team, repos } => {
            let analyzer = Analyzer::new(team, now).max_queue_days(config.max_queue_days);
            run::run_aggregate(&source, &mut sink, &analyzer, &repos).await?;
        }
    }

    info!("Reports written to {}", config.output_dir.display());
    Ok(())
}
