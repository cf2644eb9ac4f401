//! Local JSON cache of fetched repository snapshots
//!
//! A snapshot is stored as `<dir>/tmp.<owner>.<name>.json` holding
//! `{"prs": [...], "hasCommunity": bool}`. When the file exists it is used
//! as-is; delete it (or pass `refresh`) to fetch again.

use std::path::{Path, PathBuf};

use common::models::{RepoRef, RepoSnapshot};
use tracing::{debug, info};

use crate::client::ClientError;
use crate::source::PrSource;

/// Wraps another source, reading from and writing to the cache directory
pub struct CachedSource<S> {
    inner: S,
    dir: PathBuf,
    refresh: bool,
}

impl<S> CachedSource<S> {
    pub fn new(inner: S, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into(),
            refresh: false,
        }
    }

    /// Ignore existing cache files (they are still rewritten after fetching)
    pub fn refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    pub fn path_for(&self, repo: &RepoRef) -> PathBuf {
        self.dir
            .join(format!("tmp.{}.{}.json", repo.owner, repo.name))
    }
}

async fn load(path: &Path) -> Result<RepoSnapshot, ClientError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ClientError::Cache(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| ClientError::Parse(format!("{}: {}", path.display(), e)))
}

async fn store(path: &Path, snapshot: &RepoSnapshot) -> Result<(), ClientError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| ClientError::Cache(format!("{}: {}", parent.display(), e)))?;
    }
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| ClientError::Cache(e.to_string()))?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| ClientError::Cache(format!("{}: {}", path.display(), e)))
}

impl<S: PrSource + Sync> PrSource for CachedSource<S> {
    async fn snapshot(&self, repo: &RepoRef) -> Result<RepoSnapshot, ClientError> {
        let path = self.path_for(repo);

        if !self.refresh && tokio::fs::try_exists(&path).await.unwrap_or(false) {
            info!("Using cached PRs for {} from {}", repo, path.display());
            return load(&path).await;
        }

        let snapshot = self.inner.snapshot(repo).await?;
        store(&path, &snapshot).await?;
        debug!("Cached {} PRs at {}", snapshot.prs.len(), path.display());
        Ok(snapshot)
    }
}
