//! Capability for anything that can hand over a repository's PRs

use std::future::Future;

use common::models::{RepoRef, RepoSnapshot};

use crate::ClientError;

/// A source of complete, already-fetched PR snapshots
pub trait PrSource {
    fn snapshot(
        &self,
        repo: &RepoRef,
    ) -> impl Future<Output = Result<RepoSnapshot, ClientError>> + Send;
}
