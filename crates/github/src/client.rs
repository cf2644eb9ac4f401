//! GitHub GraphQL API client for fetching PRs with their review timelines

use common::models::{PullRequestRecord, RepoRef, RepoSnapshot};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::query::{
    GraphQlRequest, GraphQlResponse, RepoPrsData, RepoPrsVariables, PAGE_SIZE, REPO_PRS_QUERY,
};
use crate::source::PrSource;

const GRAPHQL_URL: &str = "https://api.github.com/graphql";

/// Wait used when GitHub does not say how long to back off
const DEFAULT_RETRY_AFTER: u64 = 60;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimited { retry_after: u64 },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("GraphQL error: {0}")]
    GraphQl(String),
    #[error("Malformed response: {0}")]
    Parse(String),
    #[error("Cache error: {0}")]
    Cache(String),
}

impl From<ClientError> for common::Error {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Parse(msg) => common::Error::Parse(msg),
            ClientError::Cache(msg) => common::Error::Cache(msg),
            other => common::Error::GitHub(other.to_string()),
        }
    }
}

/// GitHub API client
pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    max_pages: u32,
}

impl GitHubClient {
    pub fn new(token: Option<String>, max_pages: u32) -> Self {
        let client = reqwest::Client::new();
        Self {
            client,
            token,
            max_pages,
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("review-health/0.1"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(ref token) = self.token {
            if let Ok(val) = HeaderValue::from_str(&format!("Bearer {}", token)) {
                headers.insert(AUTHORIZATION, val);
            }
        }
        headers
    }

    async fn post<T: DeserializeOwned>(
        &self,
        request: &GraphQlRequest<'_>,
    ) -> Result<T, ClientError> {
        debug!("POST {} ({:?})", GRAPHQL_URL, request.variables);
        let resp = self
            .client
            .post(GRAPHQL_URL)
            .headers(self.headers())
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(GRAPHQL_URL.to_string()));
        }
        if status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER);
            return Err(ClientError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        let parsed: GraphQlResponse<T> =
            serde_json::from_str(&body).map_err(|e| ClientError::Parse(e.to_string()))?;
        into_data(parsed)
    }

    /// Fetch every PR of a repository, following the cursor until exhausted
    pub async fn fetch_snapshot(&self, repo: &RepoRef) -> Result<RepoSnapshot, ClientError> {
        if self.token.is_none() {
            warn!("No GitHub token configured; the GraphQL API will reject the request");
        }

        let mut prs: Vec<PullRequestRecord> = Vec::new();
        let mut has_community = true;
        let mut after: Option<String> = None;
        let mut page = 1u32;

        loop {
            info!(
                "Fetching PRs page {} for {} (starting at {:?})",
                page, repo, after
            );
            let request = GraphQlRequest {
                query: REPO_PRS_QUERY,
                variables: RepoPrsVariables {
                    owner: &repo.owner,
                    name: &repo.name,
                    after: after.as_deref(),
                },
            };
            let data: RepoPrsData = self.post(&request).await?;
            let repository = data
                .repository
                .ok_or_else(|| ClientError::NotFound(repo.to_string()))?;

            // Private repositories have no outside contributors to separate
            if repository.is_private {
                has_community = false;
            }

            let connection = repository.pull_requests;
            let fetched = connection.nodes.len();
            prs.extend(connection.nodes.into_iter().map(PullRequestRecord::from));

            let next = connection
                .page_info
                .filter(|p| p.has_next_page)
                .and_then(|p| p.end_cursor);
            match next {
                Some(cursor) if fetched > 0 => after = Some(cursor),
                _ => break,
            }

            page += 1;
            if page > self.max_pages {
                warn!(
                    "Hit pagination limit of {} pages ({} PRs) for {}",
                    self.max_pages,
                    self.max_pages * PAGE_SIZE,
                    repo
                );
                break;
            }
        }

        info!("Fetched {} PRs total for {}", prs.len(), repo);
        Ok(RepoSnapshot { prs, has_community })
    }
}

/// GraphQL reports rate limiting in the body of a 200 response
fn into_data<T>(parsed: GraphQlResponse<T>) -> Result<T, ClientError> {
    if parsed
        .errors
        .iter()
        .any(|e| e.kind.as_deref() == Some("RATE_LIMITED"))
    {
        return Err(ClientError::RateLimited {
            retry_after: DEFAULT_RETRY_AFTER,
        });
    }
    if !parsed.errors.is_empty() {
        let messages: Vec<_> = parsed.errors.into_iter().map(|e| e.message).collect();
        return Err(ClientError::GraphQl(messages.join("; ")));
    }
    parsed
        .data
        .ok_or_else(|| ClientError::GraphQl("response carried no data".to_string()))
}

impl PrSource for GitHubClient {
    async fn snapshot(&self, repo: &RepoRef) -> Result<RepoSnapshot, ClientError> {
        self.fetch_snapshot(repo).await
    }
}
