//! Paginated repository listing with rate-limit backoff

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::Result;

/// Default GitHub REST API base URL
const DEFAULT_API_BASE: &str = "https://api.github.com";

/// User-Agent sent with every request (the GitHub API rejects requests without one)
const USER_AGENT: &str = concat!("gha-sweep/", env!("CARGO_PKG_VERSION"));

/// A repository as returned by the listing endpoint
///
/// Only the identifying fields are deserialized; the rest of the payload is
/// ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Repo {
    /// Full name in `owner/repo` form
    pub full_name: String,
    /// Short repository name
    pub name: String,
}

/// Client for the paginated repository listing endpoint
///
/// Lists every repository of a user or organization via
/// `GET /users/{identity}/repos`, one page at a time, stopping at the first
/// empty page. Rate-limit responses (403 with an `X-RateLimit-Reset` header)
/// are handled by sleeping until the reset time and retrying the same page.
pub struct RepoLister {
    client: reqwest::Client,
    token: String,
    api_base: String,
}

impl RepoLister {
    /// Create a lister authenticated with the given token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Override the API base URL (e.g. for GitHub Enterprise)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// List all repositories of a user or organization
    ///
    /// Returns the union of all pages in listing order. On a non-success
    /// status other than a rate-limit signal the listing stops early and
    /// whatever was accumulated so far is returned - callers must tolerate
    /// an incomplete list. Transport and decoding failures are hard errors.
    pub async fn list_repositories(&self, identity: &str, page_size: u32) -> Result<Vec<Repo>> {
        let url = format!("{}/users/{}/repos", self.api_base, identity);
        let mut repos = Vec::new();
        let mut page: u32 = 1;

        loop {
            debug!(identity, page, "Fetching repository page");

            let response = self
                .client
                .get(&url)
                .query(&[("page", page), ("per_page", page_size)])
                .bearer_auth(&self.token)
                .header(reqwest::header::USER_AGENT, USER_AGENT)
                .send()
                .await?;

            let status = response.status();

            if status == StatusCode::FORBIDDEN {
                if let Some(reset) = rate_limit_reset(response.headers()) {
                    let wait = backoff_duration(reset, Utc::now().timestamp());
                    let reset_at = DateTime::<Utc>::from_timestamp(reset, 0)
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| reset.to_string());
                    warn!(
                        page,
                        wait_secs = wait.as_secs(),
                        reset_at = %reset_at,
                        "Rate limit exceeded, sleeping until reset"
                    );
                    tokio::time::sleep(wait).await;
                    continue;
                }
            }

            if !status.is_success() {
                warn!(
                    identity,
                    page,
                    status = %status,
                    "Failed to fetch repositories, returning partial results"
                );
                break;
            }

            let batch: Vec<Repo> = response.json().await?;
            if batch.is_empty() {
                break;
            }

            repos.extend(batch);
            page += 1;
        }

        info!(identity, count = repos.len(), "Repository listing complete");
        Ok(repos)
    }
}

impl std::fmt::Debug for RepoLister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoLister")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

/// Extract the rate-limit reset time (unix seconds) from response headers
///
/// Returns `None` if the header is absent or unparseable, in which case the
/// response is treated like any other non-success status.
fn rate_limit_reset(headers: &HeaderMap) -> Option<i64> {
    headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
}

/// Compute how long to sleep before retrying a rate-limited page
///
/// The wait is `reset - now + 1` seconds, clamped at zero for reset times
/// already in the past. It is recomputed from the current response each
/// time, never accumulated across retries.
fn backoff_duration(reset: i64, now: i64) -> Duration {
    Duration::from_secs((reset - now + 1).max(0) as u64)
}
