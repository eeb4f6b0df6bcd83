//! GitHub REST API client.
//!
//! Used by the upstream enricher for three things: classifying a
//! repository's packaging ecosystem from its root listing, repository
//! statistics (stars, forks, contributors, commit frequency), and link
//! canonicalization. All requests share one rate-limit policy: on a
//! rate-limited response, sleep until the reset point (taken from the
//! `x-ratelimit-reset` header, or the `rate reset in XmYs` message text)
//! and retry once; a second failure logs and skips.

use crate::error::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::warn;

const GITHUB_API: &str = "https://api.github.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Repo-root marker files and the deps.dev system they imply. Probed in
/// this order; first hit wins.
const ECOSYSTEM_MARKERS: [(&str, &str); 6] = [
    ("package.json", "npm"),
    ("setup.py", "pypi"),
    ("Cargo.toml", "cargo"),
    ("pom.xml", "maven"),
    ("build.gradle", "gradle"),
    ("go.mod", "go"),
];

static GITHUB_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://github\.com/([^/\s]+)/([^/\s]+)").expect("github link pattern")
});

static RATE_RESET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"rate reset in (\d+)m(\d+)s").expect("rate reset pattern"));

/// Canonicalize any GitHub URL to `https://github.com/{owner}/{repo}`,
/// stripping a trailing `.git`.
pub fn canonical_link(url: &str) -> Option<String> {
    let caps = GITHUB_LINK_RE.captures(url)?;
    let owner = &caps[1];
    let repo = caps[2].trim_end_matches(".git");
    if repo.is_empty() {
        return None;
    }
    Some(format!("https://github.com/{owner}/{repo}"))
}

/// Split a canonical link into `(owner, repo)`.
pub fn split_owner_repo(link: &str) -> Option<(String, String)> {
    let caps = GITHUB_LINK_RE.captures(link)?;
    let repo = caps[2].trim_end_matches(".git");
    if repo.is_empty() {
        return None;
    }
    Some((caps[1].to_string(), repo.to_string()))
}

#[derive(Debug, Default, Clone)]
pub struct RepoStats {
    pub star_count: i64,
    pub fork_count: i64,
    pub created_since: Option<DateTime<Utc>>,
    pub updated_since: Option<DateTime<Utc>>,
    pub contributor_count: i64,
    pub commit_frequency: i64,
}

#[derive(Debug, Deserialize)]
struct RepoInfo {
    #[serde(default)]
    stargazers_count: i64,
    #[serde(default)]
    forks_count: i64,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
}

pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("critscore/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, token })
    }

    /// Determine the packaging ecosystem from the repository root listing.
    pub async fn classify_project(&self, owner: &str, repo: &str) -> Result<Option<&'static str>> {
        let entries: Option<Vec<ContentEntry>> = self
            .get_json(&format!("/repos/{owner}/{repo}/contents/"))
            .await?;
        let Some(entries) = entries else {
            return Ok(None);
        };
        for (marker, system) in ECOSYSTEM_MARKERS {
            if entries.iter().any(|e| e.name == marker) {
                return Ok(Some(system));
            }
        }
        Ok(None)
    }

    /// Repository statistics. Endpoints that fail after the rate-limit
    /// retry leave their fields at zero.
    pub async fn repo_stats(&self, owner: &str, repo: &str) -> Result<RepoStats> {
        let mut stats = RepoStats::default();

        let info: Option<RepoInfo> = self.get_json(&format!("/repos/{owner}/{repo}")).await?;
        if let Some(info) = info {
            stats.star_count = info.stargazers_count;
            stats.fork_count = info.forks_count;
            stats.created_since = info.created_at;
            stats.updated_since = info.updated_at;
        }

        let contributors: Option<Vec<serde_json::Value>> = self
            .get_json(&format!("/repos/{owner}/{repo}/contributors?per_page=100"))
            .await?;
        if let Some(contributors) = contributors {
            stats.contributor_count = contributors.len() as i64;
        }

        let until = Utc::now();
        let since = until - chrono::Duration::days(365);
        let commits: Option<Vec<serde_json::Value>> = self
            .get_json(&format!(
                "/repos/{owner}/{repo}/commits?since={}&until={}&per_page=100",
                since.format("%Y-%m-%dT%H:%M:%SZ"),
                until.format("%Y-%m-%dT%H:%M:%SZ"),
            ))
            .await?;
        if let Some(commits) = commits {
            stats.commit_frequency = commits.len() as i64 / 52;
        }

        Ok(stats)
    }

    /// GET with one sleep-and-retry on rate limiting. `Ok(None)` means the
    /// request failed in a way the caller should log-and-skip.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{GITHUB_API}{path}");
        let response = self.send(&url).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(Some(response.json().await?));
        }
        if let Some(wait) = rate_limit_wait(response).await {
            warn!(%url, wait_secs = wait.as_secs(), "GitHub rate limit hit, sleeping until reset");
            tokio::time::sleep(wait).await;
            let retry = self.send(&url).await?;
            if retry.status().is_success() {
                return Ok(Some(retry.json().await?));
            }
            warn!(%url, status = %retry.status(), "GitHub request failed after rate-limit retry");
            return Ok(None);
        }
        warn!(%url, %status, "GitHub request failed");
        Ok(None)
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request.send().await?)
    }
}

/// How long a rate-limited response asks us to wait, if it is one.
async fn rate_limit_wait(response: reqwest::Response) -> Option<Duration> {
    let status = response.status();
    if status != StatusCode::FORBIDDEN && status != StatusCode::TOO_MANY_REQUESTS {
        return None;
    }
    if let Some(reset) = response
        .headers()
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<i64>().ok())
    {
        let now = Utc::now().timestamp();
        if reset > now {
            return Some(Duration::from_secs((reset - now) as u64 + 1));
        }
    }
    let body = response.text().await.ok()?;
    parse_reset_message(&body)
}

/// Parse the `rate reset in XmYs` wording GitHub puts in error bodies.
fn parse_reset_message(body: &str) -> Option<Duration> {
    let caps = RATE_RESET_RE.captures(body)?;
    let minutes: u64 = caps[1].parse().ok()?;
    let seconds: u64 = caps[2].parse().ok()?;
    Some(Duration::from_secs(minutes * 60 + seconds))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_link_strips_git_suffix() {
        assert_eq!(
            canonical_link("https://github.com/torvalds/linux.git").as_deref(),
            Some("https://github.com/torvalds/linux")
        );
        assert_eq!(
            canonical_link("https://github.com/torvalds/linux").as_deref(),
            Some("https://github.com/torvalds/linux")
        );
    }

    #[test]
    fn canonical_link_accepts_http_and_extra_path() {
        assert_eq!(
            canonical_link("http://github.com/owner/repo/tree/main").as_deref(),
            Some("https://github.com/owner/repo")
        );
    }

    #[test]
    fn canonical_link_rejects_other_hosts() {
        assert_eq!(canonical_link("https://gitlab.com/owner/repo"), None);
        assert_eq!(canonical_link("https://example.com/"), None);
        assert_eq!(canonical_link(""), None);
    }

    #[test]
    fn split_owner_repo_works() {
        assert_eq!(
            split_owner_repo("https://github.com/rust-lang/rust"),
            Some(("rust-lang".to_string(), "rust".to_string()))
        );
    }

    #[test]
    fn reset_message_parsed() {
        let wait = parse_reset_message(
            "403 API rate limit exceeded for user; rate reset in 12m34s, please wait",
        )
        .unwrap();
        assert_eq!(wait, Duration::from_secs(12 * 60 + 34));
        assert_eq!(parse_reset_message("no hint here"), None);
    }
}
