//! deps.dev v3alpha API client.
//!
//! Two endpoints are used: the package listing (to pick the newest
//! published version) and the per-version `:dependents` counter. deps.dev
//! publishes no rate limit; non-200 responses are logged and the caller
//! skips the link.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

const DEPS_DEV_API: &str = "https://api.deps.dev/v3alpha";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct VersionKey {
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageVersion {
    version_key: VersionKey,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct PackageInfo {
    #[serde(default)]
    versions: Vec<PackageVersion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependentInfo {
    #[serde(default)]
    pub dependent_count: i64,
    #[serde(default)]
    pub direct_dependent_count: i64,
    #[serde(default)]
    pub indirect_dependent_count: i64,
}

pub struct DepsDevClient {
    client: reqwest::Client,
}

impl DepsDevClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("critscore/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Newest published version of `name` in `system`, by `publishedAt`.
    pub async fn latest_version(&self, system: &str, name: &str) -> Result<Option<String>> {
        let url = format!("{DEPS_DEV_API}/systems/{system}/packages/{name}");
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            warn!(%url, status = %response.status(), "deps.dev package lookup failed");
            return Ok(None);
        }
        let info: PackageInfo = response.json().await?;
        Ok(newest_version(info))
    }

    /// Transitive dependent count for one package version.
    pub async fn dependent_count(
        &self,
        system: &str,
        name: &str,
        version: &str,
    ) -> Result<Option<i64>> {
        let url =
            format!("{DEPS_DEV_API}/systems/{system}/packages/{name}/versions/{version}:dependents");
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            warn!(%url, status = %response.status(), "deps.dev dependents lookup failed");
            return Ok(None);
        }
        let info: DependentInfo = response.json().await?;
        Ok(Some(info.dependent_count))
    }
}

fn newest_version(info: PackageInfo) -> Option<String> {
    info.versions
        .into_iter()
        .filter(|v| v.published_at.is_some())
        .max_by_key(|v| v.published_at)
        .map(|v| v.version_key.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newest_version_by_published_at() {
        let info: PackageInfo = serde_json::from_str(
            r#"{"versions": [
                {"versionKey": {"version": "1.0.0"}, "publishedAt": "2020-01-01T00:00:00Z"},
                {"versionKey": {"version": "2.0.0"}, "publishedAt": "2024-06-01T00:00:00Z"},
                {"versionKey": {"version": "1.5.0"}, "publishedAt": "2022-03-01T00:00:00Z"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(newest_version(info).as_deref(), Some("2.0.0"));
    }

    #[test]
    fn versions_without_dates_ignored() {
        let info: PackageInfo = serde_json::from_str(
            r#"{"versions": [
                {"versionKey": {"version": "9.9.9"}},
                {"versionKey": {"version": "1.0.0"}, "publishedAt": "2020-01-01T00:00:00Z"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(newest_version(info).as_deref(), Some("1.0.0"));
    }

    #[test]
    fn no_versions_no_answer() {
        assert_eq!(newest_version(PackageInfo::default()), None);
    }

    #[test]
    fn dependent_counts_deserialize() {
        let info: DependentInfo = serde_json::from_str(
            r#"{"dependentCount": 12, "directDependentCount": 3, "indirectDependentCount": 9}"#,
        )
        .unwrap();
        assert_eq!(info.dependent_count, 12);
        assert_eq!(info.direct_dependent_count, 3);
        assert_eq!(info.indirect_dependent_count, 9);
    }
}
