//! GitHub release update checker
//!
//! Checks the release feed for a newer version. Checking is as far as it
//! goes: nothing is downloaded or installed, the result is surfaced to the
//! user and the menu.

use semver::Version;
use serde_json::Value;
use thiserror::Error;

use crate::meta::AppMetadata;

/// Errors that can occur during an update check
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to parse version: {0}")]
    Version(String),

    #[error("Failed to parse JSON: {0}")]
    Json(String),

    #[error("GitHub API rate limit exceeded")]
    RateLimited,

    #[error("Release not found")]
    NotFound,
}

/// Information about an available update
#[derive(Debug, Clone)]
pub struct UpdateInfo {
    /// Version string (e.g., "1.2.3")
    pub version: String,
    /// Parsed semantic version
    pub semver: Version,
    /// Release notes / changelog
    pub release_notes: String,
    /// Release name/title
    pub name: String,
    /// Web page of the release
    pub page_url: Option<String>,
    /// Whether this is a prerelease
    pub prerelease: bool,
}

/// Update checker for GitHub releases
#[derive(Clone)]
pub struct UpdateChecker {
    /// GitHub repository in "owner/repo" format
    repo: String,
    /// Current version of the application
    current_version: Version,
    /// HTTP client
    client: reqwest::Client,
}

impl UpdateChecker {
    /// Create a new update checker
    ///
    /// # Arguments
    /// * `repo` - GitHub repository in "owner/repo" format
    /// * `metadata` - Running application identity
    pub fn new(repo: &str, metadata: &AppMetadata) -> Result<Self, UpdateError> {
        let client = reqwest::Client::builder()
            .user_agent(metadata.user_agent())
            .build()?;

        Ok(Self {
            repo: repo.to_string(),
            current_version: metadata.version.clone(),
            client,
        })
    }

    /// Check for available updates
    ///
    /// Returns `Some(UpdateInfo)` if a newer version is available,
    /// `None` if already on the latest version.
    pub async fn check_for_update(&self) -> Result<Option<UpdateInfo>, UpdateError> {
        let url = format!("https://api.github.com/repos/{}/releases/latest", self.repo);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(UpdateError::NotFound);
        }

        if response.status() == reqwest::StatusCode::FORBIDDEN {
            // Check if it's rate limiting
            if response
                .headers()
                .get("X-RateLimit-Remaining")
                .and_then(|v| v.to_str().ok())
                .map(|v| v == "0")
                .unwrap_or(false)
            {
                return Err(UpdateError::RateLimited);
            }
        }

        let release: Value = response
            .json()
            .await
            .map_err(|e| UpdateError::Json(e.to_string()))?;

        self.parse_release(&release)
    }

    /// Parse a GitHub release response
    fn parse_release(&self, release: &Value) -> Result<Option<UpdateInfo>, UpdateError> {
        let tag_name = release["tag_name"]
            .as_str()
            .ok_or_else(|| UpdateError::Json("Missing tag_name".to_string()))?;

        // Strip 'v' prefix if present
        let version_str = tag_name.strip_prefix('v').unwrap_or(tag_name);

        let version =
            Version::parse(version_str).map_err(|e| UpdateError::Version(e.to_string()))?;

        // Check if this is newer than current
        if version <= self.current_version {
            return Ok(None);
        }

        let release_notes = release["body"].as_str().unwrap_or("").to_string();

        let name = release["name"].as_str().unwrap_or(tag_name).to_string();

        let page_url = release["html_url"].as_str().map(|s| s.to_string());

        let prerelease = release["prerelease"].as_bool().unwrap_or(false);

        Ok(Some(UpdateInfo {
            version: version_str.to_string(),
            semver: version,
            release_notes,
            name,
            page_url,
            prerelease,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn checker_at(version: &str) -> UpdateChecker {
        let metadata = AppMetadata::parse("kestrel", version).unwrap();
        UpdateChecker::new("kestrel-shell/kestrel", &metadata).unwrap()
    }

    #[test]
    fn test_parse_release_newer_version() {
        let checker = checker_at("0.1.0");
        let release = json!({
            "tag_name": "v0.2.0",
            "name": "kestrel 0.2.0",
            "body": "Bug fixes",
            "html_url": "https://github.com/kestrel-shell/kestrel/releases/tag/v0.2.0",
            "prerelease": false,
        });

        let info = checker.parse_release(&release).unwrap().unwrap();
        assert_eq!(info.version, "0.2.0");
        assert_eq!(info.semver, Version::new(0, 2, 0));
        assert_eq!(info.name, "kestrel 0.2.0");
        assert!(!info.prerelease);
    }

    #[test]
    fn test_parse_release_same_version_is_none() {
        let checker = checker_at("0.2.0");
        let release = json!({ "tag_name": "v0.2.0" });

        assert!(checker.parse_release(&release).unwrap().is_none());
    }

    #[test]
    fn test_parse_release_older_version_is_none() {
        let checker = checker_at("1.0.0");
        let release = json!({ "tag_name": "0.9.9" });

        assert!(checker.parse_release(&release).unwrap().is_none());
    }

    #[test]
    fn test_parse_release_without_v_prefix() {
        let checker = checker_at("0.1.0");
        let release = json!({ "tag_name": "2.0.0" });

        let info = checker.parse_release(&release).unwrap().unwrap();
        assert_eq!(info.version, "2.0.0");
        // Name falls back to the tag when the release has no title
        assert_eq!(info.name, "2.0.0");
    }

    #[test]
    fn test_parse_release_missing_tag_is_error() {
        let checker = checker_at("0.1.0");
        let release = json!({ "name": "mystery release" });

        assert!(matches!(
            checker.parse_release(&release),
            Err(UpdateError::Json(_))
        ));
    }

    #[test]
    fn test_parse_release_bad_version_is_error() {
        let checker = checker_at("0.1.0");
        let release = json!({ "tag_name": "not-semver" });

        assert!(matches!(
            checker.parse_release(&release),
            Err(UpdateError::Version(_))
        ));
    }
}
