//! Package metadata
//!
//! Identity the rest of the application hangs off: name and parsed
//! version. The version string is compiled in; failing to parse it is the
//! one error this codebase treats as fatal.

use semver::Version;
use thiserror::Error;

/// Package metadata errors
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Invalid package version {0:?}: {1}")]
    Version(String, #[source] semver::Error),
}

/// Application identity, parsed once at startup
#[derive(Debug, Clone)]
pub struct AppMetadata {
    /// Application name
    pub name: String,
    /// Running version
    pub version: Version,
}

impl AppMetadata {
    /// Parse metadata from the compiled-in name and version strings
    pub fn parse(name: &str, version: &str) -> Result<Self, MetadataError> {
        let version = Version::parse(version)
            .map_err(|e| MetadataError::Version(version.to_string(), e))?;

        Ok(Self {
            name: name.to_string(),
            version,
        })
    }

    /// User agent string for outbound HTTP requests
    pub fn user_agent(&self) -> String {
        format!("{}/{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_version() {
        let meta = AppMetadata::parse("kestrel", "0.1.4").unwrap();
        assert_eq!(meta.name, "kestrel");
        assert_eq!(meta.version, Version::new(0, 1, 4));
    }

    #[test]
    fn test_parse_invalid_version_fails() {
        let err = AppMetadata::parse("kestrel", "not-a-version").unwrap_err();
        assert!(err.to_string().contains("not-a-version"));
    }

    #[test]
    fn test_user_agent() {
        let meta = AppMetadata::parse("kestrel", "1.2.3").unwrap();
        assert_eq!(meta.user_agent(), "kestrel/1.2.3");
    }
}
