//! Version comparison for plugin updates

use semver::Version;

use super::error::RegistryError;

/// Decides whether moving between two plugin versions is an update
pub struct VersionGate;

impl VersionGate {
    /// Parse a version string, tolerating a leading `v` or `=`
    pub fn parse(version: &str) -> Result<Version, RegistryError> {
        let trimmed = version.trim();
        let trimmed = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('='))
            .unwrap_or(trimmed);
        Version::parse(trimmed).map_err(|source| RegistryError::InvalidVersion {
            version: version.to_string(),
            source,
        })
    }

    /// True when `to` is strictly newer than `from`
    pub fn is_applicable(from: &str, to: &str) -> Result<bool, RegistryError> {
        Ok(Self::parse(to)? > Self::parse(from)?)
    }
}
