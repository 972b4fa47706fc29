//! Registry configuration

use serde::{Deserialize, Serialize};

/// Manifest file name looked for under every search path
pub const DEFAULT_MANIFEST_FILE: &str = "plugin.toml";

/// Tunables for a [`super::Registry`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// File name of plugin manifests
    pub manifest_file: String,
    /// Run the disable hook of live instances before re-indexing their type
    pub disable_on_reindex: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            manifest_file: DEFAULT_MANIFEST_FILE.to_string(),
            disable_on_reindex: true,
        }
    }
}
