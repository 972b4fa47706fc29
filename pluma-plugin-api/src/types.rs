//! Plugin manifest and hook metadata

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Version assumed when a manifest does not declare one
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Entry point assumed when a manifest does not declare one
pub const DEFAULT_MAIN: &str = "index";

/// Contents of a plugin manifest file.
///
/// Every field is optional in the file; missing fields take the defaults
/// below and unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginManifest {
    /// Human-readable title
    pub title: String,
    /// Human-readable description
    pub description: String,
    /// Plugin author
    pub author: String,
    /// Declared plugin version (semver)
    pub version: String,
    /// Name of the code unit that constructs the plugin
    pub main: String,
    /// Other plugins this one expects, name to version range
    pub dependencies: BTreeMap<String, String>,
    /// Ordering key within a plugin type, lower runs first
    pub weight: i64,
}

impl Default for PluginManifest {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            author: String::new(),
            version: DEFAULT_VERSION.to_string(),
            main: DEFAULT_MAIN.to_string(),
            dependencies: BTreeMap::new(),
            weight: 0,
        }
    }
}

/// One of the lifecycle hooks of [`crate::Plugin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleHook {
    Enable,
    Disable,
    Update,
    Message,
}

impl LifecycleHook {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleHook::Enable => "enable",
            LifecycleHook::Disable => "disable",
            LifecycleHook::Update => "update",
            LifecycleHook::Message => "message",
        }
    }
}

impl fmt::Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
