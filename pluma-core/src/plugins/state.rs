//! Persisted registry state - which plugins a host keeps enabled

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use super::error::StateError;

/// Enabled plugins and applied versions, keyed by `type/name`
///
/// Stored as TOML, by default in `~/.local/share/pluma/state.toml`.
/// The registry itself is stateless; hosts use this to restore enabled
/// plugins on start and to remember the baseline for `update`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegistryState {
    /// Set of enabled `type/name` keys
    #[serde(default)]
    pub enabled: BTreeSet<String>,
    /// Last version applied per `type/name`
    #[serde(default)]
    pub versions: BTreeMap<String, String>,
}

fn key(plugin_type: &str, name: &str) -> String {
    format!("{plugin_type}/{name}")
}

impl RegistryState {
    /// Load state from a TOML file
    ///
    /// Returns an empty state if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let state: Self = toml::from_str(&content)?;
        Ok(state)
    }

    /// Save state to a TOML file
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let content = toml::to_string_pretty(self)?;

        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent().filter(|p| !p.exists()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn is_enabled(&self, plugin_type: &str, name: &str) -> bool {
        self.enabled.contains(&key(plugin_type, name))
    }

    pub fn enable(&mut self, plugin_type: &str, name: &str) {
        self.enabled.insert(key(plugin_type, name));
    }

    pub fn disable(&mut self, plugin_type: &str, name: &str) {
        self.enabled.remove(&key(plugin_type, name));
    }

    /// Names of the enabled plugins of one type
    pub fn enabled_in<'a>(&'a self, plugin_type: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.enabled.iter().filter_map(move |k| {
            k.split_once('/')
                .filter(|(t, _)| *t == plugin_type)
                .map(|(_, name)| name)
        })
    }

    /// Last applied version, if any was recorded
    pub fn version(&self, plugin_type: &str, name: &str) -> Option<&str> {
        self.versions.get(&key(plugin_type, name)).map(String::as_str)
    }

    pub fn set_version(&mut self, plugin_type: &str, name: &str, version: &str) {
        self.versions
            .insert(key(plugin_type, name), version.to_string());
    }
}
