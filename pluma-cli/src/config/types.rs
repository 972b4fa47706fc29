use pluma_core::{PluginType, RegistryConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Name of the type registered when the configuration declares none
pub const DEFAULT_PLUGIN_TYPE: &str = "plugin";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPlumaConfig {
    #[serde(default)]
    pub registry: RawRegistrySection,

    /// Plugin types; a later layer replaces the whole list
    pub types: Option<Vec<PluginType>>,
}

/// Registry section as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawRegistrySection {
    /// Manifest file name looked for under each search path
    pub manifest_file: Option<String>,

    /// Run disable hooks before re-indexing a type
    pub disable_on_reindex: Option<bool>,

    /// Where enabled plugins and applied versions are recorded
    pub state_file: Option<PathBuf>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlumaConfig {
    pub registry: RegistrySection,

    pub types: Vec<PluginType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrySection {
    /// Manifest file name looked for under each search path
    pub manifest_file: String,

    /// Run disable hooks before re-indexing a type
    pub disable_on_reindex: bool,

    /// Where enabled plugins and applied versions are recorded
    pub state_file: PathBuf,
}

impl Default for RegistrySection {
    fn default() -> Self {
        let registry = RegistryConfig::default();
        Self {
            manifest_file: registry.manifest_file,
            disable_on_reindex: registry.disable_on_reindex,
            state_file: pluma_paths::state_file(),
        }
    }
}

impl Default for PlumaConfig {
    fn default() -> Self {
        Self {
            registry: RegistrySection::default(),
            types: vec![default_plugin_type()],
        }
    }
}

impl PlumaConfig {
    /// Registry tunables derived from the `[registry]` section
    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            manifest_file: self.registry.manifest_file.clone(),
            disable_on_reindex: self.registry.disable_on_reindex,
        }
    }
}

/// The `plugin` type rooted at the user plugin directory
pub fn default_plugin_type() -> PluginType {
    PluginType::new(
        DEFAULT_PLUGIN_TYPE,
        "Plugins",
        "User plugins",
        vec![pluma_paths::plugin_dir()],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = PlumaConfig::default();
        assert_eq!(config.registry.manifest_file, "plugin.toml");
        assert!(config.registry.disable_on_reindex);
        assert!(config.registry.state_file.ends_with("pluma/state.toml"));
        assert_eq!(config.types.len(), 1);
        assert_eq!(config.types[0].name, DEFAULT_PLUGIN_TYPE);
        assert!(config.types[0].paths[0].ends_with("pluma/plugins"));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PlumaConfig {
            registry: RegistrySection {
                manifest_file: "plugin.json".to_string(),
                disable_on_reindex: false,
                state_file: PathBuf::from("/tmp/state.toml"),
            },
            types: vec![PluginType::new(
                "theme",
                "Themes",
                "Color themes",
                vec![PathBuf::from("/opt/themes")],
            )],
        };

        let toml_str = toml::to_string(&config).unwrap();
        let parsed: PlumaConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.registry.manifest_file, "plugin.json");
        assert!(!parsed.registry.disable_on_reindex);
        assert_eq!(parsed.types[0].name, "theme");
        assert_eq!(parsed.types[0].paths, vec![PathBuf::from("/opt/themes")]);
    }

    #[test]
    fn test_raw_config_partial_parsing() {
        let toml_str = r#"
[registry]
disable_on_reindex = false
"#;
        let raw: RawPlumaConfig = toml::from_str(toml_str).unwrap();

        // Only disable_on_reindex was set
        assert_eq!(raw.registry.disable_on_reindex, Some(false));
        assert!(raw.registry.manifest_file.is_none());
        assert!(raw.types.is_none());
    }

    #[test]
    fn test_raw_config_types_table_array() {
        let toml_str = r#"
[[types]]
name = "module"
title = "Modules"
paths = ["/opt/modules", "/usr/share/modules"]

[[types]]
name = "theme"
"#;
        let raw: RawPlumaConfig = toml::from_str(toml_str).unwrap();
        let types = raw.types.unwrap();

        assert_eq!(types.len(), 2);
        assert_eq!(types[0].paths.len(), 2);
        assert!(types[1].paths.is_empty());
    }

    #[test]
    fn test_registry_config_mirrors_section() {
        let mut config = PlumaConfig::default();
        config.registry.manifest_file = "manifest.toml".to_string();
        config.registry.disable_on_reindex = false;

        let registry = config.registry_config();
        assert_eq!(registry.manifest_file, "manifest.toml");
        assert!(!registry.disable_on_reindex);
    }
}
