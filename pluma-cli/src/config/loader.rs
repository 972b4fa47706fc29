use super::types::{
    PlumaConfig, RawPlumaConfig, RawRegistrySection, RegistrySection, default_plugin_type,
};
use anyhow::Result;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<PlumaConfig> {
        let mut raw = RawPlumaConfig::default();

        // Layer 1: User config
        if let Some(user_path) = Self::user_config_path()
            && user_path.exists()
        {
            raw = Self::merge_raw(raw, Self::read_raw(&user_path)?);
        }

        // Layer 2: Project config
        let project_path = Self::project_config_path();
        if project_path.exists() {
            raw = Self::merge_raw(raw, Self::read_raw(&project_path)?);
        }

        // Convert to final config with defaults applied
        Ok(Self::finalize(raw))
    }

    fn read_raw(path: &Path) -> Result<RawPlumaConfig> {
        let contents = std::fs::read_to_string(path)?;
        let raw: RawPlumaConfig = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
        Ok(raw)
    }

    /// Get user config path (`$XDG_CONFIG_HOME/pluma/config.toml`)
    pub fn user_config_path() -> Option<PathBuf> {
        Some(pluma_paths::config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with PLUMA_PROJECT_CONFIG_DIR env var (useful for isolated e2e tests)
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("PLUMA_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".pluma/config.toml")
        }
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawPlumaConfig, overlay: RawPlumaConfig) -> RawPlumaConfig {
        RawPlumaConfig {
            registry: RawRegistrySection {
                manifest_file: overlay.registry.manifest_file.or(base.registry.manifest_file),
                disable_on_reindex: overlay
                    .registry
                    .disable_on_reindex
                    .or(base.registry.disable_on_reindex),
                state_file: overlay.registry.state_file.or(base.registry.state_file),
            },
            types: overlay.types.or(base.types),
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawPlumaConfig) -> PlumaConfig {
        let defaults = RegistrySection::default();
        PlumaConfig {
            registry: RegistrySection {
                manifest_file: raw.registry.manifest_file.unwrap_or(defaults.manifest_file),
                disable_on_reindex: raw
                    .registry
                    .disable_on_reindex
                    .unwrap_or(defaults.disable_on_reindex),
                state_file: raw.registry.state_file.unwrap_or(defaults.state_file),
            },
            types: match raw.types {
                Some(types) if !types.is_empty() => types,
                _ => vec![default_plugin_type()],
            },
        }
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<PlumaConfig> {
        if path.exists() {
            Ok(Self::finalize(Self::read_raw(path)?))
        } else {
            Ok(PlumaConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pluma_core::PluginType;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::TempDir;

    // ==================== Load Tests ====================

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.toml");

        let config = ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(config.registry.manifest_file, "plugin.toml");
        assert!(config.registry.disable_on_reindex);
        assert_eq!(config.types[0].name, "plugin");
    }

    #[test]
    fn test_load_from_valid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[registry]
manifest_file = "plugin.json"
state_file = "/var/lib/pluma/state.toml"

[[types]]
name = "theme"
title = "Themes"
paths = ["/opt/themes"]
"#
        )
        .unwrap();

        let config = ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(config.registry.manifest_file, "plugin.json");
        assert!(config.registry.disable_on_reindex);
        assert_eq!(
            config.registry.state_file,
            PathBuf::from("/var/lib/pluma/state.toml")
        );
        assert_eq!(config.types.len(), 1);
        assert_eq!(config.types[0].title, "Themes");
    }

    #[test]
    fn test_load_invalid_toml_returns_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("invalid.toml");

        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "this is not valid toml {{{{").unwrap();

        let result = ConfigLoader::load_from_path(&path);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_types_fall_back_to_default() {
        let config = ConfigLoader::finalize(RawPlumaConfig {
            types: Some(Vec::new()),
            ..Default::default()
        });
        assert_eq!(config.types[0].name, "plugin");
    }

    #[test]
    fn test_merge_raw_overlay_overrides_base() {
        let base = RawPlumaConfig {
            registry: RawRegistrySection {
                manifest_file: Some("plugin.json".to_string()),
                disable_on_reindex: Some(true),
                state_file: Some(PathBuf::from("/base/state.toml")),
            },
            types: Some(vec![PluginType::new("base", "", "", vec![])]),
        };

        let overlay = RawPlumaConfig {
            registry: RawRegistrySection {
                manifest_file: None, // Should preserve base value
                disable_on_reindex: Some(false),
                state_file: Some(PathBuf::from("/overlay/state.toml")),
            },
            types: Some(vec![PluginType::new("overlay", "", "", vec![])]),
        };

        let merged = ConfigLoader::merge_raw(base, overlay);

        assert_eq!(merged.registry.manifest_file, Some("plugin.json".to_string()));
        assert_eq!(merged.registry.disable_on_reindex, Some(false));
        assert_eq!(
            merged.registry.state_file,
            Some(PathBuf::from("/overlay/state.toml"))
        );
        let types = merged.types.unwrap();
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name, "overlay");
    }

    #[test]
    fn test_merge_raw_none_preserves_base() {
        let base = RawPlumaConfig {
            registry: RawRegistrySection {
                manifest_file: Some("manifest.toml".to_string()),
                disable_on_reindex: Some(false),
                state_file: None,
            },
            types: Some(vec![PluginType::new("base", "", "", vec![])]),
        };

        let merged = ConfigLoader::merge_raw(base, RawPlumaConfig::default());

        // Base values preserved when overlay has None
        assert_eq!(
            merged.registry.manifest_file,
            Some("manifest.toml".to_string())
        );
        assert_eq!(merged.registry.disable_on_reindex, Some(false));
        assert_eq!(merged.types.unwrap()[0].name, "base");
    }

    #[test]
    fn test_user_config_path_returns_some() {
        let path = ConfigLoader::user_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("pluma"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    #[serial]
    fn test_project_config_path() {
        let path = ConfigLoader::project_config_path();
        assert_eq!(path, PathBuf::from(".pluma/config.toml"));
    }

    #[test]
    #[serial]
    fn test_project_config_path_env_override() {
        let temp_dir = TempDir::new().unwrap();

        // SAFETY: env-mutating tests are serialized
        unsafe {
            std::env::set_var("PLUMA_PROJECT_CONFIG_DIR", temp_dir.path());
        }
        let path = ConfigLoader::project_config_path();
        unsafe {
            std::env::remove_var("PLUMA_PROJECT_CONFIG_DIR");
        }

        assert_eq!(path, temp_dir.path().join("config.toml"));
    }

    #[test]
    #[serial]
    fn test_load_project_layer_overrides_user() {
        let temp_dir = TempDir::new().unwrap();
        let xdg = temp_dir.path().join("xdg");
        let project = temp_dir.path().join("project");
        std::fs::create_dir_all(xdg.join("pluma")).unwrap();
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(
            xdg.join("pluma/config.toml"),
            "[registry]\nmanifest_file = \"user.toml\"\ndisable_on_reindex = false\n",
        )
        .unwrap();
        std::fs::write(
            project.join("config.toml"),
            "[registry]\nmanifest_file = \"project.toml\"\n",
        )
        .unwrap();

        // SAFETY: env-mutating tests are serialized
        unsafe {
            std::env::set_var("XDG_CONFIG_HOME", &xdg);
            std::env::set_var("PLUMA_PROJECT_CONFIG_DIR", &project);
        }
        let config = ConfigLoader::load();
        unsafe {
            std::env::remove_var("XDG_CONFIG_HOME");
            std::env::remove_var("PLUMA_PROJECT_CONFIG_DIR");
        }

        let config = config.unwrap();
        assert_eq!(config.registry.manifest_file, "project.toml");
        assert!(!config.registry.disable_on_reindex);
    }
}
