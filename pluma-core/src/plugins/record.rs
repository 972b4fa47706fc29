//! Catalog entries

use std::path::{Path, PathBuf};

use pluma_plugin_api::PluginManifest;
use serde::{Deserialize, Serialize};

use super::lifecycle::PluginLifecycle;

/// A category of plugins with its own search paths
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginType {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

impl PluginType {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: description.into(),
            paths,
        }
    }
}

/// One discovered plugin: its manifest plus the live instance, if enabled
#[derive(Debug)]
pub struct PluginRecord {
    plugin_type: String,
    name: String,
    manifest: PluginManifest,
    path: PathBuf,
    pub(crate) instance: Option<PluginLifecycle>,
}

impl PluginRecord {
    pub fn new(
        plugin_type: impl Into<String>,
        name: impl Into<String>,
        manifest: PluginManifest,
        path: PathBuf,
    ) -> Self {
        Self {
            plugin_type: plugin_type.into(),
            name: name.into(),
            manifest,
            path,
            instance: None,
        }
    }

    pub fn plugin_type(&self) -> &str {
        &self.plugin_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manifest(&self) -> &PluginManifest {
        &self.manifest
    }

    /// Directory containing the manifest
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn weight(&self) -> i64 {
        self.manifest.weight
    }

    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    pub fn is_enabled(&self) -> bool {
        self.instance.is_some()
    }

    pub fn instance(&self) -> Option<&PluginLifecycle> {
        self.instance.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_disabled() {
        let record = PluginRecord::new(
            "group1",
            "example1",
            PluginManifest::default(),
            PathBuf::from("/plugins/group1/example1"),
        );
        assert!(!record.is_enabled());
        assert!(record.instance().is_none());
        assert_eq!(record.version(), "0.0.0");
        assert_eq!(record.path(), Path::new("/plugins/group1/example1"));
    }

    #[test]
    fn test_plugin_type_from_toml() {
        let plugin_type: PluginType = toml::from_str(
            r#"
name = "module"
paths = ["/opt/modules"]
"#,
        )
        .unwrap();
        assert_eq!(plugin_type.name, "module");
        assert!(plugin_type.title.is_empty());
        assert_eq!(plugin_type.paths, vec![PathBuf::from("/opt/modules")]);
    }
}
