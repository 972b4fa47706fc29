//! Plugin registry error types

use std::path::PathBuf;

use pluma_plugin_api::{LifecycleHook, PluginError};
use thiserror::Error;

use crate::error::EventError;

/// Errors returned by [`super::Registry`] operations
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The plugin type was never indexed
    #[error("Undefined plugin type '{plugin_type}'")]
    UndefinedPluginType { plugin_type: String },

    /// The type is indexed but has no plugin with this name
    #[error("Undefined plugin '{name}' of type '{plugin_type}'")]
    UndefinedPlugin { plugin_type: String, name: String },

    /// The plugin exists but has no live instance
    #[error("Plugin '{name}' of type '{plugin_type}' is disabled")]
    DisabledPlugin { plugin_type: String, name: String },

    /// A lifecycle hook returned an error
    #[error("Plugin '{name}' of type '{plugin_type}' failed to {hook}: {source}")]
    Hook {
        plugin_type: String,
        name: String,
        hook: LifecycleHook,
        #[source]
        source: PluginError,
    },

    /// A listener vetoed an event
    #[error(transparent)]
    Vetoed(#[from] EventError),

    /// Constructing a plugin instance failed
    #[error("Failed to load plugin: {0}")]
    Load(#[from] LoadError),

    /// Discovering or parsing manifests failed
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),

    /// A version string could not be parsed as semver
    #[error("Invalid version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },
}

impl RegistryError {
    pub(crate) fn undefined_type(plugin_type: &str) -> Self {
        Self::UndefinedPluginType {
            plugin_type: plugin_type.to_string(),
        }
    }

    pub(crate) fn undefined_plugin(plugin_type: &str, name: &str) -> Self {
        Self::UndefinedPlugin {
            plugin_type: plugin_type.to_string(),
            name: name.to_string(),
        }
    }

    pub(crate) fn disabled_plugin(plugin_type: &str, name: &str) -> Self {
        Self::DisabledPlugin {
            plugin_type: plugin_type.to_string(),
            name: name.to_string(),
        }
    }
}

/// Errors raised while constructing a plugin instance
#[derive(Error, Debug)]
pub enum LoadError {
    /// No library for the entry point in the plugin directory
    #[error("Plugin library '{main}' not found in {dir}")]
    LibraryNotFound { dir: PathBuf, main: String },

    /// Failed to open the dynamic library or resolve a symbol
    #[error("Failed to load plugin library: {0}")]
    Library(#[from] libloading::Error),

    /// API version mismatch between pluma and the plugin
    #[error("API version mismatch: pluma expects {expected}, plugin has {found}")]
    ApiVersionMismatch { expected: u32, found: u32 },

    /// No constructor registered for the plugin
    #[error("No factory for plugin '{name}' of type '{plugin_type}'")]
    NoFactory { plugin_type: String, name: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while discovering or parsing manifests
#[derive(Error, Debug)]
pub enum ManifestError {
    /// A search path could not be turned into a pattern
    #[error("Invalid search pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A matched path could not be read while walking
    #[error("Failed to scan for manifests: {0}")]
    Glob(#[from] glob::GlobError),

    /// Reading the manifest failed
    #[error("Failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest content is malformed
    #[error("Failed to parse manifest {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// The background scan task did not complete
    #[error("Manifest scan task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Errors raised while persisting [`super::RegistryState`]
#[derive(Error, Debug)]
pub enum StateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse registry state: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize registry state: {0}")]
    Serialize(#[from] toml::ser::Error),
}
