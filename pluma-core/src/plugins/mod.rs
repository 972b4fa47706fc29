//! Plugin registry for pluma
//!
//! This module provides discovery and lifecycle management for plugins:
//!
//! - [`Registry`]: registered types, the catalog, and the bulk operations
//!   `index`, `enable`, `disable`, `update` and `message`
//! - [`PluginLifecycle`]: wraps a plugin instance and publishes an event
//!   after each successful hook
//! - [`PluginLoader`]: constructs fresh instances, natively ([`DylibLoader`])
//!   or in-process ([`FactoryLoader`])
//! - [`ManifestSource`]: finds and parses manifests ([`GlobManifestSource`])
//! - [`RegistryState`]: persisted set of enabled plugins for hosts
//!
//! # Plugin Discovery
//!
//! Every registered type has search paths. Indexing a type finds every
//! `plugin.toml` below those paths; the directory holding the manifest is
//! the plugin's directory and its name is the plugin's name.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pluma_core::events::MemoryEventChannel;
//! use pluma_core::plugins::{DylibLoader, PluginType, Registry, Selection};
//!
//! let mut registry = Registry::new(
//!     Arc::new(DylibLoader::new()),
//!     Arc::new(MemoryEventChannel::default()),
//! );
//! registry.register(PluginType::new("theme", "Themes", "", vec!["/opt/themes".into()]));
//! registry.index(None).await?;
//! registry.enable(Selection::of_type("theme")).await?;
//! ```

mod config;
mod dylib;
mod error;
mod lifecycle;
mod loader;
mod manifest;
mod record;
mod registry;
mod selection;
mod state;
mod version;

pub use config::{DEFAULT_MANIFEST_FILE, RegistryConfig};
pub use dylib::DylibLoader;
pub use error::{LoadError, ManifestError, RegistryError, StateError};
pub use lifecycle::PluginLifecycle;
pub use loader::{FactoryLoader, PluginFactory, PluginLoader};
pub use manifest::{GlobManifestSource, ManifestSource};
pub use record::{PluginRecord, PluginType};
pub use registry::Registry;
pub use selection::Selection;
pub use state::RegistryState;
pub use version::VersionGate;
