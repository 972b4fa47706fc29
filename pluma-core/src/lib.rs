//! pluma-core: Core library for the pluma plugin registry
//!
//! This crate provides the building blocks a host application uses to
//! discover plugins and drive their lifecycle:
//!
//! - **Registry** - [`Registry`] holds plugin types and the catalog, and runs
//!   the bulk `index`/`enable`/`disable`/`update`/`message` operations
//! - **Lifecycle** - [`PluginLifecycle`] binds a plugin instance to its identity
//! - **Loading** - [`DylibLoader`] and [`FactoryLoader`] construct fresh instances
//! - **Event system** - [`EventChannel`] trait and [`MemoryEventChannel`] for
//!   announcing transitions and letting listeners veto them
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use pluma_core::{DylibLoader, MemoryEventChannel, PluginType, Registry, Selection};
//!
//! async fn example() -> Result<(), pluma_core::RegistryError> {
//!     let mut registry = Registry::new(
//!         Arc::new(DylibLoader::new()),
//!         Arc::new(MemoryEventChannel::default()),
//!     );
//!     registry.register(PluginType::new("plugin", "Plugins", "", vec!["./plugins".into()]));
//!     registry.index(None).await?;
//!     registry.enable(Selection::AllTypes).await?;
//!
//!     for record in registry.plugins(None) {
//!         println!("{} enabled: {}", record.name(), record.is_enabled());
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod events;
pub mod plugins;

// Re-export key types for convenience
pub use error::EventError;
pub use events::{Event, EventChannel, EventListener, EventPayload, MemoryEventChannel, topics};
pub use plugins::{
    DylibLoader, FactoryLoader, GlobManifestSource, LoadError, ManifestError, ManifestSource,
    PluginLifecycle, PluginLoader, PluginRecord, PluginType, Registry, RegistryConfig,
    RegistryError, RegistryState, Selection, StateError, VersionGate,
};
