//! Plugin construction
//!
//! The registry never constructs plugins itself. It asks a [`PluginLoader`]
//! for a fresh instance every time a plugin is enabled or reloaded.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use pluma_plugin_api::Plugin;

use super::error::LoadError;
use super::record::PluginRecord;

/// Produces fresh plugin instances for catalog records
#[async_trait]
pub trait PluginLoader: Send + Sync {
    /// Construct a new, not yet enabled, instance of the record's plugin
    async fn load(&self, record: &PluginRecord) -> Result<Box<dyn Plugin>, LoadError>;
}

/// Constructor used by [`FactoryLoader`]
pub type PluginFactory = Arc<dyn Fn(&PluginRecord) -> Box<dyn Plugin> + Send + Sync>;

/// Loader for plugins compiled into the host
///
/// Factories are looked up by plugin name first, then by the manifest's
/// `main` entry point.
#[derive(Default, Clone)]
pub struct FactoryLoader {
    factories: HashMap<String, PluginFactory>,
}

impl FactoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under a plugin name or entry point
    pub fn register<F>(&mut self, key: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&PluginRecord) -> Box<dyn Plugin> + Send + Sync + 'static,
    {
        self.factories.insert(key.into(), Arc::new(factory));
        self
    }

    /// Builder-style variant of [`FactoryLoader::register`]
    pub fn with<F>(mut self, key: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&PluginRecord) -> Box<dyn Plugin> + Send + Sync + 'static,
    {
        self.register(key, factory);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.factories.contains_key(key)
    }
}

#[async_trait]
impl PluginLoader for FactoryLoader {
    async fn load(&self, record: &PluginRecord) -> Result<Box<dyn Plugin>, LoadError> {
        let factory = self
            .factories
            .get(record.name())
            .or_else(|| self.factories.get(&record.manifest().main))
            .ok_or_else(|| LoadError::NoFactory {
                plugin_type: record.plugin_type().to_string(),
                name: record.name().to_string(),
            })?;
        Ok(factory(record))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use pluma_plugin_api::{PluginManifest, async_trait};

    use super::*;

    struct Noop;

    #[async_trait]
    impl Plugin for Noop {}

    fn record(name: &str, main: &str) -> PluginRecord {
        let manifest = PluginManifest {
            main: main.to_string(),
            ..Default::default()
        };
        PluginRecord::new("group1", name, manifest, PathBuf::from("/plugins").join(name))
    }

    #[tokio::test]
    async fn test_load_by_name() {
        let loader = FactoryLoader::new().with("example1", |_| Box::new(Noop) as Box<dyn Plugin>);
        assert!(loader.load(&record("example1", "index")).await.is_ok());
    }

    #[tokio::test]
    async fn test_load_falls_back_to_main() {
        let loader = FactoryLoader::new().with("shared", |_| Box::new(Noop) as Box<dyn Plugin>);
        assert!(loader.load(&record("example1", "shared")).await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_factory() {
        let loader = FactoryLoader::new();
        let err = loader.load(&record("example1", "index")).await.err().unwrap();
        assert!(matches!(err, LoadError::NoFactory { ref name, .. } if name == "example1"));
    }

    #[tokio::test]
    async fn test_every_load_constructs_a_new_instance() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let loader = FactoryLoader::new().with("example1", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::new(Noop) as Box<dyn Plugin>
        });

        let record = record("example1", "index");
        loader.load(&record).await.unwrap();
        loader.load(&record).await.unwrap();
        assert_eq!(built.load(Ordering::SeqCst), 2);
    }
}
