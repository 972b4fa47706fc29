//! The plugin registry: registered types, the catalog and the bulk
//! lifecycle operations

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use super::config::RegistryConfig;
use super::error::RegistryError;
use super::lifecycle::PluginLifecycle;
use super::loader::PluginLoader;
use super::manifest::{GlobManifestSource, ManifestSource};
use super::record::{PluginRecord, PluginType};
use super::selection::Selection;
use super::version::VersionGate;
use crate::events::{EventChannel, EventPayload, topics};

/// Registered plugin types and the catalog of discovered plugins
///
/// Mutating operations take `&mut self`, so one bulk operation runs at a
/// time. Within an operation plugins are visited one after another in
/// ascending weight order and the first failure stops the batch.
pub struct Registry {
    types: BTreeMap<String, PluginType>,
    catalog: BTreeMap<String, Vec<PluginRecord>>,
    loader: Arc<dyn PluginLoader>,
    manifests: Arc<dyn ManifestSource>,
    custom_manifests: bool,
    events: Arc<dyn EventChannel>,
    config: RegistryConfig,
}

impl Registry {
    /// Create a registry with the default configuration and a glob manifest source
    pub fn new(loader: Arc<dyn PluginLoader>, events: Arc<dyn EventChannel>) -> Self {
        let config = RegistryConfig::default();
        Self {
            types: BTreeMap::new(),
            catalog: BTreeMap::new(),
            loader,
            manifests: Arc::new(GlobManifestSource::new(&config.manifest_file)),
            custom_manifests: false,
            events,
            config,
        }
    }

    /// Replace the configuration
    ///
    /// The default glob source follows the new manifest file name. A source
    /// set with `with_manifest_source` is kept regardless of call order.
    pub fn with_config(mut self, config: RegistryConfig) -> Self {
        if !self.custom_manifests {
            self.manifests = Arc::new(GlobManifestSource::new(&config.manifest_file));
        }
        self.config = config;
        self
    }

    pub fn with_manifest_source(mut self, manifests: Arc<dyn ManifestSource>) -> Self {
        self.manifests = manifests;
        self.custom_manifests = true;
        self
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn events(&self) -> &Arc<dyn EventChannel> {
        &self.events
    }

    // ==================== Types ====================

    /// Define or redefine a plugin type. Indexed records are left alone.
    pub fn register(&mut self, plugin_type: PluginType) -> &mut Self {
        tracing::debug!(plugin_type = %plugin_type.name, paths = ?plugin_type.paths, "Registered plugin type");
        self.types.insert(plugin_type.name.clone(), plugin_type);
        self
    }

    pub fn registered(&self, plugin_type: &str) -> bool {
        self.types.contains_key(plugin_type)
    }

    pub fn types(&self) -> &BTreeMap<String, PluginType> {
        &self.types
    }

    // ==================== Catalog ====================

    /// Records of one type, or of every indexed type, in catalog order
    pub fn plugins(&self, plugin_type: Option<&str>) -> Vec<&PluginRecord> {
        match plugin_type {
            Some(t) => self
                .catalog
                .get(t)
                .map(|records| records.iter().collect())
                .unwrap_or_default(),
            None => self.catalog.values().flatten().collect(),
        }
    }

    pub fn catalog(&self) -> &BTreeMap<String, Vec<PluginRecord>> {
        &self.catalog
    }

    /// Look up a record, distinguishing an unindexed type from an unknown name
    pub fn record(&self, plugin_type: &str, name: &str) -> Result<&PluginRecord, RegistryError> {
        self.catalog
            .get(plugin_type)
            .ok_or_else(|| RegistryError::undefined_type(plugin_type))?
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| RegistryError::undefined_plugin(plugin_type, name))
    }

    fn record_mut(
        &mut self,
        plugin_type: &str,
        name: &str,
    ) -> Result<&mut PluginRecord, RegistryError> {
        self.catalog
            .get_mut(plugin_type)
            .ok_or_else(|| RegistryError::undefined_type(plugin_type))?
            .iter_mut()
            .find(|r| r.name() == name)
            .ok_or_else(|| RegistryError::undefined_plugin(plugin_type, name))
    }

    // ==================== Indexing ====================

    /// Rebuild the catalog for the given types, or every registered type
    ///
    /// Unknown types are skipped. Live instances of a re-indexed type are
    /// disabled first when `disable_on_reindex` is set.
    pub async fn index(&mut self, types: Option<&[&str]>) -> Result<(), RegistryError> {
        let requested: Vec<PluginType> = match types {
            Some(names) => names
                .iter()
                .filter_map(|name| self.types.get(*name).cloned())
                .collect(),
            None => self.types.values().cloned().collect(),
        };

        for plugin_type in requested {
            self.retire(&plugin_type.name).await;
            self.catalog.insert(plugin_type.name.clone(), Vec::new());

            let records = self.discover(&plugin_type).await?;
            tracing::info!(
                plugin_type = %plugin_type.name,
                count = records.len(),
                "Indexed plugins"
            );
            self.catalog.insert(plugin_type.name.clone(), records);
        }

        self.events
            .emit(topics::PLUGINS_INDEXED, EventPayload::Batch)
            .await;
        Ok(())
    }

    async fn discover(&self, plugin_type: &PluginType) -> Result<Vec<PluginRecord>, RegistryError> {
        let mut records: Vec<PluginRecord> = Vec::new();

        for path in self.manifests.scan(&plugin_type.paths).await? {
            let manifest = self.manifests.parse(&path).await?;
            let dir = path.parent().map(|p| p.to_path_buf()).unwrap_or_default();
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            tracing::debug!(
                plugin_type = %plugin_type.name,
                plugin = %name,
                path = %path.display(),
                "Discovered plugin"
            );

            let record = PluginRecord::new(&plugin_type.name, name, manifest, dir);
            match records.iter_mut().find(|r| r.name() == record.name()) {
                Some(existing) => *existing = record,
                None => records.push(record),
            }
        }

        // Stable: equal weights keep discovery order
        records.sort_by_key(PluginRecord::weight);
        Ok(records)
    }

    /// Disable every live instance of a type before its records are replaced
    async fn retire(&mut self, plugin_type: &str) {
        if !self.config.disable_on_reindex {
            return;
        }
        let Some(records) = self.catalog.get_mut(plugin_type) else {
            return;
        };

        let mut retired = 0usize;
        for record in records.iter_mut() {
            let Some(mut instance) = record.instance.take() else {
                continue;
            };
            if let Err(e) = instance.disable().await {
                tracing::warn!(
                    plugin_type = %plugin_type,
                    plugin = %record.name(),
                    error = %e,
                    "Failed to disable plugin before re-indexing"
                );
                continue;
            }
            retired += 1;
            let event_topics = [topics::type_disabled(plugin_type), topics::PLUGIN_DISABLED.to_string()];
            if let Err(e) = self
                .events
                .invoke(&event_topics, EventPayload::plugin(plugin_type, record.name()))
                .await
            {
                tracing::warn!(plugin = %record.name(), error = %e, "Listener error ignored");
            }
        }

        if retired > 0 {
            self.events
                .emit(topics::PLUGINS_DISABLED, EventPayload::Batch)
                .await;
        }
    }

    // ==================== Enable / Disable ====================

    /// Enable the selected plugins in selection order, stopping at the first failure
    ///
    /// `plugins.enabled` is published whether or not the batch succeeded.
    pub async fn enable(&mut self, selection: Selection) -> Result<(), RegistryError> {
        let targets = self.select(&selection, false);
        let result = self.enable_each(targets).await;

        self.events
            .emit(topics::PLUGINS_ENABLED, EventPayload::Batch)
            .await;
        result
    }

    async fn enable_each(&mut self, targets: Vec<(String, String)>) -> Result<(), RegistryError> {
        for (plugin_type, name) in targets {
            if let Err(e) = self.enable_one(&plugin_type, &name).await {
                tracing::error!(plugin_type = %plugin_type, plugin = %name, error = %e, "Failed to enable plugin");
                return Err(e);
            }
            tracing::info!(plugin_type = %plugin_type, plugin = %name, "Enabled plugin");
        }
        Ok(())
    }

    async fn enable_one(&mut self, plugin_type: &str, name: &str) -> Result<(), RegistryError> {
        let record = self.record(plugin_type, name)?;
        let inner = self.loader.load(record).await?;
        let mut instance = PluginLifecycle::new(record, inner, Arc::clone(&self.events));

        instance.enable().await?;
        self.record_mut(plugin_type, name)?.instance = Some(instance);

        let event_topics = [topics::type_enabled(plugin_type), topics::PLUGIN_ENABLED.to_string()];
        self.events
            .invoke(&event_topics, EventPayload::plugin(plugin_type, name))
            .await?;
        Ok(())
    }

    /// Disable enabled plugins of an indexed type, all of them or the named ones
    ///
    /// `plugins.disabled` is published whether or not the batch succeeded.
    pub async fn disable(
        &mut self,
        plugin_type: &str,
        names: Option<&[&str]>,
    ) -> Result<(), RegistryError> {
        let records = self
            .catalog
            .get(plugin_type)
            .ok_or_else(|| RegistryError::undefined_type(plugin_type))?;

        let targets: Vec<String> = records
            .iter()
            .filter(|r| r.is_enabled())
            .filter(|r| names.is_none_or(|names| names.contains(&r.name())))
            .map(|r| r.name().to_string())
            .collect();

        let result = self.disable_each(plugin_type, targets).await;

        self.events
            .emit(topics::PLUGINS_DISABLED, EventPayload::Batch)
            .await;
        result
    }

    async fn disable_each(&mut self, plugin_type: &str, targets: Vec<String>) -> Result<(), RegistryError> {
        for name in targets {
            if let Err(e) = self.disable_one(plugin_type, &name).await {
                tracing::error!(plugin_type = %plugin_type, plugin = %name, error = %e, "Failed to disable plugin");
                return Err(e);
            }
            tracing::info!(plugin_type = %plugin_type, plugin = %name, "Disabled plugin");
        }
        Ok(())
    }

    async fn disable_one(&mut self, plugin_type: &str, name: &str) -> Result<(), RegistryError> {
        let record = self.record_mut(plugin_type, name)?;
        let Some(instance) = record.instance.as_mut() else {
            return Ok(());
        };

        instance.disable().await?;
        record.instance = None;

        let event_topics = [topics::type_disabled(plugin_type), topics::PLUGIN_DISABLED.to_string()];
        self.events
            .invoke(&event_topics, EventPayload::plugin(plugin_type, name))
            .await?;
        Ok(())
    }

    // ==================== Single plugin operations ====================

    /// Swap an enabled plugin's instance for a freshly loaded one
    ///
    /// No hooks run and nothing is published.
    pub async fn reload(
        &mut self,
        plugin_type: &str,
        name: &str,
    ) -> Result<&PluginLifecycle, RegistryError> {
        self.plugin(plugin_type, name)?;

        let record = self.record(plugin_type, name)?;
        let inner = self.loader.load(record).await?;
        let instance = PluginLifecycle::new(record, inner, Arc::clone(&self.events));

        let record = self.record_mut(plugin_type, name)?;
        tracing::info!(plugin_type = %plugin_type, plugin = %name, "Reloaded plugin");
        Ok(record.instance.insert(instance))
    }

    /// Run the plugin's update hook if `from` is older than its declared version
    ///
    /// Returns whether the hook ran. Recording the new baseline is up to the caller.
    pub async fn update(
        &mut self,
        plugin_type: &str,
        name: &str,
        from: &str,
    ) -> Result<bool, RegistryError> {
        let record = self.record_mut(plugin_type, name)?;
        let to = record.version().to_string();
        let instance = record
            .instance
            .as_mut()
            .ok_or_else(|| RegistryError::disabled_plugin(plugin_type, name))?;

        if !VersionGate::is_applicable(from, &to)? {
            tracing::debug!(plugin_type = %plugin_type, plugin = %name, from = %from, to = %to, "Plugin is up to date");
            return Ok(false);
        }

        if let Err(e) = instance.update(from, &to).await {
            tracing::error!(plugin_type = %plugin_type, plugin = %name, error = %e, "Failed to update plugin");
            return Err(e);
        }
        tracing::info!(plugin_type = %plugin_type, plugin = %name, from = %from, to = %to, "Updated plugin");
        Ok(true)
    }

    /// Deliver a message to the selected enabled plugins in catalog order
    ///
    /// Disabled plugins are skipped. `plugins.messaged` is published whether
    /// or not the batch succeeded.
    pub async fn message(
        &mut self,
        selection: Selection,
        msg: &str,
        args: &[Value],
    ) -> Result<(), RegistryError> {
        let targets = self.select(&selection, true);
        let result = self.message_each(targets, msg, args).await;

        self.events
            .emit(topics::PLUGINS_MESSAGED, EventPayload::Batch)
            .await;
        result
    }

    async fn message_each(
        &mut self,
        targets: Vec<(String, String)>,
        msg: &str,
        args: &[Value],
    ) -> Result<(), RegistryError> {
        for (plugin_type, name) in targets {
            let record = self.record_mut(&plugin_type, &name)?;
            let Some(instance) = record.instance.as_mut() else {
                continue;
            };
            if let Err(e) = instance.message(msg, args).await {
                tracing::error!(plugin_type = %plugin_type, plugin = %name, message = %msg, error = %e, "Failed to deliver message");
                return Err(e);
            }
        }
        Ok(())
    }

    // ==================== Queries ====================

    pub fn enabled(&self, plugin_type: &str, name: &str) -> Result<bool, RegistryError> {
        Ok(self.record(plugin_type, name)?.is_enabled())
    }

    /// The live instance of an enabled plugin
    pub fn plugin(&self, plugin_type: &str, name: &str) -> Result<&PluginLifecycle, RegistryError> {
        self.record(plugin_type, name)?
            .instance()
            .ok_or_else(|| RegistryError::disabled_plugin(plugin_type, name))
    }

    /// Declared dependencies that are not in the same type's catalog
    pub fn missing_dependencies(
        &self,
        plugin_type: &str,
        name: &str,
    ) -> Result<Vec<String>, RegistryError> {
        let record = self.record(plugin_type, name)?;
        Ok(record
            .manifest()
            .dependencies
            .keys()
            .filter(|dep| self.record(plugin_type, dep).is_err())
            .cloned()
            .collect())
    }

    /// Disable every enabled plugin of every indexed type, logging failures
    pub async fn shutdown(&mut self) {
        let types: Vec<String> = self.catalog.keys().cloned().collect();
        for plugin_type in types {
            if let Err(e) = self.disable(&plugin_type, None).await {
                tracing::warn!(plugin_type = %plugin_type, error = %e, "Failed to disable plugins on shutdown");
            }
        }
    }

    /// `(type, name)` pairs matching a selection
    ///
    /// An explicit type list is walked in the caller's order, skipping repeats
    /// and unindexed types. Otherwise types follow catalog order. Records
    /// within a type follow weight order.
    fn select(&self, selection: &Selection, enabled_only: bool) -> Vec<(String, String)> {
        let order: Vec<&str> = match selection {
            Selection::Types(types) => {
                let mut order: Vec<&str> = Vec::new();
                for plugin_type in types {
                    if !order.contains(&plugin_type.as_str()) {
                        order.push(plugin_type.as_str());
                    }
                }
                order
            }
            _ => self
                .catalog
                .keys()
                .map(String::as_str)
                .filter(|t| selection.includes_type(t))
                .collect(),
        };

        let mut targets = Vec::new();
        for plugin_type in order {
            let Some(records) = self.catalog.get(plugin_type) else {
                continue;
            };
            for record in records {
                if !selection.includes(plugin_type, record.name()) {
                    continue;
                }
                if enabled_only && !record.is_enabled() {
                    tracing::debug!(plugin_type = %plugin_type, plugin = %record.name(), "Skipping disabled plugin");
                    continue;
                }
                targets.push((plugin_type.to_string(), record.name().to_string()));
            }
        }
        targets
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.types)
            .field("catalog", &self.catalog)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemoryEventChannel;
    use crate::plugins::FactoryLoader;

    fn registry() -> Registry {
        Registry::new(
            Arc::new(FactoryLoader::new()),
            Arc::new(MemoryEventChannel::default()),
        )
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut registry = registry();
        registry.register(PluginType::new("group1", "Group 1", "", vec![]));
        registry.register(PluginType::new("group1", "Renamed", "", vec![]));

        assert!(registry.registered("group1"));
        assert!(!registry.registered("group2"));
        assert_eq!(registry.types().len(), 1);
        assert_eq!(registry.types()["group1"].title, "Renamed");
    }

    #[test]
    fn test_queries_on_unindexed_type() {
        let registry = registry();
        assert!(matches!(
            registry.enabled("ghost", "x"),
            Err(RegistryError::UndefinedPluginType { .. })
        ));
        assert!(matches!(
            registry.plugin("ghost", "x"),
            Err(RegistryError::UndefinedPluginType { .. })
        ));
        assert!(registry.plugins(Some("ghost")).is_empty());
    }

    #[tokio::test]
    async fn test_disable_unindexed_type_fails() {
        let mut registry = registry();
        let err = registry.disable("ghost", None).await.unwrap_err();
        assert!(matches!(err, RegistryError::UndefinedPluginType { .. }));
    }

    /// Reports one `alpha` manifest wherever it is asked to look
    struct FixedManifests;

    #[async_trait::async_trait]
    impl ManifestSource for FixedManifests {
        async fn scan(
            &self,
            _roots: &[std::path::PathBuf],
        ) -> Result<Vec<std::path::PathBuf>, crate::plugins::ManifestError> {
            Ok(vec![std::path::PathBuf::from("/virtual/alpha/plugin.toml")])
        }

        async fn parse(
            &self,
            _path: &std::path::Path,
        ) -> Result<pluma_plugin_api::PluginManifest, crate::plugins::ManifestError> {
            Ok(pluma_plugin_api::PluginManifest::default())
        }
    }

    #[tokio::test]
    async fn test_with_config_keeps_custom_manifest_source() {
        let config = RegistryConfig {
            manifest_file: "other.toml".to_string(),
            ..Default::default()
        };
        let mut registry = registry()
            .with_manifest_source(Arc::new(FixedManifests))
            .with_config(config);
        registry.register(PluginType::new("virtual", "", "", vec![]));
        registry.index(None).await.unwrap();

        assert_eq!(registry.config().manifest_file, "other.toml");
        let names: Vec<String> = registry
            .plugins(None)
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["alpha"]);
    }

    #[tokio::test]
    async fn test_index_unknown_type_is_skipped() {
        let mut registry = registry();
        registry.index(Some(&["ghost"])).await.unwrap();
        assert!(registry.catalog().is_empty());
    }

    #[tokio::test]
    async fn test_enable_unknown_selection_is_noop() {
        let mut registry = registry();
        registry.enable(Selection::of_type("ghost")).await.unwrap();
        registry
            .enable(Selection::names("ghost", ["x"]))
            .await
            .unwrap();
        assert_eq!(
            registry.events().events_from(0).await.len(),
            2,
            "one plugins.enabled per batch"
        );
    }
}
