//! Lifecycle wrapper around a plugin instance

use std::fmt;
use std::sync::Arc;

use pluma_plugin_api::{LifecycleHook, Plugin, PluginError};
use serde_json::Value;

use super::error::RegistryError;
use super::record::PluginRecord;
use crate::events::{EventChannel, EventPayload, topics};

/// A live plugin instance bound to its catalog identity
///
/// Every hook runs the plugin's implementation first. Only when it succeeds
/// is `plugin.<hook>` published, with the hook's arguments as payload.
pub struct PluginLifecycle {
    plugin_type: String,
    name: String,
    title: String,
    description: String,
    weight: i64,
    version: String,
    inner: Box<dyn Plugin>,
    events: Arc<dyn EventChannel>,
}

impl PluginLifecycle {
    pub fn new(record: &PluginRecord, inner: Box<dyn Plugin>, events: Arc<dyn EventChannel>) -> Self {
        Self {
            plugin_type: record.plugin_type().to_string(),
            name: record.name().to_string(),
            title: record.manifest().title.clone(),
            description: record.manifest().description.clone(),
            weight: record.manifest().weight,
            version: record.manifest().version.clone(),
            inner,
            events,
        }
    }

    pub fn plugin_type(&self) -> &str {
        &self.plugin_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn weight(&self) -> i64 {
        self.weight
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub async fn enable(&mut self) -> Result<(), RegistryError> {
        let result = self.inner.enable().await;
        self.after(LifecycleHook::Enable, result, Vec::new()).await
    }

    pub async fn disable(&mut self) -> Result<(), RegistryError> {
        let result = self.inner.disable().await;
        self.after(LifecycleHook::Disable, result, Vec::new()).await
    }

    pub async fn update(&mut self, from: &str, to: &str) -> Result<(), RegistryError> {
        let result = self.inner.update(from, to).await;
        let args = vec![Value::from(from), Value::from(to)];
        self.after(LifecycleHook::Update, result, args).await
    }

    pub async fn message(&mut self, msg: &str, args: &[Value]) -> Result<(), RegistryError> {
        let result = self.inner.message(msg, args).await;
        let mut payload_args = Vec::with_capacity(args.len() + 1);
        payload_args.push(Value::from(msg));
        payload_args.extend_from_slice(args);
        self.after(LifecycleHook::Message, result, payload_args).await
    }

    async fn after(
        &self,
        hook: LifecycleHook,
        result: Result<(), PluginError>,
        args: Vec<Value>,
    ) -> Result<(), RegistryError> {
        result.map_err(|source| RegistryError::Hook {
            plugin_type: self.plugin_type.clone(),
            name: self.name.clone(),
            hook,
            source,
        })?;

        let payload = EventPayload::Hook {
            plugin_type: self.plugin_type.clone(),
            name: self.name.clone(),
            hook,
            args,
        };
        self.events.invoke(&[topics::hook(hook)], payload).await?;
        Ok(())
    }
}

impl fmt::Debug for PluginLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginLifecycle")
            .field("plugin_type", &self.plugin_type)
            .field("name", &self.name)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
