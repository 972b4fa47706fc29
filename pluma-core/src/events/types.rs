//! Event type definitions

use chrono::{DateTime, Utc};
use pluma_plugin_api::LifecycleHook;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Topic names published by the registry
pub mod topics {
    use pluma_plugin_api::LifecycleHook;

    pub const PLUGIN_ENABLED: &str = "plugin.enabled";
    pub const PLUGIN_DISABLED: &str = "plugin.disabled";
    pub const PLUGINS_ENABLED: &str = "plugins.enabled";
    pub const PLUGINS_DISABLED: &str = "plugins.disabled";
    pub const PLUGINS_MESSAGED: &str = "plugins.messaged";
    pub const PLUGINS_INDEXED: &str = "plugins.indexed";

    /// `plugin[<type>].enabled`
    pub fn type_enabled(plugin_type: &str) -> String {
        format!("plugin[{plugin_type}].enabled")
    }

    /// `plugin[<type>].disabled`
    pub fn type_disabled(plugin_type: &str) -> String {
        format!("plugin[{plugin_type}].disabled")
    }

    /// `plugin.<hook>`, published after a lifecycle hook succeeds
    pub fn hook(hook: LifecycleHook) -> String {
        format!("plugin.{hook}")
    }
}

/// Data carried by an event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    /// A single plugin changed state
    Plugin { plugin_type: String, name: String },

    /// A lifecycle hook completed, with the arguments it was called with
    Hook {
        plugin_type: String,
        name: String,
        hook: LifecycleHook,
        args: Vec<serde_json::Value>,
    },

    /// A bulk operation finished
    Batch,
}

impl EventPayload {
    pub fn plugin(plugin_type: &str, name: &str) -> Self {
        Self::Plugin {
            plugin_type: plugin_type.to_string(),
            name: name.to_string(),
        }
    }

    /// Name of the plugin this payload refers to, if any
    pub fn plugin_name(&self) -> Option<&str> {
        match self {
            Self::Plugin { name, .. } | Self::Hook { name, .. } => Some(name),
            Self::Batch => None,
        }
    }
}

/// A published event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Time-ordered identifier
    pub id: Uuid,
    pub topic: String,
    pub payload: EventPayload,
    pub timestamp: DateTime<Utc>,
}

impl Event {
    pub fn new(topic: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            id: Uuid::now_v7(),
            topic: topic.into(),
            payload,
            timestamp: Utc::now(),
        }
    }
}
