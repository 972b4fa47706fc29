//! pluma-plugin-api - Plugin API for the pluma plugin registry
//!
//! This crate provides the trait and types needed to write plugins that a
//! pluma registry can discover, enable, disable, update and message.
//! Plugins are opaque to the registry: it only ever calls the four lifecycle
//! hooks of [`Plugin`].
//!
//! # Example
//!
//! ```ignore
//! use pluma_plugin_api::{async_trait, export_plugin, Plugin, PluginError};
//! use serde_json::Value;
//!
//! #[derive(Default)]
//! pub struct MyPlugin {
//!     greeted: u32,
//! }
//!
//! #[async_trait]
//! impl Plugin for MyPlugin {
//!     async fn enable(&mut self) -> Result<(), PluginError> {
//!         tracing::info!("my-plugin enabled");
//!         Ok(())
//!     }
//!
//!     async fn message(&mut self, msg: &str, _args: &[Value]) -> Result<(), PluginError> {
//!         match msg {
//!             "greet" => {
//!                 self.greeted += 1;
//!                 Ok(())
//!             }
//!             other => Err(PluginError::UnknownMessage(other.to_string())),
//!         }
//!     }
//! }
//!
//! export_plugin!(MyPlugin);
//! ```

pub mod error;
pub mod types;

pub use async_trait::async_trait;
pub use error::PluginError;
pub use types::*;

/// Current plugin API version. Native plugins must match this exactly.
/// The loader checks it before constructing an instance.
pub const API_VERSION: u32 = 1;

/// The plugin capability set.
///
/// Every hook has a default implementation that succeeds without doing
/// anything, so plugins only override the transitions they care about.
/// Returning an error from a hook fails that transition: the registry keeps
/// the plugin in its previous state and stops the surrounding batch.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Called on a freshly constructed instance when the plugin is enabled.
    async fn enable(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Called before the instance is dropped when the plugin is disabled.
    async fn disable(&mut self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Migrate from the `from` version recorded by the host to the declared `to` version.
    async fn update(&mut self, _from: &str, _to: &str) -> Result<(), PluginError> {
        Ok(())
    }

    /// Handle a message sent through the registry.
    async fn message(&mut self, _msg: &str, _args: &[serde_json::Value]) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Export a plugin type for dynamic loading.
///
/// This macro generates the C ABI entry points that the pluma loader uses to
/// construct and destroy plugin instances.
///
/// # Usage
///
/// ```ignore
/// pluma_plugin_api::export_plugin!(MyPlugin);
/// ```
///
/// # Generated Functions
///
/// - `_pluma_plugin_create()`: Creates a new plugin instance
/// - `_pluma_plugin_api_version()`: Returns the API version
/// - `_pluma_plugin_destroy()`: Destroys a plugin instance
#[macro_export]
macro_rules! export_plugin {
    ($plugin_type:ty) => {
        #[unsafe(no_mangle)]
        pub extern "C" fn _pluma_plugin_create() -> *mut dyn $crate::Plugin {
            let plugin: Box<dyn $crate::Plugin> = Box::new(<$plugin_type>::default());
            Box::into_raw(plugin)
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _pluma_plugin_api_version() -> u32 {
            $crate::API_VERSION
        }

        #[unsafe(no_mangle)]
        pub extern "C" fn _pluma_plugin_destroy(ptr: *mut dyn $crate::Plugin) {
            if !ptr.is_null() {
                unsafe {
                    drop(Box::from_raw(ptr));
                }
            }
        }
    };
}
