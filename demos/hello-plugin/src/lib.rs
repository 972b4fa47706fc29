//! Hello Plugin - A simple example plugin for pluma
//!
//! This plugin demonstrates:
//! - Basic plugin structure with the `export_plugin!` macro
//! - Implementing the `Plugin` lifecycle hooks
//! - Migrating between versions (`update`)
//! - Answering messages sent through the registry (`message`)
//!
//! ## Building
//!
//! ```bash
//! cargo build --release
//! ```
//!
//! ## Installing
//!
//! ```bash
//! mkdir -p ~/.config/pluma/plugins/hello
//! cp plugin.toml ~/.config/pluma/plugins/hello/
//! cp target/release/libhello_plugin.so ~/.config/pluma/plugins/hello/
//! pluma plugin enable plugin hello
//! pluma plugin message plugin greet world
//! ```

use pluma_plugin_api::{Plugin, PluginError, async_trait, export_plugin};
use serde_json::Value;

/// A plugin that greets whoever messages it and counts greetings.
#[derive(Default)]
pub struct HelloPlugin {
    /// Greetings answered since the plugin was enabled
    greeted: u32,
}

#[async_trait]
impl Plugin for HelloPlugin {
    async fn enable(&mut self) -> Result<(), PluginError> {
        println!("Hello plugin enabled!");
        Ok(())
    }

    async fn disable(&mut self) -> Result<(), PluginError> {
        println!("Hello plugin answered {} greetings", self.greeted);
        Ok(())
    }

    async fn update(&mut self, from: &str, to: &str) -> Result<(), PluginError> {
        if from.starts_with("0.0.") {
            return Err(PluginError::update(from, to, "reinstall required"));
        }
        println!("Hello plugin migrated from {} to {}", from, to);
        Ok(())
    }

    async fn message(&mut self, msg: &str, args: &[Value]) -> Result<(), PluginError> {
        match msg {
            "greet" => {
                let who = args.first().and_then(Value::as_str).unwrap_or("stranger");
                self.greeted += 1;
                println!("Hello, {}!", who);
                Ok(())
            }
            other => Err(PluginError::UnknownMessage(other.to_string())),
        }
    }
}

// This macro generates the C ABI entry points for dynamic loading
export_plugin!(HelloPlugin);

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_greet_counts() {
        let mut plugin = HelloPlugin::default();
        plugin.message("greet", &[Value::from("world")]).await.unwrap();
        plugin.message("greet", &[]).await.unwrap();
        assert_eq!(plugin.greeted, 2);
    }

    #[tokio::test]
    async fn test_unknown_message() {
        let mut plugin = HelloPlugin::default();
        let err = plugin.message("shout", &[]).await.unwrap_err();
        assert!(matches!(err, PluginError::UnknownMessage(m) if m == "shout"));
    }

    #[tokio::test]
    async fn test_update_from_zero_minor_fails() {
        let mut plugin = HelloPlugin::default();
        assert!(plugin.update("0.0.1", "0.2.0").await.is_err());
        assert!(plugin.update("0.1.0", "0.2.0").await.is_ok());
    }
}
