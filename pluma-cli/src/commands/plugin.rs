//! Plugin management commands

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Subcommand};
use pluma_core::{
    DylibLoader, EventChannel, MemoryEventChannel, PluginRecord, Registry, RegistryState,
    Selection,
};
use serde_json::Value;

use crate::config::{ConfigLoader, PlumaConfig};

/// Plugin management arguments
#[derive(Args)]
pub struct PluginArgs {
    #[command(subcommand)]
    pub command: PluginCommands,
}

/// Plugin subcommands
#[derive(Subcommand)]
pub enum PluginCommands {
    /// List discovered plugins
    List {
        /// Only list plugins of this type
        #[arg(long = "type")]
        plugin_type: Option<String>,
    },
    /// Show plugin details
    Info {
        /// Plugin type
        plugin_type: String,
        /// Plugin name
        name: String,
    },
    /// Enable plugins of a type (all of them when no names are given)
    Enable {
        /// Plugin type
        plugin_type: String,
        /// Plugin names to enable
        names: Vec<String>,
    },
    /// Disable plugins of a type (all of them when no names are given)
    Disable {
        /// Plugin type
        plugin_type: String,
        /// Plugin names to disable
        names: Vec<String>,
    },
    /// Run a plugin's update hook if its declared version is newer
    Update {
        /// Plugin type
        plugin_type: String,
        /// Plugin name
        name: String,
        /// Version to update from (defaults to the last recorded version)
        #[arg(long)]
        from: Option<String>,
    },
    /// Send a message to enabled plugins of a type
    Message {
        /// Plugin type
        plugin_type: String,
        /// Only message these plugins
        #[arg(long = "name")]
        names: Vec<String>,
        /// Message to send
        msg: String,
        /// Message arguments, parsed as JSON when possible
        args: Vec<String>,
    },
    /// Reload an enabled plugin's code (development)
    Reload {
        /// Plugin type
        plugin_type: String,
        /// Plugin name
        name: String,
    },
    /// List registered plugin types
    Types,
}

/// Registry plus the persisted state backing it for one CLI invocation
struct Host {
    registry: Registry,
    state: RegistryState,
    state_path: PathBuf,
}

impl Host {
    /// Register configured types, index them and re-enable what was enabled before
    async fn open(config: &PlumaConfig) -> Result<Self> {
        let events = Arc::new(MemoryEventChannel::default());
        spawn_event_logger(events.as_ref());

        let mut registry = Registry::new(Arc::new(DylibLoader::new()), events)
            .with_config(config.registry_config());

        for plugin_type in &config.types {
            registry.register(plugin_type.clone());
        }
        registry.index(None).await?;

        let state_path = config.registry.state_file.clone();
        let state = RegistryState::load(&state_path)?;

        for plugin_type in config.types.iter().map(|t| t.name.as_str()) {
            let names: Vec<&str> = state.enabled_in(plugin_type).collect();
            if names.is_empty() {
                continue;
            }
            if let Err(e) = registry
                .enable(Selection::names(plugin_type, names))
                .await
            {
                tracing::warn!(plugin_type = %plugin_type, error = %e, "Failed to restore enabled plugins");
            }
        }

        Ok(Self {
            registry,
            state,
            state_path,
        })
    }

    /// Record the enabled flag of every plugin of a type and save
    fn persist(&mut self, plugin_type: &str) -> Result<()> {
        for record in self.registry.plugins(Some(plugin_type)) {
            if record.is_enabled() {
                self.state.enable(plugin_type, record.name());
            } else {
                self.state.disable(plugin_type, record.name());
            }
        }
        self.state.save(&self.state_path)?;
        Ok(())
    }
}

fn spawn_event_logger(events: &dyn EventChannel) {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        while let Ok((seq, event)) = rx.recv().await {
            tracing::debug!(seq, topic = %event.topic, plugin = ?event.payload.plugin_name(), "Event");
        }
    });
}

/// Run plugin command
pub async fn run(args: PluginArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let mut host = Host::open(&config).await?;

    match args.command {
        PluginCommands::List { plugin_type } => list_plugins(&host, plugin_type.as_deref()),
        PluginCommands::Info { plugin_type, name } => show_plugin_info(&host, &plugin_type, &name),
        PluginCommands::Enable { plugin_type, names } => {
            enable_plugins(&mut host, &plugin_type, names).await
        }
        PluginCommands::Disable { plugin_type, names } => {
            disable_plugins(&mut host, &plugin_type, &names).await
        }
        PluginCommands::Update {
            plugin_type,
            name,
            from,
        } => update_plugin(&mut host, &plugin_type, &name, from).await,
        PluginCommands::Message {
            plugin_type,
            names,
            msg,
            args,
        } => message_plugins(&mut host, &plugin_type, names, &msg, &args).await,
        PluginCommands::Reload { plugin_type, name } => {
            reload_plugin(&mut host, &plugin_type, &name).await
        }
        PluginCommands::Types => list_types(&config),
    }
}

fn status(record: &PluginRecord) -> &'static str {
    if record.is_enabled() { "✓" } else { "○" }
}

fn list_plugins(host: &Host, plugin_type: Option<&str>) -> Result<()> {
    let plugins = host.registry.plugins(plugin_type);

    if plugins.is_empty() {
        println!("No plugins found");
        println!();
        println!("Plugin directories:");
        for t in host.registry.types().values() {
            for path in &t.paths {
                println!("  {}: {}", t.name, path.display());
            }
        }
        println!();
        println!("To install a plugin:");
        println!("  1. Create a plugin directory: mkdir -p ~/.config/pluma/plugins/my-plugin");
        println!("  2. Add a manifest: echo 'version = \"0.1.0\"' > ~/.config/pluma/plugins/my-plugin/plugin.toml");
        println!("  3. Copy the plugin library: cp libmy_plugin.so ~/.config/pluma/plugins/my-plugin/index.so");
        println!("  4. Enable the plugin: pluma plugin enable plugin my-plugin");
        return Ok(());
    }

    for p in plugins {
        let description = if p.manifest().description.is_empty() {
            "No description"
        } else {
            &p.manifest().description
        };

        println!(
            "{} {}/{} v{} [{}]    {}",
            status(p),
            p.plugin_type(),
            p.name(),
            p.version(),
            p.weight(),
            description
        );
    }

    Ok(())
}

fn show_plugin_info(host: &Host, plugin_type: &str, name: &str) -> Result<()> {
    let record = host.registry.record(plugin_type, name)?;
    let m = record.manifest();

    println!("Name:        {}", record.name());
    println!("Type:        {}", record.plugin_type());
    println!(
        "Title:       {}",
        if m.title.is_empty() { "-" } else { &m.title }
    );
    println!("Version:     {}", m.version);
    println!(
        "Author:      {}",
        if m.author.is_empty() {
            "Unknown"
        } else {
            &m.author
        }
    );
    println!(
        "Description: {}",
        if m.description.is_empty() {
            "No description"
        } else {
            &m.description
        }
    );
    println!("Main:        {}", m.main);
    println!("Weight:      {}", m.weight);
    println!("Path:        {}", record.path().display());
    println!();
    println!(
        "Status:      {}",
        if record.is_enabled() {
            "Enabled"
        } else {
            "Disabled"
        }
    );
    if let Some(version) = host.state.version(plugin_type, name) {
        println!("Applied:     {}", version);
    }

    if !m.dependencies.is_empty() {
        let missing = host.registry.missing_dependencies(plugin_type, name)?;
        println!();
        println!("Dependencies:");
        for (dep, range) in &m.dependencies {
            let note = if missing.contains(dep) { " (missing)" } else { "" };
            println!("  {} {}{}", dep, range, note);
        }
    }

    Ok(())
}

async fn enable_plugins(host: &mut Host, plugin_type: &str, names: Vec<String>) -> Result<()> {
    let selection = if names.is_empty() {
        Selection::of_type(plugin_type)
    } else {
        Selection::names(plugin_type, names)
    };

    let result = host.registry.enable(selection).await;
    host.persist(plugin_type)?;
    result?;

    for record in host.registry.plugins(Some(plugin_type)) {
        if record.is_enabled() {
            println!("Enabled plugin: {}/{}", plugin_type, record.name());
        }
    }
    Ok(())
}

async fn disable_plugins(host: &mut Host, plugin_type: &str, names: &[String]) -> Result<()> {
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let names = if names.is_empty() {
        None
    } else {
        Some(names.as_slice())
    };

    let result = host.registry.disable(plugin_type, names).await;
    host.persist(plugin_type)?;
    result?;

    println!("Disabled plugins of type '{}'", plugin_type);
    Ok(())
}

async fn update_plugin(
    host: &mut Host,
    plugin_type: &str,
    name: &str,
    from: Option<String>,
) -> Result<()> {
    let from = match from.or_else(|| host.state.version(plugin_type, name).map(str::to_string)) {
        Some(from) => from,
        None => anyhow::bail!(
            "No recorded version for {}/{}; pass --from <VERSION>",
            plugin_type,
            name
        ),
    };

    let updated = host.registry.update(plugin_type, name, &from).await?;
    let declared = host.registry.record(plugin_type, name)?.version().to_string();

    if record_baseline(&mut host.state, plugin_type, name, &declared, updated) {
        host.state.save(&host.state_path)?;
    }

    if updated {
        println!("Updated {}/{}: {} -> {}", plugin_type, name, from, declared);
    } else {
        println!("{}/{} is up to date ({})", plugin_type, name, declared);
    }
    Ok(())
}

async fn message_plugins(
    host: &mut Host,
    plugin_type: &str,
    names: Vec<String>,
    msg: &str,
    args: &[String],
) -> Result<()> {
    let selection = if names.is_empty() {
        Selection::of_type(plugin_type)
    } else {
        Selection::names(plugin_type, names)
    };
    let args: Vec<Value> = args.iter().map(String::as_str).map(parse_arg).collect();

    host.registry.message(selection, msg, &args).await?;
    println!("Sent '{}' to enabled plugins of type '{}'", msg, plugin_type);
    Ok(())
}

/// Record `declared` as the applied version when the update hook ran or no
/// baseline exists yet. A skipped downgrade keeps the newer baseline.
fn record_baseline(
    state: &mut RegistryState,
    plugin_type: &str,
    name: &str,
    declared: &str,
    updated: bool,
) -> bool {
    if !updated && state.version(plugin_type, name).is_some() {
        return false;
    }
    state.set_version(plugin_type, name, declared);
    true
}

/// JSON if the argument parses as JSON, otherwise a plain string
fn parse_arg(arg: &str) -> Value {
    serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string()))
}

async fn reload_plugin(host: &mut Host, plugin_type: &str, name: &str) -> Result<()> {
    let instance = host.registry.reload(plugin_type, name).await?;
    println!(
        "Plugin '{}/{}' reloaded (v{})",
        plugin_type,
        name,
        instance.version()
    );
    println!();
    println!("Note: the new code runs without re-running its enable hook.");
    Ok(())
}

fn list_types(config: &PlumaConfig) -> Result<()> {
    for t in &config.types {
        let title = if t.title.is_empty() { &t.name } else { &t.title };
        println!("{} ({})", t.name, title);
        if !t.description.is_empty() {
            println!("  {}", t.description);
        }
        for path in &t.paths {
            println!("  {}", path.display());
        }
    }
    Ok(())
}
