//! Native plugin loading via `libloading`

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use libloading::Library;
use pluma_plugin_api::{API_VERSION, Plugin, PluginError};
use serde_json::Value;
use uuid::Uuid;

use super::error::LoadError;
use super::loader::PluginLoader;
use super::record::PluginRecord;

/// A plugin instance together with the library its code lives in
///
/// Field order matters: the instance must drop before the library is unloaded.
struct LibraryPlugin {
    instance: Box<dyn Plugin>,
    _library: Library,
}

#[async_trait]
impl Plugin for LibraryPlugin {
    async fn enable(&mut self) -> Result<(), PluginError> {
        self.instance.enable().await
    }

    async fn disable(&mut self) -> Result<(), PluginError> {
        self.instance.disable().await
    }

    async fn update(&mut self, from: &str, to: &str) -> Result<(), PluginError> {
        self.instance.update(from, to).await
    }

    async fn message(&mut self, msg: &str, args: &[Value]) -> Result<(), PluginError> {
        self.instance.message(msg, args).await
    }
}

/// Loads plugins from native libraries built with `export_plugin!`
///
/// The library for a record is `<dir>/<main>.<ext>` or `<dir>/lib<main>.<ext>`.
///
/// Each load opens a private copy of the library, so `reload` and a later
/// `enable` see the code currently on disk.
#[derive(Debug, Clone)]
pub struct DylibLoader {
    shadow_copy: bool,
}

impl Default for DylibLoader {
    fn default() -> Self {
        Self { shadow_copy: true }
    }
}

impl DylibLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn shadow copies off and open the library in place
    ///
    /// Without them the dynamic linker hands back the mapping it already
    /// holds while any instance is alive, so rebuilt code is not picked up.
    pub fn with_shadow_copy(mut self, shadow_copy: bool) -> Self {
        self.shadow_copy = shadow_copy;
        self
    }

    fn find_library(&self, dir: &Path, main: &str) -> Result<PathBuf, LoadError> {
        // Look for <main>.so (or .dylib on macOS, .dll on Windows)
        let extensions = if cfg!(target_os = "macos") {
            vec!["dylib", "so"]
        } else if cfg!(target_os = "windows") {
            vec!["dll"]
        } else {
            vec!["so"]
        };

        for ext in extensions {
            let lib_path = dir.join(format!("{}.{}", main, ext));
            if lib_path.exists() {
                return Ok(lib_path);
            }

            // Also try lib<main>.<ext> format
            let lib_path = dir.join(format!("lib{}.{}", main, ext));
            if lib_path.exists() {
                return Ok(lib_path);
            }
        }

        Err(LoadError::LibraryNotFound {
            dir: dir.to_path_buf(),
            main: main.to_string(),
        })
    }

    async fn shadow(&self, lib_path: &Path) -> Result<PathBuf, LoadError> {
        let file_name = lib_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let copy = std::env::temp_dir().join(format!("pluma-{}-{}", Uuid::new_v4(), file_name));
        tokio::fs::copy(lib_path, &copy).await?;
        Ok(copy)
    }

    fn open(&self, lib_path: &Path) -> Result<Box<dyn Plugin>, LoadError> {
        // SAFETY: the library was placed in a plugin directory the host
        // registered and is expected to follow the export_plugin! contract.
        let library = unsafe { Library::new(lib_path)? };

        // SAFETY: calling a C function exported by the plugin.
        let api_version_fn: libloading::Symbol<extern "C" fn() -> u32> =
            unsafe { library.get(b"_pluma_plugin_api_version")? };

        let plugin_api_version = api_version_fn();
        if plugin_api_version != API_VERSION {
            return Err(LoadError::ApiVersionMismatch {
                expected: API_VERSION,
                found: plugin_api_version,
            });
        }

        // SAFETY: the create function returns a pointer produced by Box::into_raw.
        let create_fn: libloading::Symbol<extern "C" fn() -> *mut dyn Plugin> =
            unsafe { library.get(b"_pluma_plugin_create")? };

        let instance = unsafe { Box::from_raw(create_fn()) };

        Ok(Box::new(LibraryPlugin {
            instance,
            _library: library,
        }))
    }
}

#[async_trait]
impl PluginLoader for DylibLoader {
    async fn load(&self, record: &PluginRecord) -> Result<Box<dyn Plugin>, LoadError> {
        let lib_path = self.find_library(record.path(), &record.manifest().main)?;

        if !self.shadow_copy {
            tracing::debug!(plugin = %record.name(), path = %lib_path.display(), "Loading plugin library");
            return self.open(&lib_path);
        }

        let copy = self.shadow(&lib_path).await?;
        tracing::debug!(plugin = %record.name(), path = %copy.display(), "Loading shadow copy");
        let result = self.open(&copy);

        // The mapping stays valid after unlinking on unix
        #[cfg(unix)]
        if let Err(e) = tokio::fs::remove_file(&copy).await {
            tracing::warn!(path = %copy.display(), error = %e, "Failed to remove shadow copy");
        }

        result
    }
}
