//! Manifest discovery and parsing

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use pluma_plugin_api::PluginManifest;

use super::error::ManifestError;

/// Finds and reads plugin manifests
#[async_trait]
pub trait ManifestSource: Send + Sync {
    /// All manifest files under the given roots, in deterministic order
    async fn scan(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>, ManifestError>;

    /// Parse one manifest file, applying defaults for missing fields
    async fn parse(&self, path: &Path) -> Result<PluginManifest, ManifestError>;
}

/// Scans roots with `<root>/**/<manifest_file>` glob patterns
///
/// Files ending in `.json` are parsed as JSON, everything else as TOML.
#[derive(Debug, Clone)]
pub struct GlobManifestSource {
    manifest_file: String,
}

impl GlobManifestSource {
    pub fn new(manifest_file: impl Into<String>) -> Self {
        Self {
            manifest_file: manifest_file.into(),
        }
    }

    pub fn manifest_file(&self) -> &str {
        &self.manifest_file
    }

    fn pattern(&self, root: &Path) -> String {
        let root = glob::Pattern::escape(&root.to_string_lossy());
        format!("{}/**/{}", root.trim_end_matches('/'), self.manifest_file)
    }
}

#[async_trait]
impl ManifestSource for GlobManifestSource {
    async fn scan(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>, ManifestError> {
        let patterns: Vec<String> = roots.iter().map(|root| self.pattern(root)).collect();

        let found = tokio::task::spawn_blocking(move || -> Result<Vec<PathBuf>, ManifestError> {
            let mut found = Vec::new();
            for pattern in patterns {
                let mut matches = Vec::new();
                for entry in glob::glob(&pattern)? {
                    let path = entry?;
                    if path.is_file() {
                        matches.push(path);
                    }
                }
                matches.sort();
                found.extend(matches);
            }
            Ok(found)
        })
        .await??;

        tracing::debug!(count = found.len(), "Scanned for manifests");
        Ok(found)
    }

    async fn parse(&self, path: &Path) -> Result<PluginManifest, ManifestError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ManifestError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed: Result<PluginManifest, String> = if is_json {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str(&content).map_err(|e| e.to_string())
        };

        parsed.map_err(|message| ManifestError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }
}
