pub mod settings;

pub use settings::Settings;

use crate::models::{AppIdentity, BuildConfig, ProjectLayout, merge_config};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Configuration manager for the project's `capacitor.config.json`.
///
/// Every operation here fails softly: a malformed document is discarded with a
/// warning and a write failure is logged, because neither should abort provisioning.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager for the project described by `layout`.
    pub fn new(layout: &ProjectLayout) -> Self {
        Self {
            config_path: layout.config_file(),
        }
    }

    /// Path of the managed document
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    /// Read and parse the document.
    ///
    /// # Returns
    /// - `Ok(None)` if the file doesn't exist
    /// - `Err(_)` if it can't be read or isn't a JSON object
    pub fn load(&self) -> Result<Option<BuildConfig>> {
        if !self.config_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read build config: {}", self.config_path))?;

        let config: BuildConfig = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse build config: {}", self.config_path))?;

        tracing::debug!("Loaded build config from {}", self.config_path);
        Ok(Some(config))
    }

    /// Serialize the document with two-space indentation and write it out.
    pub fn save(&self, config: &BuildConfig) -> Result<()> {
        let mut json =
            serde_json::to_string_pretty(config).context("Failed to serialize build config")?;
        json.push('\n');

        fs::write(&self.config_path, json)
            .with_context(|| format!("Failed to write build config: {}", self.config_path))?;

        tracing::debug!("Saved build config to {}", self.config_path);
        Ok(())
    }

    /// First merge pass: apply the invocation's identity and fill in defaults.
    ///
    /// Creates the document if absent. Returns the merged document even when it
    /// could not be written.
    pub fn merge_and_save(&self, identity: &AppIdentity) -> BuildConfig {
        let existing = match self.load() {
            Ok(existing) => existing,
            Err(e) => {
                tracing::warn!("Build config is malformed, starting from a new one: {:#}", e);
                None
            }
        };

        let merged = merge_config(existing, identity);

        match self.save(&merged) {
            Ok(()) => tracing::info!(
                "Updated build config: appId={}, appName={}",
                identity.app_id,
                identity.app_name
            ),
            Err(e) => tracing::warn!("Could not write build config: {:#}", e),
        }

        merged
    }

    /// Second merge pass: force `webDir` to the canonical web directory.
    ///
    /// Only touches an existing, well-formed document. Returns `true` if the
    /// document on disk now carries the canonical value.
    pub fn normalize_web_dir(&self) -> bool {
        let mut config = match self.load() {
            Ok(Some(config)) => config,
            Ok(None) => {
                tracing::warn!("No build config at {}, skipping webDir update", self.config_path);
                return false;
            }
            Err(e) => {
                tracing::warn!("Could not update webDir: {:#}", e);
                return false;
            }
        };

        if let Some(previous) = config.normalize_web_dir() {
            tracing::info!("Overriding webDir {} with the canonical web directory", previous);
        }

        match self.save(&config) {
            Ok(()) => {
                tracing::info!("webDir set to '{}'", crate::models::layout::WEB_DIR);
                true
            }
            Err(e) => {
                tracing::warn!("Could not update webDir: {:#}", e);
                false
            }
        }
    }
}
