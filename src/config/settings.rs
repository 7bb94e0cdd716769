//! Operator settings for the tool itself (not the scaffolded project).
//!
//! Layered with the `config` crate, later sources winning:
//! 1. Built-in defaults
//! 2. `web2apk.yaml` in the project root (optional)
//! 3. `WEB2APK_*` environment variables, e.g. `WEB2APK_NPM=pnpm`

use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Settings file looked up in the project root
pub const SETTINGS_FILE: &str = "web2apk.yaml";

/// Fallback application id when neither the CLI nor the settings provide one
pub const DEFAULT_APP_ID: &str = "com.example.webapp";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Application id used when `--app-id` is not given
    pub default_app_id: String,

    /// npm executable
    pub npm: String,

    /// npx executable (runs the Capacitor CLI)
    pub npx: String,

    /// Java executable queried for its version
    pub java: String,

    /// Packages installed on every run
    pub capacitor_packages: Vec<String>,

    /// Platform package reinstalled before `cap add`
    pub platform_package: String,

    /// Log directory, relative to the project root unless absolute
    pub log_dir: Utf8PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let (npm, npx) = if cfg!(target_os = "windows") {
            ("npm.cmd", "npx.cmd")
        } else {
            ("npm", "npx")
        };

        Self {
            default_app_id: DEFAULT_APP_ID.to_string(),
            npm: npm.to_string(),
            npx: npx.to_string(),
            java: "java".to_string(),
            capacitor_packages: vec![
                "@capacitor/core".to_string(),
                "@capacitor/cli".to_string(),
                "@capacitor/android".to_string(),
            ],
            platform_package: "@capacitor/android".to_string(),
            log_dir: Utf8PathBuf::from(".web2apk").join("logs"),
        }
    }
}

impl Settings {
    /// Load layered settings, reporting source errors.
    ///
    /// Callers treat an error as a warning and fall back to [`Settings::default`].
    pub fn try_load(project_root: &Utf8Path) -> Result<Self, config::ConfigError> {
        let path = project_root.join(SETTINGS_FILE);

        let settings: Settings = Config::builder()
            .add_source(File::from(path.as_std_path()).required(false))
            .add_source(Environment::with_prefix("WEB2APK").try_parsing(false))
            .build()?
            .try_deserialize()?;

        tracing::debug!("Loaded settings (settings file present: {})", path.exists());
        Ok(settings)
    }

    /// Absolute log directory for a project
    pub fn log_dir_in(&self, project_root: &Utf8Path) -> Utf8PathBuf {
        if self.log_dir.is_absolute() {
            self.log_dir.clone()
        } else {
            project_root.join(&self.log_dir)
        }
    }
}
