//! Command line surface: argument definitions, URL validation and app name derivation.

use camino::Utf8PathBuf;
use clap::Parser;
use thiserror::Error;
use url::Url;

use crate::config::Settings;
use crate::models::AppIdentity;

/// Convert a website into an Android APK through a Capacitor webview project
#[derive(Parser, Debug, Clone)]
#[command(name = "web2apk", version, about)]
pub struct Cli {
    /// Website URL to wrap, e.g. https://example.com
    pub url: String,

    /// Application id (reverse-domain); defaults to the configured default app id
    #[arg(long, value_name = "ID")]
    pub app_id: Option<String>,

    /// Application name; derived from the URL host when omitted
    #[arg(long, value_name = "NAME")]
    pub app_name: Option<String>,

    /// Icon file; otherwise a file with "icon" in its name is looked up in the project directory
    #[arg(long, value_name = "PATH")]
    pub icon: Option<Utf8PathBuf>,

    /// Stop after provisioning, without building the APK
    #[arg(long)]
    pub skip_build: bool,

    /// Verbose logging and full error chains
    #[arg(long)]
    pub debug: bool,

    /// Project directory to provision
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub project_dir: Utf8PathBuf,

    /// Build without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

/// Invalid command line input
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Invalid URL '{input}': {source}")]
    Malformed {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid URL '{0}': a scheme and host are required")]
    MissingHost(String),
}

/// Parse `input` and require a scheme and a non-empty host.
pub fn validate_url(input: &str) -> Result<Url, InputError> {
    let url = Url::parse(input.trim()).map_err(|source| InputError::Malformed {
        input: input.to_string(),
        source,
    })?;

    match url.host_str() {
        Some(host) if !host.is_empty() && !url.scheme().is_empty() => Ok(url),
        _ => Err(InputError::MissingHost(input.to_string())),
    }
}

/// App name from the URL host: leading `www.` stripped, dots replaced by hyphens.
///
/// The port is not part of the name.
pub fn derive_app_name(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);
    host.replace('.', "-")
}

impl Cli {
    /// Identity for this invocation: flags first, then settings, then derived values
    pub fn identity(&self, url: &Url, settings: &Settings) -> AppIdentity {
        let app_id = self
            .app_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| settings.default_app_id.clone());
        let app_name = self
            .app_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| derive_app_name(url));

        AppIdentity::new(app_id, app_name)
    }
}
