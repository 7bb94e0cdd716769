// web2apk - turn a website URL into an Android APK
//
// This is the library crate containing the provisioning pipeline and its services.
// The binary crate (main.rs) provides the command line entry point.

pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{ConfigManager, Settings};
pub use models::{AppIdentity, BuildConfig, BuildOutcome, BuildResult, ProjectLayout};
pub use pipeline::{Pipeline, PipelineOutcome, PipelineReport, PipelineRequest};
pub use state::SetupState;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
