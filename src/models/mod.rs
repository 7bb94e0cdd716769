//! Data models for web2apk.
//!
//! This module contains the core data structures used throughout the pipeline:
//! - [`BuildConfig`]: The ordered `capacitor.config.json` document and its merge rules
//! - [`AppIdentity`]: The app id, app name and web directory supplied per invocation
//! - [`IconSpec`]: A source icon plus the [`DENSITY_BUCKETS`] it must be rendered into
//! - [`BuildResult`]: The outcome of one build wrapper invocation
//! - [`ProjectLayout`]: Fixed file and directory locations inside the scaffolded project
//!
//! # Architecture Note
//!
//! None of these types are persisted by the tool itself except [`BuildConfig`],
//! which lives on disk as the project's single source of identity. Everything
//! else is derived fresh on each run.

pub mod build;
pub mod config;
pub mod icon;
pub mod layout;

pub use build::{BuildOutcome, BuildResult};
pub use config::{AppIdentity, BuildConfig, merge_config};
pub use icon::{DENSITY_BUCKETS, DensityBucket, IconFormat, IconSpec};
pub use layout::ProjectLayout;
