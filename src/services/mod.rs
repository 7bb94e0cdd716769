//! Services module - the side-effecting steps of a conversion run.
//!
//! Everything that spawns a tool or writes into the project lives here. The
//! services only reach external programs through [`ProcessRunner`], so their
//! failure policy can be tested with a scripted runner.
//!
//! # Components
//!
//! - [`process`]: [`Invocation`], [`ProcessRunner`] and the tokio-backed [`SystemRunner`]
//! - [`environment`]: SDK variable and Java version diagnostics (never fatal)
//! - [`loader_page`]: renders the `index.html` that frames the target URL
//! - [`setup`]: the guarded provisioning steps ([`ProjectSetup`])
//! - [`icons`]: icon discovery and per-density launcher icon generation
//! - [`build`]: `cap sync` plus the Gradle debug build ([`BuildDriver`])
//! - [`confirm`]: operator confirmation before the build

pub mod build;
pub mod confirm;
pub mod environment;
pub mod icons;
pub mod loader_page;
pub mod process;
pub mod setup;

pub use build::BuildDriver;
pub use confirm::{AutoConfirm, Confirm, TerminalConfirm};
pub use environment::{probe_environment, EnvSource, EnvironmentReport, ProcessEnv};
pub use icons::{locate_icon, IconEngine, IconReport};
pub use loader_page::write_loader_page;
pub use process::{Invocation, ProcessError, ProcessOutput, ProcessRunner, SystemRunner};
pub use setup::{ProjectSetup, SetupError, SetupReport, SetupStep, StepOutcome};
