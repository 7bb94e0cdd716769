use std::fmt;
use std::fs;
use thiserror::Error;

use super::process::{Invocation, ProcessError, ProcessRunner};
use crate::config::{ConfigManager, Settings};
use crate::models::layout::{PLATFORM_NAME, WEB_DIR};
use crate::models::{AppIdentity, ProjectLayout};
use crate::state::SetupState;

/// Provisioning steps, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    /// `npm init -y` when `package.json` is missing
    Manifest,
    /// `npm install --save` of the Capacitor packages, every run
    Dependencies,
    /// `npx cap init` when the build config is missing
    ProjectInit,
    /// Create the canonical web directory
    WebDir,
    /// Force `webDir` to the canonical value
    WebDirConfig,
    /// Reinstall the platform package and `npx cap add android`
    Platform,
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SetupStep::Manifest => "package manifest",
            SetupStep::Dependencies => "dependency installation",
            SetupStep::ProjectInit => "project initialization",
            SetupStep::WebDir => "web directory",
            SetupStep::WebDirConfig => "webDir normalization",
            SetupStep::Platform => "android platform",
        };
        write!(f, "{}", name)
    }
}

/// How a single step ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The side effect ran and succeeded
    Done,
    /// The guarded state was already present; nothing ran
    AlreadyPresent,
    /// The step failed softly; the pipeline carried on
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub step: SetupStep,
    pub outcome: StepOutcome,
}

/// Everything the orchestrator did, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    pub steps: Vec<StepRecord>,
}

impl SetupReport {
    fn record(&mut self, step: SetupStep, outcome: StepOutcome) {
        match &outcome {
            StepOutcome::Done => tracing::info!("{}: done", step),
            StepOutcome::AlreadyPresent => tracing::info!("{}: already present, skipping", step),
            StepOutcome::Failed(reason) => tracing::warn!("{}: {}", step, reason),
        }
        self.steps.push(StepRecord { step, outcome });
    }

    pub fn outcome(&self, step: SetupStep) -> Option<&StepOutcome> {
        self.steps.iter().find(|r| r.step == step).map(|r| &r.outcome)
    }

    pub fn soft_failures(&self) -> usize {
        self.steps
            .iter()
            .filter(|r| matches!(r.outcome, StepOutcome::Failed(_)))
            .count()
    }
}

/// Fatal provisioning errors
#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Failed to add the {platform} platform: {reason}")]
    PlatformAdd { platform: String, reason: String },
}

/// Sequences the provisioning steps against a state snapshot.
///
/// Every step except the platform add is fault-tolerant: failures are logged
/// and recorded, and the next step runs anyway.
pub struct ProjectSetup<'a, R: ProcessRunner> {
    runner: &'a R,
    layout: &'a ProjectLayout,
    settings: &'a Settings,
    identity: &'a AppIdentity,
}

impl<'a, R: ProcessRunner> ProjectSetup<'a, R> {
    pub fn new(
        runner: &'a R,
        layout: &'a ProjectLayout,
        settings: &'a Settings,
        identity: &'a AppIdentity,
    ) -> Self {
        Self {
            runner,
            layout,
            settings,
            identity,
        }
    }

    /// Run every step in order.
    ///
    /// # Errors
    /// Only [`SetupError::PlatformAdd`]: without the platform directory neither
    /// icon injection nor the build can succeed.
    pub async fn run(&self, state: &SetupState) -> Result<SetupReport, SetupError> {
        let mut report = SetupReport::default();

        // 1. Manifest
        let outcome = if state.has_manifest {
            StepOutcome::AlreadyPresent
        } else {
            tracing::info!("Creating package.json...");
            self.soft(self.npm(["init", "-y"])).await
        };
        report.record(SetupStep::Manifest, outcome);

        // 2. Dependencies (not state-guarded)
        tracing::info!("Installing Capacitor dependencies...");
        let install = self
            .npm(["install", "--save"])
            .args(self.settings.capacitor_packages.iter().cloned());
        let outcome = self.soft(install).await;
        report.record(SetupStep::Dependencies, outcome);

        // 3. Project initializer
        let outcome = if state.has_config {
            StepOutcome::AlreadyPresent
        } else {
            tracing::info!("Initializing Capacitor project...");
            let init = self.npx(["cap", "init"]).args([
                self.identity.app_id.as_str(),
                self.identity.app_name.as_str(),
                "--web-dir",
                WEB_DIR,
            ]);
            self.soft(init).await
        };
        report.record(SetupStep::ProjectInit, outcome);

        // 4. Web directory
        let outcome = if state.has_web_dir {
            StepOutcome::AlreadyPresent
        } else {
            let web_dir = self.layout.web_dir();
            match fs::create_dir_all(&web_dir) {
                Ok(()) => StepOutcome::Done,
                Err(e) => StepOutcome::Failed(format!("could not create {}: {}", web_dir, e)),
            }
        };
        report.record(SetupStep::WebDir, outcome);

        // 5. webDir normalization (always overrides)
        let outcome = if ConfigManager::new(self.layout).normalize_web_dir() {
            StepOutcome::Done
        } else {
            StepOutcome::Failed("webDir could not be updated".to_string())
        };
        report.record(SetupStep::WebDirConfig, outcome);

        // 6. Platform
        if state.has_platform {
            report.record(SetupStep::Platform, StepOutcome::AlreadyPresent);
        } else {
            tracing::info!("Adding {} platform...", PLATFORM_NAME);

            let reinstall = self
                .npm(["install", "--save"])
                .arg(self.settings.platform_package.clone());
            if let StepOutcome::Failed(reason) = self.soft(reinstall).await {
                tracing::warn!("Reinstalling {} failed: {}", self.settings.platform_package, reason);
            }

            let add = self.npx(["cap", "add", PLATFORM_NAME]);
            match self.runner.run(&add).await {
                Ok(output) if output.success() => {
                    report.record(SetupStep::Platform, StepOutcome::Done);
                }
                Ok(output) => {
                    let reason = match output.stderr_tail() {
                        Some(tail) => format!("{} exited with {:?}: {}", add, output.exit_code, tail),
                        None => format!("{} exited with {:?}", add, output.exit_code),
                    };
                    tracing::error!("{}", reason);
                    return Err(SetupError::PlatformAdd {
                        platform: PLATFORM_NAME.to_string(),
                        reason,
                    });
                }
                Err(e) => {
                    tracing::error!("{} failed: {}", add, e);
                    return Err(SetupError::PlatformAdd {
                        platform: PLATFORM_NAME.to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(report)
    }

    fn npm<const N: usize>(&self, args: [&str; N]) -> Invocation {
        Invocation::new(&self.settings.npm, self.layout.root()).args(args)
    }

    fn npx<const N: usize>(&self, args: [&str; N]) -> Invocation {
        Invocation::new(&self.settings.npx, self.layout.root()).args(args)
    }

    /// Run an invocation whose failure must not stop the pipeline
    async fn soft(&self, invocation: Invocation) -> StepOutcome {
        soft_outcome(&invocation, self.runner.run(&invocation).await)
    }
}

/// Map a process result onto a non-fatal step outcome
pub fn soft_outcome(
    invocation: &Invocation,
    result: Result<super::process::ProcessOutput, ProcessError>,
) -> StepOutcome {
    match result {
        Ok(output) if output.success() => StepOutcome::Done,
        Ok(output) => {
            if !output.stderr.is_empty() {
                tracing::debug!("{} stderr:\n{}", invocation, output.stderr);
            }
            StepOutcome::Failed(match output.stderr_tail() {
                Some(tail) => format!("{} exited with {:?}: {}", invocation, output.exit_code, tail),
                None => format!("{} exited with {:?}", invocation, output.exit_code),
            })
        }
        Err(e) => StepOutcome::Failed(e.to_string()),
    }
}
