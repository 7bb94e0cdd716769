//! The end-to-end conversion run.
//!
//! Order: environment probe, config merge, loader page, provisioning, sync,
//! icons, then (unless skipped or declined) the build. Only a failed platform
//! add stops the run early.

use anyhow::Result;
use camino::Utf8PathBuf;
use url::Url;

use crate::config::{ConfigManager, Settings};
use crate::models::{AppIdentity, BuildResult, IconSpec, ProjectLayout};
use crate::services::{
    probe_environment, write_loader_page, BuildDriver, Confirm, EnvSource, EnvironmentReport,
    IconEngine, IconReport, ProcessRunner, ProjectSetup, SetupReport, StepOutcome, locate_icon,
};
use crate::state::{FsProbe, SetupState};

/// Prompt shown before the build starts
pub const BUILD_PROMPT: &str = "Project is ready. Build the APK now?";

/// Inputs of one run, already validated
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub url: Url,
    pub identity: AppIdentity,
    /// Explicit icon; `None` means look one up in the project root
    pub icon: Option<Utf8PathBuf>,
    pub skip_build: bool,
}

/// Where the run stopped
#[derive(Debug)]
pub enum PipelineOutcome {
    /// `--skip-build`: provisioning done, no build attempted
    SetupOnly,
    /// The operator declined the build prompt
    BuildDeclined,
    /// The build ran; success or not is inside the result
    Built(BuildResult),
}

#[derive(Debug)]
pub struct PipelineReport {
    pub environment: EnvironmentReport,
    /// Writing `public/index.html`; a failure here is recorded, not raised
    pub loader_page: StepOutcome,
    pub setup: SetupReport,
    /// `None` when no icon was found or the resource directory is missing
    pub icons: Option<IconReport>,
    pub outcome: PipelineOutcome,
}

/// Runs the whole conversion against one project directory
pub struct Pipeline<'a, R, C, E>
where
    R: ProcessRunner,
    C: Confirm,
    E: EnvSource,
{
    runner: &'a R,
    confirm: &'a C,
    env: &'a E,
    settings: &'a Settings,
    layout: &'a ProjectLayout,
    icons: IconEngine,
}

impl<'a, R, C, E> Pipeline<'a, R, C, E>
where
    R: ProcessRunner,
    C: Confirm,
    E: EnvSource,
{
    pub fn new(
        runner: &'a R,
        confirm: &'a C,
        env: &'a E,
        settings: &'a Settings,
        layout: &'a ProjectLayout,
    ) -> Self {
        Self {
            runner,
            confirm,
            env,
            settings,
            layout,
            icons: IconEngine::new(),
        }
    }

    /// Replace the default icon engine
    pub fn with_icon_engine(mut self, icons: IconEngine) -> Self {
        self.icons = icons;
        self
    }

    /// Execute the run.
    ///
    /// # Errors
    /// A fatal provisioning failure ([`crate::services::SetupError`]). Build
    /// failures are not errors; they are reported through [`PipelineOutcome::Built`].
    pub async fn run(&self, request: &PipelineRequest) -> Result<PipelineReport> {
        let root = self.layout.root();

        let environment = probe_environment(self.env, self.runner, &self.settings.java, root).await;

        ConfigManager::new(self.layout).merge_and_save(&request.identity);
        let loader_page = match write_loader_page(self.layout, &request.url, &request.identity.app_name) {
            Ok(_) => StepOutcome::Done,
            Err(e) => {
                tracing::warn!("Could not write the loader page: {:#}", e);
                StepOutcome::Failed(format!("{:#}", e))
            }
        };

        let state = SetupState::inspect(&FsProbe::new(root));
        let setup = ProjectSetup::new(self.runner, self.layout, self.settings, &request.identity)
            .run(&state)
            .await?;

        let driver = BuildDriver::new(self.runner, self.layout, self.settings);
        driver.sync().await;

        let icons = self.generate_icons(request.icon.as_ref());

        if request.skip_build {
            tracing::info!("Skipping build as requested");
            return Ok(PipelineReport {
                environment,
                loader_page,
                setup,
                icons,
                outcome: PipelineOutcome::SetupOnly,
            });
        }

        if !self.confirm.confirm(BUILD_PROMPT).await {
            tracing::info!("Build declined");
            return Ok(PipelineReport {
                environment,
                loader_page,
                setup,
                icons,
                outcome: PipelineOutcome::BuildDeclined,
            });
        }

        // Gradle output goes straight to the console, not through the log formatter
        let result = driver.build(&mut |line: &str| println!("{}", line)).await;

        Ok(PipelineReport {
            environment,
            loader_page,
            setup,
            icons,
            outcome: PipelineOutcome::Built(result),
        })
    }

    fn generate_icons(&self, explicit: Option<&Utf8PathBuf>) -> Option<IconReport> {
        let source = match explicit {
            Some(path) if path.is_file() => path.clone(),
            Some(path) => {
                tracing::warn!("Icon file not found: {}, keeping default icons", path);
                return None;
            }
            None => match locate_icon(self.layout.root()) {
                Some(path) => path,
                None => {
                    tracing::warn!("No icon file found, keeping default icons");
                    return None;
                }
            },
        };

        let res_dir = self.layout.icon_res_dir();
        if !res_dir.is_dir() {
            tracing::warn!("Icon resource directory missing: {}", res_dir);
            return None;
        }

        tracing::info!("Generating icons from {}", source);
        let report = self.icons.render_icon_set(&IconSpec::new(source), &res_dir);
        if !report.is_complete() {
            tracing::warn!(
                "{} of {} icon sizes could not be generated",
                report.failures.len(),
                report.failures.len() + report.completed.len()
            );
        }
        Some(report)
    }
}
