//! Android build driver: runs the Gradle wrapper and locates the debug APK.

use camino::{Utf8Path, Utf8PathBuf};
use std::time::Instant;

use super::process::{Invocation, ProcessRunner};
use super::setup::{soft_outcome, StepOutcome};
use crate::config::Settings;
use crate::models::{BuildOutcome, BuildResult, ProjectLayout};

/// Gradle task producing the debug APK
pub const BUILD_TASK: &str = "assembleDebug";

const GRADLEW_UNIX: &str = "gradlew";
const GRADLEW_WINDOWS: &str = "gradlew.bat";

/// Pick the Gradle wrapper for this host inside `platform_dir`.
///
/// Prefers the host's native script and falls back to the other one when only
/// that exists. Returns the native name when neither exists so the spawn error
/// names the expected file.
pub fn resolve_gradle_wrapper(platform_dir: &Utf8Path) -> Utf8PathBuf {
    let (native, other) = if cfg!(target_os = "windows") {
        (GRADLEW_WINDOWS, GRADLEW_UNIX)
    } else {
        (GRADLEW_UNIX, GRADLEW_WINDOWS)
    };

    let native = platform_dir.join(native);
    if native.exists() {
        return native;
    }

    let other = platform_dir.join(other);
    if other.exists() {
        tracing::debug!("Native Gradle wrapper missing, using {}", other);
        return other;
    }

    native
}

#[cfg(unix)]
fn ensure_executable(path: &Utf8Path) {
    use std::os::unix::fs::PermissionsExt;

    let Ok(metadata) = std::fs::metadata(path) else {
        return;
    };
    let mut permissions = metadata.permissions();
    if permissions.mode() & 0o111 == 0 {
        permissions.set_mode(permissions.mode() | 0o755);
        if let Err(e) = std::fs::set_permissions(path, permissions) {
            tracing::warn!("Could not mark {} executable: {}", path, e);
        }
    }
}

#[cfg(not(unix))]
fn ensure_executable(_path: &Utf8Path) {}

/// Drives `cap sync` and the Gradle debug build for one project
pub struct BuildDriver<'a, R: ProcessRunner> {
    runner: &'a R,
    layout: &'a ProjectLayout,
    settings: &'a Settings,
}

impl<'a, R: ProcessRunner> BuildDriver<'a, R> {
    pub fn new(runner: &'a R, layout: &'a ProjectLayout, settings: &'a Settings) -> Self {
        Self {
            runner,
            layout,
            settings,
        }
    }

    /// Sync web assets into the platform project. Never fatal.
    pub async fn sync(&self) -> StepOutcome {
        let invocation = Invocation::new(&self.settings.npx, self.layout.root()).args(["cap", "sync"]);
        tracing::info!("Syncing web assets...");
        let outcome = soft_outcome(&invocation, self.runner.run(&invocation).await);
        if let StepOutcome::Failed(reason) = &outcome {
            tracing::warn!("Sync failed: {}", reason);
        }
        outcome
    }

    /// Build the debug APK.
    ///
    /// Each stdout line of the build is handed to `on_line` as it arrives. All
    /// failure modes are folded into the returned [`BuildOutcome`].
    pub async fn build(&self, on_line: &mut dyn FnMut(&str)) -> BuildResult {
        let platform_dir = self.layout.platform_dir();
        if !platform_dir.is_dir() {
            tracing::error!("Platform directory not found: {}", platform_dir);
            return BuildResult::new(BuildOutcome::PlatformMissing {
                expected: platform_dir,
            });
        }

        self.sync().await;

        let wrapper = resolve_gradle_wrapper(&platform_dir);
        ensure_executable(&wrapper);

        let invocation = Invocation::new(wrapper.as_str(), &platform_dir).arg(BUILD_TASK);
        tracing::info!("Building APK: {}", invocation);

        let start = Instant::now();
        let result = self.runner.run_streaming(&invocation, on_line).await;
        let duration = start.elapsed();

        let (outcome, diagnostics) = match result {
            Ok(output) if output.success() => {
                let artifact = self.layout.debug_artifact();
                let outcome = if artifact.is_file() {
                    tracing::info!("APK built: {}", artifact);
                    BuildOutcome::Succeeded { artifact }
                } else {
                    tracing::warn!("Build finished but no APK at {}", artifact);
                    BuildOutcome::ArtifactMissing { expected: artifact }
                };
                (outcome, output.stderr)
            }
            Ok(output) => {
                tracing::error!("Build failed with exit code {:?}", output.exit_code);
                if !output.stderr.is_empty() {
                    tracing::error!("Build diagnostics:\n{}", output.stderr);
                }
                (
                    BuildOutcome::Failed {
                        exit_code: output.exit_code,
                    },
                    output.stderr,
                )
            }
            Err(e) => {
                tracing::error!("Build could not run: {}", e);
                (
                    BuildOutcome::Crashed {
                        message: e.to_string(),
                    },
                    String::new(),
                )
            }
        };

        tracing::info!("Build took {:.1}s", duration.as_secs_f32());

        BuildResult {
            outcome,
            diagnostics,
            duration,
        }
    }
}
