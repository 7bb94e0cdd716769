use camino::Utf8PathBuf;
use std::time::Duration;

/// How a build invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Exit status zero and the artifact exists
    Succeeded { artifact: Utf8PathBuf },

    /// Exit status zero but the expected artifact is not on disk
    ArtifactMissing { expected: Utf8PathBuf },

    /// The build wrapper exited non-zero (or was killed by a signal)
    Failed { exit_code: Option<i32> },

    /// Spawning or talking to the child process failed
    Crashed { message: String },

    /// The platform project directory does not exist; nothing was invoked
    PlatformMissing { expected: Utf8PathBuf },
}

/// Result of a single build invocation. Not persisted.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub outcome: BuildOutcome,
    /// Captured diagnostic (stderr) stream of the build wrapper
    pub diagnostics: String,
    pub duration: Duration,
}

impl BuildResult {
    pub fn new(outcome: BuildOutcome) -> Self {
        Self {
            outcome,
            diagnostics: String::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, BuildOutcome::Succeeded { .. })
    }

    pub fn artifact(&self) -> Option<&Utf8PathBuf> {
        match &self.outcome {
            BuildOutcome::Succeeded { artifact } => Some(artifact),
            _ => None,
        }
    }

    /// Operator guidance for an unsuccessful build
    pub fn remediation_hints(&self) -> Vec<&'static str> {
        match self.outcome {
            BuildOutcome::Succeeded { .. } => Vec::new(),
            BuildOutcome::ArtifactMissing { .. } => vec![
                "Check the build output above, or look for the APK under android/app/build/outputs",
            ],
            BuildOutcome::PlatformMissing { .. } => vec![
                "Run the tool again without --skip-build so the Android platform gets added",
            ],
            BuildOutcome::Failed { .. } | BuildOutcome::Crashed { .. } => vec![
                "Make sure ANDROID_HOME points at an Android SDK",
                "Make sure JAVA_HOME points at a supported JDK",
                "Make sure the SDK has the required build tools installed",
                "Check the network connection so Gradle can download dependencies",
            ],
        }
    }
}
