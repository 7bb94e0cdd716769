//! Build environment diagnostics.
//!
//! Nothing in here can fail the run: every problem becomes a warning string.

use super::process::{Invocation, ProcessRunner};
use camino::Utf8Path;
use regex::Regex;
use std::sync::LazyLock;

/// SDK location variables the Android build relies on
pub const SDK_ENV_VARS: [&str; 2] = ["ANDROID_HOME", "JAVA_HOME"];

static JAVA_VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"version\s+"([^"]+)""#).expect("Invalid java version regex"));

/// Source of environment variables
#[cfg_attr(test, mockall::automock)]
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// [`EnvSource`] reading the process environment
#[derive(Debug, Clone, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Findings of one environment probe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentReport {
    /// Every probed variable with its value, if set
    pub variables: Vec<(String, Option<String>)>,
    pub java_version: Option<String>,
    pub warnings: Vec<String>,
}

impl EnvironmentReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Extract the quoted version token from `java -version` output
pub fn parse_java_version(output: &str) -> Option<String> {
    JAVA_VERSION_PATTERN
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Check SDK variables and the installed Java version.
pub async fn probe_environment<E, R>(
    env: &E,
    runner: &R,
    java: &str,
    working_dir: &Utf8Path,
) -> EnvironmentReport
where
    E: EnvSource,
    R: ProcessRunner,
{
    let mut report = EnvironmentReport::default();

    for key in SDK_ENV_VARS {
        let value = env.var(key);
        match &value {
            Some(v) => tracing::info!("{}: {}", key, v),
            None => {
                let warning = format!("{} is not set; the build may fail", key);
                tracing::warn!("{}", warning);
                report.warnings.push(warning);
            }
        }
        report.variables.push((key.to_string(), value));
    }

    // java prints its version banner on stderr
    let invocation = Invocation::new(java, working_dir).arg("-version");
    let version = match runner.run(&invocation).await {
        Ok(output) => parse_java_version(&output.stderr).or_else(|| parse_java_version(&output.stdout)),
        Err(e) => {
            tracing::debug!("Java version query failed: {}", e);
            None
        }
    };

    match version {
        Some(v) => {
            tracing::info!("Java version: {}", v);
            report.java_version = Some(v);
        }
        None => {
            let warning = "Could not determine the Java version".to_string();
            tracing::warn!("{}", warning);
            report.warnings.push(warning);
        }
    }

    report
}
