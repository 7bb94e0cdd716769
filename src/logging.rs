use anyhow::{Context, Result};
use camino::Utf8Path;
use std::fs;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Prefix of the daily log files
pub const LOG_PREFIX: &str = "web2apk";

/// Level filter for a run: `RUST_LOG` wins, then `--debug`, then `info`.
pub fn level_filter(debug_mode: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if debug_mode {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    })
}

/// Setup logging with a daily rotating file and optional console output.
///
/// # Arguments
/// * `log_dir` - Directory for log files, created if missing
/// * `debug_mode` - If true, use debug level; otherwise use info level
/// * `console_output` - If true, also log to stderr
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging(
    log_dir: &Utf8Path,
    debug_mode: bool,
    console_output: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }

    let file_appender = rolling::daily(log_dir, LOG_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if console_output {
        // Console goes to stderr so streamed build output on stdout stays clean
        let console_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
            .without_time();

        tracing_subscriber::registry()
            .with(level_filter(debug_mode))
            .with(file_layer)
            .with(console_layer)
            .try_init()
            .context("Failed to install log subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(level_filter(debug_mode))
            .with(file_layer)
            .try_init()
            .context("Failed to install log subscriber")?;
    }

    tracing::debug!(
        "Logging initialized: dir={}, debug={}, console={}",
        log_dir,
        debug_mode,
        console_output
    );

    Ok(guard)
}
