//! web2apk - turn a website URL into an Android APK.
//!
//! Main entry point for the command line tool.
//!
//! # Execution Flow
//!
//! 1. Parse arguments and validate the URL (nothing is written before this)
//! 2. Load tool settings (`web2apk.yaml`, `WEB2APK_*`), falling back to defaults
//! 3. Initialize logging → `<project>/.web2apk/logs/web2apk.<date>`, then report
//!    any settings error as a warning
//! 4. Create a current-thread tokio runtime
//! 5. Run the pipeline, racing it against Ctrl+C
//! 6. Report the outcome and map it to an exit code
//!
//! # Exit Codes
//!
//! - `0`: build succeeded, was skipped or declined, or failed in the build tool
//! - `1`: invalid URL, fatal provisioning failure, unexpected error or interrupt

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use web2apk::cli::{Cli, validate_url};
use web2apk::services::{AutoConfirm, Confirm, ProcessEnv, SystemRunner, TerminalConfirm, locate_icon};
use web2apk::{
    APP_NAME, BuildOutcome, BuildResult, Pipeline, PipelineOutcome, PipelineReport, PipelineRequest,
    ProjectLayout, Settings, VERSION,
};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let url = match validate_url(&cli.url) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let root = match project_root(&cli.project_dir) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    // Held until logging is up so the warning reaches the console and the log file
    let (settings, settings_error) = match Settings::try_load(&root) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    // Keep the guard alive until exit so buffered log lines are flushed
    let log_guard = match web2apk::logging::setup_logging(&settings.log_dir_in(&root), cli.debug, true) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: file logging unavailable: {:#}", e);
            None
        }
    };

    if let Some(e) = settings_error {
        if log_guard.is_some() {
            tracing::warn!("Ignoring invalid settings, using defaults: {}", e);
        } else {
            eprintln!("Warning: ignoring invalid settings, using defaults: {}", e);
        }
    }

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let layout = ProjectLayout::new(&root);
    let request = PipelineRequest {
        identity: cli.identity(&url, &settings),
        url,
        icon: cli.icon.clone().map(|icon| if icon.is_absolute() { icon } else { root.join(icon) }),
        skip_build: cli.skip_build,
    };

    print_banner(&request, &layout);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error: failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let code = if cli.yes {
        runtime.block_on(execute(&AutoConfirm, &settings, &layout, &request, cli.debug))
    } else {
        runtime.block_on(execute(&TerminalConfirm, &settings, &layout, &request, cli.debug))
    };

    // A pending stdin read must not hold the process open after an interrupt
    runtime.shutdown_timeout(Duration::from_millis(200));

    code
}

fn project_root(dir: &Utf8Path) -> anyhow::Result<Utf8PathBuf> {
    use anyhow::Context;

    let absolute = std::path::absolute(dir)
        .with_context(|| format!("Failed to resolve project directory: {}", dir))?;
    let root = Utf8PathBuf::try_from(absolute).context("Project directory is not valid UTF-8")?;
    std::fs::create_dir_all(&root)
        .with_context(|| format!("Failed to create project directory: {}", root))?;
    Ok(root)
}

async fn execute<C: Confirm>(
    confirm: &C,
    settings: &Settings,
    layout: &ProjectLayout,
    request: &PipelineRequest,
    debug: bool,
) -> ExitCode {
    let runner = SystemRunner::new();
    let env = ProcessEnv;
    let pipeline = Pipeline::new(&runner, confirm, &env, settings, layout);

    tokio::select! {
        result = pipeline.run(request) => match result {
            Ok(report) => report_outcome(report),
            Err(e) => {
                tracing::error!("Run failed: {:#}", e);
                if debug {
                    eprintln!("\nError: {:?}", e);
                } else {
                    eprintln!("\nError: {}", e);
                    eprintln!("Run with --debug for details");
                }
                ExitCode::FAILURE
            }
        },
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted by user");
            eprintln!("\nOperation cancelled");
            ExitCode::FAILURE
        }
    }
}

fn print_banner(request: &PipelineRequest, layout: &ProjectLayout) {
    let icon = request
        .icon
        .clone()
        .or_else(|| locate_icon(layout.root()))
        .map(|path| path.to_string())
        .unwrap_or_else(|| "default icon".to_string());

    println!("Converting {} to an Android APK", request.url);
    println!("  App ID:   {}", request.identity.app_id);
    println!("  App name: {}", request.identity.app_name);
    println!("  Icon:     {}", icon);
    println!("  Project:  {}", layout.root());
    println!();
}

fn gradle_command(task: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("cd android && gradlew.bat {}", task)
    } else {
        format!("cd android && ./gradlew {}", task)
    }
}

fn report_outcome(report: PipelineReport) -> ExitCode {
    // Environment warnings were already logged by the probe
    match report.outcome {
        PipelineOutcome::SetupOnly => {
            println!("\nSetup complete, build skipped.");
            println!("Before building, make sure the SDK locations are set:");
            println!("  export ANDROID_HOME=/path/to/android/sdk");
            println!("  export JAVA_HOME=/path/to/jdk");
            println!("Then build with: {}", gradle_command("assembleDebug"));
            ExitCode::SUCCESS
        }
        PipelineOutcome::BuildDeclined => {
            println!("\nBuild declined. Run again, or build with: {}", gradle_command("assembleDebug"));
            ExitCode::SUCCESS
        }
        PipelineOutcome::Built(result) => report_build(&result),
    }
}

fn report_build(result: &BuildResult) -> ExitCode {
    match &result.outcome {
        BuildOutcome::Succeeded { artifact } => {
            println!("\nAPK built successfully: {}", artifact);
            println!(
                "A release build needs a signing configuration; then run: {}",
                gradle_command("assembleRelease")
            );
            return ExitCode::SUCCESS;
        }
        BuildOutcome::ArtifactMissing { expected } => {
            println!("\nBuild finished but the APK was not found at {}", expected);
        }
        BuildOutcome::Failed { exit_code } => match exit_code {
            Some(code) => println!("\nBuild failed with exit code {}", code),
            None => println!("\nBuild was terminated by a signal"),
        },
        BuildOutcome::Crashed { message } => {
            println!("\nBuild could not run: {}", message);
        }
        BuildOutcome::PlatformMissing { expected } => {
            eprintln!("\nError: platform directory not found: {}", expected);
            for hint in result.remediation_hints() {
                eprintln!("  - {}", hint);
            }
            return ExitCode::FAILURE;
        }
    }

    println!("Things to check:");
    for hint in result.remediation_hints() {
        println!("  - {}", hint);
    }
    ExitCode::SUCCESS
}
