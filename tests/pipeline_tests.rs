//! End-to-end pipeline runs against a temporary project with scripted tools

use std::fs;
use url::Url;
use web2apk::config::Settings;
use web2apk::services::{SetupStep, StepOutcome};
use web2apk::{AppIdentity, ConfigManager, Pipeline, PipelineOutcome, PipelineRequest};

mod common;

use common::{FakeEnv, FakeRunner, FixedConfirm, exit, simulate_tools};

fn request(skip_build: bool) -> PipelineRequest {
    PipelineRequest {
        url: Url::parse("https://example.com/app").unwrap(),
        identity: AppIdentity::new("com.example.webapp", "example-com"),
        icon: None,
        skip_build,
    }
}

#[tokio::test]
async fn test_skip_build_provisions_everything() {
    let (_tmp, layout) = common::temp_project();
    common::write_png(&layout.root().join("site-icon.png"), 256);
    let settings = Settings::default();
    let runner = FakeRunner::new();
    let confirm = FixedConfirm::new(true);
    let env = FakeEnv::with_sdk();

    let report = Pipeline::new(&runner, &confirm, &env, &settings, &layout)
        .run(&request(true))
        .await
        .unwrap();

    assert!(matches!(report.outcome, PipelineOutcome::SetupOnly));
    assert_eq!(confirm.asked(), 0);
    assert_eq!(runner.gradle_calls(), 0);

    // Environment probe ran first and found everything
    assert!(runner.calls()[0].has_args(&["-version"]));
    assert!(report.environment.is_clean());
    assert_eq!(report.environment.java_version.as_deref(), Some("17.0.9"));

    // Config and loader page
    let config = ConfigManager::new(&layout).load().unwrap().unwrap();
    assert_eq!(config.app_name(), Some("example-com"));
    assert_eq!(config.web_dir(), Some("public"));
    assert_eq!(report.loader_page, StepOutcome::Done);
    let html = fs::read_to_string(layout.loader_page()).unwrap();
    assert!(html.contains(r#"src="https://example.com/app""#));

    // One sync after provisioning, then icons
    assert_eq!(runner.count(&["cap", "sync"]), 1);
    assert!(runner.position(&["cap", "add"]) < runner.position(&["cap", "sync"]));
    let icons = report.icons.expect("icons should be generated");
    assert!(icons.is_complete());
    assert_eq!(icons.written.len(), 10);
    assert_eq!(report.setup.outcome(SetupStep::Platform), Some(&StepOutcome::Done));
}

#[tokio::test]
async fn test_confirmed_build_produces_artifact() {
    let (_tmp, layout) = common::temp_project();
    let settings = Settings::default();
    let runner = FakeRunner::new();
    let confirm = FixedConfirm::new(true);
    let env = FakeEnv::default();

    let report = Pipeline::new(&runner, &confirm, &env, &settings, &layout)
        .run(&request(false))
        .await
        .unwrap();

    assert_eq!(confirm.asked(), 1);
    // Missing SDK variables are warnings, not failures
    assert_eq!(report.environment.warnings.len(), 2);
    // No icon anywhere: platform defaults are kept
    assert!(report.icons.is_none());

    match report.outcome {
        PipelineOutcome::Built(result) => {
            assert!(result.is_success());
            assert!(layout.debug_artifact().is_file());
        }
        other => panic!("expected a build, got {other:?}"),
    }
    // Pipeline sync plus the build driver's own sync
    assert_eq!(runner.count(&["cap", "sync"]), 2);
}

#[tokio::test]
async fn test_declined_build_runs_nothing_further() {
    let (_tmp, layout) = common::temp_project();
    let settings = Settings::default();
    let runner = FakeRunner::new();
    let confirm = FixedConfirm::new(false);
    let env = FakeEnv::with_sdk();

    let report = Pipeline::new(&runner, &confirm, &env, &settings, &layout)
        .run(&request(false))
        .await
        .unwrap();

    assert!(matches!(report.outcome, PipelineOutcome::BuildDeclined));
    assert_eq!(runner.gradle_calls(), 0);
    assert!(layout.platform_dir().is_dir());
}

#[tokio::test]
async fn test_platform_add_failure_aborts_before_icons_and_build() {
    let (_tmp, layout) = common::temp_project();
    common::write_png(&layout.root().join("icon.png"), 64);
    let settings = Settings::default();
    let runner = FakeRunner::with_handler(|inv| {
        if inv.has_args(&["cap", "add"]) {
            exit(1, "[error] Could not find the android platform")
        } else {
            simulate_tools(inv)
        }
    });
    let confirm = FixedConfirm::new(true);
    let env = FakeEnv::with_sdk();

    let err = Pipeline::new(&runner, &confirm, &env, &settings, &layout)
        .run(&request(false))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("android platform"));
    assert_eq!(runner.count(&["cap", "sync"]), 0);
    assert_eq!(runner.gradle_calls(), 0);
    assert_eq!(confirm.asked(), 0);
    // Work done before the failure stays on disk for the next run
    assert!(layout.config_file().is_file());
    assert!(layout.loader_page().is_file());
}

#[tokio::test]
async fn test_unwritable_loader_page_does_not_stop_provisioning() {
    let (_tmp, layout) = common::temp_project();
    // A plain file where the web directory should be
    fs::write(layout.web_dir(), "not a directory").unwrap();
    let settings = Settings::default();
    let runner = FakeRunner::new();
    let confirm = FixedConfirm::new(true);
    let env = FakeEnv::with_sdk();

    let report = Pipeline::new(&runner, &confirm, &env, &settings, &layout)
        .run(&request(true))
        .await
        .unwrap();

    assert!(matches!(report.loader_page, StepOutcome::Failed(_)));
    assert!(matches!(report.outcome, PipelineOutcome::SetupOnly));
    assert_eq!(runner.count(&["cap", "add", "android"]), 1);
    assert_eq!(runner.count(&["cap", "sync"]), 1);
    assert!(layout.platform_dir().is_dir());
    assert!(layout.config_file().is_file());
}

#[tokio::test]
async fn test_explicit_missing_icon_is_a_warning() {
    let (_tmp, layout) = common::temp_project();
    let settings = Settings::default();
    let runner = FakeRunner::new();
    let confirm = FixedConfirm::new(true);
    let env = FakeEnv::with_sdk();

    let mut req = request(true);
    req.icon = Some(layout.root().join("missing.png"));

    let report = Pipeline::new(&runner, &confirm, &env, &settings, &layout)
        .run(&req)
        .await
        .unwrap();

    assert!(report.icons.is_none());
    assert!(matches!(report.outcome, PipelineOutcome::SetupOnly));
}

#[tokio::test]
async fn test_rerun_is_a_no_op_for_completed_steps() {
    let (_tmp, layout) = common::temp_project();
    let settings = Settings::default();
    let runner = FakeRunner::new();
    let confirm = FixedConfirm::new(true);
    let env = FakeEnv::with_sdk();
    let pipeline = Pipeline::new(&runner, &confirm, &env, &settings, &layout);

    pipeline.run(&request(true)).await.unwrap();
    runner.clear();
    let report = pipeline.run(&request(true)).await.unwrap();

    assert_eq!(runner.count(&["cap", "add"]), 0);
    assert_eq!(runner.count(&["cap", "init"]), 0);
    assert_eq!(runner.count(&["init", "-y"]), 0);
    assert_eq!(
        report.setup.outcome(SetupStep::Platform),
        Some(&StepOutcome::AlreadyPresent)
    );
}
