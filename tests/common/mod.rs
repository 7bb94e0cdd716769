//! Shared fixtures for the integration tests.
//!
//! `FakeRunner` stands in for npm, the Capacitor CLI, java and Gradle. By default
//! it imitates their on-disk side effects so the pipeline can run end to end in
//! a temporary directory.

#![allow(dead_code)]

use camino::{Utf8Path, Utf8PathBuf};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;
use web2apk::ProjectLayout;
use web2apk::services::{Confirm, EnvSource, Invocation, ProcessError, ProcessOutput, ProcessRunner};

pub type Handler = Box<dyn Fn(&Invocation) -> Result<ProcessOutput, ProcessError>>;

/// Create an empty project directory
pub fn temp_project() -> (TempDir, ProjectLayout) {
    let temp_dir = TempDir::new().unwrap();
    let root = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, ProjectLayout::new(root))
}

pub fn ok() -> Result<ProcessOutput, ProcessError> {
    Ok(ProcessOutput {
        exit_code: Some(0),
        ..Default::default()
    })
}

pub fn ok_with_stdout(stdout: &str) -> Result<ProcessOutput, ProcessError> {
    Ok(ProcessOutput {
        exit_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    })
}

pub fn exit(code: i32, stderr: &str) -> Result<ProcessOutput, ProcessError> {
    Ok(ProcessOutput {
        exit_code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    })
}

pub fn spawn_error(program: &str) -> Result<ProcessOutput, ProcessError> {
    Err(ProcessError::Spawn {
        program: program.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "program not found"),
    })
}

pub fn is_gradle(invocation: &Invocation) -> bool {
    Utf8Path::new(&invocation.program)
        .file_name()
        .is_some_and(|name| name.starts_with("gradlew"))
}

/// Imitate what the real tools leave on disk
pub fn simulate_tools(invocation: &Invocation) -> Result<ProcessOutput, ProcessError> {
    let dir = &invocation.working_dir;

    if invocation.has_args(&["init", "-y"]) {
        fs::write(dir.join("package.json"), "{\n  \"name\": \"site\"\n}\n").unwrap();
    } else if invocation.has_args(&["cap", "init"]) {
        // The initializer picks its own webDir; the pipeline must override it
        let config = serde_json::json!({
            "appId": invocation.args[2],
            "appName": invocation.args[3],
            "webDir": "www",
        });
        fs::write(
            dir.join("capacitor.config.json"),
            serde_json::to_string_pretty(&config).unwrap(),
        )
        .unwrap();
    } else if invocation.has_args(&["cap", "add", "android"]) {
        fs::create_dir_all(dir.join("android/app/src/main/res")).unwrap();
    } else if invocation.has_args(&["-version"]) {
        return Ok(ProcessOutput {
            exit_code: Some(0),
            stdout: String::new(),
            stderr: "openjdk version \"17.0.9\" 2023-10-17\n".to_string(),
        });
    } else if is_gradle(invocation) {
        let apk = dir.join("app/build/outputs/apk/debug/app-debug.apk");
        fs::create_dir_all(apk.parent().unwrap()).unwrap();
        fs::write(&apk, b"apk").unwrap();
        return ok_with_stdout("> Task :app:assembleDebug\nBUILD SUCCESSFUL\n");
    }

    ok()
}

/// Scripted [`ProcessRunner`] that records every invocation
pub struct FakeRunner {
    handler: Handler,
    calls: RefCell<Vec<Invocation>>,
}

impl FakeRunner {
    /// Runner whose tools all succeed with their usual side effects
    pub fn new() -> Self {
        Self::with_handler(simulate_tools)
    }

    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&Invocation) -> Result<ProcessOutput, ProcessError> + 'static,
    {
        Self {
            handler: Box::new(handler),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Number of recorded invocations whose arguments start with `prefix`
    pub fn count(&self, prefix: &[&str]) -> usize {
        self.calls.borrow().iter().filter(|c| c.has_args(prefix)).count()
    }

    pub fn gradle_calls(&self) -> usize {
        self.calls.borrow().iter().filter(|c| is_gradle(c)).count()
    }

    /// Position of the first invocation matching `prefix`
    pub fn position(&self, prefix: &[&str]) -> Option<usize> {
        self.calls.borrow().iter().position(|c| c.has_args(prefix))
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl ProcessRunner for FakeRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, ProcessError> {
        self.calls.borrow_mut().push(invocation.clone());
        (self.handler)(invocation)
    }

    async fn run_streaming(
        &self,
        invocation: &Invocation,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<ProcessOutput, ProcessError> {
        self.calls.borrow_mut().push(invocation.clone());
        let mut output = (self.handler)(invocation)?;
        for line in output.stdout.lines() {
            on_line(line);
        }
        output.stdout.clear();
        Ok(output)
    }
}

/// [`EnvSource`] backed by a fixed map
#[derive(Debug, Default)]
pub struct FakeEnv {
    vars: HashMap<String, String>,
}

impl FakeEnv {
    pub fn with_sdk() -> Self {
        let mut vars = HashMap::new();
        vars.insert("ANDROID_HOME".to_string(), "/opt/android-sdk".to_string());
        vars.insert("JAVA_HOME".to_string(), "/opt/jdk-17".to_string());
        Self { vars }
    }
}

impl EnvSource for FakeEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

/// [`Confirm`] with a fixed answer that counts how often it was asked
#[derive(Debug)]
pub struct FixedConfirm {
    answer: bool,
    asked: Cell<usize>,
}

impl FixedConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            asked: Cell::new(0),
        }
    }

    pub fn asked(&self) -> usize {
        self.asked.get()
    }
}

impl Confirm for FixedConfirm {
    async fn confirm(&self, _prompt: &str) -> bool {
        self.asked.set(self.asked.get() + 1);
        self.answer
    }
}

/// Write a solid PNG of the given size
pub fn write_png(path: &Utf8Path, size: u32) {
    let img = image::RgbaImage::from_pixel(size, size, image::Rgba([30, 144, 255, 255]));
    img.save(path).unwrap();
}
