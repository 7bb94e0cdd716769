use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::process::Stdio;
use std::time::Instant;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

/// A single external command: program, arguments and working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Utf8PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<String>, working_dir: impl AsRef<Utf8Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// True if the argument list starts with `prefix`
    pub fn has_args(&self, prefix: &[&str]) -> bool {
        self.args.len() >= prefix.len() && self.args.iter().zip(prefix).all(|(a, p)| a == p)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// What a finished process left behind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` if terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Last non-empty line of stderr, for one-line failure reports
    pub fn stderr_tail(&self) -> Option<&str> {
        self.stderr.lines().rev().map(str::trim).find(|l| !l.is_empty())
    }
}

/// Errors raised while starting or talking to a child process
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} pipe was not captured")]
    MissingPipe(&'static str),

    #[error("Process I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output reader failed: {0}")]
    Reader(String),
}

/// Capability for running external tools.
///
/// The orchestration logic only talks to processes through this trait, so its
/// failure policy can be exercised with a scripted fake.
#[allow(async_fn_in_trait)]
pub trait ProcessRunner {
    /// Run to completion, capturing stdout and stderr.
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, ProcessError>;

    /// Run to completion, handing each stdout line to `on_line` as it arrives.
    ///
    /// Stdout is not retained in the returned output; stderr is captured.
    async fn run_streaming(
        &self,
        invocation: &Invocation,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<ProcessOutput, ProcessError>;
}

/// [`ProcessRunner`] that spawns real processes with tokio.
///
/// Children are killed if the calling future is dropped, so abandoning the
/// pipeline on an interrupt does not leave tools running.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(invocation: &Invocation) -> Command {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl ProcessRunner for SystemRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessOutput, ProcessError> {
        tracing::debug!("Executing: {} (in {})", invocation, invocation.working_dir);
        let start = Instant::now();

        let output = Self::command(invocation)
            .output()
            .await
            .map_err(|source| ProcessError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        let result = ProcessOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        tracing::debug!(
            "{} completed in {:.2}s with exit code {:?}",
            invocation.program,
            start.elapsed().as_secs_f32(),
            result.exit_code
        );

        Ok(result)
    }

    async fn run_streaming(
        &self,
        invocation: &Invocation,
        on_line: &mut dyn FnMut(&str),
    ) -> Result<ProcessOutput, ProcessError> {
        tracing::debug!("Streaming: {} (in {})", invocation, invocation.working_dir);
        let start = Instant::now();

        let mut child = Self::command(invocation)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: invocation.program.clone(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or(ProcessError::MissingPipe("stdout"))?;
        let mut stderr = child.stderr.take().ok_or(ProcessError::MissingPipe("stderr"))?;

        // stderr is drained on its own task so a chatty diagnostic stream can't
        // fill its pipe and stall the child while stdout is being read.
        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await.map(|_| buf)
        });

        let mut reader = BufReader::new(stdout);
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).await? == 0 {
                break;
            }
            let text = String::from_utf8_lossy(&line);
            on_line(text.trim_end_matches(['\r', '\n']));
        }

        let status = child.wait().await?;
        let stderr = stderr_task
            .await
            .map_err(|e| ProcessError::Reader(e.to_string()))??;

        tracing::debug!(
            "{} completed in {:.2}s with exit code {:?}",
            invocation.program,
            start.elapsed().as_secs_f32(),
            status.code()
        );

        Ok(ProcessOutput {
            exit_code: status.code(),
            stdout: String::new(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}
