//! Invocation of kitty's remote-control binary.
//!
//! Runs `kitten @ [--to ADDR] <command> ...`, captures its output and maps
//! failures to [`KittenError`]. Each call is a separate child process,
//! awaited to completion or killed at the timeout.

use crate::model::{self, OsWindow};
use crate::request::{Extent, Request};
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

/// Default binary name, resolved through `PATH`.
pub const DEFAULT_KITTEN: &str = "kitten";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while talking to kitty.
#[derive(Debug, Error)]
pub enum KittenError {
    #[error("kitten command not found ({0}). Is kitty installed?")]
    NotFound(String),

    #[error("failed to run kitten: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("kitten @ {command} timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    #[error("{}", failure_message(.code, .stderr))]
    Failed { code: i32, stderr: String },

    #[error("invalid JSON from kitten: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("unexpected output from kitten: {0:?}")]
    UnexpectedOutput(String),
}

#[allow(clippy::trivially_copy_pass_by_ref)] // thiserror passes fields by reference
fn failure_message(code: &i32, stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("kitten exited with status {code}")
    } else {
        stderr.to_string()
    }
}

impl KittenError {
    /// Process exit code to report for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Failed { code, .. } => *code,
            _ => 1,
        }
    }
}

/// Captured result of one invocation.
#[derive(Debug, Clone)]
pub struct Output {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl Output {
    #[must_use]
    pub const fn success(&self) -> bool {
        self.code == 0
    }
}

/// Handle on the remote-control binary.
#[derive(Debug, Clone)]
pub struct Kitten {
    program: PathBuf,
    to: Option<String>,
    timeout: Duration,
}

impl Default for Kitten {
    fn default() -> Self {
        Self::new(DEFAULT_KITTEN)
    }
}

impl Kitten {
    /// Create a handle that runs the given binary.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            to: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Address of the kitty instance to control (`unix:/path`, `tcp:host:port`).
    #[must_use]
    pub fn with_to(mut self, to: Option<String>) -> Self {
        self.to = to.filter(|addr| !addr.trim().is_empty());
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full argument vector passed to the binary for a request.
    #[must_use]
    pub fn command_line(&self, request: &Request) -> Vec<String> {
        let mut args = vec!["@".to_string()];
        if let Some(to) = &self.to {
            args.push("--to".to_string());
            args.push(to.clone());
        }
        args.extend(request.args());
        args
    }

    /// Run a request and capture its output, whatever the exit code.
    pub async fn run(&self, request: &Request) -> Result<Output, KittenError> {
        let args = self.command_line(request);
        if request.is_query() {
            debug!(program = %self.program.display(), ?args, "querying kitty");
        } else {
            info!(program = %self.program.display(), ?args, "sending command to kitty");
        }

        let child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    KittenError::NotFound(self.program.display().to_string())
                } else {
                    KittenError::Spawn(e)
                }
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| KittenError::Timeout {
                command: request.name().to_string(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(KittenError::Spawn)?;

        let code = exit_code(output.status);
        debug!(command = request.name(), code, "kitten finished");

        Ok(Output {
            code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run a request and return stdout, failing on a non-zero exit.
    pub async fn call(&self, request: &Request) -> Result<String, KittenError> {
        let output = self.run(request).await?;
        if output.success() {
            Ok(output.stdout)
        } else {
            Err(KittenError::Failed {
                code: output.code,
                stderr: output.stderr,
            })
        }
    }

    /// Run an `ls` request and return its untyped JSON document, for
    /// pass-through printing.
    pub async fn ls_json(&self, request: &Request) -> Result<serde_json::Value, KittenError> {
        let stdout = self.call(request).await?;
        serde_json::from_str(&stdout).map_err(KittenError::InvalidJson)
    }

    /// `ls` parsed into the window hierarchy.
    pub async fn ls(&self) -> Result<Vec<OsWindow>, KittenError> {
        let stdout = self
            .call(&Request::Ls { matcher: None, tab_matcher: None })
            .await?;
        model::parse_ls(&stdout).map_err(KittenError::InvalidJson)
    }

    /// Text of one window.
    pub async fn get_text(&self, window_id: u64, extent: Extent) -> Result<String, KittenError> {
        self.call(&Request::GetText {
            matcher: Some(format!("id:{window_id}")),
            extent,
            ansi: false,
        })
        .await
    }

    /// Launch a window and return its id.
    pub async fn launch(&self, request: &Request) -> Result<u64, KittenError> {
        let stdout = self.call(request).await?;
        parse_window_id(&stdout)
    }
}

/// Parse the window id `launch` prints.
pub fn parse_window_id(stdout: &str) -> Result<u64, KittenError> {
    let trimmed = stdout.trim();
    trimmed
        .parse()
        .map_err(|_| KittenError::UnexpectedOutput(trimmed.to_string()))
}

/// Exit code for a finished child; signals map to the shell's 128+N.
fn exit_code(status: ExitStatus) -> i32 {
    status
        .code()
        .or_else(|| status.signal().map(|sig| 128 + sig))
        .unwrap_or(1)
}
