//! Subprocess-based isolation engine.
//!
//! Executes a module's handler inside a bounded child process: the launcher
//! program is spawned with the unit path, handler name, and a payload file
//! as explicit arguments, and its single-line JSON report is decoded into a
//! normalized outcome. Isolating by subprocess trades performance for fault
//! containment; a crashing or looping handler cannot take down the host.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use fabrica_contract::{ErrorCode, ExecutionContext, JsonMap, Outcome, OutcomeStatus};

use crate::protocol::{LaunchPayload, LaunchReport};
use crate::unit::PluginUnit;

/// Default wall-clock timeout for one isolated execution (30 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the isolation engine.
#[derive(Debug, Clone)]
pub struct IsolatorConfig {
    /// Hard wall-clock timeout per execution.
    pub timeout: Duration,
    /// Launcher executable. When unset, the current executable is used, on
    /// the assumption that the host binary carries the launch entrypoint.
    pub launcher: Option<PathBuf>,
    /// Arguments placed before the protocol arguments (normally the hidden
    /// `launch` subcommand).
    pub launcher_args: Vec<String>,
}

impl Default for IsolatorConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            launcher: None,
            launcher_args: vec!["launch".to_string()],
        }
    }
}

impl IsolatorConfig {
    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Sets the launcher executable.
    pub fn launcher(mut self, path: impl Into<PathBuf>) -> Self {
        self.launcher = Some(path.into());
        self
    }

    /// Replaces the leading launcher arguments.
    pub fn launcher_args(mut self, args: Vec<String>) -> Self {
        self.launcher_args = args;
        self
    }
}

/// The isolation engine.
#[derive(Debug, Clone, Default)]
pub struct Isolator {
    config: IsolatorConfig,
}

impl Isolator {
    /// Creates an engine with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with the given configuration.
    pub fn with_config(config: IsolatorConfig) -> Self {
        Self { config }
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &IsolatorConfig {
        &self.config
    }

    /// Executes a handler of the given unit in a child process.
    ///
    /// Never panics and never returns an error: every failure mode is folded
    /// into an error [`Outcome`] with the matching [`ErrorCode`]. The per-run
    /// scratch directory (payload file included) is removed on every exit
    /// path.
    pub fn execute(
        &self,
        unit: &PluginUnit,
        handler_name: &str,
        input: &JsonMap,
        context: Option<&ExecutionContext>,
    ) -> Outcome {
        let payload = LaunchPayload {
            input: input.clone(),
            context: context.cloned(),
        };

        // Scratch dir owns the payload file; dropping it removes both.
        let scratch = match tempfile::Builder::new().prefix("fabrica_exec_").tempdir() {
            Ok(dir) => dir,
            Err(e) => {
                return Outcome::error_with_code(
                    ErrorCode::UnknownError,
                    format!("failed to create scratch directory: {e}"),
                )
            }
        };
        let payload_path = scratch.path().join("payload.json");
        let payload_json = match serde_json::to_vec(&payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                return Outcome::error_with_code(
                    ErrorCode::UnknownError,
                    format!("failed to serialize payload: {e}"),
                )
            }
        };
        if let Err(e) = std::fs::write(&payload_path, payload_json) {
            return Outcome::error_with_code(
                ErrorCode::UnknownError,
                format!("failed to write payload file: {e}"),
            );
        }

        let launcher = match self.resolve_launcher() {
            Ok(path) => path,
            Err(e) => {
                return Outcome::error_with_code(
                    ErrorCode::UnknownError,
                    format!("failed to resolve launcher executable: {e}"),
                )
            }
        };

        debug!(
            unit = %unit.id,
            handler = handler_name,
            launcher = %launcher.display(),
            "spawning isolated execution"
        );

        let mut cmd = Command::new(&launcher);
        cmd.args(&self.config.launcher_args)
            .arg("--unit")
            .arg(&unit.path)
            .arg("--handler")
            .arg(handler_name)
            .arg("--payload")
            .arg(&payload_path)
            .current_dir(&unit.path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return Outcome::error_with_code(
                    ErrorCode::UnknownError,
                    format!("failed to spawn launcher '{}': {}", launcher.display(), e),
                )
            }
        };

        let output = match wait_with_timeout(child, self.config.timeout) {
            Ok(output) => output,
            Err(WaitError::Timeout) => {
                warn!(unit = %unit.id, handler = handler_name, "isolated execution timed out");
                return Outcome::error_with_code(
                    ErrorCode::TimeoutError,
                    format!(
                        "execution timed out after {} seconds",
                        self.config.timeout.as_secs()
                    ),
                );
            }
            Err(WaitError::Wait(e)) => {
                return Outcome::error_with_code(
                    ErrorCode::UnknownError,
                    format!("failed to wait for launcher: {e}"),
                )
            }
        };

        drop(scratch);
        decode_output(&output)
    }

    fn resolve_launcher(&self) -> std::io::Result<PathBuf> {
        match &self.config.launcher {
            Some(path) => Ok(path.clone()),
            None => std::env::current_exe(),
        }
    }
}

/// Maps the child's exit status and captured streams onto an outcome.
fn decode_output(output: &std::process::Output) -> Outcome {
    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        match serde_json::from_str::<LaunchReport>(stdout.trim()) {
            Ok(report) => {
                let status = if report.success {
                    OutcomeStatus::Success
                } else {
                    OutcomeStatus::Error
                };
                Outcome {
                    status,
                    data: report.data,
                    message: report.message,
                    error_code: None,
                    execution_time: report.execution_time,
                }
            }
            Err(_) => Outcome::error_with_code(
                ErrorCode::OutputParseError,
                format!("failed to parse launcher output: {stdout}"),
            ),
        }
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            "execution failed".to_string()
        } else {
            stderr
        };
        Outcome::error_with_code(ErrorCode::ExecutionError, message)
    }
}

enum WaitError {
    Timeout,
    Wait(std::io::Error),
}

/// Waits for a child process, killing and reaping it when the deadline
/// elapses. Both pipes are drained on background threads while waiting; a
/// child whose report exceeds the OS pipe buffer must still be able to
/// flush it and exit.
fn wait_with_timeout(
    mut child: std::process::Child,
    timeout: Duration,
) -> Result<std::process::Output, WaitError> {
    let start = Instant::now();
    let stdout = spawn_pipe_reader(child.stdout.take());
    let stderr = spawn_pipe_reader(child.stderr.take());

    loop {
        match child.try_wait() {
            Ok(Some(status)) => {
                return Ok(std::process::Output {
                    status,
                    stdout: join_pipe_reader(stdout),
                    stderr: join_pipe_reader(stderr),
                });
            }
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(WaitError::Timeout);
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(WaitError::Wait(e));
            }
        }
    }
}

fn spawn_pipe_reader<R>(stream: Option<R>) -> Option<std::thread::JoinHandle<Vec<u8>>>
where
    R: std::io::Read + Send + 'static,
{
    stream.map(|mut s| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            std::io::Read::read_to_end(&mut s, &mut buf).ok();
            buf
        })
    })
}

fn join_pipe_reader(handle: Option<std::thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}
