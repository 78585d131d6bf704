//! # External Command Runner
//!
//! Runs a program in the background and hands its captured output to a
//! completion callback once the process has exited.
//!
//! ## Output Handling
//!
//! - stdout and stderr are read line by line on the tokio runtime
//! - every line is decoded lossily and passed through [`sanitize`] before it
//!   is stored, so consumers never see terminal control sequences
//! - lines are only ever appended, in arrival order
//!
//! ## Environment
//!
//! Tools like translate-shell still colour and page their output when they
//! think a terminal is attached. [`DEFAULT_ENV`] turns that off; entries in
//! [`CommandJob::env`] take precedence over the defaults.
//!
//! ## Completion
//!
//! The callback is a `FnOnce`, called exactly once per job with either
//! [`JobOutcome::FailedToStart`] or [`JobOutcome::Exited`]. The application
//! passes a callback that posts an event to its queue, so UI state is only
//! ever touched by the event loop.

use super::sanitize::sanitize;
use std::collections::BTreeMap;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Environment applied to every job unless the job overrides a key.
pub const DEFAULT_ENV: &[(&str, &str)] = &[
    ("NO_COLOR", "1"),
    ("TERM", "dumb"),
    ("PAGER", "cat"),
    // -X keeps less from sending termcap init/deinit sequences.
    ("LESS", "-X"),
];

/// Exit code reported when the process ended without one (e.g. killed by a
/// signal) or could not be reaped.
pub const UNKNOWN_EXIT_CODE: i32 = -1;

/// One external-process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandJob {
    pub program: String,
    pub args: Vec<String>,
    /// Overrides merged on top of [`DEFAULT_ENV`].
    pub env: BTreeMap<String, String>,
}

impl CommandJob {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(vars.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// The environment the child actually receives on top of the inherited
    /// one: defaults first, job overrides last.
    pub fn effective_env(&self) -> BTreeMap<String, String> {
        let mut env: BTreeMap<String, String> = DEFAULT_ENV
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        env.extend(self.env.iter().map(|(k, v)| (k.clone(), v.clone())));
        env
    }
}

/// How a job finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The process could not be started at all.
    FailedToStart { program: String, error: String },
    /// The process ran and exited. Lines are already sanitized.
    Exited {
        code: i32,
        stdout: Vec<String>,
        stderr: Vec<String>,
    },
}


/// Start `job` and call `on_complete` once it has finished.
///
/// Must be called from within a tokio runtime. A spawn failure is reported
/// synchronously, before this function returns; otherwise the callback runs
/// on a runtime task after both output streams hit EOF and the child has been
/// reaped.
pub fn spawn<F>(job: CommandJob, on_complete: F)
where
    F: FnOnce(JobOutcome) + Send + 'static,
{
    let mut command = Command::new(&job.program);
    command
        .args(&job.args)
        .envs(job.effective_env())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(e) => {
            warn!(program = %job.program, error = %e, "failed to start command");
            on_complete(JobOutcome::FailedToStart {
                program: job.program,
                error: e.to_string(),
            });
            return;
        }
    };

    info!(program = %job.program, args = ?job.args, "command started");

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    tokio::spawn(async move {
        let (stdout, mut stderr) = tokio::join!(collect_lines(stdout), collect_lines(stderr));

        let code = match child.wait().await {
            Ok(status) => status.code().unwrap_or(UNKNOWN_EXIT_CODE),
            Err(e) => {
                stderr.push(format!("failed to wait for {}: {}", job.program, e));
                UNKNOWN_EXIT_CODE
            }
        };

        info!(
            program = %job.program,
            code,
            stdout_lines = stdout.len(),
            stderr_lines = stderr.len(),
            "command exited"
        );

        on_complete(JobOutcome::Exited {
            code,
            stdout,
            stderr,
        });
    });
}

/// Read `stream` to EOF, one sanitized line per entry.
async fn collect_lines<R>(stream: Option<R>) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let mut lines = Vec::new();
    let Some(stream) = stream else {
        return lines;
    };

    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let raw = String::from_utf8_lossy(&buf);
                let raw = raw.trim_end_matches(['\n', '\r']);
                lines.push(sanitize(raw).into_owned());
            }
            Err(e) => {
                debug!(error = %e, "stopped reading command output");
                break;
            }
        }
    }
    lines
}
