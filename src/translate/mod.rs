//! # Translate Module
//!
//! Translates the word under the cursor (or the current selection) with
//! [translate-shell](https://github.com/soimort/translate-shell) and turns
//! the result into overlay content.
//!
//! ## Pipeline
//!
//! ```text
//! TranslateRequest ──► build_job ──► runner::spawn ──► sanitize (per line)
//!                                                          │
//!                          overlay content ◄── render_outcome
//! ```
//!
//! ## Command Line
//!
//! | Request | argv |
//! |---------|------|
//! | brief, `:bg`, `hello` | `trans -brief --no-ansi :bg hello` |
//! | verbose, no target, `hello` | `trans --no-ansi hello` |
//!
//! The text is always the last argument and is passed as a single argv
//! entry; no shell is involved.

pub mod runner;
pub mod sanitize;

pub use runner::{spawn, CommandJob, JobOutcome, DEFAULT_ENV};
pub use sanitize::{sanitize, sanitize_opt};

use std::collections::BTreeMap;

/// Default translator binary.
pub const DEFAULT_PROGRAM: &str = "trans";

/// Overlay text shown when there is nothing to send to the translator.
pub const NOTHING_TO_TRANSLATE: &str = "Nothing to translate";

/// Overlay text shown when the translator succeeded but printed nothing.
pub const EMPTY_TRANSLATION: &str = "No translation returned";

/// One translation to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateRequest {
    /// Text to translate, passed verbatim.
    pub text: String,
    /// Target language selector, e.g. `:bg` or `en:fr`.
    pub target: Option<String>,
    /// `-brief` output (translation only) instead of the full dictionary view.
    pub brief: bool,
}

impl TranslateRequest {
    /// Create a request, or `None` when `text` is blank. Non-blank text is
    /// kept exactly as given.
    pub fn new(text: &str, target: Option<String>, brief: bool) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            target: target.filter(|t| !t.trim().is_empty()),
            brief,
        })
    }
}

/// Translator arguments for `request`, without the program.
pub fn build_args(request: &TranslateRequest) -> Vec<String> {
    let mut args = Vec::new();
    if request.brief {
        args.push("-brief".to_string());
    }
    args.push("--no-ansi".to_string());
    if let Some(target) = &request.target {
        args.push(target.clone());
    }
    args.push(request.text.clone());
    args
}

/// Build the job for `request`, with extra environment overrides from config.
pub fn build_job(
    program: &str,
    request: &TranslateRequest,
    env: &BTreeMap<String, String>,
) -> CommandJob {
    CommandJob::new(program)
        .with_args(build_args(request))
        .with_envs(env.iter().map(|(k, v)| (k.clone(), v.clone())))
}

/// Turn a finished job into markdown-like overlay lines.
pub fn render_outcome(outcome: &JobOutcome) -> Vec<String> {
    match outcome {
        JobOutcome::FailedToStart { program, error } => vec![
            format!("**Failed to start `{}`**", program),
            String::new(),
            error.clone(),
        ],
        JobOutcome::Exited { code, stderr, .. } if *code != 0 => {
            let mut lines = vec![format!("**Translator exited with code {}**", code)];
            let stderr = trim_blank_edges(stderr);
            if !stderr.is_empty() {
                lines.push(String::new());
                lines.extend(stderr.iter().cloned());
            }
            lines
        }
        JobOutcome::Exited { stdout, .. } => {
            let stdout = trim_blank_edges(stdout);
            if stdout.is_empty() {
                vec![EMPTY_TRANSLATION.to_string()]
            } else {
                stdout.to_vec()
            }
        }
    }
}

fn trim_blank_edges(lines: &[String]) -> &[String] {
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |i| i + 1);
    &lines[start..end]
}
