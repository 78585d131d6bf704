//! # Escape Sequence Sanitizer
//!
//! Strips terminal control sequences from lines captured from external
//! tools so they can be drawn verbatim inside an overlay.
//!
//! Three families are removed:
//!
//! | Family | Shape | Example |
//! |--------|-------|---------|
//! | OSC | `ESC ]` … `BEL` or `ESC \` | `\x1b]0;title\x07` |
//! | CSI | `ESC [` params intermediates final | `\x1b[1;31m` |
//! | Two-character | `ESC` + byte in `@`..=`_` | `\x1bM` |
//!
//! OSC runs first: `]` is inside the two-character range, so the generic rule
//! would otherwise eat `ESC ]` and leave the title text behind.

use regex::Regex;
use std::borrow::Cow;
use std::sync::OnceLock;

const ESC: char = '\x1b';

static OSC: OnceLock<Regex> = OnceLock::new();
static CSI: OnceLock<Regex> = OnceLock::new();
static SIMPLE: OnceLock<Regex> = OnceLock::new();

fn osc() -> &'static Regex {
    OSC.get_or_init(|| compile(r"(?s)\x1b\].*?(?:\x07|\x1b\\)"))
}

fn csi() -> &'static Regex {
    CSI.get_or_init(|| compile(r"\x1b\[[0-?]*[ -/]*[@-~]"))
}

fn simple() -> &'static Regex {
    SIMPLE.get_or_init(|| compile(r"\x1b[@-Z\\-_]"))
}

fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        // Patterns are literals checked by the tests below.
        Err(e) => panic!("invalid sanitizer pattern {pattern:?}: {e}"),
    }
}

/// Remove every terminal control sequence from `line`.
///
/// Lines without an escape character are returned borrowed and untouched.
/// The passes repeat until nothing more matches, so a removal that splices
/// two fragments into a fresh sequence is cleaned up as well and the result
/// is always a fixed point.
pub fn sanitize(line: &str) -> Cow<'_, str> {
    if !line.contains(ESC) {
        return Cow::Borrowed(line);
    }

    let mut current = line.to_string();
    loop {
        let stripped = strip_once(&current);
        if stripped.len() == current.len() {
            return Cow::Owned(current);
        }
        current = stripped;
    }
}

/// [`sanitize`] for values that may be absent.
pub fn sanitize_opt(line: Option<&str>) -> Option<Cow<'_, str>> {
    line.map(sanitize)
}

fn strip_once(text: &str) -> String {
    let text = osc().replace_all(text, "");
    let text = csi().replace_all(&text, "");
    simple().replace_all(&text, "").into_owned()
}
