//! Tabdeck - a small terminal editor shell with a tab picker and inline
//! translations
//!
//! This library provides the editor workspace, the tab picker controller,
//! the translate-shell runner and output sanitizer, and the terminal UI that
//! ties them together.

pub mod logging;
pub mod tabs;
pub mod translate;
pub mod ui;
