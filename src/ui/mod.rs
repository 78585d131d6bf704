//! # UI Module
//!
//! Terminal front end: application state, key handling and drawing.
//!
//! ## Components
//!
//! - [`App`] - Editor state plus the picker, overlay and pending translations
//! - [`mod@render`] - Rendering functions for drawing the TUI
//! - [`command`] - `:` command line parser
//! - [`overlay`] - Transient popup with dismissal triggers
//! - [`config`] - Persisted settings
//!
//! ## Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │ Tabline                                         │
//! ├─────────────────────────────────────────────────┤
//! │ Window (buffer view)   ┌──────────┐             │
//! │   cursor ─────────────►│ overlay  │             │
//! │                        └──────────┘             │
//! ├─────────────────────────────────────────────────┤
//! │ Window (split)                                  │
//! ├─────────────────────────────────────────────────┤
//! │ Footer / command line                           │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! The tab picker draws as a centered popup over everything else.

pub mod app;
pub mod command;
pub mod config;
pub mod overlay;
pub mod render;

pub use app::{App, AppEvent, Mode};
pub use config::Config;
pub use render::render;
