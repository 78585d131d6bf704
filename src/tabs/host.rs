//! # Host Capabilities
//!
//! The picker never reaches into editor state directly. Everything it needs
//! goes through [`TabHost`], and the one capability that differs between
//! hosts (activating a tab by handle) is hidden behind an
//! [`ActivationStrategy`] picked once at startup.

use super::catalog::Entry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

/// Opaque tab identifier handed out by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabHandle(u64);

impl TabHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for TabHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab#{}", self.0)
    }
}

/// Errors a host can report when asked to change tabs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("no tab at index {0}")]
    NoSuchIndex(usize),
    #[error("no tab with handle {0}")]
    NoSuchHandle(TabHandle),
    #[error("cannot close the last tab")]
    LastTab,
    #[error("host cannot activate tabs by handle")]
    Unsupported,
}

/// Capability set the tab picker needs from its host.
///
/// Indices are 1-based, matching what the catalog shows to the user.
pub trait TabHost {
    /// All tabs, in display order.
    fn tab_handles(&self) -> Vec<TabHandle>;

    fn current_tab(&self) -> Option<TabHandle>;

    /// Absolute path of the tab's primary resource, `None` when unnamed.
    fn primary_resource(&self, tab: TabHandle) -> Option<PathBuf>;

    /// Whether the tab's primary resource has unsaved changes.
    fn is_modified(&self, tab: TabHandle) -> bool;

    /// Number of windows (views) in the tab.
    fn view_count(&self, tab: TabHandle) -> usize;

    /// Root used to shorten paths, `None` when the host has no resolver.
    fn working_root(&self) -> Option<PathBuf>;

    fn activate_tab_at(&mut self, index: usize) -> Result<(), HostError>;

    fn remove_tab_at(&mut self, index: usize) -> Result<(), HostError>;

    /// Whether [`TabHost::activate_tab`] is available.
    fn can_activate_by_handle(&self) -> bool {
        false
    }

    fn activate_tab(&mut self, tab: TabHandle) -> Result<(), HostError> {
        let _ = tab;
        Err(HostError::Unsupported)
    }
}

/// How a picked entry is turned back into a tab switch.
pub trait ActivationStrategy: fmt::Debug {
    fn name(&self) -> &'static str;

    fn activate(&self, host: &mut dyn TabHost, entry: &Entry) -> Result<(), HostError>;
}

/// Switch by the entry's recorded handle.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActivateByHandle;

impl ActivationStrategy for ActivateByHandle {
    fn name(&self) -> &'static str {
        "handle"
    }

    fn activate(&self, host: &mut dyn TabHost, entry: &Entry) -> Result<(), HostError> {
        host.activate_tab(entry.handle)
    }
}

/// Switch by the entry's recorded index.
///
/// Only correct if no tab was opened or closed between building the catalog
/// and running the action; otherwise a neighbouring tab is activated.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActivateByIndex;

impl ActivationStrategy for ActivateByIndex {
    fn name(&self) -> &'static str {
        "index"
    }

    fn activate(&self, host: &mut dyn TabHost, entry: &Entry) -> Result<(), HostError> {
        host.activate_tab_at(entry.index)
    }
}

/// Activation preference from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationMode {
    /// By handle when the host supports it, by index otherwise.
    #[default]
    Auto,
    Handle,
    Index,
}

/// Pick the activation strategy for `host`.
///
/// `Handle` on a host without the capability falls back to index.
pub fn select_strategy(mode: ActivationMode, host: &dyn TabHost) -> Box<dyn ActivationStrategy> {
    match mode {
        ActivationMode::Index => Box::new(ActivateByIndex),
        ActivationMode::Auto | ActivationMode::Handle if host.can_activate_by_handle() => {
            Box::new(ActivateByHandle)
        }
        ActivationMode::Auto | ActivationMode::Handle => Box::new(ActivateByIndex),
    }
}

/// Result of a best-effort host effect.
///
/// The picker closes before its effect runs, so there is nobody left to show
/// a failure to. Wrapping the result makes that explicit at the call site.
#[must_use = "call .ignore() to discard a best-effort result"]
#[derive(Debug)]
pub struct Ignorable(Result<(), HostError>);

impl Ignorable {
    pub fn new(result: Result<(), HostError>) -> Self {
        Self(result)
    }

    pub fn is_ok(&self) -> bool {
        self.0.is_ok()
    }

    /// Discard the result, logging a failure at debug level.
    pub fn ignore(self, effect: &str) {
        if let Err(e) = self.0 {
            debug!(effect, error = %e, "best-effort tab effect failed");
        }
    }
}

impl From<Result<(), HostError>> for Ignorable {
    fn from(result: Result<(), HostError>) -> Self {
        Self::new(result)
    }
}
