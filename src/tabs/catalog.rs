//! # Entry Catalog
//!
//! Snapshots the host's tabs into display-ready [`Entry`] values. A catalog is
//! built fresh for every picker session and never mutated afterwards.

use super::host::{TabHandle, TabHost};
use std::path::Path;

/// Label used for tabs whose primary resource has no name.
pub const NO_NAME: &str = "[No Name]";

/// One selectable tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// 1-based position in the catalog (= host tab order).
    pub index: usize,
    pub handle: TabHandle,
    pub label: String,
    pub modified: bool,
    /// Windows in the tab.
    pub view_count: usize,
    /// Text the picker filters on.
    pub search_key: String,
}

impl Entry {
    /// Row text for the picker list, e.g. `2: src/main.rs [+] (3 windows)`.
    pub fn display(&self) -> String {
        let mut row = format!("{}: {}", self.index, self.label);
        if self.modified {
            row.push_str(" [+]");
        }
        if self.view_count > 1 {
            row.push_str(&format!(" ({} windows)", self.view_count));
        }
        row
    }
}

/// Snapshot every tab of `host` in its current order.
pub fn build_catalog(host: &dyn TabHost) -> Vec<Entry> {
    let root = host.working_root();

    host.tab_handles()
        .into_iter()
        .enumerate()
        .map(|(i, handle)| {
            let index = i + 1;
            let label = display_label(host.primary_resource(handle).as_deref(), root.as_deref());
            Entry {
                index,
                handle,
                search_key: format!("{} {}", index, label),
                label,
                modified: host.is_modified(handle),
                view_count: host.view_count(handle),
            }
        })
        .collect()
}

/// Render `path` for display, shortened relative to `root` when it lives
/// underneath it.
pub fn display_label(path: Option<&Path>, root: Option<&Path>) -> String {
    let Some(path) = path.filter(|p| !p.as_os_str().is_empty()) else {
        return NO_NAME.to_string();
    };

    if let Some(relative) = root.and_then(|r| path.strip_prefix(r).ok()) {
        if !relative.as_os_str().is_empty() {
            return relative.display().to_string();
        }
    }
    path.display().to_string()
}
