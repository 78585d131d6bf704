//! # Tabs Module
//!
//! Tab bookkeeping and the interactive tab picker.
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`workspace::Workspace`] | Editor state: tabs, windows, buffers |
//! | [`host::TabHost`] | Capability set the picker needs from a host |
//! | [`catalog::build_catalog`] | Snapshot of tabs as picker entries |
//! | [`picker::PickerController`] | Picker session and deferred actions |

pub mod catalog;
pub mod host;
pub mod picker;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;

pub use catalog::{build_catalog, display_label, Entry, NO_NAME};
pub use host::{
    select_strategy, ActivateByHandle, ActivateByIndex, ActivationMode, ActivationStrategy,
    HostError, Ignorable, TabHandle, TabHost,
};
pub use picker::{Action, PickerController, PickerOptions, PickerSession, SessionState, Stage};
pub use workspace::{Buffer, Cursor, Motion, Workspace};
