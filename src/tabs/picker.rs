//! # Tab Picker Controller
//!
//! Owns the interactive tab picker session and the follow-up work its
//! actions trigger.
//!
//! ## Session Lifecycle
//!
//! ```text
//! open ──► Open ──(action)──► Closing ──(Stage::Close)──► Closed
//! ```
//!
//! ## Stages
//!
//! An action never touches the host directly. It captures the highlighted
//! entry and queues stages, and the event loop runs one stage per tick:
//!
//! | Action | Stages |
//! |--------|--------|
//! | Accept | `Close`, `Activate` |
//! | Dismiss target | `Close`, `Remove` |
//! | Dismiss and restart | `Close`, `Remove`, `Rebuild` |
//! | Cancel | `Close` |
//!
//! Running one stage per tick means the closed picker is drawn before its
//! effect lands, and `Remove` is always issued before `Rebuild` builds the
//! next catalog. Whether the host has finished removing the tab by then is up
//! to the host; the new catalog shows whatever it reports.

use super::catalog::{build_catalog, Entry};
use super::host::{ActivationStrategy, Ignorable, TabHost};
use std::collections::VecDeque;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closing,
    Closed,
}

/// Actions bound inside an open picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Switch to the highlighted tab.
    Accept,
    /// Close the highlighted tab.
    DismissTarget,
    /// Close the highlighted tab and reopen the picker.
    DismissAndRestart,
    /// Close the picker without doing anything.
    Cancel,
}

/// Deferred work queued by an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    Close,
    Activate(Entry),
    Remove(Entry),
    Rebuild,
}

/// Settings a session is opened with. A restart reuses them unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOptions {
    pub title: String,
    /// Filter text the picker opens with.
    pub initial_query: String,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            title: "Tabs".to_string(),
            initial_query: String::new(),
        }
    }
}

/// One run of the picker, from open to closed.
#[derive(Debug, Clone)]
pub struct PickerSession {
    pub id: u64,
    pub entries: Vec<Entry>,
    pub selected: Option<Entry>,
    pub state: SessionState,
    pub options: PickerOptions,
    pub query: String,
    /// Row within [`PickerSession::visible_entries`].
    pub highlighted: usize,
}

impl PickerSession {
    fn new(id: u64, entries: Vec<Entry>, options: PickerOptions, current: Option<usize>) -> Self {
        let mut session = Self {
            id,
            entries,
            selected: None,
            state: SessionState::Open,
            query: options.initial_query.clone(),
            options,
            highlighted: 0,
        };
        // Start on the tab the user is already in.
        if let Some(index) = current {
            if let Some(row) = session
                .visible_entries()
                .iter()
                .position(|e| e.index == index)
            {
                session.highlighted = row;
            }
        }
        session
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Entries whose search key contains the query (case-insensitive).
    pub fn visible_entries(&self) -> Vec<&Entry> {
        let query = self.query.to_lowercase();
        self.entries
            .iter()
            .filter(|e| query.is_empty() || e.search_key.to_lowercase().contains(&query))
            .collect()
    }

    /// The highlighted entry, if any entry is visible.
    pub fn current_entry(&self) -> Option<&Entry> {
        self.visible_entries().get(self.highlighted).copied()
    }

    pub fn next(&mut self) {
        let count = self.visible_entries().len();
        if count > 0 {
            self.highlighted = (self.highlighted + 1) % count;
        }
    }

    pub fn previous(&mut self) {
        let count = self.visible_entries().len();
        if count > 0 {
            self.highlighted = if self.highlighted > 0 {
                self.highlighted - 1
            } else {
                count - 1
            };
        }
    }

    pub fn push_query(&mut self, c: char) {
        self.query.push(c);
        self.highlighted = 0;
    }

    pub fn pop_query(&mut self) {
        self.query.pop();
        self.highlighted = 0;
    }
}

/// Manages at most one picker session and its pending stages.
#[derive(Debug)]
pub struct PickerController {
    session: Option<PickerSession>,
    pending: VecDeque<Stage>,
    /// Options of the last opened session, reused by `Stage::Rebuild`.
    options: PickerOptions,
    activation: Box<dyn ActivationStrategy>,
    next_id: u64,
}

impl PickerController {
    pub fn new(activation: Box<dyn ActivationStrategy>) -> Self {
        Self {
            session: None,
            pending: VecDeque::new(),
            options: PickerOptions::default(),
            activation,
            next_id: 1,
        }
    }

    pub fn activation(&self) -> &dyn ActivationStrategy {
        self.activation.as_ref()
    }

    /// The latest session, including one that has already closed.
    pub fn session(&self) -> Option<&PickerSession> {
        self.session.as_ref()
    }

    /// The session while it accepts input.
    pub fn open_session_mut(&mut self) -> Option<&mut PickerSession> {
        self.session.as_mut().filter(|s| s.is_open())
    }

    pub fn is_open(&self) -> bool {
        self.session.as_ref().is_some_and(PickerSession::is_open)
    }

    /// Whether stages are waiting for [`PickerController::step`].
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Open a session with a fresh catalog. Keeps the current session if one
    /// is already open.
    pub fn open(&mut self, host: &dyn TabHost, options: PickerOptions) -> &PickerSession {
        let session = match self.session.take() {
            Some(session) if session.is_open() => session,
            _ => {
                self.options = options;
                self.new_session(host)
            }
        };
        self.session.insert(session)
    }

    fn new_session(&mut self, host: &dyn TabHost) -> PickerSession {
        let entries = build_catalog(host);
        let current = host
            .current_tab()
            .and_then(|h| entries.iter().find(|e| e.handle == h))
            .map(|e| e.index);

        let id = self.next_id;
        self.next_id += 1;
        debug!(session = id, entries = entries.len(), "tab picker opened");
        PickerSession::new(id, entries, self.options.clone(), current)
    }

    /// Run `action` against the highlighted entry.
    ///
    /// Returns `false` (and does nothing) when no session is open or, for
    /// anything but `Cancel`, when no entry is highlighted.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let Some(session) = self.session.as_mut().filter(|s| s.is_open()) else {
            return false;
        };

        let entry = session.current_entry().cloned();
        let stages = match (action, entry) {
            (Action::Cancel, _) => vec![Stage::Close],
            (_, None) => return false,
            (Action::Accept, Some(entry)) => vec![Stage::Close, Stage::Activate(entry)],
            (Action::DismissTarget, Some(entry)) => vec![Stage::Close, Stage::Remove(entry)],
            (Action::DismissAndRestart, Some(entry)) => {
                vec![Stage::Close, Stage::Remove(entry), Stage::Rebuild]
            }
        };
        if let Some(Stage::Activate(entry) | Stage::Remove(entry)) = stages.get(1) {
            session.selected = Some(entry.clone());
        }

        debug!(session = session.id, ?action, "tab picker action");
        session.state = SessionState::Closing;
        self.pending.extend(stages);
        true
    }

    /// Run the next pending stage. Returns the stage that ran.
    pub fn step(&mut self, host: &mut dyn TabHost) -> Option<Stage> {
        let stage = self.pending.pop_front()?;
        match &stage {
            Stage::Close => {
                if let Some(session) = self.session.as_mut() {
                    session.state = SessionState::Closed;
                }
            }
            Stage::Activate(entry) => {
                Ignorable::from(self.activation.activate(host, entry)).ignore("activate");
            }
            Stage::Remove(entry) => {
                Ignorable::from(host.remove_tab_at(entry.index)).ignore("remove");
            }
            Stage::Rebuild => {
                let session = self.new_session(host);
                self.session = Some(session);
            }
        }
        debug!(?stage, "tab picker stage ran");
        Some(stage)
    }

    /// Run every pending stage back to back.
    pub fn run_pending(&mut self, host: &mut dyn TabHost) -> Vec<Stage> {
        let mut ran = Vec::new();
        while let Some(stage) = self.step(host) {
            ran.push(stage);
        }
        ran
    }
}
