//! # Overlay
//!
//! A transient popup used to show translation results. Only one surface is
//! visible at a time; showing a new one replaces the old.
//!
//! Every shown surface is armed with the same set of dismissal triggers
//! ([`DISMISS_TRIGGERS`]). The first trigger that fires tears the surface
//! down; anything after that is a no-op, as is dismissing a handle twice.

use tracing::debug;

/// Events that close the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissTrigger {
    CursorMoved,
    /// The buffer lost focus (tab switch, picker opened, command line).
    FocusLost,
    InsertEntered,
}

pub const DISMISS_TRIGGERS: [DismissTrigger; 3] = [
    DismissTrigger::CursorMoved,
    DismissTrigger::FocusLost,
    DismissTrigger::InsertEntered,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Just below the cursor, flipping above when there is no room.
    Cursor,
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayOptions {
    pub anchor: Anchor,
    pub max_width: u16,
    pub max_height: u16,
    pub title: Option<String>,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            anchor: Anchor::Cursor,
            max_width: 60,
            max_height: 16,
            title: None,
        }
    }
}

/// Content plus placement for one overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayRequest {
    /// Markdown-like lines.
    pub content: Vec<String>,
    pub options: OverlayOptions,
}

impl OverlayRequest {
    pub fn new(content: Vec<String>, options: OverlayOptions) -> Self {
        Self { content, options }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(u64);

#[derive(Debug)]
struct Surface {
    handle: SurfaceHandle,
    request: OverlayRequest,
    triggers: Vec<DismissTrigger>,
}

#[derive(Debug, Default)]
pub struct Overlay {
    surface: Option<Surface>,
    next_handle: u64,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `request`, replacing any visible surface.
    pub fn show(&mut self, request: OverlayRequest) -> SurfaceHandle {
        self.next_handle += 1;
        let handle = SurfaceHandle(self.next_handle);
        if let Some(old) = self.surface.take() {
            debug!(surface = old.handle.0, "overlay replaced");
        }
        self.surface = Some(Surface {
            handle,
            request,
            triggers: DISMISS_TRIGGERS.to_vec(),
        });
        handle
    }

    /// Close `handle` if it is still the visible surface.
    pub fn dismiss(&mut self, handle: SurfaceHandle) -> bool {
        if self.surface.as_ref().is_some_and(|s| s.handle == handle) {
            self.surface = None;
            debug!(surface = handle.0, "overlay dismissed");
            return true;
        }
        false
    }

    /// Report that `trigger` happened. Returns the surface it closed.
    pub fn notify(&mut self, trigger: DismissTrigger) -> Option<SurfaceHandle> {
        let handle = self
            .surface
            .as_ref()
            .filter(|s| s.triggers.contains(&trigger))?
            .handle;
        debug!(?trigger, "overlay dismiss trigger");
        self.dismiss(handle);
        Some(handle)
    }

    pub fn visible(&self) -> Option<&OverlayRequest> {
        self.surface.as_ref().map(|s| &s.request)
    }

    pub fn handle(&self) -> Option<SurfaceHandle> {
        self.surface.as_ref().map(|s| s.handle)
    }

    pub fn is_visible(&self) -> bool {
        self.surface.is_some()
    }
}
