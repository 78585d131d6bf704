//! # Workspace
//!
//! In-memory editor state: buffers, the windows viewing them, and the tabs
//! grouping windows. This is the host the tab picker and the translate
//! command operate on.
//!
//! ```text
//! Workspace
//! ├── Tab (handle) ── Window ── cursor ──► Buffer (path, lines, modified)
//! │                └─ Window ───────────┘
//! └── Tab (handle) ── Window ──────────► Buffer
//! ```
//!
//! Buffers outlive the tabs that show them, so closing a tab never discards
//! unsaved text.

use super::host::{HostError, TabHandle, TabHost};
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub type BufferId = usize;

#[derive(Debug, Clone, Default)]
pub struct Buffer {
    pub path: Option<PathBuf>,
    pub lines: Vec<String>,
    pub modified: bool,
}

impl Buffer {
    pub fn empty() -> Self {
        Self {
            path: None,
            lines: vec![String::new()],
            modified: false,
        }
    }

    fn from_text(path: Option<PathBuf>, text: &str) -> Self {
        let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            path,
            lines,
            modified: false,
        }
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, |l| l.chars().count())
    }

    /// Nearest position that exists in this buffer.
    fn clamp(&self, cursor: Cursor) -> Cursor {
        let row = cursor.row.min(self.lines.len().saturating_sub(1));
        Cursor {
            row,
            col: cursor.col.min(self.line_len(row)),
        }
    }
}

/// Cursor position; `col` counts chars, not bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone)]
pub struct Window {
    pub buffer: BufferId,
    pub cursor: Cursor,
    /// Start of a visual selection, if one is active.
    pub anchor: Option<Cursor>,
}

impl Window {
    fn new(buffer: BufferId) -> Self {
        Self {
            buffer,
            cursor: Cursor::default(),
            anchor: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Tab {
    pub handle: TabHandle,
    pub windows: Vec<Window>,
    pub active_window: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
}

#[derive(Debug)]
pub struct Workspace {
    buffers: Vec<Buffer>,
    tabs: Vec<Tab>,
    current: usize,
    root: Option<PathBuf>,
    next_handle: u64,
    handle_activation: bool,
}

impl Workspace {
    /// A workspace with a single unnamed tab.
    pub fn new(root: Option<PathBuf>) -> Self {
        let mut workspace = Self {
            buffers: Vec::new(),
            tabs: Vec::new(),
            current: 0,
            root,
            next_handle: 1,
            handle_activation: true,
        };
        let buffer = workspace.add_buffer(Buffer::empty());
        workspace.push_tab(buffer);
        workspace
    }

    /// Disable activation by handle, for hosts that can only switch by index.
    pub fn set_handle_activation(&mut self, enabled: bool) {
        self.handle_activation = enabled;
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    /// 0-based position of the current tab.
    pub fn current_position(&self) -> usize {
        self.current
    }

    pub fn buffer(&self, id: BufferId) -> Option<&Buffer> {
        self.buffers.get(id)
    }

    /// Open `path` in a new tab and make it current.
    ///
    /// A missing file opens as an empty buffer that will be created on save.
    pub fn open_in_new_tab(&mut self, path: &Path) -> Result<TabHandle> {
        let buffer = self.load_buffer(path)?;
        let handle = self.push_tab(buffer);
        self.current = self.tabs.len() - 1;
        Ok(handle)
    }

    /// Open an unnamed buffer in a new tab and make it current.
    pub fn new_empty_tab(&mut self) -> TabHandle {
        let buffer = self.add_buffer(Buffer::empty());
        let handle = self.push_tab(buffer);
        self.current = self.tabs.len() - 1;
        handle
    }

    /// Replace the single startup tab with `path` if that tab is still an
    /// untouched unnamed buffer, otherwise open a new tab.
    pub fn open(&mut self, path: &Path) -> Result<TabHandle> {
        let pristine = self.tabs.len() == 1
            && self
                .current_buffer()
                .is_some_and(|b| b.path.is_none() && !b.modified && b.lines == [""]);
        if !pristine {
            return self.open_in_new_tab(path);
        }
        let buffer = self.load_buffer(path)?;
        let tab = &mut self.tabs[0];
        tab.windows = vec![Window::new(buffer)];
        tab.active_window = 0;
        Ok(tab.handle)
    }

    /// Add a window on the current buffer to the current tab.
    pub fn split(&mut self) {
        let Some(tab) = self.tabs.get_mut(self.current) else {
            return;
        };
        let Some(active) = tab.windows.get(tab.active_window).cloned() else {
            return;
        };
        tab.windows.push(Window {
            anchor: None,
            ..active
        });
        tab.active_window = tab.windows.len() - 1;
    }

    /// Cycle focus to the next window in the current tab.
    pub fn next_window(&mut self) {
        if let Some(tab) = self.tabs.get_mut(self.current) {
            if !tab.windows.is_empty() {
                tab.active_window = (tab.active_window + 1) % tab.windows.len();
            }
        }
    }

    pub fn next_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.current = (self.current + 1) % self.tabs.len();
        }
    }

    pub fn previous_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.current = if self.current > 0 {
                self.current - 1
            } else {
                self.tabs.len() - 1
            };
        }
    }

    pub fn current_window(&self) -> Option<&Window> {
        let tab = self.tabs.get(self.current)?;
        tab.windows.get(tab.active_window)
    }

    fn current_window_mut(&mut self) -> Option<&mut Window> {
        let tab = self.tabs.get_mut(self.current)?;
        tab.windows.get_mut(tab.active_window)
    }

    pub fn current_buffer(&self) -> Option<&Buffer> {
        self.buffers.get(self.current_window()?.buffer)
    }

    pub fn cursor(&self) -> Cursor {
        self.current_window().map(|w| w.cursor).unwrap_or_default()
    }

    /// Move the cursor. Returns whether it actually moved.
    pub fn move_cursor(&mut self, motion: Motion) -> bool {
        let Some(window) = self.current_window() else {
            return false;
        };
        let Some(buffer) = self.buffers.get(window.buffer) else {
            return false;
        };
        let Cursor { row, col } = buffer.clamp(window.cursor);
        let last_row = buffer.lines.len().saturating_sub(1);

        let target = match motion {
            Motion::Left => Cursor {
                row,
                col: col.saturating_sub(1),
            },
            Motion::Right => Cursor {
                row,
                col: (col + 1).min(buffer.line_len(row)),
            },
            Motion::Up => {
                let row = row.saturating_sub(1);
                Cursor {
                    row,
                    col: col.min(buffer.line_len(row)),
                }
            }
            Motion::Down => {
                let row = (row + 1).min(last_row);
                Cursor {
                    row,
                    col: col.min(buffer.line_len(row)),
                }
            }
            Motion::LineStart => Cursor { row, col: 0 },
            Motion::LineEnd => Cursor {
                row,
                col: buffer.line_len(row),
            },
        };

        if target == window.cursor {
            return false;
        }
        if let Some(window) = self.current_window_mut() {
            window.cursor = target;
        }
        true
    }

    /// Start a selection at the cursor, or clear the active one.
    pub fn toggle_selection(&mut self) {
        if let Some(window) = self.current_window_mut() {
            window.anchor = match window.anchor {
                Some(_) => None,
                None => Some(window.cursor),
            };
        }
    }

    pub fn clear_selection(&mut self) {
        if let Some(window) = self.current_window_mut() {
            window.anchor = None;
        }
    }

    pub fn has_selection(&self) -> bool {
        self.current_window().is_some_and(|w| w.anchor.is_some())
    }

    /// Text between the selection anchor and the cursor, both inclusive.
    pub fn selected_text(&self) -> Option<String> {
        let window = self.current_window()?;
        let anchor = window.anchor?;
        let buffer = self.buffers.get(window.buffer)?;
        let (start, end) = if anchor <= window.cursor {
            (anchor, window.cursor)
        } else {
            (window.cursor, anchor)
        };

        let mut parts = Vec::new();
        for row in start.row..=end.row {
            let line = buffer.lines.get(row)?;
            let from = if row == start.row { start.col } else { 0 };
            let to = if row == end.row {
                end.col + 1
            } else {
                usize::MAX
            };
            parts.push(
                line.chars()
                    .skip(from)
                    .take(to.saturating_sub(from))
                    .collect::<String>(),
            );
        }
        Some(parts.join("\n"))
    }

    /// The word touching the cursor, if any.
    pub fn word_under_cursor(&self) -> Option<String> {
        let buffer = self.current_buffer()?;
        let Cursor { row, col } = self.cursor();
        let chars: Vec<char> = buffer.lines.get(row)?.chars().collect();

        let is_word = |c: char| c.is_alphanumeric() || c == '_' || c == '\'';
        // Cursor just past the end of a word still counts.
        let col = if chars.get(col).copied().is_some_and(is_word) {
            col
        } else if col > 0 && chars.get(col - 1).copied().is_some_and(is_word) {
            col - 1
        } else {
            return None;
        };

        let start = chars[..col]
            .iter()
            .rposition(|c| !is_word(*c))
            .map_or(0, |i| i + 1);
        let end = chars[col..]
            .iter()
            .position(|c| !is_word(*c))
            .map_or(chars.len(), |i| col + i);
        Some(chars[start..end].iter().collect())
    }

    /// Insert `c` at the cursor (`'\n'` splits the line).
    pub fn insert_char(&mut self, c: char) {
        let Some(window) = self.current_window() else {
            return;
        };
        let (id, cursor) = (window.buffer, window.cursor);
        let Some(buffer) = self.buffers.get_mut(id) else {
            return;
        };
        let Cursor { row, col } = buffer.clamp(cursor);
        let Some(line) = buffer.lines.get_mut(row) else {
            return;
        };

        let at = byte_offset(line, col);
        let cursor = if c == '\n' {
            let rest = line.split_off(at);
            buffer.lines.insert(row + 1, rest);
            Cursor { row: row + 1, col: 0 }
        } else {
            line.insert(at, c);
            Cursor { row, col: col + 1 }
        };
        buffer.modified = true;
        self.set_cursor_in_buffer(id, cursor);
        self.clamp_windows(id);
    }

    /// Delete the char before the cursor, joining lines at column 0.
    pub fn backspace(&mut self) {
        let Some(window) = self.current_window() else {
            return;
        };
        let (id, cursor) = (window.buffer, window.cursor);
        let Some(buffer) = self.buffers.get_mut(id) else {
            return;
        };
        let Cursor { row, col } = buffer.clamp(cursor);

        let cursor = if col > 0 {
            let Some(line) = buffer.lines.get_mut(row) else {
                return;
            };
            let at = byte_offset(line, col - 1);
            line.remove(at);
            Cursor { row, col: col - 1 }
        } else if row > 0 {
            let tail = buffer.lines.remove(row);
            let prev = &mut buffer.lines[row - 1];
            let col = prev.chars().count();
            prev.push_str(&tail);
            Cursor { row: row - 1, col }
        } else {
            return;
        };
        buffer.modified = true;
        self.set_cursor_in_buffer(id, cursor);
        self.clamp_windows(id);
    }

    /// Pull every window on buffer `id` back inside it after an edit made
    /// through another window.
    fn clamp_windows(&mut self, id: BufferId) {
        let Some(buffer) = self.buffers.get(id) else {
            return;
        };
        let windows = self
            .tabs
            .iter_mut()
            .flat_map(|t| t.windows.iter_mut())
            .filter(|w| w.buffer == id);
        for window in windows {
            window.cursor = buffer.clamp(window.cursor);
            window.anchor = window.anchor.map(|a| buffer.clamp(a));
        }
    }

    fn set_cursor_in_buffer(&mut self, id: BufferId, cursor: Cursor) {
        if let Some(window) = self.current_window_mut() {
            if window.buffer == id {
                window.cursor = cursor;
            }
        }
    }

    /// Write the current buffer to its path.
    pub fn save_current(&mut self) -> Result<PathBuf> {
        let id = self
            .current_window()
            .map(|w| w.buffer)
            .context("No window is open")?;
        let buffer = self.buffers.get_mut(id).context("Window has no buffer")?;
        let path = buffer.path.clone().context("No file name")?;

        let mut contents = buffer.lines.join("\n");
        contents.push('\n');
        fs::write(&path, contents)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        buffer.modified = false;
        Ok(path)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            return path.to_path_buf();
        }
        match &self.root {
            Some(root) => root.join(path),
            None => std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf()),
        }
    }

    fn load_buffer(&mut self, path: &Path) -> Result<BufferId> {
        let path = self.resolve(path);
        if let Some(id) = self
            .buffers
            .iter()
            .position(|b| b.path.as_deref() == Some(path.as_path()))
        {
            return Ok(id);
        }

        let buffer = if path.exists() {
            if !path.is_file() {
                anyhow::bail!("Path is not a file: {}", path.display());
            }
            let text = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;
            Buffer::from_text(Some(path), &text)
        } else {
            Buffer {
                path: Some(path),
                ..Buffer::empty()
            }
        };
        Ok(self.add_buffer(buffer))
    }

    fn add_buffer(&mut self, buffer: Buffer) -> BufferId {
        self.buffers.push(buffer);
        self.buffers.len() - 1
    }

    fn push_tab(&mut self, buffer: BufferId) -> TabHandle {
        let handle = TabHandle::new(self.next_handle);
        self.next_handle += 1;
        self.tabs.push(Tab {
            handle,
            windows: vec![Window::new(buffer)],
            active_window: 0,
        });
        handle
    }

    fn tab(&self, handle: TabHandle) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.handle == handle)
    }

    fn primary_buffer(&self, handle: TabHandle) -> Option<&Buffer> {
        let tab = self.tab(handle)?;
        let window = tab.windows.get(tab.active_window)?;
        self.buffers.get(window.buffer)
    }

    fn position_of_index(&self, index: usize) -> Result<usize, HostError> {
        if index == 0 || index > self.tabs.len() {
            return Err(HostError::NoSuchIndex(index));
        }
        Ok(index - 1)
    }
}

/// Byte offset of the `col`-th char, clamped to the end of `line`.
fn byte_offset(line: &str, col: usize) -> usize {
    line.char_indices()
        .nth(col)
        .map_or(line.len(), |(offset, _)| offset)
}

impl TabHost for Workspace {
    fn tab_handles(&self) -> Vec<TabHandle> {
        self.tabs.iter().map(|t| t.handle).collect()
    }

    fn current_tab(&self) -> Option<TabHandle> {
        self.tabs.get(self.current).map(|t| t.handle)
    }

    fn primary_resource(&self, tab: TabHandle) -> Option<PathBuf> {
        self.primary_buffer(tab).and_then(|b| b.path.clone())
    }

    fn is_modified(&self, tab: TabHandle) -> bool {
        self.primary_buffer(tab).is_some_and(|b| b.modified)
    }

    fn view_count(&self, tab: TabHandle) -> usize {
        self.tab(tab).map_or(0, |t| t.windows.len())
    }

    fn working_root(&self) -> Option<PathBuf> {
        self.root.clone()
    }

    fn activate_tab_at(&mut self, index: usize) -> Result<(), HostError> {
        self.current = self.position_of_index(index)?;
        Ok(())
    }

    fn remove_tab_at(&mut self, index: usize) -> Result<(), HostError> {
        let position = self.position_of_index(index)?;
        if self.tabs.len() == 1 {
            return Err(HostError::LastTab);
        }
        self.tabs.remove(position);
        if self.current > position || self.current >= self.tabs.len() {
            self.current = self.current.saturating_sub(1);
        }
        Ok(())
    }

    fn can_activate_by_handle(&self) -> bool {
        self.handle_activation
    }

    fn activate_tab(&mut self, tab: TabHandle) -> Result<(), HostError> {
        if !self.handle_activation {
            return Err(HostError::Unsupported);
        }
        self.current = self
            .tabs
            .iter()
            .position(|t| t.handle == tab)
            .ok_or(HostError::NoSuchHandle(tab))?;
        Ok(())
    }
}
