use crate::tabs::workspace::Window;
use crate::tabs::{display_label, Cursor, TabHost};
use crate::ui::app::{App, Mode};
use crate::ui::overlay::{Anchor, OverlayRequest};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

pub fn render(frame: &mut Frame, app: &App) {
    // Main layout: Tabline + Body + Footer
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tabline
            Constraint::Min(0),    // Windows
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    render_tabline(frame, app, main_chunks[0]);
    let cursor = render_windows(frame, app, main_chunks[1]);
    render_footer(frame, app, main_chunks[2]);

    if let Some(request) = app.overlay.visible() {
        render_overlay(frame, request, cursor);
    }

    if app.picker.is_open() {
        render_picker(frame, app);
    } else if app.mode == Mode::Command {
        let footer = main_chunks[2];
        if footer.width > 0 {
            let offset = app.command_line.chars().count() + 1;
            let x = footer.x + cursor_cell(offset, footer.width);
            frame.set_cursor_position(Position::new(x, footer.y));
        }
    } else if let Some(position) = cursor {
        frame.set_cursor_position(position);
    }
}

fn render_tabline(frame: &mut Frame, app: &App, area: Rect) {
    let root = app.workspace.working_root();
    let current = app.workspace.current_position();

    let spans: Vec<Span> = app
        .workspace
        .tabs()
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            let path = app.workspace.primary_resource(tab.handle);
            let mut label = format!(" {} ", display_label(path.as_deref(), root.as_deref()));
            if app.workspace.is_modified(tab.handle) {
                label.push_str("[+] ");
            }
            let style = if i == current {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Span::styled(label, style)
        })
        .collect();

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draw every window of the current tab. Returns the screen position of the
/// active window's cursor.
fn render_windows(frame: &mut Frame, app: &App, area: Rect) -> Option<Position> {
    let tab = app.workspace.tabs().get(app.workspace.current_position())?;
    let count = tab.windows.len().max(1) as u32;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, count); tab.windows.len()])
        .split(area);

    let mut cursor = None;
    for (i, (window, chunk)) in tab.windows.iter().zip(chunks.iter()).enumerate() {
        let active = i == tab.active_window;
        let position = render_window(frame, app, window, *chunk, active);
        if active {
            cursor = position;
        }
    }
    cursor
}

fn render_window(
    frame: &mut Frame,
    app: &App,
    window: &Window,
    area: Rect,
    active: bool,
) -> Option<Position> {
    let buffer = app.workspace.buffer(window.buffer)?;
    let root = app.workspace.root();
    let mut title = format!(" {} ", display_label(buffer.path.as_deref(), root));
    if buffer.modified {
        title.push_str("[+] ");
    }

    let border_color = if active { Color::Cyan } else { Color::Gray };
    let block = Block::default()
        .borders(Borders::TOP)
        .title(title)
        .border_style(Style::default().fg(border_color));
    let inner = block.inner(area);

    let height = inner.height as usize;
    let top = scroll_offset(window.cursor.row, height);
    let left = scroll_offset(window.cursor.col, inner.width as usize);
    let selection = window.anchor.map(|anchor| ordered(anchor, window.cursor));

    let text: Vec<Line> = buffer
        .lines
        .iter()
        .enumerate()
        .skip(top)
        .take(height)
        .map(|(row, line)| buffer_line(line, row, left, selection))
        .collect();

    frame.render_widget(Paragraph::new(text).block(block), area);

    if inner.height == 0 || inner.width == 0 {
        return None;
    }
    let x = inner.x + cursor_cell(window.cursor.col - left, inner.width);
    let y = inner.y + cursor_cell(window.cursor.row - top, inner.height);
    Some(Position::new(x, y))
}

/// First visible row (or column) so that `pos` stays inside `extent` cells.
pub fn scroll_offset(pos: usize, extent: usize) -> usize {
    if extent == 0 {
        return pos;
    }
    (pos + 1).saturating_sub(extent)
}

/// Screen cell for `offset`, kept inside a non-empty `extent`.
fn cursor_cell(offset: usize, extent: u16) -> u16 {
    let last = extent.saturating_sub(1);
    u16::try_from(offset).map_or(last, |cell| cell.min(last))
}

fn ordered(a: Cursor, b: Cursor) -> (Cursor, Cursor) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// One buffer line with its first `left` chars scrolled off.
fn buffer_line(
    line: &str,
    row: usize,
    left: usize,
    selection: Option<(Cursor, Cursor)>,
) -> Line<'static> {
    let visible = || line.chars().skip(left);
    let Some((start, end)) = selection.filter(|(s, e)| (s.row..=e.row).contains(&row)) else {
        return Line::from(visible().collect::<String>());
    };

    let from = if row == start.row { start.col } else { 0 };
    let to = if row == end.row {
        end.col + 1
    } else {
        usize::MAX
    };
    let (from, to) = (from.saturating_sub(left), to.saturating_sub(left));

    let before: String = visible().take(from).collect();
    let selected: String = visible().skip(from).take(to.saturating_sub(from)).collect();
    let after: String = visible().skip(to).collect();

    Line::from(vec![
        Span::raw(before),
        Span::styled(selected, Style::default().bg(Color::DarkGray)),
        Span::raw(after),
    ])
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = match app.mode {
        Mode::Command => Line::from(format!(":{}", app.command_line)),
        _ => match &app.status {
            Some(status) => Line::from(Span::styled(
                status.clone(),
                Style::default().fg(Color::Yellow),
            )),
            None if app.mode == Mode::Insert => Line::from(Span::styled(
                "-- INSERT --",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            None => Line::from(Span::styled(
                "[hjkl] Move  [v] Select  [T] Translate  [t] Tabs  [:] Command  [q] Quit",
                Style::default().fg(Color::Gray),
            )),
        },
    };

    frame.render_widget(Paragraph::new(line), area);
}

fn render_picker(frame: &mut Frame, app: &App) {
    let Some(session) = app.picker.session() else {
        return;
    };
    let area = centered_rect(60, 60, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", session.options.title))
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let prompt = Line::from(vec![
        Span::styled("> ", Style::default().fg(Color::Cyan)),
        Span::raw(session.query.clone()),
    ]);
    frame.render_widget(Paragraph::new(prompt), chunks[0]);

    let visible = session.visible_entries();
    let items: Vec<ListItem> = visible
        .iter()
        .map(|entry| ListItem::new(entry.display()))
        .collect();
    let list = List::new(items)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    let highlighted = session.current_entry().map(|_| session.highlighted);
    let mut state = ListState::default().with_selected(highlighted);
    frame.render_stateful_widget(list, chunks[1], &mut state);

    let x = chunks[0].x + 2 + session.query.chars().count() as u16;
    frame.set_cursor_position(Position::new(
        x.min(chunks[0].right().saturating_sub(1)),
        chunks[0].y,
    ));
}

fn render_overlay(frame: &mut Frame, request: &OverlayRequest, cursor: Option<Position>) {
    let area = overlay_area(frame.area(), cursor, request);
    if area.width < 3 || area.height < 3 {
        return;
    }
    frame.render_widget(Clear, area);

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta));
    if let Some(title) = &request.options.title {
        block = block.title(format!(" {} ", title));
    }

    let text: Vec<Line> = request
        .content
        .iter()
        .map(String::as_str)
        .map(styled_line)
        .collect();
    frame.render_widget(Paragraph::new(text).block(block), area);
}

/// Where the overlay goes: sized to its content within the configured
/// limits, below the cursor or above it when there is no room.
pub fn overlay_area(screen: Rect, cursor: Option<Position>, request: &OverlayRequest) -> Rect {
    let options = &request.options;
    let content_width = request
        .content
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max(options.title.as_ref().map_or(0, |t| t.chars().count() + 2));

    let width = (content_width as u16)
        .saturating_add(2)
        .min(options.max_width)
        .min(screen.width);
    let height = (request.content.len() as u16)
        .saturating_add(2)
        .min(options.max_height)
        .min(screen.height);

    let (x, y) = match (options.anchor, cursor) {
        (Anchor::Cursor, Some(cursor)) => {
            let below = cursor.y.saturating_add(1);
            let y = if below.saturating_add(height) <= screen.bottom() {
                below
            } else {
                cursor.y.saturating_sub(height).max(screen.y)
            };
            let x = cursor.x.min(screen.right().saturating_sub(width));
            (x, y)
        }
        _ => (
            screen.x + (screen.width - width) / 2,
            screen.y + (screen.height - height) / 2,
        ),
    };

    Rect::new(x, y, width, height)
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

/// Render one markdown-like line: `# ` headings and `**bold**` runs.
pub fn styled_line(line: &str) -> Line<'static> {
    if let Some(heading) = line.strip_prefix("# ") {
        return Line::from(Span::styled(
            heading.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let mut spans = Vec::new();
    let mut bold = false;
    for (i, part) in line.split("**").enumerate() {
        if i > 0 {
            bold = !bold;
        }
        if part.is_empty() {
            continue;
        }
        let style = if bold {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        spans.push(Span::styled(part.to_string(), style));
    }
    Line::from(spans)
}
