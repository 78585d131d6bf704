//! Tab picker flow tests
//!
//! Drive the app with key events the way the event loop does: handle a key,
//! then tick once per frame until the deferred picker stages are done.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fs;
use std::path::Path;
use tabdeck::tabs::{ActivationMode, TabHost, Workspace};
use tabdeck::ui::{App, AppEvent, Config};
use tempfile::TempDir;
use tokio::sync::mpsc::{self, UnboundedReceiver};

/// Helper to create a key event
fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::empty())
}

fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_key(key(KeyCode::Char(c)));
    }
}

/// Run pending picker stages, one per frame. Returns the number of frames.
fn run_frames(app: &mut App) -> usize {
    let mut frames = 0;
    while app.tick() {
        frames += 1;
    }
    frames
}

/// Workspace with `names` opened one per tab under a temp root.
fn create_test_app(names: &[&str], config: Config) -> (TempDir, App, UnboundedReceiver<AppEvent>) {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("src")).unwrap();
    let mut workspace = Workspace::new(Some(temp_dir.path().to_path_buf()));
    for name in names {
        fs::write(temp_dir.path().join(name), format!("contents of {}\n", name)).unwrap();
        workspace.open(Path::new(name)).unwrap();
    }
    let (tx, rx) = mpsc::unbounded_channel();
    (temp_dir, App::new(workspace, config, tx), rx)
}

fn labels(app: &App) -> Vec<String> {
    app.picker
        .session()
        .unwrap()
        .visible_entries()
        .iter()
        .map(|e| e.display())
        .collect()
}

#[test]
fn test_picker_lists_tabs_relative_to_root() {
    let (_dir, mut app, _rx) = create_test_app(&["README.md", "src/main.rs"], Config::default());

    app.handle_key(key(KeyCode::Char('t')));

    assert_eq!(labels(&app), vec!["1: README.md", "2: src/main.rs"]);
    assert_eq!(app.picker.session().unwrap().options.title, "Tabs");
}

#[test]
fn test_picker_marks_modified_and_split_tabs() {
    let (_dir, mut app, _rx) = create_test_app(&["a.txt", "b.txt"], Config::default());
    app.handle_key(key(KeyCode::Char('i')));
    type_text(&mut app, "x");
    app.handle_key(key(KeyCode::Esc));
    type_text(&mut app, ":split");
    app.handle_key(key(KeyCode::Enter));

    app.handle_key(key(KeyCode::Char('t')));

    assert_eq!(labels(&app), vec!["1: a.txt", "2: b.txt [+] (2 windows)"]);
}

#[test]
fn test_accept_switches_after_close_frame() {
    let (_dir, mut app, _rx) = create_test_app(&["a.txt", "b.txt", "c.txt"], Config::default());

    app.handle_key(key(KeyCode::Char('t')));
    type_text(&mut app, "a.t");
    app.handle_key(key(KeyCode::Enter));

    // Closed in state, but the tab switch waits for the loop.
    assert!(!app.picker.is_open());
    assert_eq!(app.workspace.current_position(), 2);

    assert!(app.tick());
    assert_eq!(app.workspace.current_position(), 2);
    assert!(app.tick());
    assert_eq!(app.workspace.current_position(), 0);
    assert!(!app.tick());
}

#[test]
fn test_dismiss_target_closes_tab() {
    let (_dir, mut app, _rx) = create_test_app(&["a.txt", "b.txt", "c.txt"], Config::default());

    app.handle_key(key(KeyCode::Char('t')));
    app.handle_key(key(KeyCode::Up));
    app.handle_key(ctrl('x'));
    assert_eq!(run_frames(&mut app), 2);

    assert_eq!(app.workspace.tab_count(), 2);
    assert!(!app.picker.is_open());
    assert_eq!(app.current_label(), "c.txt");
}

#[test]
fn test_dismiss_and_restart_reopens_without_closed_tab() {
    let (_dir, mut app, _rx) = create_test_app(&["a.txt", "b.txt", "c.txt"], Config::default());

    app.handle_key(key(KeyCode::Char('t')));
    app.handle_key(ctrl('n'));
    app.handle_key(ctrl('d'));
    assert_eq!(run_frames(&mut app), 3);

    assert!(app.picker.is_open());
    assert_eq!(labels(&app), vec!["1: b.txt", "2: c.txt"]);

    // The fresh session keeps working.
    app.handle_key(ctrl('d'));
    run_frames(&mut app);
    assert_eq!(labels(&app), vec!["1: b.txt"]);

    // The last tab cannot be closed; the picker still comes back.
    app.handle_key(ctrl('d'));
    run_frames(&mut app);
    assert_eq!(app.workspace.tab_count(), 1);
    assert!(app.picker.is_open());
}

#[test]
fn test_no_match_makes_actions_noops() {
    let (_dir, mut app, _rx) = create_test_app(&["a.txt", "b.txt"], Config::default());

    app.handle_key(key(KeyCode::Char('t')));
    type_text(&mut app, "zzz");
    app.handle_key(key(KeyCode::Enter));
    app.handle_key(ctrl('x'));

    assert!(app.picker.is_open());
    assert!(!app.has_pending_work());
    assert_eq!(app.workspace.tab_count(), 2);

    app.handle_key(key(KeyCode::Esc));
    run_frames(&mut app);
    assert!(!app.picker.is_open());
}

#[test]
fn test_tabs_command_opens_filtered() {
    let (_dir, mut app, _rx) = create_test_app(&["a.txt", "b.txt"], Config::default());

    type_text(&mut app, ":Tabs b.t");
    app.handle_key(key(KeyCode::Enter));

    assert_eq!(labels(&app), vec!["2: b.txt"]);
}

#[test]
fn test_index_activation_from_config() {
    let mut config = Config::default();
    config.picker.activation = ActivationMode::Index;
    config.picker.title = "Buffers".to_string();
    let (_dir, mut app, _rx) = create_test_app(&["a.txt", "b.txt"], config);

    assert_eq!(app.picker.activation().name(), "index");

    app.handle_key(key(KeyCode::Char('t')));
    assert_eq!(app.picker.session().unwrap().options.title, "Buffers");
    app.handle_key(key(KeyCode::Up));
    app.handle_key(key(KeyCode::Enter));
    run_frames(&mut app);
    assert_eq!(app.workspace.current_position(), 0);
}

#[test]
fn test_auto_activation_falls_back_to_index() {
    let mut workspace = Workspace::new(None);
    workspace.set_handle_activation(false);
    let (tx, _rx) = mpsc::unbounded_channel();
    let app = App::new(workspace, Config::default(), tx);
    assert_eq!(app.picker.activation().name(), "index");

    let (tx, _rx) = mpsc::unbounded_channel();
    let app = App::new(Workspace::new(None), Config::default(), tx);
    assert_eq!(app.picker.activation().name(), "handle");
}

#[test]
fn test_tab_removed_by_another_path_before_accept() {
    let (_dir, mut app, _rx) = create_test_app(&["a.txt", "b.txt", "c.txt"], Config::default());

    app.handle_key(key(KeyCode::Char('t')));
    app.handle_key(key(KeyCode::Enter));

    // The highlighted tab disappears before the activation stage runs.
    let handle = app.workspace.current_tab().unwrap();
    app.workspace.remove_tab_at(3).unwrap();
    run_frames(&mut app);

    // Activation failed quietly; the workspace is still usable.
    assert_eq!(app.workspace.tab_count(), 2);
    assert!(!app.workspace.tab_handles().contains(&handle));
}
