//! Translate flow tests
//!
//! End to end through the app: key press or `:Translate` command, a real
//! child process, the completion event, and the overlay it produces. Standard
//! tools stand in for translate-shell so the argv can be observed.
#![cfg(unix)]

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tabdeck::tabs::Workspace;
use tabdeck::translate::NOTHING_TO_TRANSLATE;
use tabdeck::ui::{App, AppEvent, Config};
use tempfile::TempDir;
use tokio::sync::mpsc::{self, UnboundedReceiver};

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::empty())
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_key(key(KeyCode::Char(c)));
    }
}

fn create_test_app(text: &str, program: &str) -> (TempDir, App, UnboundedReceiver<AppEvent>) {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("notes.txt"), text).unwrap();
    let mut workspace = Workspace::new(Some(temp_dir.path().to_path_buf()));
    workspace.open(Path::new("notes.txt")).unwrap();

    let mut config = Config::default();
    config.translator.program = program.to_string();
    config.translator.default_target = Some(":fr".to_string());

    let (tx, rx) = mpsc::unbounded_channel();
    (temp_dir, App::new(workspace, config, tx), rx)
}

/// Wait for the translation to come back and hand it to the app.
async fn deliver(app: &mut App, rx: &mut UnboundedReceiver<AppEvent>) {
    let event = tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("translation timed out")
        .expect("channel closed");
    app.handle_event(event);
}

fn overlay_lines(app: &App) -> Vec<String> {
    app.overlay.visible().map(|r| r.content.clone()).unwrap_or_default()
}

#[tokio::test]
async fn test_translate_word_under_cursor() {
    let (_dir, mut app, mut rx) = create_test_app("hello world\n", "echo");

    app.handle_key(key(KeyCode::Char('T')));
    assert_eq!(app.jobs_in_flight, 1);
    assert!(app.has_pending_work());

    deliver(&mut app, &mut rx).await;
    assert_eq!(overlay_lines(&app), vec!["-brief --no-ansi :fr hello"]);
    assert_eq!(
        app.overlay.visible().and_then(|r| r.options.title.clone()).as_deref(),
        Some(":fr")
    );
    assert!(!app.has_pending_work());
}

#[tokio::test]
async fn test_translate_selection_verbose_command() {
    let (_dir, mut app, mut rx) = create_test_app("good morning\n", "echo");

    app.handle_key(key(KeyCode::Char('v')));
    app.handle_key(key(KeyCode::Char('$')));
    type_text(&mut app, ":Translate! :bg");
    app.handle_key(key(KeyCode::Enter));

    // The selection is consumed by the request.
    assert!(!app.workspace.has_selection());

    deliver(&mut app, &mut rx).await;
    assert_eq!(overlay_lines(&app), vec!["--no-ansi :bg good morning"]);
}

#[tokio::test]
async fn test_translate_command_without_target_uses_default() {
    let (_dir, mut app, mut rx) = create_test_app("hello\n", "echo");
    app.config.translator.default_target = None;

    type_text(&mut app, ":Translate");
    app.handle_key(key(KeyCode::Enter));

    deliver(&mut app, &mut rx).await;
    assert_eq!(overlay_lines(&app), vec!["-brief --no-ansi hello"]);
    assert_eq!(
        app.overlay.visible().and_then(|r| r.options.title.clone()).as_deref(),
        Some("Translate")
    );
}

#[tokio::test]
async fn test_translator_failure_exit_code() {
    let (_dir, mut app, mut rx) = create_test_app("hello\n", "false");

    app.handle_key(key(KeyCode::Char('T')));
    deliver(&mut app, &mut rx).await;

    assert_eq!(overlay_lines(&app), vec!["**Translator exited with code 1**"]);
}

#[tokio::test]
async fn test_missing_translator_reports_failure() {
    let (_dir, mut app, mut rx) = create_test_app("hello\n", "tabdeck-no-such-translator");

    app.handle_key(key(KeyCode::Char('T')));

    // Spawn failure is reported before the key handler returns.
    let event = rx.try_recv().expect("failure delivered synchronously");
    app.handle_event(event);

    let lines = overlay_lines(&app);
    assert_eq!(lines[0], "**Failed to start `tabdeck-no-such-translator`**");
    assert_eq!(app.jobs_in_flight, 0);
}

#[tokio::test]
async fn test_nothing_to_translate() {
    let (_dir, mut app, mut rx) = create_test_app("   \n", "echo");

    app.handle_key(key(KeyCode::Char('T')));

    assert_eq!(overlay_lines(&app), vec![NOTHING_TO_TRANSLATE]);
    assert!(rx.try_recv().is_err());
    assert_eq!(app.jobs_in_flight, 0);
}

#[tokio::test]
async fn test_overlay_dismissed_by_cursor_motion() {
    let (_dir, mut app, mut rx) = create_test_app("hello world\n", "echo");

    app.handle_key(key(KeyCode::Char('T')));
    deliver(&mut app, &mut rx).await;
    assert!(app.overlay.is_visible());

    app.handle_key(key(KeyCode::Char('l')));
    assert!(!app.overlay.is_visible());

    // Further triggers after dismissal change nothing.
    app.handle_key(key(KeyCode::Char('i')));
    assert!(!app.overlay.is_visible());
}

#[tokio::test]
async fn test_newer_translation_replaces_overlay() {
    let (_dir, mut app, mut rx) = create_test_app("hello world\n", "echo");

    app.handle_key(key(KeyCode::Char('T')));
    deliver(&mut app, &mut rx).await;
    let first = app.overlay.handle();

    app.handle_key(key(KeyCode::Char('$')));
    app.handle_key(key(KeyCode::Char('T')));
    deliver(&mut app, &mut rx).await;

    assert_ne!(app.overlay.handle(), first);
    assert_eq!(overlay_lines(&app), vec!["-brief --no-ansi :fr world"]);
}
