//! # Tabdeck CLI Entry Point
//!
//! This is the main entry point for the Tabdeck TUI application.
//!
//! ## Overview
//!
//! Tabdeck is a small modal editor shell. Files open one per tab, a picker
//! lists every tab for switching and closing, and the word under the cursor
//! (or the selection) can be translated with translate-shell into a popup.
//!
//! ## Usage
//!
//! ```bash
//! # Open two files in tabs, paths relative to the current directory
//! tabdeck notes.md todo.md
//!
//! # Resolve and label paths against another directory
//! tabdeck --root ~/project src/main.rs
//!
//! # Debug logging to a chosen file
//! tabdeck --verbose --log-file /tmp/tabdeck.log
//! ```
//!
//! ## Key Bindings
//!
//! ### Normal mode
//! - `h` `j` `k` `l` / arrows - Move the cursor
//! - `0` / `$` - Line start / end
//! - `v` - Start or clear a selection
//! - `T` - Translate the selection or word under the cursor
//! - `t` - Open the tab picker
//! - `Tab` / `Shift+Tab` - Next / previous tab
//! - `Ctrl+w` - Next window
//! - `i` - Insert mode, `Esc` back to normal
//! - `:` - Command line (`Translate[!] [lang]`, `Tabs`, `tabnew`, `split`, `w`, `q`)
//! - `q` - Quit
//!
//! ### Tab picker
//! - `Enter` - Switch to the highlighted tab
//! - `Ctrl+x` - Close the highlighted tab
//! - `Ctrl+d` - Close the highlighted tab and reopen the picker
//! - `Esc` - Close the picker
//! - `Up` / `Down`, `Ctrl+p` / `Ctrl+n` - Move the highlight
//! - Typing filters by tab number and name

use tabdeck::logging;
use tabdeck::tabs::Workspace;
use tabdeck::ui::{self, App, AppEvent, Config};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::io;
use std::panic;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info};

/// Trait for reading terminal events (allows dependency injection for testing)
trait EventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

/// Production event reader that uses crossterm's event polling + read
struct CrosstermEventReader;

impl EventReader for CrosstermEventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if event::poll(timeout).context("Failed to poll for events")? {
            Ok(Some(
                event::read().context("Failed to read keyboard event")?,
            ))
        } else {
            Ok(None)
        }
    }
}

/// Tabdeck - a terminal editor shell with a tab picker and inline translations
#[derive(Parser, Debug)]
#[command(name = "tabdeck")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Edit files in tabs, pick tabs fast, translate words in place", long_about = None)]
struct Args {
    /// Files to open, one per tab
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// Working root used to resolve and label paths (defaults to the current directory)
    #[arg(long, value_name = "DIR", conflicts_with = "no_root")]
    root: Option<PathBuf>,

    /// Run without a working root; tabs show full paths
    #[arg(long)]
    no_root: bool,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write logs to this file instead of the default location
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up panic hook to ensure terminal is restored on panic
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);

        original_hook(panic_info);
    }));

    let result = run_application(args).await;

    // Restore panic hook
    let _ = panic::take_hook();

    result
}

async fn run_application(args: Args) -> Result<()> {
    match logging::init(args.verbose, args.log_file.as_deref()) {
        Ok(path) => info!(log = %path.display(), "tabdeck starting"),
        Err(e) => eprintln!("Warning: logging disabled: {:#}", e),
    }

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };

    let workspace = build_workspace(&args)?;

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode for terminal")?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut app = App::new(workspace, config, tx);

    // Run the app and ensure cleanup happens even on error
    let mut event_reader = CrosstermEventReader;
    let run_result = run_app(&mut terminal, &mut app, &mut rx, &mut event_reader).await;

    // Restore terminal (always runs, even if run_app failed)
    let cleanup_result = cleanup_terminal(&mut terminal);

    if app.jobs_in_flight > 0 {
        info!(jobs = app.jobs_in_flight, "exiting with translations in flight");
    }

    // Return the first error that occurred, or Ok if both succeeded
    run_result?;
    cleanup_result?;

    Ok(())
}

/// Build the workspace: resolve the working root and open the given files.
fn build_workspace(args: &Args) -> Result<Workspace> {
    let root = if args.no_root {
        None
    } else if let Some(path) = &args.root {
        let root = path
            .canonicalize()
            .with_context(|| format!("Failed to access directory: {}", path.display()))?;
        if !root.is_dir() {
            anyhow::bail!("Not a directory: {}", root.display());
        }
        Some(root)
    } else {
        Some(std::env::current_dir().context("Failed to get current working directory")?)
    };

    let mut workspace = Workspace::new(root);
    for file in &args.files {
        workspace
            .open(file)
            .with_context(|| format!("Failed to open {}", file.display()))?;
    }
    Ok(workspace)
}

/// Clean up terminal state
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;

    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;

    terminal.show_cursor().context("Failed to show cursor")?;

    Ok(())
}

async fn run_app<B>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &mut UnboundedReceiver<AppEvent>,
    event_reader: &mut dyn EventReader,
) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    loop {
        // Deliver finished translations
        while let Ok(event) = events.try_recv() {
            app.handle_event(event);
        }

        terminal
            .draw(|f| ui::render(f, app))
            .context("Failed to draw terminal UI")?;

        // One deferred picker stage per frame, after the frame that shows
        // the picker closed.
        app.tick();

        if app.should_quit {
            return Ok(());
        }

        // Spin faster while picker stages or translations are pending
        let poll_timeout = if app.has_pending_work() {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        };

        let event = match event_reader.read_event(poll_timeout)? {
            Some(e) => e,
            None => {
                // Let runner tasks make progress on a current-thread runtime
                tokio::task::yield_now().await;
                continue;
            }
        };

        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key(key),
            Event::Key(_) | Event::Resize(_, _) => {}
            other => debug!(event = ?other, "unhandled terminal event"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::collections::VecDeque;
    use tempfile::TempDir;

    /// Mock event reader for testing that returns a predetermined sequence of events
    struct MockEventReader {
        events: VecDeque<Event>,
    }

    impl MockEventReader {
        fn new(events: Vec<Event>) -> Self {
            Self {
                events: VecDeque::from(events),
            }
        }
    }

    impl EventReader for MockEventReader {
        fn read_event(&mut self, _timeout: Duration) -> Result<Option<Event>> {
            Ok(self.events.pop_front())
        }
    }

    /// Helper to create a key event
    fn key_event(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn args(files: &[&str]) -> Args {
        Args {
            files: files.iter().map(PathBuf::from).collect(),
            root: None,
            no_root: false,
            config: None,
            log_file: None,
            verbose: false,
        }
    }

    #[test]
    fn test_mock_event_reader() {
        let mut reader = MockEventReader::new(vec![key_event(KeyCode::Char('a'))]);
        assert!(matches!(
            reader.read_event(Duration::from_millis(10)).unwrap(),
            Some(Event::Key(KeyEvent {
                code: KeyCode::Char('a'),
                ..
            }))
        ));
        assert!(reader
            .read_event(Duration::from_millis(10))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from(["tabdeck", "--no-root", "-v", "a.txt", "b.txt"]).unwrap();
        assert!(args.no_root);
        assert!(args.verbose);
        assert_eq!(args.files.len(), 2);

        let conflict = Args::try_parse_from(["tabdeck", "--root", "/tmp", "--no-root"]);
        assert!(conflict.is_err());
    }

    #[test]
    fn test_build_workspace_opens_files_in_tabs() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("a.txt"), "a").unwrap();
        std::fs::write(temp_dir.path().join("b.txt"), "b").unwrap();

        let mut args = args(&["a.txt", "b.txt"]);
        args.root = Some(temp_dir.path().to_path_buf());

        let workspace = build_workspace(&args).unwrap();
        assert_eq!(workspace.tab_count(), 2);
        assert_eq!(workspace.current_position(), 1);
    }

    #[test]
    fn test_build_workspace_missing_root() {
        let mut args = args(&[]);
        args.root = Some(PathBuf::from("/nonexistent/directory/that/does/not/exist"));

        let err = build_workspace(&args).unwrap_err();
        assert!(err.to_string().contains("Failed to access directory"));
    }

    #[test]
    fn test_build_workspace_without_root() {
        let mut args = args(&[]);
        args.no_root = true;
        let workspace = build_workspace(&args).unwrap();
        assert!(workspace.root().is_none());
    }

    #[tokio::test]
    async fn test_run_app_quits_on_q() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(Workspace::new(None), Config::default(), tx);
        let mut reader = MockEventReader::new(vec![key_event(KeyCode::Char('q'))]);

        run_app(&mut terminal, &mut app, &mut rx, &mut reader)
            .await
            .unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_run_app_picker_accept_lands_after_close() {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut workspace = Workspace::new(None);
        workspace.new_empty_tab();
        let mut app = App::new(workspace, Config::default(), tx);

        let mut reader = MockEventReader::new(vec![
            key_event(KeyCode::Char('t')),
            key_event(KeyCode::Up),
            key_event(KeyCode::Enter),
            // Two idle frames let both stages run before quitting.
            key_event(KeyCode::F(1)),
            key_event(KeyCode::F(1)),
            key_event(KeyCode::Char('q')),
        ]);

        run_app(&mut terminal, &mut app, &mut rx, &mut reader)
            .await
            .unwrap();
        assert!(!app.picker.is_open());
        assert_eq!(app.workspace.current_position(), 0);
    }
}
