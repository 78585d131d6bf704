use crate::tabs::{
    select_strategy, Action, Motion, PickerController, PickerOptions, TabHost, Workspace,
};
use crate::translate::{self, JobOutcome, TranslateRequest, NOTHING_TO_TRANSLATE};
use crate::ui::command::{parse_command, EditorCommand};
use crate::ui::config::Config;
use crate::ui::overlay::{DismissTrigger, Overlay, OverlayOptions, OverlayRequest};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Insert,
    /// Typing a `:` command.
    Command,
}

/// Work finished off the event loop, delivered back to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    TranslationDone {
        request: TranslateRequest,
        outcome: JobOutcome,
    },
}

pub struct App {
    pub workspace: Workspace,
    pub picker: PickerController,
    pub overlay: Overlay,
    pub config: Config,
    pub mode: Mode,
    pub command_line: String,
    /// One-line message shown in the footer.
    pub status: Option<String>,
    pub should_quit: bool,
    /// Translations started but not yet delivered.
    pub jobs_in_flight: usize,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(workspace: Workspace, config: Config, events: UnboundedSender<AppEvent>) -> Self {
        let activation = select_strategy(config.picker.activation, &workspace);
        debug!(strategy = activation.name(), "tab activation strategy selected");
        Self {
            workspace,
            picker: PickerController::new(activation),
            overlay: Overlay::new(),
            config,
            mode: Mode::Normal,
            command_line: String::new(),
            status: None,
            should_quit: false,
            jobs_in_flight: 0,
            events,
        }
    }

    /// Whether the loop should spin fast instead of waiting for input.
    pub fn has_pending_work(&self) -> bool {
        self.picker.has_pending() || self.jobs_in_flight > 0
    }

    /// Run one deferred picker stage. Called once per loop iteration, after
    /// drawing, so a closed picker is on screen before its effect lands.
    pub fn tick(&mut self) -> bool {
        self.picker.step(&mut self.workspace).is_some()
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::TranslationDone { request, outcome } => {
                self.jobs_in_flight = self.jobs_in_flight.saturating_sub(1);
                if self.jobs_in_flight == 0 && self.status.as_deref() == Some(TRANSLATING) {
                    self.status = None;
                }
                let content = translate::render_outcome(&outcome);
                let title = request.target.unwrap_or_else(|| "Translate".to_string());
                self.show_overlay(content, Some(title));
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.picker.is_open() {
            self.handle_picker_key(key);
            return;
        }

        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Insert => self.handle_insert_key(key),
            Mode::Command => self.handle_command_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('h') | KeyCode::Left => self.move_cursor(Motion::Left),
            KeyCode::Char('l') | KeyCode::Right => self.move_cursor(Motion::Right),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(Motion::Up),
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(Motion::Down),
            KeyCode::Char('0') | KeyCode::Home => self.move_cursor(Motion::LineStart),
            KeyCode::Char('$') | KeyCode::End => self.move_cursor(Motion::LineEnd),
            KeyCode::Char('i') => {
                self.workspace.clear_selection();
                self.overlay.notify(DismissTrigger::InsertEntered);
                self.mode = Mode::Insert;
            }
            KeyCode::Char('v') => {
                self.workspace.toggle_selection();
            }
            KeyCode::Char('T') => {
                let target = self.config.translator.default_target.clone();
                let verbose = self.config.translator.verbose;
                self.translate(target, verbose);
            }
            KeyCode::Char('t') => {
                self.open_picker(None);
            }
            KeyCode::Char('w') if ctrl => {
                self.overlay.notify(DismissTrigger::FocusLost);
                self.workspace.next_window();
            }
            KeyCode::Tab => {
                self.overlay.notify(DismissTrigger::FocusLost);
                self.workspace.next_tab();
            }
            KeyCode::BackTab => {
                self.overlay.notify(DismissTrigger::FocusLost);
                self.workspace.previous_tab();
            }
            KeyCode::Char(':') => {
                self.overlay.notify(DismissTrigger::FocusLost);
                self.command_line.clear();
                self.status = None;
                self.mode = Mode::Command;
            }
            KeyCode::Esc => {
                self.workspace.clear_selection();
                if let Some(handle) = self.overlay.handle() {
                    self.overlay.dismiss(handle);
                }
            }
            _ => {}
        }
    }

    fn handle_insert_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => self.workspace.insert_char('\n'),
            KeyCode::Backspace => self.workspace.backspace(),
            KeyCode::Left => self.move_cursor(Motion::Left),
            KeyCode::Right => self.move_cursor(Motion::Right),
            KeyCode::Up => self.move_cursor(Motion::Up),
            KeyCode::Down => self.move_cursor(Motion::Down),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.workspace.insert_char(c);
            }
            _ => {}
        }
    }

    fn handle_command_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.command_line.clear();
                self.mode = Mode::Normal;
            }
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.command_line);
                self.mode = Mode::Normal;
                match parse_command(&line) {
                    Ok(command) => self.run_command(command),
                    Err(e) => self.status = Some(e.to_string()),
                }
            }
            KeyCode::Backspace => {
                if self.command_line.pop().is_none() {
                    self.mode = Mode::Normal;
                }
            }
            KeyCode::Char(c) => {
                self.command_line.push(c);
            }
            _ => {}
        }
    }

    fn handle_picker_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => {
                self.picker.dispatch(Action::Cancel);
            }
            KeyCode::Enter => {
                self.picker.dispatch(Action::Accept);
            }
            KeyCode::Char('x') if ctrl => {
                self.picker.dispatch(Action::DismissTarget);
            }
            KeyCode::Char('d') if ctrl => {
                self.picker.dispatch(Action::DismissAndRestart);
            }
            KeyCode::Down => self.move_picker_highlight(true),
            KeyCode::Char('n') if ctrl => self.move_picker_highlight(true),
            KeyCode::Up => self.move_picker_highlight(false),
            KeyCode::Char('p') if ctrl => self.move_picker_highlight(false),
            KeyCode::Backspace => {
                if let Some(session) = self.picker.open_session_mut() {
                    session.pop_query();
                }
            }
            KeyCode::Char(c) if !ctrl => {
                if let Some(session) = self.picker.open_session_mut() {
                    session.push_query(c);
                }
            }
            _ => {}
        }
    }

    fn move_picker_highlight(&mut self, forward: bool) {
        if let Some(session) = self.picker.open_session_mut() {
            if forward {
                session.next();
            } else {
                session.previous();
            }
        }
    }

    fn move_cursor(&mut self, motion: Motion) {
        if self.workspace.move_cursor(motion) {
            self.overlay.notify(DismissTrigger::CursorMoved);
        }
    }

    pub fn run_command(&mut self, command: EditorCommand) {
        match command {
            EditorCommand::Translate { target, verbose } => {
                let target = target.or_else(|| self.config.translator.default_target.clone());
                self.translate(target, verbose);
            }
            EditorCommand::Tabs { query } => self.open_picker(query),
            EditorCommand::TabNew(path) => {
                let result = match path {
                    Some(path) => self.workspace.open_in_new_tab(&path).map(|_| ()),
                    None => {
                        self.workspace.new_empty_tab();
                        Ok(())
                    }
                };
                if let Err(e) = result {
                    self.status = Some(format!("{:#}", e));
                }
            }
            EditorCommand::Split => self.workspace.split(),
            EditorCommand::Write => match self.workspace.save_current() {
                Ok(path) => self.status = Some(format!("Wrote {}", path.display())),
                Err(e) => self.status = Some(format!("{:#}", e)),
            },
            EditorCommand::Quit => self.should_quit = true,
        }
    }

    /// Open the tab picker, optionally pre-filtered.
    pub fn open_picker(&mut self, query: Option<String>) {
        self.overlay.notify(DismissTrigger::FocusLost);
        let options = PickerOptions {
            title: self.config.picker.title.clone(),
            initial_query: query.unwrap_or_default(),
        };
        self.picker.open(&self.workspace, options);
    }

    /// Translate the selection, or the word under the cursor.
    pub fn translate(&mut self, target: Option<String>, verbose: bool) {
        let text = if self.workspace.has_selection() {
            self.workspace.selected_text()
        } else {
            self.workspace.word_under_cursor()
        };
        self.workspace.clear_selection();

        let Some(request) = text.and_then(|t| TranslateRequest::new(&t, target, !verbose)) else {
            self.show_overlay(vec![NOTHING_TO_TRANSLATE.to_string()], None);
            return;
        };

        let translator = &self.config.translator;
        let job = translate::build_job(&translator.program, &request, &translator.env);
        let events = self.events.clone();
        let request_for_event = request.clone();

        self.jobs_in_flight += 1;
        self.status = Some(TRANSLATING.to_string());
        translate::spawn(job, move |outcome| {
            let event = AppEvent::TranslationDone {
                request: request_for_event,
                outcome,
            };
            if events.send(event).is_err() {
                warn!("translation finished after the event loop stopped");
            }
        });
    }

    fn show_overlay(&mut self, content: Vec<String>, title: Option<String>) {
        let options = OverlayOptions {
            max_width: self.config.overlay.max_width,
            max_height: self.config.overlay.max_height,
            title,
            ..OverlayOptions::default()
        };
        self.overlay.show(OverlayRequest::new(content, options));
    }

    /// Label of the current tab, as the picker would show it.
    pub fn current_label(&self) -> String {
        let root = self.workspace.working_root();
        let path = self
            .workspace
            .current_tab()
            .and_then(|t| self.workspace.primary_resource(t));
        crate::tabs::display_label(path.as_deref(), root.as_deref())
    }
}

const TRANSLATING: &str = "Translating…";
