use super::events::TuiEvent;
use super::state::{
    BannerKind, FileBrowserState, InlineEditState, Mode, NavigationState, PendingAction,
    PromptState, View,
};
use crate::app::config::FieldValue;
use crate::app::fields::{Field, FieldKey, FieldKind, GROUPS, GroupKey, fields_in_group, is_input_ready};
use crate::app::keybindings::{KeyAction, KeybindingResolver, is_interrupt};
use crate::app::state::AppState;
use crate::app::validation::validate;
use crate::cli::error;
use crate::download::args::{Invocation, is_launchable};
use crate::download::history::RunStatus;
use crate::download::launcher::{self, LaunchError, LaunchOutcome, LaunchRequest};
use crate::file::browser::list_supported_files;
use anyhow::Result;
use crossterm::ExecutableCommand;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures_util::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Maximum text buffer length in the prompt and the inline URI editor
const MAX_INPUT_LENGTH: usize = 8192;

/// Delay before returning to the group list once the input source is set
pub const AUTO_RETURN_DELAY: Duration = Duration::from_millis(100);

/// Main TUI application
pub struct TuiApp {
    pub state: NavigationState,
    pub app: AppState,
    keybinding_resolver: KeybindingResolver,
    /// Sender side of the event queue, used for delayed events
    events: mpsc::Sender<TuiEvent>,
    pending_launch: Option<LaunchRequest>,
    exit_code: Option<i32>,
}

impl TuiApp {
    pub fn new(app: AppState, events: mpsc::Sender<TuiEvent>) -> Self {
        let ready = is_input_ready(&app.config);
        Self {
            state: NavigationState::new(ready),
            app,
            keybinding_resolver: KeybindingResolver::default(),
            events,
            pending_launch: None,
            exit_code: None,
        }
    }

    /// Exit code once the user asked to quit
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Launch requested by the run action, if any
    pub fn take_launch(&mut self) -> Option<LaunchRequest> {
        self.pending_launch.take()
    }

    /// Handle a TUI event
    ///
    /// Must run inside a tokio runtime: committing the input source schedules
    /// a delayed [`TuiEvent::AutoReturn`].
    pub fn handle_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Tick => {
                self.state.expire_banner(Instant::now());
            }
            TuiEvent::Input(input) => {
                self.handle_input(input);
                self.state.mark_dirty();
            }
            TuiEvent::AutoReturn => {
                tracing::debug!(view = ?self.state.view, mode = ?self.state.mode, "Auto-return fired");
                self.exit_group();
                self.state.mark_dirty();
            }
            TuiEvent::Interrupt => {
                tracing::info!("Interrupted by signal");
                self.quit();
            }
        }
    }

    fn handle_input(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                modifiers,
                kind,
                ..
            }) => {
                // Only process key press events, ignore release and repeat
                if kind != KeyEventKind::Press {
                    return;
                }
                if is_interrupt(code, modifiers) {
                    tracing::info!("Interrupted from the keyboard");
                    self.quit();
                    return;
                }

                match self.state.mode {
                    Mode::List => self.handle_list_mode(code, modifiers),
                    Mode::Prompt => self.handle_prompt_mode(code, modifiers),
                    Mode::InlineEdit => self.handle_inline_edit_mode(code, modifiers),
                    Mode::Confirm => self.handle_confirm_mode(code),
                    Mode::FileBrowser => self.handle_file_browser_mode(code, modifiers),
                    Mode::Preview => self.handle_preview_mode(code, modifiers),
                }
            }
            Event::Paste(text) => self.handle_paste(&text),
            // Resize only needs a redraw
            _ => {}
        }
    }

    fn handle_list_mode(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let Some(action) = self.keybinding_resolver.resolve(code, modifiers) else {
            return;
        };

        match action {
            KeyAction::Quit => self.quit(),
            KeyAction::MoveUp => self.state.move_selection_up(),
            KeyAction::MoveDown => {
                let max = self.max_selection();
                self.state.move_selection_down(max);
            }
            KeyAction::Back => match self.state.view {
                View::Fields => self.exit_group(),
                View::Groups => self.state.show_history(),
                View::History => {}
            },
            KeyAction::Select => self.select_current(),
            KeyAction::Toggle => {
                if let Some(field) = self.selected_field() {
                    if field.kind == FieldKind::Bool {
                        self.toggle_field(field.key);
                    }
                }
            }
            KeyAction::NewRun if self.state.view == View::History => self.start_new_run(),
            KeyAction::DeleteEntry if self.state.view == View::History => {
                self.delete_history_entry()
            }
            KeyAction::NewRun | KeyAction::DeleteEntry => {}
            KeyAction::EditUris => self.jump_to_uri_editor(),
            KeyAction::BrowseFile => self.jump_to_file_browser(),
            KeyAction::Preview => self.state.mode = Mode::Preview,
            KeyAction::SaveConfig => self.save_config(),
            KeyAction::Run => self.run_action(),
        }
    }

    fn max_selection(&self) -> usize {
        match self.state.view {
            // row 0 is "new run", entries follow
            View::History => self.app.history.len(),
            View::Groups => GROUPS.len() - 1,
            View::Fields => self
                .state
                .current_group
                .map(|g| fields_in_group(g).len().saturating_sub(1))
                .unwrap_or(0),
        }
    }

    /// Field under the cursor in the field list
    pub fn selected_field(&self) -> Option<&'static Field> {
        if self.state.view != View::Fields {
            return None;
        }
        let group = self.state.current_group?;
        fields_in_group(group).get(self.state.selected).copied()
    }

    fn select_current(&mut self) {
        match self.state.view {
            View::History => self.restore_from_history(),
            View::Groups => self.enter_group(),
            View::Fields => self.begin_edit_selected(),
        }
    }

    // ----- history view -----

    fn restore_from_history(&mut self) {
        if self.state.selected == 0 || self.app.history.is_empty() {
            self.start_new_run();
            return;
        }

        let Some(entry) = self.app.history.get(self.state.selected - 1) else {
            return;
        };
        let id = entry.id;
        if entry.status == RunStatus::Completed {
            self.state.pending_action = Some(PendingAction::RestoreEntry { id });
            self.state.mode = Mode::Confirm;
            return;
        }
        self.restore_entry(id);
    }

    fn restore_entry(&mut self, id: u64) {
        let Some(entry) = self.app.history.find(id) else {
            tracing::warn!(id, "History entry vanished before restore");
            return;
        };
        let filename = entry.filename.clone();
        self.app.config = entry.config.clone();
        self.state.current_history_id = Some(id);
        self.state.input_ready = is_input_ready(&self.app.config);
        self.state.mode = Mode::List;
        self.state.show_groups();
        self.state
            .set_banner(BannerKind::Success, format!("Restored: {filename}"));
        tracing::info!(id, "Restored config from history");
    }

    fn start_new_run(&mut self) {
        self.state.current_history_id = None;
        self.state.input_ready = is_input_ready(&self.app.config);
        if self.state.input_ready {
            self.state.show_groups();
        } else {
            self.state.show_fields(GroupKey::Input);
        }
    }

    fn delete_history_entry(&mut self) {
        if self.state.selected == 0 || self.app.history.is_empty() {
            return;
        }
        let deleted_id = self.app.history.get(self.state.selected - 1).map(|e| e.id);
        if self.app.history.delete(self.state.selected - 1) {
            if deleted_id.is_some() && deleted_id == self.state.current_history_id {
                self.state.current_history_id = None;
            }
            if self.state.selected > self.app.history.len() {
                self.state.selected = self.app.history.len();
            }
            self.state.set_banner(BannerKind::Info, "History entry deleted");
        }
        self.report_history_error();
    }

    fn report_history_error(&mut self) {
        if let Some(e) = self.app.history.take_persist_error() {
            self.state
                .set_banner(BannerKind::Error, format!("Could not save history: {e}"));
        }
    }

    // ----- group list -----

    fn enter_group(&mut self) {
        let Some(group) = GROUPS.get(self.state.selected) else {
            return;
        };
        self.state.input_ready = is_input_ready(&self.app.config);
        if !group.required && !self.state.input_ready {
            self.state.set_banner(
                BannerKind::Warning,
                "Set an input source first (URIs, a torrent/metalink file or a URI list)",
            );
            return;
        }
        self.state.show_fields(group.key);
    }

    /// Leaves the field list for the group list.
    ///
    /// Also the target of [`TuiEvent::AutoReturn`], so it runs in whatever
    /// state is current when the delayed event arrives.
    fn exit_group(&mut self) {
        let was_input = self.state.current_group == Some(GroupKey::Input);
        let ready = is_input_ready(&self.app.config);
        self.state.input_ready = ready;

        if was_input && ready {
            if let Some(name) = self.app.config.fill_output_from_uris() {
                self.state
                    .set_banner(BannerKind::Info, format!("File name derived: {name}"));
            }
            if !self.state.ready_on_group_entry && !self.state.unlock_announced {
                self.state.unlock_announced = true;
                self.state
                    .set_banner(BannerKind::Success, "Input source set, all groups unlocked");
            }
        }

        self.state.show_groups();
    }

    // ----- field list -----

    fn begin_edit_selected(&mut self) {
        let Some(field) = self.selected_field() else {
            return;
        };
        match field.kind {
            FieldKind::Action => self.run_action(),
            FieldKind::Bool => self.toggle_field(field.key),
            FieldKind::Enum(_) => {
                if let Err(e) = self.app.config.cycle_enum(field.key) {
                    self.state.set_banner(BannerKind::Error, e.to_string());
                }
            }
            _ if field.key == FieldKey::Uris => self.begin_inline_edit(field.key),
            FieldKind::File => self.begin_file_browser(field.key),
            FieldKind::Number | FieldKind::Text | FieldKind::List => self.begin_prompt(field),
        }
    }

    fn toggle_field(&mut self, key: FieldKey) {
        if let Err(e) = self.app.config.toggle(key) {
            self.state.set_banner(BannerKind::Error, e.to_string());
        }
    }

    fn begin_prompt(&mut self, field: &'static Field) {
        let buffer = self
            .app
            .config
            .get(field.key)
            .map(|v| v.display())
            .unwrap_or_default();
        let validation = validate(field, &buffer);
        self.state.prompt = Some(PromptState {
            target: field.key,
            label: field.label.to_string(),
            hint: field.hint.to_string(),
            buffer,
            validation,
        });
        self.state.mode = Mode::Prompt;
    }

    fn begin_inline_edit(&mut self, target: FieldKey) {
        let buffer = self.app.config.uris.join(" ");
        self.state.inline_edit = Some(InlineEditState { target, buffer });
        self.state.mode = Mode::InlineEdit;
    }

    fn begin_file_browser(&mut self, target: FieldKey) {
        let directory = self.app.paths.browse_dir.clone();
        let entries = list_supported_files(&directory);
        tracing::debug!(dir = %directory.display(), count = entries.len(), "Opened file browser");
        self.state.file_browser = Some(FileBrowserState {
            target,
            directory,
            entries,
            selected: 0,
        });
        self.state.mode = Mode::FileBrowser;
    }

    /// `u`: open the URI editor, entering the input group from the group list
    fn jump_to_uri_editor(&mut self) {
        if !self.enter_input_group_for_shortcut() {
            return;
        }
        self.state.selected = field_index(GroupKey::Input, FieldKey::Uris);
        self.begin_inline_edit(FieldKey::Uris);
    }

    /// `t`: open the file browser, entering the input group from the group list
    fn jump_to_file_browser(&mut self) {
        if !self.enter_input_group_for_shortcut() {
            return;
        }
        self.state.selected = field_index(GroupKey::Input, FieldKey::InputFile);
        self.begin_file_browser(FieldKey::InputFile);
    }

    fn enter_input_group_for_shortcut(&mut self) -> bool {
        match self.state.view {
            View::Groups => {
                self.state.show_fields(GroupKey::Input);
                true
            }
            View::Fields => self.state.current_group == Some(GroupKey::Input),
            View::History => false,
        }
    }

    /// Shared follow-up of every input-group commit: refresh readiness and,
    /// on the first transition to ready, derive the file name and schedule
    /// the return to the group list.
    fn after_input_commit(&mut self, was_ready: bool) {
        if !self.state.in_input_group() {
            return;
        }
        let ready = is_input_ready(&self.app.config);
        self.state.input_ready = ready;
        if !ready || was_ready {
            return;
        }

        if let Some(name) = self.app.config.fill_output_from_uris() {
            self.state
                .set_banner(BannerKind::Success, format!("Input set, file name: {name}"));
        }
        self.schedule_auto_return();
    }

    fn schedule_auto_return(&self) {
        let tx = self.events.clone();
        tokio::spawn(async move {
            tokio::time::sleep(AUTO_RETURN_DELAY).await;
            if tx.send(TuiEvent::AutoReturn).await.is_err() {
                tracing::debug!("Event queue closed before auto-return");
            }
        });
    }

    // ----- prompt -----

    fn handle_prompt_mode(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match code {
            KeyCode::Esc => {
                self.state.prompt = None;
                self.state.mode = Mode::List;
            }
            KeyCode::Enter => {
                self.apply_prompt();
                self.state.mode = Mode::List;
            }
            _ => {
                let Some(prompt) = self.state.prompt.as_mut() else {
                    return;
                };
                if edit_buffer(&mut prompt.buffer, code, modifiers) {
                    prompt.validation = validate(prompt.target.field(), &prompt.buffer);
                }
            }
        }
    }

    fn apply_prompt(&mut self) {
        let Some(prompt) = self.state.prompt.take() else {
            return;
        };
        let field = prompt.target.field();

        let validation = validate(field, &prompt.buffer);
        if !validation.is_valid() {
            let message = validation
                .message
                .unwrap_or_else(|| "Invalid value".to_string());
            self.state
                .set_banner(BannerKind::Error, format!("{}: {message}", field.label));
            return;
        }

        let was_ready = self.state.input_ready;
        if let Err(e) = self.app.config.commit(prompt.target, &prompt.buffer) {
            self.state.set_banner(BannerKind::Error, e.to_string());
            return;
        }
        tracing::debug!(key = prompt.target.as_str(), "Committed field");

        if field.group == GroupKey::Input {
            self.after_input_commit(was_ready);
        }
    }

    // ----- inline URI editor -----

    fn handle_inline_edit_mode(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match code {
            KeyCode::Esc => {
                self.state.inline_edit = None;
                self.state.mode = Mode::List;
            }
            KeyCode::Enter => {
                self.state.mode = Mode::List;
                self.apply_inline_edit();
            }
            _ => {
                if let Some(edit) = self.state.inline_edit.as_mut() {
                    edit_buffer(&mut edit.buffer, code, modifiers);
                }
            }
        }
    }

    fn apply_inline_edit(&mut self) {
        let Some(edit) = self.state.inline_edit.take() else {
            return;
        };
        let was_ready = self.state.input_ready;
        if let Err(e) = self.app.config.commit(edit.target, &edit.buffer) {
            self.state.set_banner(BannerKind::Error, e.to_string());
            return;
        }

        match self.app.config.uris.len() {
            0 => self.state.set_banner(BannerKind::Info, "URIs cleared"),
            1 => self.state.set_banner(BannerKind::Success, "1 URI set"),
            n => self.state.set_banner(BannerKind::Success, format!("{n} URIs set")),
        }
        self.after_input_commit(was_ready);
    }

    fn handle_paste(&mut self, text: &str) {
        if !self.state.mode.is_text_input() {
            return;
        }
        let text = text.replace(['\r', '\n'], " ");
        tracing::debug!(mode = ?self.state.mode, len = text.len(), "Paste received");

        match self.state.mode {
            Mode::Prompt => {
                if let Some(prompt) = self.state.prompt.as_mut() {
                    push_limited(&mut prompt.buffer, &text);
                    prompt.validation = validate(prompt.target.field(), &prompt.buffer);
                }
            }
            Mode::InlineEdit => {
                if let Some(edit) = self.state.inline_edit.as_mut() {
                    push_limited(&mut edit.buffer, &text);
                }
            }
            _ => {}
        }
    }

    // ----- confirm dialog -----

    fn handle_confirm_mode(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                self.state.mode = Mode::List;
                if let Some(action) = self.state.pending_action.take() {
                    self.execute_pending(action);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state.pending_action = None;
                self.state.mode = Mode::List;
            }
            _ => {}
        }
    }

    fn execute_pending(&mut self, action: PendingAction) {
        match action {
            PendingAction::RestoreEntry { id } => self.restore_entry(id),
        }
    }

    // ----- file browser -----

    fn handle_file_browser_mode(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        let Some(action) = self.keybinding_resolver.resolve(code, modifiers) else {
            return;
        };
        match action {
            KeyAction::Back | KeyAction::Quit => {
                self.state.file_browser = None;
                self.state.mode = Mode::List;
                self.state.set_banner(BannerKind::Info, "File selection cancelled");
            }
            KeyAction::MoveUp => {
                if let Some(browser) = self.state.file_browser.as_mut() {
                    browser.selected = browser.selected.saturating_sub(1);
                }
            }
            KeyAction::MoveDown => {
                if let Some(browser) = self.state.file_browser.as_mut() {
                    let max = browser.entries.len().saturating_sub(1);
                    browser.selected = (browser.selected + 1).min(max);
                }
            }
            KeyAction::Select => self.apply_file_selection(),
            _ => {}
        }
    }

    fn apply_file_selection(&mut self) {
        let Some(browser) = self.state.file_browser.take() else {
            return;
        };
        self.state.mode = Mode::List;

        let Some(entry) = browser.entries.get(browser.selected) else {
            self.state.set_banner(
                BannerKind::Warning,
                format!("No selectable files in {}", browser.directory.display()),
            );
            return;
        };

        let was_ready = self.state.input_ready;
        let path = entry.path.to_string_lossy().into_owned();
        if let Err(e) = self.app.config.set(browser.target, FieldValue::Text(path)) {
            self.state.set_banner(BannerKind::Error, e.to_string());
            return;
        }
        self.state
            .set_banner(BannerKind::Success, format!("Selected file: {}", entry.name));

        if browser.target.field().group == GroupKey::Input {
            self.after_input_commit(was_ready);
        }
    }

    // ----- preview -----

    fn handle_preview_mode(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        match self.keybinding_resolver.resolve(code, modifiers) {
            Some(KeyAction::Back) => {
                self.state.mode = Mode::List;
                self.state.show_groups();
            }
            Some(KeyAction::Quit) => self.quit(),
            Some(KeyAction::Select) | Some(KeyAction::Run) => self.run_action(),
            _ => {}
        }
    }

    // ----- global actions -----

    fn save_config(&mut self) {
        match self.app.save_config() {
            Ok(()) => {
                let path = self.app.paths.config.display().to_string();
                tracing::info!(path, "Saved config");
                self.state.set_banner(BannerKind::Success, format!("Saved: {path}"));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to save config");
                self.state
                    .set_banner(BannerKind::Error, format!("Save failed: {e:#}"));
            }
        }
    }

    /// Queues a launch of the current config, or refuses with a warning
    /// when there is nothing to download.
    fn run_action(&mut self) {
        if !is_launchable(&self.app.config) {
            self.state.set_banner(
                BannerKind::Warning,
                "No input: press u to enter URIs or t to pick a torrent/metalink file",
            );
            return;
        }

        let remembered = self
            .state
            .current_history_id
            .filter(|id| self.app.history.find(*id).is_some());
        let history_id = match remembered {
            Some(id) => {
                self.app.history.update_status(id, RunStatus::Pending);
                id
            }
            None => self.app.history.add(&self.app.config, RunStatus::Pending),
        };
        self.report_history_error();
        self.state.current_history_id = Some(history_id);

        self.pending_launch = Some(LaunchRequest {
            bin: self.app.paths.bin.clone(),
            args: Invocation::from_config(&self.app.config).args(),
            history_id,
        });
    }

    /// Records the launch outcome in history and returns the exit code
    pub fn complete_launch(
        &mut self,
        request: &LaunchRequest,
        result: Result<LaunchOutcome, LaunchError>,
    ) -> i32 {
        let code = match result {
            Ok(outcome) => {
                if let Some(status) = outcome.run_status() {
                    self.app.history.update_status(request.history_id, status);
                }
                outcome.exit_code()
            }
            Err(e) => {
                tracing::error!(error = %e, "Launch failed");
                eprintln!("{e}");
                self.app
                    .history
                    .update_status(request.history_id, RunStatus::Failed);
                error::ERROR
            }
        };
        if let Some(e) = self.app.history.take_persist_error() {
            eprintln!("warning: could not save history: {e}");
        }
        code
    }

    fn quit(&mut self) {
        self.exit_code = Some(error::SUCCESS);
    }
}

fn field_index(group: GroupKey, key: FieldKey) -> usize {
    fields_in_group(group)
        .iter()
        .position(|f| f.key == key)
        .unwrap_or(0)
}

/// Applies an editing key to a text buffer. Returns true if it changed.
fn edit_buffer(buffer: &mut String, code: KeyCode, modifiers: KeyModifiers) -> bool {
    match code {
        KeyCode::Backspace => buffer.pop().is_some(),
        KeyCode::Char(c)
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                && !c.is_control() =>
        {
            if buffer.chars().count() >= MAX_INPUT_LENGTH {
                return false;
            }
            buffer.push(c);
            true
        }
        _ => false,
    }
}

fn push_limited(buffer: &mut String, text: &str) {
    let available = MAX_INPUT_LENGTH.saturating_sub(buffer.chars().count());
    buffer.extend(text.chars().take(available));
}

type Tui = Terminal<CrosstermBackend<Stdout>>;

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(EnableBracketedPaste)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    terminal.backend_mut().execute(DisableBracketedPaste)?;
    terminal.backend_mut().execute(LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Why the event loop stopped
enum LoopExit {
    Quit(i32),
    Launch(LaunchRequest),
}

async fn event_loop(
    terminal: &mut Tui,
    app: &mut TuiApp,
    rx: &mut mpsc::Receiver<TuiEvent>,
) -> Result<LoopExit> {
    loop {
        if let Some(code) = app.exit_code() {
            return Ok(LoopExit::Quit(code));
        }
        if let Some(request) = app.take_launch() {
            return Ok(LoopExit::Launch(request));
        }

        // Draw UI only if dirty flag is set (optimization)
        if app.state.needs_redraw() {
            terminal.draw(|f| super::ui::render(app, f))?;
            app.state.clear_dirty();
        }

        if let Ok(Some(event)) = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await {
            app.handle_event(event);
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            tracing::warn!("Could not listen for SIGTERM: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Runs the interactive wizard and returns the process exit code.
///
/// When the user starts a download, the terminal is restored and aria2c
/// runs in the foreground until it exits.
pub async fn run_tui(app_state: AppState) -> Result<i32> {
    let mut terminal = init_terminal()?;

    // Event channel
    let (tx, mut rx) = mpsc::channel(100);

    // Spawn keyboard event reader
    let input_tx = tx.clone();
    let input_task = tokio::spawn(async move {
        let mut reader = crossterm::event::EventStream::new();
        while let Some(Ok(event)) = reader.next().await {
            if input_tx.send(TuiEvent::Input(event)).await.is_err() {
                break;
            }
        }
    });

    // Spawn tick event generator
    let tick_tx = tx.clone();
    let tick_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            if tick_tx.send(TuiEvent::Tick).await.is_err() {
                break;
            }
        }
    });

    // External interrupts take the same quit path as Ctrl+C
    let signal_tx = tx.clone();
    let signal_task = tokio::spawn(async move {
        wait_for_signal().await;
        let _ = signal_tx.send(TuiEvent::Interrupt).await;
    });

    let mut app = TuiApp::new(app_state, tx);
    let exit = event_loop(&mut terminal, &mut app, &mut rx).await;

    // stop reading the terminal before handing it to aria2c
    input_task.abort();
    tick_task.abort();
    signal_task.abort();
    restore_terminal(&mut terminal)?;

    match exit? {
        LoopExit::Quit(code) => {
            tracing::info!(code, "Quit");
            Ok(code)
        }
        LoopExit::Launch(request) => {
            println!();
            let result = launcher::run(&request).await;
            Ok(app.complete_launch(&request, result))
        }
    }
}
