use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::app::fields::{FieldKey, GroupKey};
use crate::app::validation::Validation;
use crate::file::browser::FileEntry;

/// How long a status banner stays visible
pub const BANNER_TTL: Duration = Duration::from_secs(4);

/// UI mode determines how keys are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Navigating one of the list views
    List,
    /// Single-line prompt for a field value
    Prompt,
    /// Yes/no dialog for a pending action
    Confirm,
    /// Input-file picker
    FileBrowser,
    /// Inline URI editor inside the input group
    InlineEdit,
    /// Command preview
    Preview,
}

impl Mode {
    /// Returns true if this mode accepts free-form text input
    pub fn is_text_input(&self) -> bool {
        matches!(self, Mode::Prompt | Mode::InlineEdit)
    }
}

/// Which list is shown in `Mode::List`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Run history, with "new run" on row 0
    History,
    /// Group list
    Groups,
    /// Fields of `current_group`
    Fields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PromptState {
    pub target: FieldKey,
    pub label: String,
    pub hint: String,
    pub buffer: String,
    pub validation: Validation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBrowserState {
    pub target: FieldKey,
    pub directory: PathBuf,
    pub entries: Vec<FileEntry>,
    pub selected: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineEditState {
    pub target: FieldKey,
    pub buffer: String,
}

/// Action waiting on the confirm dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    /// Load a completed history entry back into the config
    RestoreEntry { id: u64 },
}

impl PendingAction {
    pub fn question(&self) -> &'static str {
        match self {
            PendingAction::RestoreEntry { .. } => {
                "This download already completed. Load its settings again?"
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient status message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
    pub shown_at: Instant,
}

/// Navigation state of the TUI; never persisted
#[derive(Debug)]
pub struct NavigationState {
    pub mode: Mode,
    pub view: View,
    /// Set while `view` is `Fields`
    pub current_group: Option<GroupKey>,
    /// Cursor in the current list
    pub selected: usize,

    pub prompt: Option<PromptState>,
    pub file_browser: Option<FileBrowserState>,
    pub inline_edit: Option<InlineEditState>,
    pub pending_action: Option<PendingAction>,

    pub banner: Option<Banner>,

    /// Cached readiness, refreshed at commits and when leaving a group
    pub input_ready: bool,
    /// Readiness when the current group was entered
    pub ready_on_group_entry: bool,
    /// The "other groups unlocked" notice was already shown
    pub unlock_announced: bool,

    /// History entry the current config was restored from or launched as
    pub current_history_id: Option<u64>,

    /// Rendering optimization: flag to indicate if UI needs redraw
    needs_redraw: bool,
}

impl NavigationState {
    pub fn new(input_ready: bool) -> Self {
        Self {
            mode: Mode::List,
            view: View::History,
            current_group: None,
            selected: 0,
            prompt: None,
            file_browser: None,
            inline_edit: None,
            pending_action: None,
            banner: None,
            input_ready,
            ready_on_group_entry: input_ready,
            unlock_announced: false,
            current_history_id: None,
            needs_redraw: true,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.needs_redraw = true;
    }

    pub fn needs_redraw(&self) -> bool {
        self.needs_redraw
    }

    pub fn clear_dirty(&mut self) {
        self.needs_redraw = false;
    }

    pub fn set_banner(&mut self, kind: BannerKind, text: impl Into<String>) {
        self.banner = Some(Banner {
            kind,
            text: text.into(),
            shown_at: Instant::now(),
        });
        self.mark_dirty();
    }

    /// Drops the banner once it is older than [`BANNER_TTL`].
    /// Returns true if one was removed.
    pub fn expire_banner(&mut self, now: Instant) -> bool {
        let expired = self
            .banner
            .as_ref()
            .is_some_and(|b| now.saturating_duration_since(b.shown_at) >= BANNER_TTL);
        if expired {
            self.banner = None;
            self.mark_dirty();
        }
        expired
    }

    pub fn move_selection_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Moves down, never past `max_index`
    pub fn move_selection_down(&mut self, max_index: usize) {
        self.selected = (self.selected + 1).min(max_index);
    }

    pub fn show_history(&mut self) {
        self.view = View::History;
        self.current_group = None;
        self.selected = 0;
    }

    pub fn show_groups(&mut self) {
        self.view = View::Groups;
        self.current_group = None;
        self.selected = 0;
    }

    pub fn show_fields(&mut self, group: GroupKey) {
        self.view = View::Fields;
        self.current_group = Some(group);
        self.selected = 0;
        self.ready_on_group_entry = self.input_ready;
    }

    pub fn in_input_group(&self) -> bool {
        self.view == View::Fields && self.current_group == Some(GroupKey::Input)
    }
}
