//! Key bindings for list-style views
//!
//! Text-entry modes (prompt, inline edit, confirm) read raw keys instead.

use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

/// Actions reachable from the list views, the file browser and the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    // Navigation
    MoveUp,
    MoveDown,
    Select,
    Back,

    // Editing
    Toggle,
    EditUris,
    BrowseFile,

    // History
    NewRun,
    DeleteEntry,

    // Global
    SaveConfig,
    Preview,
    Run,
    Quit,
}

/// Default key table: action and the keys bound to it
const DEFAULT_BINDINGS: &[(KeyAction, &[&str])] = &[
    (KeyAction::MoveUp, &["k", "Up"]),
    (KeyAction::MoveDown, &["j", "Down"]),
    (KeyAction::Select, &["Enter"]),
    (KeyAction::Back, &["Esc"]),
    (KeyAction::Toggle, &["Space"]),
    (KeyAction::EditUris, &["u"]),
    (KeyAction::BrowseFile, &["t"]),
    (KeyAction::NewRun, &["n", "N"]),
    (KeyAction::DeleteEntry, &["d", "D"]),
    (KeyAction::SaveConfig, &["s"]),
    (KeyAction::Preview, &["p"]),
    (KeyAction::Run, &["r"]),
    (KeyAction::Quit, &["q"]),
];

/// Parsed key combination
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Parse a key string like "Ctrl+c", "Space", "a"
    pub fn parse(s: &str) -> Option<KeyCombo> {
        let s = s.trim();
        let mut modifiers = KeyModifiers::empty();
        let mut key_part = s;

        let parts: Vec<&str> = s.split('+').collect();
        if parts.len() > 1 {
            for part in &parts[..parts.len() - 1] {
                match part.to_lowercase().as_str() {
                    "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                    "alt" => modifiers |= KeyModifiers::ALT,
                    "shift" => modifiers |= KeyModifiers::SHIFT,
                    _ => return None,
                }
            }
            key_part = parts.last()?;
        }

        let code = parse_key_code(key_part)?;
        Some(KeyCombo::new(code, modifiers))
    }

    pub fn matches(&self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let (code, modifiers) = normalize_key_event(code, modifiers);
        self.code == code && self.modifiers == modifiers
    }
}

fn parse_key_code(s: &str) -> Option<KeyCode> {
    let s = s.trim();

    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeyCode::Enter),
        "space" => return Some(KeyCode::Char(' ')),
        "tab" => return Some(KeyCode::Tab),
        "backspace" => return Some(KeyCode::Backspace),
        "esc" | "escape" => return Some(KeyCode::Esc),
        "up" => return Some(KeyCode::Up),
        "down" => return Some(KeyCode::Down),
        "left" => return Some(KeyCode::Left),
        "right" => return Some(KeyCode::Right),
        "home" => return Some(KeyCode::Home),
        "end" => return Some(KeyCode::End),
        _ => {}
    }

    let mut chars = s.chars();
    let first = chars.next()?;
    if chars.next().is_none() {
        return Some(KeyCode::Char(first));
    }

    None
}

/// Maps key events to actions
#[derive(Debug, Clone)]
pub struct KeybindingResolver {
    action_map: HashMap<KeyCombo, KeyAction>,
}

impl KeybindingResolver {
    pub fn from_table(table: &[(KeyAction, &[&str])]) -> Self {
        let mut action_map = HashMap::new();
        for (action, keys) in table {
            for key in *keys {
                match KeyCombo::parse(key) {
                    Some(combo) => {
                        action_map.insert(combo, *action);
                    }
                    None => tracing::warn!(key, "Ignoring unparsable key binding"),
                }
            }
        }
        Self { action_map }
    }

    pub fn resolve(&self, code: KeyCode, modifiers: KeyModifiers) -> Option<KeyAction> {
        let (code, modifiers) = normalize_key_event(code, modifiers);
        self.action_map.get(&KeyCombo::new(code, modifiers)).copied()
    }
}

/// Strips SHIFT from characters that already carry it (e.g. 'A', '?'), since
/// terminals disagree on whether to report it.
fn normalize_key_event(code: KeyCode, modifiers: KeyModifiers) -> (KeyCode, KeyModifiers) {
    match code {
        KeyCode::Char(c) if !c.is_ascii_lowercase() => (code, modifiers - KeyModifiers::SHIFT),
        _ => (code, modifiers),
    }
}

impl Default for KeybindingResolver {
    fn default() -> Self {
        Self::from_table(DEFAULT_BINDINGS)
    }
}

/// Ctrl+C, which exits from any mode
pub fn is_interrupt(code: KeyCode, modifiers: KeyModifiers) -> bool {
    KeyCombo::new(KeyCode::Char('c'), KeyModifiers::CONTROL).matches(code, modifiers)
}
