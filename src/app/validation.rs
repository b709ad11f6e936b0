//! Per-field input validation
//!
//! Runs on every keystroke of the prompt dialog. Only number and rate-limit
//! failures block a commit; path messages are advisory.

use crate::app::fields::{Field, FieldKey, FieldKind};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

/// `<digits>` with an optional K/M/G suffix, e.g. `500K`, `2m`, `0`
static RATE_LIMIT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[0-9]+[KMG]?$").expect("Invalid regex pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Ok,
    /// Informational note (e.g. the path exists)
    Info,
    /// Non-blocking warning
    Warning,
    /// Blocks the commit
    Invalid,
}

/// Outcome of validating one raw value
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Validation {
    pub severity: Severity,
    pub message: Option<String>,
}

impl Validation {
    fn ok() -> Self {
        Self::default()
    }

    fn with(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: Some(message.into()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.severity != Severity::Invalid
    }
}

/// Parses a number the way a prompt commit does: trimmed, finite only
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn is_path_field(key: FieldKey) -> bool {
    matches!(key, FieldKey::Dir | FieldKey::InputFile)
}

pub fn validate(field: &Field, raw: &str) -> Validation {
    if raw.trim().is_empty() {
        return Validation::ok();
    }

    if field.kind == FieldKind::Number {
        return match parse_number(raw) {
            Some(_) => Validation::ok(),
            None => Validation::with(Severity::Invalid, "Must be a number"),
        };
    }

    if is_path_field(field.key) {
        return if Path::new(raw.trim()).exists() {
            Validation::with(Severity::Info, "Path exists")
        } else {
            Validation::with(
                Severity::Warning,
                "Path does not exist yet (may be created or fail at run time)",
            )
        };
    }

    if field.key.is_rate_limit() {
        return if RATE_LIMIT_PATTERN.is_match(raw) {
            Validation::ok()
        } else {
            Validation::with(Severity::Invalid, "Format: digits with optional K/M/G, e.g. 500K")
        };
    }

    Validation::ok()
}
