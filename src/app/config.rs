//! Download option store
//!
//! One value per field key, seeded from defaults and the persisted JSON file
//! and mutated through typed operations (toggle, cycle, commit).

use crate::app::fields::{FIELDS, FieldKey, FieldKind};
use crate::app::validation::parse_number;
use crate::file::naming::filename_from_uri;
use crate::util::paths;
use crate::util::persist;
use serde::{Deserialize, Serialize, Serializer};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("'{raw}' is not a valid number for {key}")]
    InvalidNumber { key: &'static str, raw: String },

    #[error("{key} does not hold a {kind} value")]
    TypeMismatch { key: &'static str, kind: &'static str },

    #[error("unexpected JSON for {key}: {source}")]
    Json {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Download options, keyed the same way as the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub uris: Vec<String>,
    pub dir: String,
    pub out: String,
    #[serde(rename = "continue")]
    pub continue_download: bool,
    #[serde(serialize_with = "serialize_number")]
    pub max_concurrent_downloads: Option<f64>,
    #[serde(serialize_with = "serialize_number")]
    pub split: Option<f64>,
    #[serde(serialize_with = "serialize_number")]
    pub max_connection_per_server: Option<f64>,
    pub max_download_limit: String,
    pub max_upload_limit: String,
    pub file_allocation: String,
    pub check_certificate: bool,
    pub enable_mmap: bool,
    pub follow_torrent: bool,
    #[serde(serialize_with = "serialize_number")]
    pub seed_time: Option<f64>,
    pub user_agent: String,
    pub input_file: String,
    pub extra_args: String,
}

/// Writes integral numbers as JSON integers (`16`, not `16.0`)
fn serialize_number<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => serializer.serialize_i64(*n as i64),
        Some(n) => serializer.serialize_f64(*n),
        None => serializer.serialize_none(),
    }
}

/// Bare defaults: no concurrency overrides and no target directory.
impl Default for Config {
    fn default() -> Self {
        Self {
            uris: Vec::new(),
            dir: String::new(),
            out: String::new(),
            continue_download: true,
            max_concurrent_downloads: None,
            split: None,
            max_connection_per_server: None,
            max_download_limit: String::new(),
            max_upload_limit: String::new(),
            file_allocation: "none".to_string(),
            check_certificate: true,
            enable_mmap: true,
            follow_torrent: true,
            seed_time: Some(0.0),
            user_agent: String::new(),
            input_file: String::new(),
            extra_args: String::new(),
        }
    }
}

/// A single field value, typed by field kind
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Number(Option<f64>),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Bool(_) => "bool",
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "string",
            FieldValue::List(_) => "list",
        }
    }

    /// Whether the value counts as filled in for group summaries
    pub fn is_set(&self) -> bool {
        match self {
            FieldValue::Bool(_) => true,
            FieldValue::Number(n) => n.is_some(),
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::List(items) => !items.is_empty(),
        }
    }

    /// Text form used for display and to pre-fill prompts
    pub fn display(&self) -> String {
        match self {
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(Some(n)) => format_number(*n),
            FieldValue::Number(None) => String::new(),
            FieldValue::Text(s) => s.clone(),
            FieldValue::List(items) => items.join(" "),
        }
    }
}

pub fn format_number(n: f64) -> String {
    n.to_string()
}

impl Config {
    /// Defaults used at startup: bare defaults plus the stock concurrency
    /// settings and `~/Downloads` as the target directory.
    pub fn startup_defaults() -> Self {
        Self {
            dir: paths::default_download_dir().to_string_lossy().into_owned(),
            max_concurrent_downloads: Some(5.0),
            split: Some(16.0),
            max_connection_per_server: Some(16.0),
            ..Self::default()
        }
    }

    /// Loads the config file merged over the startup defaults.
    ///
    /// A missing or corrupt file yields the defaults. Keys are merged one by
    /// one so a single ill-typed key keeps its default without discarding
    /// the rest of the file.
    pub fn load(path: &Path) -> Self {
        match persist::read_json(path) {
            Some(value) => Self::from_json(&value),
            None => Self::startup_defaults(),
        }
    }

    pub fn from_json(value: &serde_json::Value) -> Self {
        let mut config = Self::startup_defaults();
        let Some(object) = value.as_object() else {
            tracing::warn!("Config file is not a JSON object, using defaults");
            return config;
        };

        for field in FIELDS.iter() {
            let Some(raw) = object.get(field.key.as_str()) else {
                continue;
            };
            if let Err(e) = config.apply_json(field.key, raw) {
                tracing::warn!(key = field.key.as_str(), error = %e, "Ignoring config value");
            }
        }
        config
    }

    fn apply_json(&mut self, key: FieldKey, raw: &serde_json::Value) -> Result<(), ConfigError> {
        let json_err = |source| ConfigError::Json {
            key: key.as_str(),
            source,
        };
        let value = match key.field().kind {
            FieldKind::Bool => FieldValue::Bool(serde_json::from_value(raw.clone()).map_err(json_err)?),
            FieldKind::Number => {
                FieldValue::Number(serde_json::from_value(raw.clone()).map_err(json_err)?)
            }
            FieldKind::List => FieldValue::List(serde_json::from_value(raw.clone()).map_err(json_err)?),
            FieldKind::Text | FieldKind::Enum(_) | FieldKind::File => {
                FieldValue::Text(serde_json::from_value(raw.clone()).map_err(json_err)?)
            }
            FieldKind::Action => return Ok(()),
        };
        self.set(key, value)
    }

    /// Writes the config pretty-printed with a trailing newline
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        persist::write_json(path, self)
    }

    /// Reads a field. Returns `None` for the run action, which has no value.
    pub fn get(&self, key: FieldKey) -> Option<FieldValue> {
        let value = match key {
            FieldKey::Uris => FieldValue::List(self.uris.clone()),
            FieldKey::Continue => FieldValue::Bool(self.continue_download),
            FieldKey::EnableMmap => FieldValue::Bool(self.enable_mmap),
            FieldKey::FollowTorrent => FieldValue::Bool(self.follow_torrent),
            FieldKey::CheckCertificate => FieldValue::Bool(self.check_certificate),
            FieldKey::MaxConcurrentDownloads => FieldValue::Number(self.max_concurrent_downloads),
            FieldKey::Split => FieldValue::Number(self.split),
            FieldKey::MaxConnectionPerServer => FieldValue::Number(self.max_connection_per_server),
            FieldKey::SeedTime => FieldValue::Number(self.seed_time),
            FieldKey::InputFile => FieldValue::Text(self.input_file.clone()),
            FieldKey::Dir => FieldValue::Text(self.dir.clone()),
            FieldKey::Out => FieldValue::Text(self.out.clone()),
            FieldKey::FileAllocation => FieldValue::Text(self.file_allocation.clone()),
            FieldKey::MaxDownloadLimit => FieldValue::Text(self.max_download_limit.clone()),
            FieldKey::MaxUploadLimit => FieldValue::Text(self.max_upload_limit.clone()),
            FieldKey::UserAgent => FieldValue::Text(self.user_agent.clone()),
            FieldKey::ExtraArgs => FieldValue::Text(self.extra_args.clone()),
            FieldKey::Run => return None,
        };
        Some(value)
    }

    /// Writes a field; the value variant must match the field kind.
    pub fn set(&mut self, key: FieldKey, value: FieldValue) -> Result<(), ConfigError> {
        let mismatch = ConfigError::TypeMismatch {
            key: key.as_str(),
            kind: value.kind_name(),
        };
        match value {
            FieldValue::Bool(b) => *self.bool_slot(key).ok_or(mismatch)? = b,
            FieldValue::Number(n) => *self.number_slot(key).ok_or(mismatch)? = n,
            FieldValue::Text(s) => *self.text_slot(key).ok_or(mismatch)? = s,
            FieldValue::List(items) if key == FieldKey::Uris => self.uris = items,
            FieldValue::List(_) => return Err(mismatch),
        }
        Ok(())
    }

    fn bool_slot(&mut self, key: FieldKey) -> Option<&mut bool> {
        match key {
            FieldKey::Continue => Some(&mut self.continue_download),
            FieldKey::EnableMmap => Some(&mut self.enable_mmap),
            FieldKey::FollowTorrent => Some(&mut self.follow_torrent),
            FieldKey::CheckCertificate => Some(&mut self.check_certificate),
            _ => None,
        }
    }

    fn number_slot(&mut self, key: FieldKey) -> Option<&mut Option<f64>> {
        match key {
            FieldKey::MaxConcurrentDownloads => Some(&mut self.max_concurrent_downloads),
            FieldKey::Split => Some(&mut self.split),
            FieldKey::MaxConnectionPerServer => Some(&mut self.max_connection_per_server),
            FieldKey::SeedTime => Some(&mut self.seed_time),
            _ => None,
        }
    }

    fn text_slot(&mut self, key: FieldKey) -> Option<&mut String> {
        match key {
            FieldKey::InputFile => Some(&mut self.input_file),
            FieldKey::Dir => Some(&mut self.dir),
            FieldKey::Out => Some(&mut self.out),
            FieldKey::FileAllocation => Some(&mut self.file_allocation),
            FieldKey::MaxDownloadLimit => Some(&mut self.max_download_limit),
            FieldKey::MaxUploadLimit => Some(&mut self.max_upload_limit),
            FieldKey::UserAgent => Some(&mut self.user_agent),
            FieldKey::ExtraArgs => Some(&mut self.extra_args),
            _ => None,
        }
    }

    /// Flips a bool field and returns the new value
    pub fn toggle(&mut self, key: FieldKey) -> Result<bool, ConfigError> {
        let slot = self.bool_slot(key).ok_or(ConfigError::TypeMismatch {
            key: key.as_str(),
            kind: "bool",
        })?;
        *slot = !*slot;
        Ok(*slot)
    }

    /// Advances an enum field to the next option, wrapping around.
    ///
    /// A current value outside the option list moves to the first option.
    pub fn cycle_enum(&mut self, key: FieldKey) -> Result<&'static str, ConfigError> {
        let FieldKind::Enum(options) = key.field().kind else {
            return Err(ConfigError::TypeMismatch {
                key: key.as_str(),
                kind: "enum",
            });
        };
        let slot = self.text_slot(key).ok_or(ConfigError::TypeMismatch {
            key: key.as_str(),
            kind: "enum",
        })?;
        let next = match options.iter().position(|o| *o == slot.as_str()) {
            Some(i) => (i + 1) % options.len(),
            None => 0,
        };
        *slot = options[next].to_string();
        Ok(options[next])
    }

    /// Commits raw prompt text into a field, coerced by the field's kind.
    ///
    /// An unparsable number leaves the field untouched. A blank number
    /// stores 0. Rate limits are stored trimmed, so a blank limit drops out
    /// of the argument vector.
    pub fn commit(&mut self, key: FieldKey, raw: &str) -> Result<(), ConfigError> {
        let value = match key.field().kind {
            FieldKind::Number if raw.trim().is_empty() => FieldValue::Number(Some(0.0)),
            FieldKind::Number => match parse_number(raw) {
                Some(n) => FieldValue::Number(Some(n)),
                None => {
                    return Err(ConfigError::InvalidNumber {
                        key: key.as_str(),
                        raw: raw.to_string(),
                    });
                }
            },
            FieldKind::Bool => FieldValue::Bool(parse_bool(raw)),
            FieldKind::List => FieldValue::List(raw.split_whitespace().map(str::to_string).collect()),
            FieldKind::Text if key.is_rate_limit() => FieldValue::Text(raw.trim().to_string()),
            FieldKind::Text | FieldKind::Enum(_) | FieldKind::File => FieldValue::Text(raw.to_string()),
            FieldKind::Action => {
                return Err(ConfigError::TypeMismatch {
                    key: key.as_str(),
                    kind: "action",
                });
            }
        };
        self.set(key, value)
    }

    /// Source used to tell history runs apart: first URI, else input file
    pub fn primary_source(&self) -> String {
        self.uris
            .first()
            .cloned()
            .unwrap_or_else(|| self.input_file.clone())
    }

    /// Fills `out` from the first URI when it is blank. Returns the derived
    /// name if one was set.
    pub fn fill_output_from_uris(&mut self) -> Option<String> {
        if !self.out.trim().is_empty() {
            return None;
        }
        let name = filename_from_uri(self.uris.first()?)?;
        self.out = name.clone();
        Some(name)
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::fields::FILE_ALLOCATION_OPTIONS;
    use crate::download::args::build_args;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_startup_defaults() {
        let config = Config::startup_defaults();
        assert!(config.uris.is_empty());
        assert!(config.dir.ends_with("Downloads"));
        assert_eq!(config.max_concurrent_downloads, Some(5.0));
        assert_eq!(config.split, Some(16.0));
        assert_eq!(config.max_connection_per_server, Some(16.0));
        assert_eq!(config.file_allocation, "none");
        assert_eq!(config.seed_time, Some(0.0));
        assert!(config.continue_download);
    }

    #[test]
    fn test_every_value_field_readable() {
        let config = Config::default();
        for field in FIELDS.iter() {
            let value = config.get(field.key);
            assert_eq!(value.is_none(), field.kind == FieldKind::Action, "{}", field.key.as_str());
        }
    }

    #[test]
    fn test_commit_then_read_coerces() {
        let mut config = Config::default();

        config.commit(FieldKey::Split, " 8 ").unwrap();
        assert_eq!(config.get(FieldKey::Split), Some(FieldValue::Number(Some(8.0))));

        config.commit(FieldKey::Continue, "YES").unwrap();
        assert_eq!(config.get(FieldKey::Continue), Some(FieldValue::Bool(true)));
        config.commit(FieldKey::Continue, "nope").unwrap();
        assert_eq!(config.get(FieldKey::Continue), Some(FieldValue::Bool(false)));

        config.commit(FieldKey::Uris, "  http://a/x  \t http://b/y ").unwrap();
        assert_eq!(
            config.get(FieldKey::Uris),
            Some(FieldValue::List(vec!["http://a/x".into(), "http://b/y".into()]))
        );

        config.commit(FieldKey::UserAgent, "  spaced ").unwrap();
        assert_eq!(config.user_agent, "  spaced ");
    }

    #[test]
    fn test_invalid_number_keeps_prior_value() {
        let mut config = Config::startup_defaults();
        let err = config.commit(FieldKey::Split, "lots").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { key: "split", .. }));
        assert_eq!(config.split, Some(16.0));
    }

    #[test]
    fn test_blank_number_stores_zero() {
        let mut config = Config::startup_defaults();
        config.commit(FieldKey::MaxConcurrentDownloads, "").unwrap();
        assert_eq!(config.max_concurrent_downloads, Some(0.0));

        config.commit(FieldKey::SeedTime, "  ").unwrap();
        assert_eq!(config.seed_time, Some(0.0));
        assert!(build_args(&config).contains(&"--seed-time=0".to_string()));
    }

    #[test]
    fn test_blank_rate_limit_drops_out() {
        let mut config = Config::default();
        config.commit(FieldKey::MaxDownloadLimit, "   ").unwrap();
        assert_eq!(config.max_download_limit, "");
        assert!(
            !build_args(&config)
                .iter()
                .any(|a| a.starts_with("--max-download-limit"))
        );
    }

    #[test]
    fn test_toggle() {
        let mut config = Config::default();
        assert_eq!(config.toggle(FieldKey::EnableMmap).unwrap(), false);
        assert_eq!(config.toggle(FieldKey::EnableMmap).unwrap(), true);
        assert!(config.toggle(FieldKey::Dir).is_err());
    }

    #[test]
    fn test_cycle_enum_wraps() {
        let mut config = Config::default();
        let start = config.file_allocation.clone();
        for _ in 0..FILE_ALLOCATION_OPTIONS.len() {
            config.cycle_enum(FieldKey::FileAllocation).unwrap();
        }
        assert_eq!(config.file_allocation, start);

        assert_eq!(config.cycle_enum(FieldKey::FileAllocation).unwrap(), "prealloc");
    }

    #[test]
    fn test_cycle_enum_unknown_value_starts_over() {
        let mut config = Config::default();
        config.file_allocation = "bogus".to_string();
        assert_eq!(config.cycle_enum(FieldKey::FileAllocation).unwrap(), "none");
    }

    #[test]
    fn test_from_json_merges_over_defaults() {
        let config = Config::from_json(&json!({
            "dir": "/data",
            "split": 4,
            "continue": false,
            "uris": ["http://a/b.iso"],
            "maxConcurrentDownloads": "not a number",
            "unknownKey": 1
        }));
        assert_eq!(config.dir, "/data");
        assert_eq!(config.split, Some(4.0));
        assert!(!config.continue_download);
        assert_eq!(config.uris, vec!["http://a/b.iso".to_string()]);
        // ill-typed key keeps its default
        assert_eq!(config.max_concurrent_downloads, Some(5.0));
    }

    #[test]
    fn test_from_json_non_object() {
        assert_eq!(Config::from_json(&json!([1, 2])), Config::startup_defaults());
    }

    #[test]
    fn test_serialize_integers() {
        let mut config = Config::default();
        config.split = Some(16.0);
        config.seed_time = Some(1.5);
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["split"], json!(16));
        assert_eq!(value["seedTime"], json!(1.5));
        assert_eq!(value["maxConcurrentDownloads"], json!(null));
        assert_eq!(value["continue"], json!(true));
        assert!(value.get("continueDownload").is_none());
    }

    #[test]
    fn test_fill_output_only_when_blank() {
        let mut config = Config::default();
        config.uris = vec!["https://x.test/dir/File%20Name.ISO?x=1".to_string()];
        assert_eq!(config.fill_output_from_uris().as_deref(), Some("File Name.ISO"));
        assert_eq!(config.out, "File Name.ISO");

        config.uris = vec!["https://x.test/other.bin".to_string()];
        assert_eq!(config.fill_output_from_uris(), None);
        assert_eq!(config.out, "File Name.ISO");
    }

    #[test]
    fn test_primary_source() {
        let mut config = Config::default();
        assert_eq!(config.primary_source(), "");
        config.input_file = "/t/a.torrent".to_string();
        assert_eq!(config.primary_source(), "/t/a.torrent");
        config.uris = vec!["http://a/x".to_string()];
        assert_eq!(config.primary_source(), "http://a/x");
    }
}
