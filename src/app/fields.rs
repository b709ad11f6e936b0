//! Field and group registry
//!
//! Static schema of every option the wizard can edit. Each field belongs to
//! exactly one group, and the group list is always shown in the same order.

use crate::app::config::Config;

/// Topical group shown on the group list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Download sources (URIs or an input file). Required before anything else.
    Input,
    Save,
    Performance,
    Limit,
    Torrent,
    Advanced,
    /// Launch entry
    Action,
}

impl GroupKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupKey::Input => "input",
            GroupKey::Save => "save",
            GroupKey::Performance => "performance",
            GroupKey::Limit => "limit",
            GroupKey::Torrent => "torrent",
            GroupKey::Advanced => "advanced",
            GroupKey::Action => "action",
        }
    }

    /// Static descriptor for this group
    pub fn group(self) -> &'static Group {
        &GROUPS[self as usize]
    }
}

/// Group descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub key: GroupKey,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    /// Required groups stay reachable while the input source is missing
    pub required: bool,
}

/// Identifier of an editable option
///
/// Declaration order matches [`FIELDS`], which is also the on-screen order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Uris,
    InputFile,
    Dir,
    Out,
    Continue,
    MaxConcurrentDownloads,
    Split,
    MaxConnectionPerServer,
    FileAllocation,
    EnableMmap,
    MaxDownloadLimit,
    MaxUploadLimit,
    FollowTorrent,
    SeedTime,
    UserAgent,
    CheckCertificate,
    ExtraArgs,
    Run,
}

impl FieldKey {
    /// Persisted key name (camelCase, as stored in the config file)
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::Uris => "uris",
            FieldKey::InputFile => "inputFile",
            FieldKey::Dir => "dir",
            FieldKey::Out => "out",
            FieldKey::Continue => "continue",
            FieldKey::MaxConcurrentDownloads => "maxConcurrentDownloads",
            FieldKey::Split => "split",
            FieldKey::MaxConnectionPerServer => "maxConnectionPerServer",
            FieldKey::FileAllocation => "fileAllocation",
            FieldKey::EnableMmap => "enableMmap",
            FieldKey::MaxDownloadLimit => "maxDownloadLimit",
            FieldKey::MaxUploadLimit => "maxUploadLimit",
            FieldKey::FollowTorrent => "followTorrent",
            FieldKey::SeedTime => "seedTime",
            FieldKey::UserAgent => "userAgent",
            FieldKey::CheckCertificate => "checkCertificate",
            FieldKey::ExtraArgs => "extraArgs",
            FieldKey::Run => "__run__",
        }
    }

    pub fn field(self) -> &'static Field {
        &FIELDS[self as usize]
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, FieldKey::MaxDownloadLimit | FieldKey::MaxUploadLimit)
    }
}

/// Value kind of a field, which decides how it is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Number,
    Text,
    /// Whitespace-separated list
    List,
    /// Closed set of options, cycled in order
    Enum(&'static [&'static str]),
    /// Path picked from the file browser
    File,
    /// Not a value; selecting it triggers the launch
    Action,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Number => "number",
            FieldKind::Text => "string",
            FieldKind::List => "list",
            FieldKind::Enum(_) => "enum",
            FieldKind::File => "file",
            FieldKind::Action => "action",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: FieldKey,
    pub label: &'static str,
    pub kind: FieldKind,
    pub group: GroupKey,
    pub description: &'static str,
    /// Short input hint shown in the prompt dialog
    pub hint: &'static str,
}

pub const FILE_ALLOCATION_OPTIONS: &[&str] = &["none", "prealloc", "trunc", "falloc"];

pub static GROUPS: [Group; 7] = [
    Group {
        key: GroupKey::Input,
        name: "Input source",
        icon: ">>",
        description: "URIs or a torrent/metalink/list file (required)",
        required: true,
    },
    Group {
        key: GroupKey::Save,
        name: "Save location",
        icon: "[]",
        description: "Target directory, file name, resume",
        required: false,
    },
    Group {
        key: GroupKey::Performance,
        name: "Performance",
        icon: "**",
        description: "Concurrency, connections, allocation",
        required: false,
    },
    Group {
        key: GroupKey::Limit,
        name: "Speed limits",
        icon: "<>",
        description: "Download and upload caps",
        required: false,
    },
    Group {
        key: GroupKey::Torrent,
        name: "BitTorrent",
        icon: "@@",
        description: "Torrent follow-up and seeding",
        required: false,
    },
    Group {
        key: GroupKey::Advanced,
        name: "Advanced",
        icon: "##",
        description: "User agent, certificates, extra arguments",
        required: false,
    },
    Group {
        key: GroupKey::Action,
        name: "Run",
        icon: "=>",
        description: "Start aria2c with the current settings",
        required: false,
    },
];

pub static FIELDS: [Field; 18] = [
    Field {
        key: FieldKey::Uris,
        label: "Download URIs (u)",
        kind: FieldKind::List,
        group: GroupKey::Input,
        description: "One or more URIs separated by spaces",
        hint: "http(s)/ftp/magnet URIs, space separated",
    },
    Field {
        key: FieldKey::InputFile,
        label: "Input file (t)",
        kind: FieldKind::File,
        group: GroupKey::Input,
        description: "A .torrent, .metalink, .meta4 or URI list file",
        hint: "pick a file from the current directory",
    },
    Field {
        key: FieldKey::Dir,
        label: "Save directory (-d)",
        kind: FieldKind::Text,
        group: GroupKey::Save,
        description: "Directory the download is written to",
        hint: "absolute or relative path",
    },
    Field {
        key: FieldKey::Out,
        label: "Output file name (-o)",
        kind: FieldKind::Text,
        group: GroupKey::Save,
        description: "File name for a single-file download",
        hint: "leave blank to let aria2c decide",
    },
    Field {
        key: FieldKey::Continue,
        label: "Resume partial downloads (-c)",
        kind: FieldKind::Bool,
        group: GroupKey::Save,
        description: "Continue a partially downloaded file",
        hint: "",
    },
    Field {
        key: FieldKey::MaxConcurrentDownloads,
        label: "Concurrent downloads (-j)",
        kind: FieldKind::Number,
        group: GroupKey::Performance,
        description: "Maximum number of parallel downloads",
        hint: "number, e.g. 5",
    },
    Field {
        key: FieldKey::Split,
        label: "Split (-s)",
        kind: FieldKind::Number,
        group: GroupKey::Performance,
        description: "Connections used to download one file",
        hint: "number, e.g. 16",
    },
    Field {
        key: FieldKey::MaxConnectionPerServer,
        label: "Connections per server (-x)",
        kind: FieldKind::Number,
        group: GroupKey::Performance,
        description: "Maximum connections to one server",
        hint: "number, 1-16",
    },
    Field {
        key: FieldKey::FileAllocation,
        label: "File allocation",
        kind: FieldKind::Enum(FILE_ALLOCATION_OPTIONS),
        group: GroupKey::Performance,
        description: "How disk space is reserved up front",
        hint: "",
    },
    Field {
        key: FieldKey::EnableMmap,
        label: "Memory-mapped I/O",
        kind: FieldKind::Bool,
        group: GroupKey::Performance,
        description: "Map files into memory while writing",
        hint: "",
    },
    Field {
        key: FieldKey::MaxDownloadLimit,
        label: "Max download speed",
        kind: FieldKind::Text,
        group: GroupKey::Limit,
        description: "Overall download cap, 0 for unlimited",
        hint: "e.g. 500K, 2M, 0",
    },
    Field {
        key: FieldKey::MaxUploadLimit,
        label: "Max upload speed",
        kind: FieldKind::Text,
        group: GroupKey::Limit,
        description: "Overall upload cap, 0 for unlimited",
        hint: "e.g. 100K, 1M, 0",
    },
    Field {
        key: FieldKey::FollowTorrent,
        label: "Follow torrent",
        kind: FieldKind::Bool,
        group: GroupKey::Torrent,
        description: "Start the download described by a fetched .torrent",
        hint: "",
    },
    Field {
        key: FieldKey::SeedTime,
        label: "Seed time (minutes)",
        kind: FieldKind::Number,
        group: GroupKey::Torrent,
        description: "Minutes to keep seeding, 0 stops right away",
        hint: "number of minutes",
    },
    Field {
        key: FieldKey::UserAgent,
        label: "User agent",
        kind: FieldKind::Text,
        group: GroupKey::Advanced,
        description: "User-Agent header sent to HTTP servers",
        hint: "leave blank for the aria2c default",
    },
    Field {
        key: FieldKey::CheckCertificate,
        label: "Verify TLS certificates",
        kind: FieldKind::Bool,
        group: GroupKey::Advanced,
        description: "Reject servers with invalid certificates",
        hint: "",
    },
    Field {
        key: FieldKey::ExtraArgs,
        label: "Extra arguments",
        kind: FieldKind::Text,
        group: GroupKey::Advanced,
        description: "Appended verbatim after the generated options",
        hint: "shell-style words, quotes and \\ escapes allowed",
    },
    Field {
        key: FieldKey::Run,
        label: "Start download",
        kind: FieldKind::Action,
        group: GroupKey::Action,
        description: "Launch aria2c in this terminal",
        hint: "",
    },
];

/// Fields of one group, in display order
pub fn fields_in_group(group: GroupKey) -> Vec<&'static Field> {
    FIELDS.iter().filter(|f| f.group == group).collect()
}

/// True once either URIs or an input file is set
pub fn is_input_ready(config: &Config) -> bool {
    !config.uris.is_empty() || !config.input_file.trim().is_empty()
}

/// Returns `(set, total)` over the value-bearing fields of a group
pub fn group_summary(config: &Config, group: GroupKey) -> (usize, usize) {
    fields_in_group(group)
        .into_iter()
        .filter_map(|f| config.get(f.key))
        .fold((0, 0), |(set, total), value| {
            (set + usize::from(value.is_set()), total + 1)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_matches_keys() {
        for (i, field) in FIELDS.iter().enumerate() {
            assert_eq!(field.key as usize, i, "{} out of order", field.key.as_str());
        }
        for (i, group) in GROUPS.iter().enumerate() {
            assert_eq!(group.key as usize, i);
        }
    }

    #[test]
    fn test_every_group_has_fields() {
        for group in &GROUPS {
            assert!(!fields_in_group(group.key).is_empty(), "{}", group.name);
        }
    }

    #[test]
    fn test_input_ready() {
        let mut config = Config::default();
        assert!(!is_input_ready(&config));

        config.input_file = "   ".to_string();
        assert!(!is_input_ready(&config));

        config.input_file = "a.torrent".to_string();
        assert!(is_input_ready(&config));

        config.input_file.clear();
        config.uris = vec!["http://x/a.zip".to_string()];
        assert!(is_input_ready(&config));
    }

    #[test]
    fn test_group_summary_skips_action() {
        let config = Config::default();
        assert_eq!(group_summary(&config, GroupKey::Action), (0, 0));

        // bools always count as set
        let (set, total) = group_summary(&config, GroupKey::Torrent);
        assert_eq!(total, 2);
        assert_eq!(set, 2);
    }
}
