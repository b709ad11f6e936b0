//! aria2c argument vector
//!
//! Translates a [`Config`] into the exact argument list handed to the
//! binary. Each token keeps its role so the launcher can tell whether any
//! download source is present.

use crate::app::config::{Config, format_number};

/// Role of a token in the argument vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRole {
    /// Option token, e.g. `-c` or `--seed-time=0`
    Flag,
    /// Value consumed by the preceding flag, e.g. the `/x` of `-d /x`
    Value,
    /// Bare source (URI, or a non-option word from the extra arguments)
    Positional,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub role: TokenRole,
    pub text: String,
}

/// Ordered argument vector built from a config
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    tokens: Vec<Token>,
}

impl Invocation {
    pub fn from_config(config: &Config) -> Self {
        let mut inv = Self::default();

        inv.push_pair("-d", &config.dir);
        inv.push_pair("-o", &config.out);
        if config.continue_download {
            inv.push_flag("-c".to_string());
        }
        inv.push_number("-j", config.max_concurrent_downloads);
        inv.push_number("-s", config.split);
        inv.push_number("-x", config.max_connection_per_server);
        inv.push_joined("--max-download-limit", &config.max_download_limit);
        inv.push_joined("--max-upload-limit", &config.max_upload_limit);
        inv.push_joined("--file-allocation", &config.file_allocation);
        inv.push_joined("--check-certificate", bool_str(config.check_certificate));
        inv.push_joined("--enable-mmap", bool_str(config.enable_mmap));
        inv.push_joined("--follow-torrent", bool_str(config.follow_torrent));
        if let Some(seed_time) = config.seed_time {
            inv.push_joined("--seed-time", &format_number(seed_time));
        }
        inv.push_pair("-U", &config.user_agent);
        inv.push_pair("--input-file", &config.input_file);

        // Option arity is unknown here, so `--header 'X-A: 1'` tags its value
        // as positional. aria2c rejects a run with no URI itself.
        for word in parse_shell_words(&config.extra_args) {
            let role = if word.starts_with('-') {
                TokenRole::Flag
            } else {
                TokenRole::Positional
            };
            inv.tokens.push(Token { role, text: word });
        }

        for uri in config.uris.iter().filter(|u| !u.is_empty()) {
            inv.tokens.push(Token {
                role: TokenRole::Positional,
                text: uri.clone(),
            });
        }

        inv
    }

    fn push_flag(&mut self, text: String) {
        self.tokens.push(Token {
            role: TokenRole::Flag,
            text,
        });
    }

    /// `flag value` as two tokens, skipped when the value is empty
    fn push_pair(&mut self, flag: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        self.push_flag(flag.to_string());
        self.tokens.push(Token {
            role: TokenRole::Value,
            text: value.to_string(),
        });
    }

    fn push_number(&mut self, flag: &str, value: Option<f64>) {
        if let Some(n) = value {
            self.push_pair(flag, &format_number(n));
        }
    }

    /// `flag=value` as one token, skipped when the value is empty
    fn push_joined(&mut self, flag: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        self.push_flag(format!("{flag}={value}"));
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn args(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.text.clone()).collect()
    }

    pub fn has_positional(&self) -> bool {
        self.tokens.iter().any(|t| t.role == TokenRole::Positional)
    }
}

fn bool_str(b: bool) -> &'static str {
    if b { "true" } else { "false" }
}

/// Argument vector for `config`
pub fn build_args(config: &Config) -> Vec<String> {
    Invocation::from_config(config).args()
}

/// True when a launch would have something to download: a bare source in
/// the argument vector, or an input file.
///
/// Any extra-argument word not starting with `-` counts as a source, even
/// when it is really the value of a preceding option.
pub fn is_launchable(config: &Config) -> bool {
    Invocation::from_config(config).has_positional() || !config.input_file.trim().is_empty()
}

/// Splits a string into shell-style words.
///
/// Single quotes keep everything literal up to the closing quote. Double
/// quotes group words but a backslash still escapes the next character.
/// Outside single quotes a backslash takes the next character verbatim.
/// Unquoted whitespace separates words and empty words are dropped.
pub fn parse_shell_words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_single = false;
    let mut in_double = false;
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if ch == '\'' && !in_double {
            in_single = !in_single;
            i += 1;
            continue;
        }
        if ch == '"' && !in_single {
            in_double = !in_double;
            i += 1;
            continue;
        }
        if !in_single && !in_double && ch.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            while i < chars.len() && chars[i].is_whitespace() {
                i += 1;
            }
            continue;
        }
        if !in_single && ch == '\\' && i + 1 < chars.len() {
            current.push(chars[i + 1]);
            i += 2;
            continue;
        }

        current.push(ch);
        i += 1;
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Quotes a token for display in the command preview
pub fn quote_for_display(arg: &str) -> String {
    shlex::try_quote(arg)
        .map(|q| q.into_owned())
        .unwrap_or_else(|_| format!("{arg:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_args_reference_vector() {
        let config = Config {
            dir: "/x".to_string(),
            out: "f.bin".to_string(),
            continue_download: true,
            split: Some(16.0),
            uris: vec!["http://a/f.bin".to_string()],
            ..Config::default()
        };

        assert_eq!(
            build_args(&config),
            strings(&[
                "-d",
                "/x",
                "-o",
                "f.bin",
                "-c",
                "-s",
                "16",
                "--file-allocation=none",
                "--check-certificate=true",
                "--enable-mmap=true",
                "--follow-torrent=true",
                "--seed-time=0",
                "http://a/f.bin",
            ])
        );
    }

    #[test]
    fn test_build_args_full_order() {
        let config = Config {
            dir: "/d".to_string(),
            continue_download: false,
            max_concurrent_downloads: Some(5.0),
            split: Some(8.0),
            max_connection_per_server: Some(4.0),
            max_download_limit: "2M".to_string(),
            max_upload_limit: "100K".to_string(),
            file_allocation: "falloc".to_string(),
            check_certificate: false,
            enable_mmap: false,
            follow_torrent: false,
            seed_time: None,
            user_agent: "agent/1".to_string(),
            input_file: "/t/list.txt".to_string(),
            extra_args: "--header 'X-A: 1'".to_string(),
            uris: vec!["u1".to_string(), String::new(), "u2".to_string()],
            ..Config::default()
        };

        assert_eq!(
            build_args(&config),
            strings(&[
                "-d",
                "/d",
                "-j",
                "5",
                "-s",
                "8",
                "-x",
                "4",
                "--max-download-limit=2M",
                "--max-upload-limit=100K",
                "--file-allocation=falloc",
                "--check-certificate=false",
                "--enable-mmap=false",
                "--follow-torrent=false",
                "-U",
                "agent/1",
                "--input-file",
                "/t/list.txt",
                "--header",
                "X-A: 1",
                "u1",
                "u2",
            ])
        );
    }

    #[test]
    fn test_tokenizer_reference() {
        assert_eq!(parse_shell_words(r"--foo 'a b' c\ d"), strings(&["--foo", "a b", "c d"]));
    }

    #[test]
    fn test_tokenizer_edge_cases() {
        assert!(parse_shell_words("").is_empty());
        assert!(parse_shell_words("   \t ").is_empty());
        assert!(parse_shell_words("''").is_empty());
        assert_eq!(parse_shell_words(r#""a \"b\"" c"#), strings(&["a \"b\"", "c"]));
        assert_eq!(parse_shell_words(r"'a\b'"), strings(&[r"a\b"]));
        assert_eq!(parse_shell_words(r"trail\"), strings(&[r"trail\"]));
        assert_eq!(parse_shell_words(r#"x"y z"w"#), strings(&["xy zw"]));
        assert_eq!(parse_shell_words("'unterminated rest"), strings(&["unterminated rest"]));
    }

    #[test]
    fn test_launchable_needs_source() {
        // flag values do not count as sources
        let mut config = Config {
            dir: "/x".to_string(),
            user_agent: "ua".to_string(),
            ..Config::default()
        };
        assert!(!is_launchable(&config));

        config.extra_args = "--quiet".to_string();
        assert!(!is_launchable(&config));

        config.extra_args = "--quiet magnet:?xt=urn:btih:abc".to_string();
        assert!(is_launchable(&config));

        config.extra_args.clear();
        config.input_file = "/t/a.torrent".to_string();
        assert!(is_launchable(&config));

        config.input_file.clear();
        config.uris = vec!["http://a/b".to_string()];
        assert!(is_launchable(&config));
    }

    #[test]
    fn test_extra_option_value_counts_as_source() {
        let config = Config {
            extra_args: "--header 'X-A: 1'".to_string(),
            ..Config::default()
        };
        let inv = Invocation::from_config(&config);
        let extra: Vec<(TokenRole, &str)> = inv
            .tokens()
            .iter()
            .filter(|t| t.text.starts_with("--header") || t.text == "X-A: 1")
            .map(|t| (t.role, t.text.as_str()))
            .collect();
        assert_eq!(
            extra,
            vec![(TokenRole::Flag, "--header"), (TokenRole::Positional, "X-A: 1")]
        );
        assert!(is_launchable(&config));

        let joined = Config {
            extra_args: "--header='X-A: 1'".to_string(),
            ..Config::default()
        };
        assert!(!is_launchable(&joined));
    }

    #[test]
    fn test_token_roles() {
        let config = Config {
            dir: "/x".to_string(),
            uris: vec!["http://a/b".to_string()],
            ..Config::default()
        };
        let inv = Invocation::from_config(&config);
        let roles: Vec<TokenRole> = inv.tokens().iter().map(|t| t.role).collect();
        assert_eq!(roles[0], TokenRole::Flag);
        assert_eq!(roles[1], TokenRole::Value);
        assert_eq!(roles.last(), Some(&TokenRole::Positional));
    }

    #[test]
    fn test_quote_for_display() {
        assert_eq!(quote_for_display("plain"), "plain");
        assert_eq!(quote_for_display("a b"), "'a b'");
    }
}
