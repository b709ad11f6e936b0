//! Output file name helpers

use percent_encoding::percent_decode_str;
use url::Url;

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replaces characters that cannot appear in a file name and strips trailing
/// dots and spaces. Returns an empty string when nothing usable is left.
pub fn sanitize_filename(name: &str) -> String {
    let result: String = name
        .chars()
        .map(|c| {
            if INVALID_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    result.trim_end_matches([' ', '.']).to_string()
}

/// Derives an output file name from a download URI.
///
/// Takes the last path segment, which must contain a '.', and percent-decodes
/// it. Query and fragment are ignored. Any failure yields `None`, including a
/// `%` not followed by two hex digits.
///
/// The decoded name is also run through [`sanitize_filename`], so an encoded
/// separator such as `%2F` cannot make aria2c write outside the target dir.
///
/// ```
/// use aria2tui::file::naming::filename_from_uri;
///
/// let name = filename_from_uri("https://x.test/dir/File%20Name.ISO?x=1");
/// assert_eq!(name.as_deref(), Some("File Name.ISO"));
/// ```
pub fn filename_from_uri(uri: &str) -> Option<String> {
    let url = Url::parse(uri.trim()).ok()?;
    let segment = url.path_segments()?.next_back()?;
    if !segment.contains('.') {
        return None;
    }

    if has_malformed_escape(segment) {
        tracing::debug!(uri, "Malformed percent escape in file name");
        return None;
    }

    let decoded = percent_decode_str(segment).decode_utf8().ok()?;
    let name = sanitize_filename(&decoded);
    if name.is_empty() {
        tracing::debug!(uri, "Derived file name was empty after sanitizing");
        return None;
    }
    Some(name)
}

fn has_malformed_escape(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'%'
            && !(bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_uri() {
        assert_eq!(
            filename_from_uri("https://x.test/dir/File%20Name.ISO?x=1").as_deref(),
            Some("File Name.ISO")
        );
        assert_eq!(
            filename_from_uri("http://example.com/a/b/archive.tar.gz#frag").as_deref(),
            Some("archive.tar.gz")
        );
    }

    #[test]
    fn test_filename_requires_dot() {
        assert_eq!(filename_from_uri("https://x.test/dir/download"), None);
        assert_eq!(filename_from_uri("https://x.test/"), None);
        assert_eq!(filename_from_uri("https://x.test"), None);
    }

    #[test]
    fn test_filename_rejects_non_urls() {
        assert_eq!(filename_from_uri("not a url.zip"), None);
        assert_eq!(filename_from_uri(""), None);
    }

    #[test]
    fn test_filename_bad_utf8_skipped() {
        assert_eq!(filename_from_uri("https://x.test/%FF%FE.bin"), None);
    }

    #[test]
    fn test_filename_malformed_escape_skipped() {
        assert_eq!(filename_from_uri("https://x.test/%zz.bin"), None);
        assert_eq!(filename_from_uri("https://x.test/100%.bin"), None);
        assert_eq!(filename_from_uri("https://x.test/a%2.bin"), None);
        assert_eq!(
            filename_from_uri("https://x.test/100%25.bin").as_deref(),
            Some("100%.bin")
        );
    }

    #[test]
    fn test_filename_decoded_separator_sanitized() {
        assert_eq!(
            filename_from_uri("https://x.test/a%2Fb.iso").as_deref(),
            Some("a_b.iso")
        );
    }

    #[test]
    fn test_sanitize_invalid_chars() {
        assert_eq!(sanitize_filename("file<name>.txt"), "file_name_.txt");
        assert_eq!(sanitize_filename("path/to/file.txt"), "path_to_file.txt");
        assert_eq!(sanitize_filename("data\nnewline.txt"), "data_newline.txt");
    }

    #[test]
    fn test_sanitize_trailing_dots_spaces() {
        assert_eq!(sanitize_filename("filename.txt..."), "filename.txt");
        assert_eq!(sanitize_filename("test. . ."), "test");
        assert_eq!(sanitize_filename("..."), "");
    }

    #[test]
    fn test_sanitize_unicode_safe() {
        assert_eq!(sanitize_filename("ファイル名.txt"), "ファイル名.txt");
    }
}
