//! URL path translation
//!
//! Maps a request path onto a path relative to the document root. `..`
//! segments are resolved lexically and can never climb above the root, so
//! `/../outside.txt` names `<root>/outside.txt`.

use percent_encoding::percent_decode_str;
use std::path::PathBuf;

/// A request path after decoding and normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedPath {
    /// Path relative to the document root, empty for the root itself
    pub relative: PathBuf,
    /// Whether the request path ended with `/`
    pub trailing_slash: bool,
}

/// Translate a URL path (no query string) to a root-relative path
///
/// Returns `None` when the decoded path contains a NUL byte.
pub fn translate_path(url_path: &str) -> Option<TranslatedPath> {
    let trailing_slash = url_path.trim_end().ends_with('/');
    let decoded = percent_decode_str(url_path).decode_utf8_lossy();
    if decoded.contains('\0') {
        return None;
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            // Windows separators would let a single segment carry a traversal
            #[cfg(windows)]
            s if s.contains('\\') => {}
            s => segments.push(s),
        }
    }

    Some(TranslatedPath {
        relative: segments.iter().collect(),
        trailing_slash,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relative(url_path: &str) -> PathBuf {
        translate_path(url_path).unwrap().relative
    }

    #[test]
    fn test_root() {
        let t = translate_path("/").unwrap();
        assert_eq!(t.relative, PathBuf::new());
        assert!(t.trailing_slash);
    }

    #[test]
    fn test_plain_file() {
        let t = translate_path("/javascript/life.js").unwrap();
        assert_eq!(t.relative, PathBuf::from("javascript/life.js"));
        assert!(!t.trailing_slash);
    }

    #[test]
    fn test_traversal_clamped_to_root() {
        assert_eq!(relative("/../outside.txt"), PathBuf::from("outside.txt"));
        assert_eq!(relative("/a/../../../etc/passwd"), PathBuf::from("etc/passwd"));
        assert_eq!(relative("/a/b/../c"), PathBuf::from("a/c"));
    }

    #[test]
    fn test_encoded_traversal_clamped() {
        assert_eq!(relative("/%2e%2e/outside.txt"), PathBuf::from("outside.txt"));
        assert_eq!(relative("/a%2f..%2f..%2fsecret"), PathBuf::from("secret"));
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(relative("/my%20file.txt"), PathBuf::from("my file.txt"));
    }

    #[test]
    fn test_dot_and_empty_segments() {
        assert_eq!(relative("//a/./b//"), PathBuf::from("a/b"));
    }

    #[cfg(windows)]
    #[test]
    fn test_backslash_segments_dropped() {
        assert_eq!(relative("/..\\secret/x"), PathBuf::from("x"));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_backslash_is_a_filename_character() {
        assert_eq!(relative("/..\\secret/x"), PathBuf::from("..\\secret/x"));
        assert_eq!(relative("/dir/a\\b.txt"), PathBuf::from("dir/a\\b.txt"));
    }

    #[test]
    fn test_nul_rejected() {
        assert!(translate_path("/a%00b").is_none());
    }
}
