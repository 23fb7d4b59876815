//! Directory listing page
//!
//! Generated for directories without an index file.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Write;
use std::path::Path;
use tokio::fs;

/// Characters left unencoded in listing hrefs
const HREF_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl ListingEntry {
    /// Directories get `/`, symlinks `@` (a symlink to a directory shows `@`
    /// but still links with `/`)
    fn display_name(&self) -> String {
        if self.is_symlink {
            format!("{}@", self.name)
        } else if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }

    fn href(&self) -> String {
        let link = if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        };
        utf8_percent_encode(&link, HREF_ENCODE_SET).to_string()
    }
}

/// Read a directory's entries, sorted case-insensitively
pub async fn read_entries(dir: &Path) -> std::io::Result<Vec<ListingEntry>> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let is_symlink = entry
            .file_type()
            .await
            .is_ok_and(|t| t.is_symlink());
        // Follows symlinks; a dangling link lists as a plain entry
        let is_dir = fs::metadata(entry.path())
            .await
            .is_ok_and(|m| m.is_dir());

        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_symlink,
        });
    }

    entries.sort_by_cached_key(|e| e.name.to_lowercase());
    Ok(entries)
}

/// Render the listing page for `url_path` (the raw, encoded request path)
pub fn render_listing(url_path: &str, entries: &[ListingEntry]) -> String {
    let title = format!(
        "Directory listing for {}",
        escape_html(&percent_decode_str(url_path).decode_utf8_lossy())
    );

    let mut html = String::with_capacity(256 + entries.len() * 64);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>{title}</title>");
    html.push_str("</head>\n<body>\n");
    let _ = writeln!(html, "<h1>{title}</h1>");
    html.push_str("<hr>\n<ul>\n");
    for entry in entries {
        let _ = writeln!(
            html,
            "<li><a href=\"{}\">{}</a></li>",
            entry.href(),
            escape_html(&entry.display_name())
        );
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, is_dir: bool, is_symlink: bool) -> ListingEntry {
        ListingEntry {
            name: name.to_string(),
            is_dir,
            is_symlink,
        }
    }

    #[test]
    fn test_render_marks_directories_and_links() {
        let html = render_listing(
            "/javascript/",
            &[
                entry("components", true, false),
                entry("life.js", false, false),
                entry("shared", true, true),
            ],
        );

        assert!(html.contains("<title>Directory listing for /javascript/</title>"));
        assert!(html.contains("<li><a href=\"components/\">components/</a></li>"));
        assert!(html.contains("<li><a href=\"life.js\">life.js</a></li>"));
        assert!(html.contains("<li><a href=\"shared/\">shared@</a></li>"));
    }

    #[test]
    fn test_render_escapes_names() {
        let html = render_listing("/a%20b/", &[entry("<x>&y z.txt", false, false)]);
        assert!(html.contains("Directory listing for /a b/"));
        assert!(html.contains("href=\"%3Cx%3E%26y%20z.txt\""));
        assert!(html.contains("&lt;x&gt;&amp;y z.txt"));
    }

    #[tokio::test]
    async fn test_read_entries_sorted_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("beta.txt"), b"b").unwrap();
        std::fs::write(dir.path().join("Alpha.txt"), b"a").unwrap();
        std::fs::create_dir(dir.path().join("gamma")).unwrap();

        let entries = read_entries(dir.path()).await.unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha.txt", "beta.txt", "gamma"]);
        assert!(entries[2].is_dir);
        assert!(!entries[0].is_dir);
    }
}
