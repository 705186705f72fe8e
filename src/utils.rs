//! Utility functions for filenames and sizes

use chrono::Utc;
use url::Url;

/// Extract the target filename from a download URL
///
/// Returns the last path segment verbatim, or `None` when the path ends in
/// `/` or is empty.
///
/// # Examples
///
/// ```
/// use kiwix_manager::utils::filename_from_url;
/// use url::Url;
///
/// let url = Url::parse("https://download.kiwix.org/zim/wikipedia_en_100.zim").unwrap();
/// assert_eq!(filename_from_url(&url).as_deref(), Some("wikipedia_en_100.zim"));
///
/// let bare = Url::parse("https://download.kiwix.org/").unwrap();
/// assert_eq!(filename_from_url(&bare), None);
/// ```
pub fn filename_from_url(url: &Url) -> Option<String> {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Fallback filename for URLs without a path segment: `download_<unix-seconds>.<extension>`
pub fn synthesized_filename(extension: &str) -> String {
    format!("download_{}.{}", Utc::now().timestamp(), extension)
}

/// Whether a name can be used as a file directly under the storage root
///
/// Rejects empty names, `.` and `..`, path separators and NUL. Dots inside a
/// name (`wiki..v2.zim`) are allowed.
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
}

/// Format bytes as a human-readable size with two decimals (base 1024)
///
/// # Examples
///
/// ```
/// use kiwix_manager::utils::format_size;
///
/// assert_eq!(format_size(512), "512.00 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(size_bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    let mut size = size_bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} PB", size)
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_is_last_segment_exactly() {
        let cases = [
            ("http://example.test/archive.zim", "archive.zim"),
            ("http://example.test/a/b/c/wiki_fr_all.zim", "wiki_fr_all.zim"),
            ("http://example.test/files/archive.zim?token=abc", "archive.zim"),
            ("http://example.test/no-extension", "no-extension"),
            ("http://example.test/space%20name.zim", "space%20name.zim"),
        ];

        for (raw, expected) in cases {
            let url = Url::parse(raw).unwrap();
            assert_eq!(filename_from_url(&url).as_deref(), Some(expected), "{raw}");
        }
    }

    #[test]
    fn test_no_filename_for_directory_urls() {
        for raw in [
            "http://example.test",
            "http://example.test/",
            "http://example.test/zim/",
        ] {
            let url = Url::parse(raw).unwrap();
            assert_eq!(filename_from_url(&url), None, "{raw}");
        }
    }

    #[test]
    fn test_synthesized_filename_shape() {
        let name = synthesized_filename("zim");
        assert!(name.starts_with("download_"));
        assert!(name.ends_with(".zim"));
        assert!(is_safe_filename(&name));
    }

    #[test]
    fn test_safe_filename_rejects_traversal() {
        assert!(is_safe_filename("wikipedia.zim"));
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename("."));
        assert!(!is_safe_filename(".."));
        assert!(!is_safe_filename("../etc/passwd"));
        assert!(!is_safe_filename("dir/file.zim"));
        assert!(!is_safe_filename("dir\\file.zim"));
        assert!(!is_safe_filename("..\\..\\boot.ini"));
    }

    #[test]
    fn test_safe_filename_allows_inner_dots() {
        assert!(is_safe_filename("wiki..v2.zim"));
        assert!(is_safe_filename("..hidden.zim"));
        assert!(is_safe_filename("archive.zim.."));
    }

    #[test]
    fn test_format_size_units() {
        assert_eq!(format_size(0), "0.00 B");
        assert_eq!(format_size(1023), "1023.00 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(10 * 1024 * 1024), "10.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
        assert_eq!(format_size(1024u64.pow(5)), "1.00 PB");
    }
}
