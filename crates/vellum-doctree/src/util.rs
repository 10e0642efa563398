//! Shared helpers for ids, escaping and page-relative links.

/// Escape text for HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Convert a title into an HTML id.
///
/// Lowercases, keeps ASCII alphanumerics, and collapses every other run of
/// characters into a single `-`. Ids never start or end with `-`; an id
/// that would be empty becomes `section`.
///
/// # Examples
///
/// ```
/// use vellum_doctree::make_id;
///
/// assert_eq!(make_id("Getting Started"), "getting-started");
/// assert_eq!(make_id("Version 0.3"), "version-0-3");
/// assert_eq!(make_id("What's New"), "what-s-new");
/// ```
pub fn make_id(title: &str) -> String {
    let mut id = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !id.is_empty() {
                id.push('-');
            }
            pending_dash = false;
            id.push(ch);
        } else {
            pending_dash = true;
        }
    }
    if id.is_empty() {
        "section".to_owned()
    } else {
        id
    }
}

/// Compute a relative URL from one page to another (RFC 3986).
///
/// Both `from` and `to` are page paths without leading slash. The last
/// segment of `from` is the current document; the base directory is
/// everything before it.
///
/// # Examples
///
/// ```
/// use vellum_doctree::relative_path;
///
/// assert_eq!(relative_path("a/b", "a/c"), "c");
/// assert_eq!(relative_path("index", "guide/setup"), "guide/setup");
/// assert_eq!(relative_path("guide/setup", "index"), "../index");
/// ```
pub fn relative_path(from: &str, to: &str) -> String {
    let from_segs: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segs: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let from_dir = if from.ends_with('/') || from_segs.is_empty() {
        &from_segs[..]
    } else {
        &from_segs[..from_segs.len() - 1]
    };

    let common = from_dir
        .iter()
        .zip(&to_segs)
        .take_while(|(a, b)| a == b)
        .count();

    let ups_part = "../".repeat(from_dir.len() - common);
    let down_part = to_segs[common..].join("/");

    let result = format!("{ups_part}{down_part}");
    if result.is_empty() {
        "./".to_owned()
    } else {
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html_special_characters() {
        assert_eq!(escape_html("<a href=\"x\">"), "&lt;a href=&quot;x&quot;&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
    }

    #[test]
    fn test_make_id_strips_punctuation() {
        assert_eq!(make_id("  Hello, World!  "), "hello-world");
        assert_eq!(make_id("0.3.1 - 2024-05-01"), "0-3-1-2024-05-01");
    }

    #[test]
    fn test_make_id_empty_title() {
        assert_eq!(make_id("!!!"), "section");
    }

    #[test]
    fn test_relative_path_deep_to_shallow() {
        assert_eq!(relative_path("user/guide/setup", "user/index"), "../index");
    }

    #[test]
    fn test_relative_path_siblings() {
        assert_eq!(relative_path("guide", "faq"), "faq");
    }

    #[test]
    fn test_relative_path_same_page() {
        assert_eq!(relative_path("guide", "guide"), "guide");
    }

    #[test]
    fn test_relative_path_both_empty() {
        assert_eq!(relative_path("", ""), "./");
    }
}
