use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    // Any number of '#' counts for the title line.
    static ref TITLE_RE: Regex = Regex::new(r"(?m)^#+[ \t]+(\S.*)$").expect("valid regex");
    static ref HEADING_RE: Regex = Regex::new(r"(?m)^#{1,6}[ \t]+(\S.*)$").expect("valid regex");
}

const MARKDOWN_EXTENSIONS: &[&str] = &[".md", ".markdown"];

/// Title of a markdown page: the text of its first heading line, or the
/// fallback file name without its markdown extension.
pub fn extract_title(content: &str, fallback_name: &str) -> String {
    if let Some(caps) = TITLE_RE.captures(content) {
        return caps[1].trim().to_string();
    }
    normalize_file_name(fallback_name)
}

/// Every heading (levels 1-6) in document order, marker stripped.
pub fn extract_headings(content: &str) -> Vec<String> {
    HEADING_RE
        .captures_iter(content)
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

fn normalize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(name);
    for ext in MARKDOWN_EXTENSIONS {
        if let Some(stem) = base.strip_suffix(ext) {
            if !stem.is_empty() {
                return stem.to_string();
            }
        }
    }
    base.to_string()
}
