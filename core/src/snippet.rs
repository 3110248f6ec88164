/// Default window for [`create_snippet`].
pub const DEFAULT_SNIPPET_LENGTH: usize = 200;

pub const TRUNCATION_MARKER: &str = "\n\n[Content truncated...]";

/// Excerpt of `content` around the first query word that occurs in it.
///
/// Words are tried in query order; the first word found anchors a window of
/// `max_length` chars centred on it and trimmed. Without any hit the excerpt
/// is the untrimmed start of the content. Offsets count chars, not bytes.
pub fn create_snippet(content: &str, query: &str, max_length: usize) -> String {
    let chars: Vec<char> = content.chars().collect();
    let len = chars.len();

    // Per-char lowering, matching how the content is lowered.
    let query_lower: String = query.chars().flat_map(char::to_lowercase).collect();
    let position = query_lower
        .split_whitespace()
        .find_map(|word| find_case_insensitive(content, word));

    match position {
        Some(p) => {
            let start = p.saturating_sub(max_length / 2);
            let end = (start + max_length).min(len);
            let mut s: String = chars[start..end].iter().collect();
            if start > 0 {
                s.insert_str(0, "...");
            }
            if end < len {
                s.push_str("...");
            }
            s.trim().to_string()
        }
        None => {
            let mut s: String = chars.iter().take(max_length).collect();
            if len > max_length {
                s.push_str("...");
            }
            s
        }
    }
}

/// First `max_chars` chars of `content`, with a marker appended when cut.
pub fn truncate_content(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}{}", &content[..byte_idx], TRUNCATION_MARKER),
        None => content.to_string(),
    }
}

/// Char offset of the first case-insensitive occurrence of `needle_lower`.
fn find_case_insensitive(haystack: &str, needle_lower: &str) -> Option<usize> {
    // Lowercasing can change char counts, so keep each lowered char's source offset.
    let mut lowered = String::with_capacity(haystack.len());
    let mut origin: Vec<usize> = Vec::with_capacity(haystack.len());
    for (i, c) in haystack.chars().enumerate() {
        for lc in c.to_lowercase() {
            lowered.push(lc);
            origin.push(i);
        }
    }
    let byte_idx = lowered.find(needle_lower)?;
    let char_idx = lowered[..byte_idx].chars().count();
    origin.get(char_idx).copied()
}
