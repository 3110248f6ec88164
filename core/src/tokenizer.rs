use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}][\p{L}\p{N}_']*").expect("valid regex");
}

/// Tokenize text into (term, position) using NFKC normalization and lowercasing.
///
/// Positions are word ordinals, used for proximity scoring. No stemming and
/// no stopword removal: prefix matching at query time covers inflections,
/// and every word of a title stays searchable.
pub fn tokenize(text: &str) -> Vec<(String, usize)> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .enumerate()
        .map(|(pos, mat)| (mat.as_str().trim_end_matches('\'').to_string(), pos))
        .collect()
}

/// Distinct query terms in first-occurrence order.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for (term, _pos) in tokenize(query) {
        if !terms.contains(&term) {
            terms.push(term);
        }
    }
    terms
}
