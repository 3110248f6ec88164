use crate::index::{DocId, Field, SearchIndex};
use crate::snippet::{create_snippet, truncate_content};
use crate::tokenizer::query_terms;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const TITLE_BOOST: f32 = 2.0;
const TEXT_BOOST: f32 = 1.0;
/// Weight of an occurrence matched only by prefix, relative to an exact one.
const PREFIX_WEIGHT: f32 = 0.5;
/// Max word distance between consecutive query terms that earns a bonus.
const PROXIMITY_WINDOW: u32 = 8;
const PROXIMITY_WEIGHT: f32 = 1.0;

const SNIPPET_LENGTH: usize = 300;
const MAX_HEADINGS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOptions {
    pub limit: usize,
    pub include_full_content: bool,
    pub max_content_length: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { limit: 10, include_full_content: false, max_content_length: 3000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub title: String,
    pub path: String,
    pub snippet: String,
    pub headings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub query: String,
    pub result_count: usize,
    pub results: Vec<Match>,
    pub message: String,
}

impl SearchResponse {
    fn new(query: &str, results: Vec<Match>) -> Self {
        let message = if results.is_empty() {
            "No results found".to_string()
        } else {
            format!("Found {} result(s)", results.len())
        };
        Self { query: query.to_string(), result_count: results.len(), results, message }
    }
}

#[derive(Debug, Clone, Default)]
struct TermHits {
    weight: f32,
    positions: Vec<u32>,
}

/// Rank every document matching the query: score descending, id ascending.
///
/// A field matches when each distinct query term prefix-matches some word in
/// it. A document's score is the best of its field scores.
pub fn rank(index: &SearchIndex, query: &str) -> Vec<(DocId, f32)> {
    let terms = query_terms(query);
    if terms.is_empty() {
        return Vec::new();
    }

    let mut scores: HashMap<DocId, f32> = HashMap::new();
    for field in Field::ALL {
        for (doc_id, score) in score_field(index, field, &terms) {
            let best = scores.entry(doc_id).or_insert(score);
            if score > *best {
                *best = score;
            }
        }
    }

    let mut scored: Vec<(DocId, f32)> = scores.into_iter().collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    scored
}

fn score_field(index: &SearchIndex, field: Field, terms: &[String]) -> Vec<(DocId, f32)> {
    let boost = match field {
        Field::Title => TITLE_BOOST,
        Field::SearchText => TEXT_BOOST,
    };

    let mut per_doc: HashMap<DocId, Vec<TermHits>> = HashMap::new();
    for (t, term) in terms.iter().enumerate() {
        for (exact, postings) in index.prefix_postings(field, term) {
            let w = if exact { 1.0 } else { PREFIX_WEIGHT };
            for p in postings {
                let hits = per_doc
                    .entry(p.doc_id)
                    .or_insert_with(|| vec![TermHits::default(); terms.len()]);
                hits[t].weight += w * p.positions.len() as f32;
                hits[t].positions.extend_from_slice(&p.positions);
            }
        }
    }

    per_doc
        .into_iter()
        .filter_map(|(doc_id, mut hits)| {
            if hits.iter().any(|h| h.positions.is_empty()) {
                return None;
            }
            for h in hits.iter_mut() {
                h.positions.sort_unstable();
            }
            let term_score: f32 = hits.iter().map(|h| (1.0 + h.weight).ln()).sum();
            let proximity: f32 = hits
                .windows(2)
                .map(|pair| proximity_bonus(&pair[0].positions, &pair[1].positions))
                .sum();
            Some((doc_id, boost * (term_score + proximity)))
        })
        .collect()
}

fn proximity_bonus(a: &[u32], b: &[u32]) -> f32 {
    match min_distance(a, b) {
        Some(d) if d <= PROXIMITY_WINDOW => {
            let d = d.max(1);
            PROXIMITY_WEIGHT * (PROXIMITY_WINDOW + 1 - d) as f32 / PROXIMITY_WINDOW as f32
        }
        _ => 0.0,
    }
}

/// Smallest gap between any element of `a` and any of `b`; both sorted.
fn min_distance(a: &[u32], b: &[u32]) -> Option<u32> {
    let (mut i, mut j) = (0, 0);
    let mut best: Option<u32> = None;
    while i < a.len() && j < b.len() {
        let d = a[i].abs_diff(b[j]);
        best = Some(best.map_or(d, |cur| cur.min(d)));
        if a[i] < b[j] {
            i += 1;
        } else {
            j += 1;
        }
    }
    best
}

/// Run a query and assemble up to `options.limit` matches.
pub fn execute(index: &SearchIndex, query: &str, options: &SearchOptions) -> SearchResponse {
    let ranked = rank(index, query);
    let total_hits = ranked.len();

    let results: Vec<Match> = ranked
        .into_iter()
        .take(options.limit)
        .filter_map(|(doc_id, _score)| index.doc(doc_id))
        .map(|doc| Match {
            title: doc.title.clone(),
            path: doc.path.clone(),
            snippet: create_snippet(&doc.content, query, SNIPPET_LENGTH),
            headings: doc.headings.iter().take(MAX_HEADINGS).cloned().collect(),
            full_content: options
                .include_full_content
                .then(|| truncate_content(&doc.content, options.max_content_length)),
        })
        .collect();

    tracing::debug!(query, total_hits, returned = results.len(), "search executed");
    SearchResponse::new(query, results)
}
