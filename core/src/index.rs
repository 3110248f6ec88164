use crate::snapshot::Document;
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type DocId = u32;

/// Indexed fields, in the order they are searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    SearchText,
}

impl Field {
    pub const ALL: [Field; 2] = [Field::Title, Field::SearchText];

    fn slot(self) -> usize {
        match self {
            Field::Title => 0,
            Field::SearchText => 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Posting {
    pub doc_id: DocId,
    /// Word positions of the term within the field, ascending
    pub positions: Vec<u32>,
}

/// Stored fields returned with a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDoc {
    pub id: DocId,
    pub title: String,
    pub path: String,
    pub content: String,
    pub headings: Vec<String>,
}

#[derive(Debug, Default)]
struct FieldIndex {
    // Ordered so that all terms sharing a prefix are one contiguous range.
    terms: BTreeMap<String, Vec<Posting>>, // postings sorted by doc_id
}

impl FieldIndex {
    fn add(&mut self, doc_id: DocId, text: &str) {
        let mut by_term: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        for (term, pos) in tokenize(text) {
            by_term.entry(term).or_default().push(pos as u32);
        }
        for (term, positions) in by_term {
            self.terms.entry(term).or_default().push(Posting { doc_id, positions });
        }
    }

    /// Every indexed term starting with `prefix`, with its postings.
    fn expand<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a [Posting])> + 'a {
        self.terms
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .take_while(move |(term, _)| term.starts_with(prefix))
            .map(|(term, postings)| (term.as_str(), postings.as_slice()))
    }
}

/// In-memory inverted index over `title` and `searchText`, plus the forward store.
///
/// Built once from a document list whose ids equal their positions, so the
/// forward store is a plain vector indexed by id.
#[derive(Debug)]
pub struct SearchIndex {
    fields: [FieldIndex; 2],
    docs: Vec<StoredDoc>,
}

impl SearchIndex {
    pub fn build(documents: &[Document]) -> Self {
        let mut index = SearchIndex { fields: Default::default(), docs: Vec::with_capacity(documents.len()) };
        for doc in documents {
            index.fields[Field::Title.slot()].add(doc.id, &doc.title);
            index.fields[Field::SearchText.slot()].add(doc.id, &doc.search_text);
            index.docs.push(StoredDoc {
                id: doc.id,
                title: doc.title.clone(),
                path: doc.path.clone(),
                content: doc.content.clone(),
                headings: doc.headings.clone(),
            });
        }
        tracing::debug!(
            documents = index.docs.len(),
            title_terms = index.fields[Field::Title.slot()].terms.len(),
            text_terms = index.fields[Field::SearchText.slot()].terms.len(),
            "search index built"
        );
        index
    }

    pub fn num_docs(&self) -> usize { self.docs.len() }

    pub fn num_terms(&self, field: Field) -> usize { self.fields[field.slot()].terms.len() }

    pub fn doc(&self, id: DocId) -> Option<&StoredDoc> { self.docs.get(id as usize) }

    /// Prefix-expanded postings of `prefix` in `field`, tagged with whether the
    /// indexed term equals the prefix exactly.
    pub fn prefix_postings<'a>(&'a self, field: Field, prefix: &'a str) -> impl Iterator<Item = (bool, &'a [Posting])> + 'a {
        self.fields[field.slot()]
            .expand(prefix)
            .map(move |(term, postings)| (term == prefix, postings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_snapshot, SourceDocument};

    fn index(bodies: &[&str]) -> SearchIndex {
        let docs = bodies
            .iter()
            .enumerate()
            .map(|(i, body)| SourceDocument::from_markdown(format!("{i}.md"), *body))
            .collect();
        SearchIndex::build(&build_snapshot(docs).unwrap().documents)
    }

    #[test]
    fn prefix_expansion_is_contiguous() {
        let ix = index(&["# Install\ninstaller installs insight", "# Other\ninstall"]);
        let hits: Vec<(bool, Vec<DocId>)> = ix
            .prefix_postings(Field::SearchText, "install")
            .map(|(exact, ps)| (exact, ps.iter().map(|p| p.doc_id).collect()))
            .collect();
        // install, installer, installs
        assert_eq!(hits, vec![(true, vec![0, 1]), (false, vec![0]), (false, vec![0])]);
    }

    #[test]
    fn positions_recorded_per_field() {
        let ix = index(&["# Alpha Beta\nbeta"]);
        let title: Vec<&Posting> = ix.prefix_postings(Field::Title, "beta").flat_map(|(_, ps)| ps).collect();
        assert_eq!(title[0].positions, vec![1]);
        // search text: "alpha beta alpha beta alpha beta beta"
        let text: Vec<&Posting> = ix.prefix_postings(Field::SearchText, "beta").flat_map(|(_, ps)| ps).collect();
        assert_eq!(text[0].positions, vec![1, 3, 5, 6]);
    }

    #[test]
    fn forward_store_positional() {
        let ix = index(&["# Zero", "# One"]);
        assert_eq!(ix.num_docs(), 2);
        assert_eq!(ix.doc(1).unwrap().title, "One");
        assert!(ix.doc(2).is_none());
    }
}
