use crate::error::LoadError;
use crate::index::DocId;
use serde::{Deserialize, Serialize};

/// Format tag written into every snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocId,
    pub title: String,
    /// Corpus-relative path, e.g. `functions/abs.md`
    pub path: String,
    /// Raw markdown, kept verbatim for snippet offsets
    pub content: String,
    pub headings: Vec<String>,
    /// title + headings + content, computed once at build time
    pub search_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub build_date: String,
    pub document_count: usize,
    pub documents: Vec<Document>,
}

impl Snapshot {
    /// Structural checks a parsed snapshot must pass before it is indexed.
    pub fn validate(&self) -> Result<(), LoadError> {
        let major = SNAPSHOT_VERSION.split('.').next().unwrap_or(SNAPSHOT_VERSION);
        if self.version.split('.').next() != Some(major) {
            return Err(LoadError::invalid(
                "version",
                format!("unsupported snapshot version {:?}, expected {}", self.version, SNAPSHOT_VERSION),
            ));
        }
        if self.document_count != self.documents.len() {
            return Err(LoadError::invalid(
                "documentCount",
                format!("declares {} documents but contains {}", self.document_count, self.documents.len()),
            ));
        }
        validate_ids(&self.documents)
    }
}

/// Ids must be dense and equal to the document's position.
pub(crate) fn validate_ids(documents: &[Document]) -> Result<(), LoadError> {
    for (pos, doc) in documents.iter().enumerate() {
        if doc.id as usize != pos {
            return Err(LoadError::invalid(
                format!("documents[{pos}].id"),
                format!("expected {pos}, found {}", doc.id),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: DocId) -> Document {
        Document {
            id,
            title: format!("Doc {id}"),
            path: format!("doc{id}.md"),
            content: String::new(),
            headings: vec![],
            search_text: format!("Doc {id}"),
        }
    }

    fn snapshot(documents: Vec<Document>) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION.into(),
            build_date: "2024-01-01T00:00:00Z".into(),
            document_count: documents.len(),
            documents,
        }
    }

    #[test]
    fn accepts_dense_ids() {
        assert!(snapshot(vec![doc(0), doc(1), doc(2)]).validate().is_ok());
    }

    #[test]
    fn rejects_id_gap() {
        let err = snapshot(vec![doc(0), doc(2)]).validate().unwrap_err();
        assert_eq!(err, LoadError::invalid("documents[1].id", "expected 1, found 2"));
    }

    #[test]
    fn rejects_count_mismatch() {
        let mut snap = snapshot(vec![doc(0)]);
        snap.document_count = 3;
        match snap.validate() {
            Err(LoadError::Invalid { field, .. }) => assert_eq!(field, "documentCount"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn rejects_other_major_version() {
        let mut snap = snapshot(vec![doc(0)]);
        snap.version = "2.0.0".into();
        assert!(matches!(snap.validate(), Err(LoadError::Invalid { field, .. }) if field == "version"));
    }

    #[test]
    fn serializes_camel_case_fields() {
        let json = serde_json::to_value(snapshot(vec![doc(0)])).unwrap();
        assert_eq!(json["documentCount"], 1);
        assert!(json["buildDate"].is_string());
        assert_eq!(json["documents"][0]["searchText"], "Doc 0");
    }
}
