use crate::error::BuildError;
use crate::index::DocId;
use crate::markdown::{extract_headings, extract_title};
use crate::snapshot::{Document, Snapshot, SNAPSHOT_VERSION};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// A document as handed over by the discovery step, before id assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub title: String,
    pub path: String,
    pub content: String,
    pub headings: Vec<String>,
}

impl SourceDocument {
    /// Derive title and headings from the raw markdown body.
    pub fn from_markdown(path: impl Into<String>, content: impl Into<String>) -> Self {
        let path = path.into();
        let content = content.into();
        let title = extract_title(&content, &path);
        let headings = extract_headings(&content);
        Self { title, path, content, headings }
    }
}

/// Assign ids in input order and wrap the documents in a snapshot stamped with the current time.
pub fn build_snapshot(documents: Vec<SourceDocument>) -> Result<Snapshot, BuildError> {
    build_snapshot_at(documents, OffsetDateTime::now_utc())
}

pub fn build_snapshot_at(documents: Vec<SourceDocument>, built_at: OffsetDateTime) -> Result<Snapshot, BuildError> {
    if documents.is_empty() {
        return Err(BuildError::NoDocuments);
    }
    let build_date = built_at.format(&Rfc3339)?;

    let documents: Vec<Document> = documents
        .into_iter()
        .enumerate()
        .map(|(i, src)| {
            let search_text = search_text(&src.title, &src.headings, &src.content);
            Document {
                id: i as DocId,
                title: src.title,
                path: src.path,
                content: src.content,
                headings: src.headings,
                search_text,
            }
        })
        .collect();

    tracing::info!(documents = documents.len(), %build_date, "snapshot built");
    Ok(Snapshot {
        version: SNAPSHOT_VERSION.to_string(),
        build_date,
        document_count: documents.len(),
        documents,
    })
}

fn search_text(title: &str, headings: &[String], content: &str) -> String {
    format!("{} {} {}", title, headings.join(" "), content)
}
