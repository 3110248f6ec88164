use crate::error::LoadError;
use crate::index::{DocId, Field, SearchIndex, StoredDoc};
use crate::persist::load_snapshot;
use crate::search::{execute, SearchOptions, SearchResponse};
use crate::snapshot::{validate_ids, Document};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Where the engine gets its documents from on first use.
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    /// A snapshot file written by the indexer
    File(PathBuf),
    /// Documents handed over directly, ids already assigned
    Documents(Vec<Document>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

type LoadOutcome = Result<Arc<SearchIndex>, LoadError>;

/// Process-scoped query engine.
///
/// The searchable structure is built by the first call to [`QueryEngine::load`]
/// (directly or through [`QueryEngine::search`]) and lives until the engine is
/// dropped. Only one caller builds; concurrent first callers block until the
/// outcome is set and then share it. After that, reads are lock-free. A failed
/// load is terminal and is returned to every later caller.
pub struct QueryEngine {
    source: SnapshotSource,
    outcome: OnceLock<LoadOutcome>,
    loading: AtomicBool,
}

impl QueryEngine {
    pub fn new(source: SnapshotSource) -> Self {
        Self { source, outcome: OnceLock::new(), loading: AtomicBool::new(false) }
    }

    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::new(SnapshotSource::File(path.into()))
    }

    pub fn from_documents(documents: Vec<Document>) -> Self {
        Self::new(SnapshotSource::Documents(documents))
    }

    /// Build the searchable structure if needed. Idempotent.
    pub fn load(&self) -> Result<Arc<SearchIndex>, LoadError> {
        self.outcome
            .get_or_init(|| {
                self.loading.store(true, Ordering::Release);
                let outcome = self.materialize().map(Arc::new);
                if let Err(err) = &outcome {
                    tracing::error!(error = %err, "failed to load documentation index");
                }
                self.loading.store(false, Ordering::Release);
                outcome
            })
            .clone()
    }

    fn materialize(&self) -> Result<SearchIndex, LoadError> {
        match &self.source {
            SnapshotSource::File(path) => {
                let snapshot = load_snapshot(path)?;
                let index = SearchIndex::build(&snapshot.documents);
                tracing::info!(
                    documents = snapshot.document_count,
                    terms = index.num_terms(Field::SearchText),
                    version = %snapshot.version,
                    build_date = %snapshot.build_date,
                    path = %path.display(),
                    "loaded documentation index"
                );
                Ok(index)
            }
            SnapshotSource::Documents(documents) => {
                validate_ids(documents)?;
                let index = SearchIndex::build(documents);
                tracing::info!(documents = documents.len(), "indexed documents");
                Ok(index)
            }
        }
    }

    /// Search the corpus, loading it first if this is the first use.
    pub fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse, LoadError> {
        let index = self.load()?;
        Ok(execute(&index, query, options))
    }

    /// Stored fields of one document, by id.
    pub fn document(&self, id: DocId) -> Result<Option<StoredDoc>, LoadError> {
        let index = self.load()?;
        Ok(index.doc(id).cloned())
    }

    pub fn status(&self) -> EngineStatus {
        match self.outcome.get() {
            Some(Ok(_)) => EngineStatus::Ready,
            Some(Err(_)) => EngineStatus::Failed,
            None if self.loading.load(Ordering::Acquire) => EngineStatus::Loading,
            None => EngineStatus::Unloaded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_snapshot, SourceDocument};

    fn documents() -> Vec<Document> {
        build_snapshot(vec![
            SourceDocument::from_markdown("a.md", "# Alpha\nfirst page"),
            SourceDocument::from_markdown("b.md", "# Beta\nsecond page"),
        ])
        .unwrap()
        .documents
    }

    #[test]
    fn lazy_load_on_first_search() {
        let engine = QueryEngine::from_documents(documents());
        assert_eq!(engine.status(), EngineStatus::Unloaded);
        let resp = engine.search("beta", &SearchOptions::default()).unwrap();
        assert_eq!(resp.results[0].path, "b.md");
        assert_eq!(engine.status(), EngineStatus::Ready);
    }

    #[test]
    fn load_is_idempotent() {
        let engine = QueryEngine::from_documents(documents());
        let first = engine.load().unwrap();
        let second = engine.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn failure_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs-index.json");
        let engine = QueryEngine::from_file(&path);
        let err = engine.search("x", &SearchOptions::default()).unwrap_err();
        assert!(err.is_missing());
        assert_eq!(engine.status(), EngineStatus::Failed);

        // Creating the file afterwards does not revive this engine.
        let snap = build_snapshot(vec![SourceDocument::from_markdown("a.md", "# A")]).unwrap();
        std::fs::write(&path, serde_json::to_string(&snap).unwrap()).unwrap();
        assert_eq!(engine.load().unwrap_err(), err);
    }

    #[test]
    fn rejects_non_dense_documents() {
        let mut docs = documents();
        docs[1].id = 5;
        let engine = QueryEngine::from_documents(docs);
        assert!(matches!(engine.load(), Err(LoadError::Invalid { .. })));
    }

    #[test]
    fn document_lookup() {
        let engine = QueryEngine::from_documents(documents());
        assert_eq!(engine.document(0).unwrap().unwrap().title, "Alpha");
        assert!(engine.document(9).unwrap().is_none());
    }

    #[test]
    fn concurrent_first_calls_share_one_index() {
        let engine = Arc::new(QueryEngine::from_documents(documents()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.load().unwrap())
            })
            .collect();
        let indexes: Vec<Arc<SearchIndex>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(indexes.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn ready_status_is_stable_under_concurrent_queries() {
        let engine = Arc::new(QueryEngine::from_documents(documents()));
        engine.load().unwrap();
        let stop = Arc::new(AtomicBool::new(false));
        let workers: Vec<_> = (0..4)
            .map(|_| {
                let engine = Arc::clone(&engine);
                let stop = Arc::clone(&stop);
                std::thread::spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        engine.search("page", &SearchOptions::default()).unwrap();
                    }
                })
            })
            .collect();
        let not_ready = (0..10_000).filter(|_| engine.status() != EngineStatus::Ready).count();
        stop.store(true, Ordering::Relaxed);
        for w in workers {
            w.join().unwrap();
        }
        assert_eq!(not_ready, 0);
    }
}
