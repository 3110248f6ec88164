//! Markdown documentation search: snapshot building, in-memory inverted
//! index, ranked prefix search and snippet extraction.

pub mod builder;
pub mod engine;
pub mod error;
pub mod index;
pub mod markdown;
pub mod persist;
pub mod search;
pub mod snapshot;
pub mod snippet;
pub mod tokenizer;

pub use builder::{build_snapshot, SourceDocument};
pub use engine::{EngineStatus, QueryEngine, SnapshotSource};
pub use error::{BuildError, LoadError, PersistError};
pub use index::{DocId, Field, Posting, SearchIndex, StoredDoc};
pub use search::{Match, SearchOptions, SearchResponse};
pub use snapshot::{Document, Snapshot, SNAPSHOT_VERSION};
