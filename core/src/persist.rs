use crate::error::{LoadError, PersistError};
use crate::snapshot::Snapshot;
use std::fs::{create_dir_all, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

pub const SNAPSHOT_FILE: &str = "docs-index.json";

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn snapshot(&self) -> PathBuf { self.root.join(SNAPSHOT_FILE) }
}

/// Write the snapshot as pretty JSON, returning the number of bytes written.
pub fn save_snapshot(paths: &IndexPaths, snapshot: &Snapshot) -> Result<u64, PersistError> {
    let io_err = |source: std::io::Error| PersistError::Io { path: paths.snapshot(), source };
    create_dir_all(&paths.root).map_err(io_err)?;
    let json = serde_json::to_string_pretty(snapshot)?;
    let mut f = File::create(paths.snapshot()).map_err(io_err)?;
    f.write_all(json.as_bytes()).map_err(io_err)?;
    Ok(json.len() as u64)
}

/// Read, parse and validate a snapshot file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot, LoadError> {
    let mut f = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadError::Missing { path: path.to_path_buf() },
        _ => LoadError::Unreadable { path: path.to_path_buf(), message: e.to_string() },
    })?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)
        .map_err(|e| LoadError::Unreadable { path: path.to_path_buf(), message: e.to_string() })?;
    let snapshot: Snapshot = serde_json::from_str(&buf)
        .map_err(|e| LoadError::Malformed { message: e.to_string() })?;
    snapshot.validate()?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build_snapshot, SourceDocument};
    use tempfile::tempdir;

    #[test]
    fn save_then_load() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path().join("data"));
        let snap = build_snapshot(vec![SourceDocument::from_markdown("a.md", "# A\nbody")]).unwrap();
        let bytes = save_snapshot(&paths, &snap).unwrap();
        assert!(bytes > 0);
        assert_eq!(load_snapshot(&paths.snapshot()).unwrap(), snap);
    }

    #[test]
    fn missing_file() {
        let dir = tempdir().unwrap();
        let err = load_snapshot(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.is_missing());
        assert!(err.to_string().contains("docsearch-indexer build"));
    }

    #[test]
    fn missing_field_is_named() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        std::fs::write(&path, r#"{"version":"1.0.0","buildDate":"x","documentCount":1,"documents":[{"id":0,"path":"a.md","content":"","headings":[],"searchText":""}]}"#).unwrap();
        match load_snapshot(&path) {
            Err(LoadError::Malformed { message }) => assert!(message.contains("title"), "{message}"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn not_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILE);
        std::fs::write(&path, "garbage").unwrap();
        assert!(matches!(load_snapshot(&path), Err(LoadError::Malformed { .. })));
    }
}
