use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use docsearch_core::persist::{load_snapshot, save_snapshot, IndexPaths};
use docsearch_core::{build_snapshot, QueryEngine, SearchOptions, SourceDocument};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "docsearch-indexer")]
#[command(about = "Build and query the markdown documentation index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index snapshot from a directory of markdown files
    Build {
        /// Documentation root, searched recursively for .md files
        #[arg(long)]
        input: String,
        /// Output index directory
        #[arg(long, default_value = "./index")]
        output: String,
    },
    /// Run a query against a built index and print the JSON response
    Search {
        /// Index directory
        #[arg(long, default_value = "./index")]
        index: String,
        /// Query text
        query: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Attach the (truncated) page content to each result
        #[arg(long, default_value_t = false)]
        full_content: bool,
        #[arg(long, default_value_t = 3000)]
        max_content_length: usize,
    },
    /// Print snapshot metadata
    Info {
        #[arg(long, default_value = "./index")]
        index: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output } => build_index(&input, &output),
        Commands::Search { index, query, limit, full_content, max_content_length } => {
            let opts = SearchOptions { limit, include_full_content: full_content, max_content_length };
            let engine = QueryEngine::from_file(IndexPaths::new(&index).snapshot());
            let resp = engine.search(&query, &opts)?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
            Ok(())
        }
        Commands::Info { index } => {
            let snapshot = load_snapshot(&IndexPaths::new(&index).snapshot())?;
            println!("version:    {}", snapshot.version);
            println!("built:      {}", snapshot.build_date);
            println!("documents:  {}", snapshot.document_count);
            Ok(())
        }
    }
}

fn build_index(input: &str, output: &str) -> Result<()> {
    let input_path = Path::new(input);
    let out_paths = IndexPaths::new(output);

    tracing::info!(input, "reading markdown files");
    let files = discover_markdown(input_path)?;
    tracing::info!(count = files.len(), "found markdown files");

    let total = files.len();
    let mut documents: Vec<SourceDocument> = Vec::with_capacity(total);
    for (i, (abs, rel)) in files.into_iter().enumerate() {
        let content = fs::read_to_string(&abs).with_context(|| format!("reading {}", abs.display()))?;
        documents.push(SourceDocument::from_markdown(rel, content));
        if (i + 1) % 50 == 0 || i + 1 == total {
            tracing::info!(processed = i + 1, total, "processing files");
        }
    }

    let snapshot = build_snapshot(documents)
        .with_context(|| format!("building index from {}", input_path.display()))?;
    let bytes = save_snapshot(&out_paths, &snapshot)?;

    tracing::info!(
        documents = snapshot.document_count,
        size_kb = (bytes + 512) / 1024,
        location = %out_paths.snapshot().display(),
        "index build complete"
    );
    Ok(())
}

/// Markdown files under `root`, sorted by name, as (absolute, corpus-relative) pairs.
fn discover_markdown(root: &Path) -> Result<Vec<(PathBuf, String)>> {
    if !root.is_dir() {
        bail!("documentation directory not found: {}", root.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(error = %e, "skipping directory entry");
                continue;
            }
        };
        let p = entry.path();
        if !entry.file_type().is_file() || !is_markdown(p) {
            continue;
        }
        let rel = p
            .strip_prefix(root)
            .unwrap_or(p)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((p.to_path_buf(), rel));
    }
    Ok(files)
}

fn is_markdown(p: &Path) -> bool {
    matches!(p.extension().and_then(|s| s.to_str()), Some("md" | "markdown"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn discovers_nested_markdown_sorted() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("b/nested")).unwrap();
        fs::write(dir.path().join("z.md"), "# Z").unwrap();
        fs::write(dir.path().join("a.md"), "# A").unwrap();
        fs::write(dir.path().join("b/nested/c.markdown"), "# C").unwrap();
        fs::write(dir.path().join("b/ignore.txt"), "nope").unwrap();

        let rels: Vec<String> = discover_markdown(dir.path()).unwrap().into_iter().map(|(_, r)| r).collect();
        assert_eq!(rels, vec!["a.md", "b/nested/c.markdown", "z.md"]);
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = tempdir().unwrap();
        assert!(discover_markdown(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn empty_corpus_fails_build() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("out");
        let err = build_index(dir.path().to_str().unwrap(), out.to_str().unwrap()).unwrap_err();
        assert!(err.root_cause().to_string().contains("no documents"));
        assert!(!out.join("docs-index.json").exists());
    }

    #[test]
    fn build_writes_loadable_snapshot() {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("open.md"), "# OPEN\nOpens a channel.").unwrap();
        fs::write(docs.join("untitled.md"), "no heading").unwrap();
        let out = dir.path().join("index");

        build_index(docs.to_str().unwrap(), out.to_str().unwrap()).unwrap();
        let snapshot = load_snapshot(&IndexPaths::new(&out).snapshot()).unwrap();
        assert_eq!(snapshot.document_count, 2);
        assert_eq!(snapshot.documents[0].title, "OPEN");
        assert_eq!(snapshot.documents[1].title, "untitled");
        assert_eq!(snapshot.documents[1].path, "untitled.md");
    }

    #[test]
    fn non_utf8_file_aborts_build() {
        let dir = tempdir().unwrap();
        let docs = dir.path().join("docs");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("a.md"), "# A\nfine").unwrap();
        fs::write(docs.join("b.md"), [0xff, 0xfe, 0x00, 0x80]).unwrap();
        let out = dir.path().join("index");

        let err = build_index(docs.to_str().unwrap(), out.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("b.md"), "{err:#}");
        assert!(!out.join("docs-index.json").exists());
    }
}
