
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Result of ingesting a corpus directory: the ordered raw document texts
/// plus a count of records that were skipped as unusable. Document position
/// in `documents` is the document's identity for retrieval, so enumeration
/// order must be reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedCorpus {
    pub documents: Vec<String>,
    pub skipped_records: usize,
}

/// Load every `.json`/`.jsonl` record file directly inside `dir`.
///
/// Files are visited in file-name order so repeated loads of an unchanged
/// directory yield the same document sequence. Malformed records are
/// skipped and counted, never fatal; only an unreadable directory is an
/// error.
#[inline]
pub fn load_corpus(dir: &Path) -> Result<LoadedCorpus> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read corpus directory: {}", dir.display()))?;

    let mut files: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("jsonl")
                })
        })
        .collect();
    files.sort();

    let mut corpus = LoadedCorpus {
        documents: Vec::new(),
        skipped_records: 0,
    };

    for path in &files {
        match fs::read_to_string(path) {
            Ok(text) => ingest_file(&text, path, &mut corpus),
            Err(e) => {
                warn!("Skipping unreadable corpus file {}: {}", path.display(), e);
                corpus.skipped_records += 1;
            }
        }
    }

    info!(
        "Loaded {} documents from {} ({} files, {} records skipped)",
        corpus.documents.len(),
        dir.display(),
        files.len(),
        corpus.skipped_records
    );

    Ok(corpus)
}

/// Parse one file's worth of records. `.json` files hold a single record
/// (or an array of records); anything that fails whole-file parsing is
/// retried as line-delimited JSON, which also covers `.jsonl`.
fn ingest_file(text: &str, path: &Path, corpus: &mut LoadedCorpus) {
    let is_jsonl = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jsonl"));

    if !is_jsonl {
        if let Ok(value) = serde_json::from_str::<Value>(text) {
            match value {
                Value::Array(records) => {
                    for record in &records {
                        ingest_record(record, corpus);
                    }
                }
                record => ingest_record(&record, corpus),
            }
            return;
        }
        debug!(
            "{} is not a single JSON document, retrying as line-delimited",
            path.display()
        );
    }

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(record) => ingest_record(&record, corpus),
            Err(e) => {
                debug!("Skipping malformed record in {}: {}", path.display(), e);
                corpus.skipped_records += 1;
            }
        }
    }
}

/// Pull usable text out of a single record, preserving the boundary
/// contract: a list-typed `paragraphs` field joined with single spaces,
/// else a `content` string. Everything else in the record is ignored.
fn ingest_record(record: &Value, corpus: &mut LoadedCorpus) {
    match record_text(record) {
        Some(text) => corpus.documents.push(text),
        None => {
            debug!("Skipping record without usable text");
            corpus.skipped_records += 1;
        }
    }
}

fn record_text(record: &Value) -> Option<String> {
    if let Some(paragraphs) = record.get("paragraphs").and_then(Value::as_array) {
        // A list-typed paragraphs field commits the record to this branch;
        // an empty join means the record is unusable, not a fallback case.
        let joined = paragraphs
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        let trimmed = joined.trim();
        return (!trimmed.is_empty()).then(|| trimmed.to_string());
    }

    let content = record.get("content").and_then(Value::as_str)?;
    let trimmed = content.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
