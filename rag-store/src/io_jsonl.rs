//! JSONL persistence for collections.
//!
//! Provides two utilities:
//! - [`append_documents`] → durable append (`sync_all` before returning).
//! - [`read_rows`] → tolerant loader; malformed lines are logged and skipped,
//!   but still reserve their id.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::errors::StoreError;
use crate::record::{Document, DocumentMetadata};

/// Row as found on disk.
///
/// `content` and `metadata` are kept loose so that a damaged field degrades a
/// single hit instead of the whole collection.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredRow {
    pub id: String,
    #[serde(default)]
    pub content: Option<String>,
    pub embedding: Vec<f32>,
    #[serde(default)]
    pub metadata: Value,
}

impl StoredRow {
    /// Decodes the metadata column, `None` when it is absent or malformed.
    pub fn decode_metadata(&self) -> Option<DocumentMetadata> {
        if self.metadata.is_null() {
            return None;
        }
        match serde_json::from_value::<DocumentMetadata>(self.metadata.clone()) {
            Ok(m) => Some(m),
            Err(e) => {
                warn!(id = %self.id, error = %e, "malformed stored metadata");
                None
            }
        }
    }
}

impl From<Document> for StoredRow {
    fn from(d: Document) -> Self {
        let metadata = serde_json::to_value(&d.metadata).unwrap_or(Value::Null);
        Self {
            id: d.id,
            content: Some(d.content),
            embedding: d.embedding,
            metadata,
        }
    }
}

/// Appends documents to `path`, creating parent directories as needed.
///
/// The file is flushed and `sync_all`ed before returning.
///
/// # Errors
/// - [`StoreError::Io`] on filesystem failures.
/// - [`StoreError::Serialize`] if a document cannot be encoded.
pub fn append_documents(path: &Path, docs: &[Document]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut buf = Vec::new();
    for d in docs {
        serde_json::to_writer(&mut buf, d)?;
        buf.push(b'\n');
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut w = BufWriter::new(file);
    w.write_all(&buf)?;
    w.flush()?;
    w.get_ref().sync_all()?;

    debug!(path = %path.display(), rows = docs.len(), "appended documents");
    Ok(())
}

/// Rows of a collection file plus the first id sequence that is still free.
#[derive(Debug, Default)]
pub struct LoadedRows {
    pub rows: Vec<StoredRow>,
    /// Never below the number of non-blank lines, skipped ones included.
    pub next_seq: usize,
}

/// Reads every well-formed row of a collection file.
///
/// A missing file is an empty collection.
///
/// # Errors
/// - [`StoreError::Io`] if the file exists but cannot be read.
pub fn read_rows(path: &Path) -> Result<LoadedRows, StoreError> {
    if !path.exists() {
        debug!(path = %path.display(), "collection file absent, starting empty");
        return Ok(LoadedRows::default());
    }
    info!("Reading collection JSONL: {:?}", path);

    let reader = BufReader::new(File::open(path)?);
    let mut out = LoadedRows::default();
    let mut lines = 0usize;
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        lines += 1;
        match serde_json::from_str::<StoredRow>(&line) {
            Ok(row) => {
                if let Some(seq) = id_seq(&row.id) {
                    out.next_seq = out.next_seq.max(seq + 1);
                }
                out.rows.push(row);
            }
            Err(e) => warn!("Skipping malformed row on line {}: {}", i + 1, e),
        }
    }
    out.next_seq = out.next_seq.max(lines);

    debug!("Loaded {} stored rows, next id doc_{}", out.rows.len(), out.next_seq);
    Ok(out)
}

/// Sequence number of a `doc_<n>` id.
fn id_seq(id: &str) -> Option<usize> {
    id.strip_prefix("doc_")?.parse().ok()
}
