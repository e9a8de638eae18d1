//! File-backed collection with exact cosine search.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, error, info, trace, warn};

use crate::distance::cosine_distance;
use crate::errors::StoreError;
use crate::io_jsonl::{LoadedRows, StoredRow, append_documents, read_rows};
use crate::record::{Document, DocumentMetadata, QueryColumns, RetrievedDocument};
use crate::VectorStore;

/// One collection: an in-memory index mirrored to an append-only JSONL file.
///
/// Reads take a shared lock; `add` takes the write lock for the whole
/// persist-then-publish sequence, so id assignment always sees a consistent count.
#[derive(Debug)]
pub struct LocalVectorStore {
    name: String,
    path: Option<PathBuf>,
    rows: RwLock<LoadedRows>,
}

impl LocalVectorStore {
    /// Opens (or lazily creates) the collection stored at `path`.
    ///
    /// # Errors
    /// [`StoreError::Io`] if an existing file cannot be read.
    pub fn open(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let name = name.into();
        let path = path.as_ref().to_path_buf();
        let rows = read_rows(&path)?;
        info!(
            collection = %name,
            documents = rows.rows.len(),
            next_id = rows.next_seq,
            path = %path.display(),
            "collection opened"
        );
        Ok(Self {
            name,
            path: Some(path),
            rows: RwLock::new(rows),
        })
    }

    /// Volatile collection without a backing file.
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            rows: RwLock::new(LoadedRows::default()),
        }
    }

    fn search(&self, embedding: &[f32], top_k: usize) -> Result<QueryColumns, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Poisoned(self.name.clone()))?;

        let mut scored: Vec<(f32, &StoredRow)> = Vec::with_capacity(rows.rows.len());
        for row in rows.rows.iter() {
            if row.embedding.len() != embedding.len() {
                warn!(
                    collection = %self.name,
                    id = %row.id,
                    got = row.embedding.len(),
                    want = embedding.len(),
                    "skipping row with mismatched dimension"
                );
                continue;
            }
            scored.push((cosine_distance(embedding, &row.embedding), row));
        }
        // Stable sort: equal distances keep insertion (id) order.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(top_k);

        let mut cols = QueryColumns::default();
        for (distance, row) in scored {
            cols.documents.push(row.content.clone());
            cols.metadatas.push(row.decode_metadata());
            cols.distances.push(Some(distance));
        }
        Ok(cols)
    }
}

impl VectorStore for LocalVectorStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn add(
        &self,
        documents: &[String],
        embeddings: &[Vec<f32>],
        metadata: &[DocumentMetadata],
    ) -> Result<Vec<String>, StoreError> {
        if documents.is_empty() {
            warn!(collection = %self.name, "add called with no documents; nothing stored");
            return Ok(Vec::new());
        }
        if documents.len() != embeddings.len() || documents.len() != metadata.len() {
            return Err(StoreError::LengthMismatch {
                documents: documents.len(),
                embeddings: embeddings.len(),
                metadata: metadata.len(),
            });
        }

        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::Poisoned(self.name.clone()))?;

        let dim = rows
            .rows
            .first()
            .map(|r| r.embedding.len())
            .unwrap_or_else(|| embeddings[0].len());
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dim) {
            return Err(StoreError::VectorSizeMismatch {
                got: bad.len(),
                want: dim,
            });
        }

        // Lines skipped at load time keep their ids reserved.
        let start = rows.next_seq;
        let docs: Vec<Document> = documents
            .iter()
            .zip(embeddings)
            .zip(metadata)
            .enumerate()
            .map(|(i, ((content, embedding), meta))| Document {
                id: format!("doc_{}", start + i),
                content: content.clone(),
                embedding: embedding.clone(),
                metadata: meta.clone(),
            })
            .collect();

        if let Some(path) = &self.path {
            append_documents(path, &docs)?;
        }

        let ids: Vec<String> = docs.iter().map(|d| d.id.clone()).collect();
        rows.next_seq = start + docs.len();
        rows.rows.extend(docs.into_iter().map(StoredRow::from));
        debug!(collection = %self.name, added = ids.len(), total = rows.rows.len(), "documents added");
        Ok(ids)
    }

    fn query(&self, embedding: &[f32], top_k: usize) -> Vec<RetrievedDocument> {
        trace!(collection = %self.name, top_k, "query");
        if top_k == 0 {
            return Vec::new();
        }
        match self.search(embedding, top_k) {
            Ok(cols) => {
                let hits = cols.into_rows();
                if hits.is_empty() {
                    info!(collection = %self.name, "query returned no documents");
                }
                hits
            }
            Err(e) => {
                error!(collection = %self.name, error = %e, "query failed; returning no results");
                Vec::new()
            }
        }
    }

    fn count(&self) -> usize {
        match self.rows.read() {
            Ok(rows) => rows.rows.len(),
            Err(_) => {
                error!(collection = %self.name, "lock poisoned while counting");
                0
            }
        }
    }
}
