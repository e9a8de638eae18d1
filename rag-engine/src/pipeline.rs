//! Query processing and knowledge ingestion.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rag_store::{DocumentMetadata, RetrievedDocument, VectorStore};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RagEngineConfig;
use crate::embed::EmbeddingsProvider;
use crate::errors::{RagEngineError, Result};
use crate::rewrite::{TextRewriter, refine_summary};
use crate::summary::ScoredSummarizer;
use crate::tally::ErrorTally;
use crate::text::TextAnalyzer;

/// Placeholder for a retrieved row whose content is missing or blank.
pub const MISSING_CONTENT: &str = "（文档内容缺失）";
/// Placeholder for a retrieved row without keyword metadata.
pub const NO_KEYWORDS: &str = "（无可用关键词）";

/// Output of [`RagEngine::process_query`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Ranked keywords of the input.
    pub keywords: Vec<String>,
    /// Extractive summary, whole terminated sentences in document order.
    pub summary: Vec<String>,
    /// LLM-refined summary text, when refinement is enabled and succeeded.
    pub refined_summary: Option<String>,
    /// Prefixed text that was embedded for retrieval.
    pub query_text: String,
    /// Numbered context blocks, one per retrieved document.
    pub context: String,
    /// Number of retrieved documents.
    pub retrieved: usize,
    /// Vector the query was retrieved with, reusable for further lookups.
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

/// Statistics of one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub indexed: usize,
    pub skipped: usize,
    pub duration_ms: u128,
}

/// Text processing for a single document, before embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedText {
    pub keywords: Vec<String>,
    pub summary: Vec<String>,
    pub query_text: String,
}

/// The retrieval pipeline: keywords, summary, embedding, search, context.
///
/// All collaborators are injected; the engine holds no global state besides
/// the shared [`ErrorTally`].
pub struct RagEngine {
    cfg: RagEngineConfig,
    analyzer: Arc<dyn TextAnalyzer>,
    summarizer: ScoredSummarizer,
    embedder: Arc<dyn EmbeddingsProvider>,
    rewriter: Option<Arc<dyn TextRewriter>>,
    default_store: Arc<dyn VectorStore>,
    professional_store: Option<Arc<dyn VectorStore>>,
    tally: Arc<ErrorTally>,
}

impl RagEngine {
    pub fn new(
        cfg: RagEngineConfig,
        analyzer: Arc<dyn TextAnalyzer>,
        embedder: Arc<dyn EmbeddingsProvider>,
        default_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            cfg,
            analyzer,
            summarizer: ScoredSummarizer,
            embedder,
            rewriter: None,
            default_store,
            professional_store: None,
            tally: Arc::new(ErrorTally::new()),
        }
    }

    /// Enables the optional summary refinement capability.
    pub fn with_rewriter(mut self, rewriter: Arc<dyn TextRewriter>) -> Self {
        self.rewriter = Some(rewriter);
        self
    }

    /// Sets the collection used when `use_professional_kb` is requested.
    pub fn with_professional_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.professional_store = Some(store);
        self
    }

    /// Shares an existing tally (e.g. with the legal analyzer).
    pub fn with_tally(mut self, tally: Arc<ErrorTally>) -> Self {
        self.tally = tally;
        self
    }

    pub fn config(&self) -> &RagEngineConfig {
        &self.cfg
    }

    pub fn analyzer(&self) -> &Arc<dyn TextAnalyzer> {
        &self.analyzer
    }

    pub fn tally(&self) -> &Arc<ErrorTally> {
        &self.tally
    }

    pub fn default_store(&self) -> &Arc<dyn VectorStore> {
        &self.default_store
    }

    pub fn professional_store(&self) -> Option<&Arc<dyn VectorStore>> {
        self.professional_store.as_ref()
    }

    /// Keywords, summary and retrieval rephrasing of `text` (no I/O).
    pub fn process_text(&self, text: &str) -> ProcessedText {
        ProcessedText {
            keywords: self
                .analyzer
                .extract_keywords(text, self.cfg.keyword_top_k),
            summary: self.summarizer.summarize(
                self.analyzer.as_ref(),
                text,
                self.cfg.summary_sentences,
            ),
            query_text: self.retrieval_query(text),
        }
    }

    /// Instruction prefix + original text.
    pub fn retrieval_query(&self, text: &str) -> String {
        format!("{}{}", self.cfg.query_prefix, text)
    }

    /// Runs the full pipeline for `text`.
    ///
    /// # Errors
    /// Only the embedding step can fail the query ([`RagEngineError::Embedding`],
    /// [`RagEngineError::EmbeddingTimeout`], [`RagEngineError::EmbeddingShape`]).
    /// Retrieval and refinement degrade instead of failing.
    pub async fn process_query(&self, text: &str, use_professional_kb: bool) -> Result<QueryResult> {
        info!(
            target: "rag_engine::query",
            chars = text.chars().count(),
            use_professional_kb,
            "process_query: start"
        );

        let processed = self.process_text(text);
        let embedding = self.embed_one(&processed.query_text).await?;

        let store = self.select_store(use_professional_kb);
        let hits = self.retrieve_with(store, &embedding, self.cfg.retrieval_top_k);
        let context = build_context(&hits);

        let refined_summary = match (&self.rewriter, self.cfg.refine_summary) {
            (Some(rw), true) if !processed.summary.is_empty() => {
                let joined = processed.summary.concat();
                let refined =
                    refine_summary(rw.as_ref(), &joined, self.cfg.refine_timeout, &self.tally).await;
                (refined != joined).then_some(refined)
            }
            _ => None,
        };

        info!(
            target: "rag_engine::query",
            keywords = processed.keywords.len(),
            summary_sentences = processed.summary.len(),
            retrieved = hits.len(),
            collection = store.name(),
            "process_query: finished"
        );

        Ok(QueryResult {
            keywords: processed.keywords,
            summary: processed.summary,
            refined_summary,
            query_text: processed.query_text,
            context,
            retrieved: hits.len(),
            embedding,
        })
    }

    /// Nearest rows to an embedding already computed by [`Self::process_query`].
    ///
    /// Used by enhancements that need raw rows instead of a context string.
    pub fn nearest(
        &self,
        embedding: &[f32],
        use_professional_kb: bool,
        top_k: usize,
    ) -> Vec<RetrievedDocument> {
        let store = self.select_store(use_professional_kb);
        self.retrieve_with(store, embedding, top_k)
    }

    /// Processes, embeds and stores one knowledge document.
    ///
    /// The raw text is stored; its retrieval rephrasing is embedded.
    pub async fn ingest_document(&self, text: &str, source: &str) -> Result<String> {
        let keywords = self.analyzer.extract_keywords(text, self.cfg.keyword_top_k);
        let embedding = self.embed_one(&self.retrieval_query(text)).await?;
        let ids = self.default_store.add(
            &[text.to_string()],
            &[embedding],
            &[DocumentMetadata::new(keywords, source)],
        )?;
        let id = ids.into_iter().next().unwrap_or_default();
        debug!(target: "rag_engine::ingest", source, id = %id, "document ingested");
        Ok(id)
    }

    /// Ingests every readable UTF-8 file of `dir`, in file-name order.
    ///
    /// Unreadable, non-UTF-8 and blank files are skipped with a warning.
    ///
    /// # Errors
    /// [`RagEngineError::Io`] when `dir` cannot be listed; embedding and
    /// store errors abort the run.
    pub async fn ingest_directory(&self, dir: &Path) -> Result<IngestStats> {
        info!(target: "rag_engine::ingest", dir = %dir.display(), "ingest_directory: start");
        let started = Instant::now();

        let mut entries = tokio::fs::read_dir(dir).await.map_err(|source| RagEngineError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut files: Vec<PathBuf> = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|source| RagEngineError::Io {
            path: dir.to_path_buf(),
            source,
        })? {
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let mut stats = IngestStats::default();
        for path in files {
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let text = match tokio::fs::read_to_string(&path).await {
                Ok(t) if !t.trim().is_empty() => t,
                Ok(_) => {
                    warn!(target: "rag_engine::ingest", file = %path.display(), "skipping empty file");
                    stats.skipped += 1;
                    continue;
                }
                Err(e) => {
                    warn!(target: "rag_engine::ingest", file = %path.display(), error = %e, "skipping unreadable file");
                    stats.skipped += 1;
                    continue;
                }
            };
            self.ingest_document(&text, &source).await?;
            stats.indexed += 1;
        }
        stats.duration_ms = started.elapsed().as_millis();

        info!(
            target: "rag_engine::ingest",
            indexed = stats.indexed,
            skipped = stats.skipped,
            duration_ms = stats.duration_ms,
            "ingest_directory: finished"
        );
        Ok(stats)
    }

    /* --------------------- Internals --------------------- */

    fn select_store(&self, use_professional_kb: bool) -> &Arc<dyn VectorStore> {
        if !use_professional_kb {
            return &self.default_store;
        }
        match &self.professional_store {
            Some(store) => store,
            None => {
                warn!(
                    target: "rag_engine::query",
                    fallback = self.default_store.name(),
                    "professional knowledge base not configured; using default collection"
                );
                &self.default_store
            }
        }
    }

    fn retrieve_with(
        &self,
        store: &Arc<dyn VectorStore>,
        embedding: &[f32],
        top_k: usize,
    ) -> Vec<RetrievedDocument> {
        let hits = store.query(embedding, top_k);
        if hits.is_empty() {
            warn!(target: "rag_engine::query", collection = store.name(), "no documents retrieved");
        }
        hits
    }

    async fn embed_one(&self, query_text: &str) -> Result<Vec<f32>> {
        let input = [query_text.to_string()];
        let vectors = tokio::time::timeout(self.cfg.embed_timeout, self.embedder.embed(&input))
            .await
            .map_err(|_| RagEngineError::EmbeddingTimeout(self.cfg.embed_timeout))?
            .map_err(RagEngineError::Embedding)?;

        let usable = vectors.iter().filter(|v| !v.is_empty()).count();
        match vectors.into_iter().next() {
            Some(v) if usable == 1 => Ok(v),
            _ => Err(RagEngineError::EmbeddingShape {
                expected: 1,
                got: usable,
            }),
        }
    }
}

/// Renders retrieved rows as numbered context blocks joined by newlines.
///
/// Blank content and missing keywords are replaced by placeholders so the
/// block count always equals the row count.
pub fn build_context(hits: &[RetrievedDocument]) -> String {
    hits.iter()
        .enumerate()
        .map(|(i, hit)| {
            let content = hit
                .content
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or(MISSING_CONTENT);
            let keywords = hit
                .metadata
                .as_ref()
                .map(|m| m.keywords.join(", "))
                .filter(|k| !k.trim().is_empty())
                .unwrap_or_else(|| NO_KEYWORDS.to_string());
            format!("相关文档 {}: {}\n关键词: {}", i + 1, content, keywords)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(content: Option<&str>, kws: Option<Vec<&str>>) -> RetrievedDocument {
        RetrievedDocument {
            content: content.map(str::to_string),
            metadata: kws.map(|k| {
                DocumentMetadata::new(k.into_iter().map(str::to_string).collect(), "a.txt")
            }),
            distance: Some(0.1),
        }
    }

    #[test]
    fn context_is_numbered_in_retrieval_order() {
        let ctx = build_context(&[
            hit(Some("甲"), Some(vec!["隐私", "数据"])),
            hit(Some("乙"), Some(vec!["合同"])),
        ]);
        assert_eq!(ctx, "相关文档 1: 甲\n关键词: 隐私, 数据\n相关文档 2: 乙\n关键词: 合同");
    }

    #[test]
    fn blank_rows_get_placeholders() {
        let ctx = build_context(&[hit(Some("  "), None), hit(None, Some(vec![]))]);
        assert_eq!(
            ctx,
            format!(
                "相关文档 1: {MISSING_CONTENT}\n关键词: {NO_KEYWORDS}\n相关文档 2: {MISSING_CONTENT}\n关键词: {NO_KEYWORDS}"
            )
        );
    }

    #[test]
    fn no_hits_means_empty_context() {
        assert_eq!(build_context(&[]), "");
    }
}
