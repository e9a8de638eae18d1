use std::path::PathBuf;
use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use ai_llm_service::config::default_config::{config_embedding, config_rewrite};
use legal_analyzer::{AnalyzerConfig, LegalAnalyzer};
use rag_engine::{DefaultTextAnalyzer, ErrorTally, RagEngine, RagEngineConfig};
use rag_store::{LocalVectorStore, StoreConfig, VectorStore};
use tracing::info;

use crate::analysis::IntegratedAnalysis;
use crate::error_handler::AppError;

/// Shared state for all HTTP handlers.
pub struct AppState {
    pub analysis: IntegratedAnalysis,
    /// Directory ingested by `POST /knowledge/ingest`.
    pub knowledge_dir: Option<PathBuf>,
}

impl AppState {
    pub fn new(analysis: IntegratedAnalysis, knowledge_dir: Option<PathBuf>) -> Self {
        Self {
            analysis,
            knowledge_dir,
        }
    }

    /// Wires every component from environment variables.
    ///
    /// Fails fast on any configuration error; nothing is retried.
    pub fn from_env() -> Result<Self, AppError> {
        let store_cfg = StoreConfig::from_env()?;
        let rag_cfg = RagEngineConfig::from_env()?;
        let analyzer_cfg = Arc::new(AnalyzerConfig::from_env()?);

        let profiles = Arc::new(LlmServiceProfiles::new(config_rewrite()?, config_embedding()?));
        let tally = Arc::new(ErrorTally::new());

        let default_store: Arc<dyn VectorStore> = Arc::new(LocalVectorStore::open(
            store_cfg.collection.clone(),
            store_cfg.collection_path(&store_cfg.collection),
        )?);

        let mut rag = RagEngine::new(
            rag_cfg,
            Arc::new(text_analyzer(&analyzer_cfg)),
            profiles.clone(),
            default_store,
        )
        .with_rewriter(profiles.clone())
        .with_tally(tally.clone());
        if let Some(name) = &store_cfg.professional_collection {
            let pro = LocalVectorStore::open(name.clone(), store_cfg.collection_path(name))?;
            rag = rag.with_professional_store(Arc::new(pro));
        }

        let legal = LegalAnalyzer::new(analyzer_cfg)
            .with_rewriter(profiles.clone())
            .with_tally(tally.clone());

        let analysis = IntegratedAnalysis::new(Arc::new(rag), Arc::new(legal), tally)
            .with_chat(profiles);

        let knowledge_dir = std::env::var("KNOWLEDGE_BASE_DIR")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);

        info!(
            target: "api::state",
            store_dir = %store_cfg.root_dir.display(),
            collection = %store_cfg.collection,
            professional = ?store_cfg.professional_collection,
            knowledge_dir = ?knowledge_dir,
            "application state ready"
        );
        Ok(Self::new(analysis, knowledge_dir))
    }
}

/// Tokenizer that keeps every configured legal term whole.
pub fn text_analyzer(cfg: &AnalyzerConfig) -> DefaultTextAnalyzer {
    DefaultTextAnalyzer::default().with_terms(cfg.vocabulary())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_engine::TextAnalyzer;

    #[test]
    fn configured_terms_reach_the_tokenizer() {
        let mut cfg = AnalyzerConfig::default();
        cfg.term_dictionary.push("格式条款提示义务".into());

        let text = "经营者应当履行格式条款提示义务。";
        assert!(
            !DefaultTextAnalyzer::default()
                .tokenize(text)
                .contains(&"格式条款提示义务".to_string())
        );
        assert!(text_analyzer(&cfg).tokenize(text).contains(&"格式条款提示义务".to_string()));
    }
}
