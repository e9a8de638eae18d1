//! Integrated document analysis: RAG retrieval and legal analysis run
//! concurrently and are merged into one [`AnalysisReport`].

pub mod report;
pub mod similar_cases;

use std::sync::Arc;
use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use legal_analyzer::{LegalAnalyzer, RiskLevel};
use rag_engine::{ErrorTally, QueryResult, RagEngine, RagEngineError, TextRewriter};
use tracing::info;

use crate::analysis::report::{
    AnalysisReport, ComplianceReport, LegalAnalysis, QualityIndicators, RagAnalysis, SimilarCase,
    TextAnalysis,
};
use crate::analysis::similar_cases::find_similar_cases;
use crate::error_handler::AppResult;

/// Tally key used when a domain has no compliance template.
pub const COMPLIANCE_STEP: &str = "compliance";

pub const DEFAULT_DOMAIN: &str = "privacy";

/// Owns the RAG engine and the legal analyzer and merges their outputs.
pub struct IntegratedAnalysis {
    rag: Arc<RagEngine>,
    legal: Arc<LegalAnalyzer>,
    chat: Option<Arc<dyn TextRewriter>>,
    tally: Arc<ErrorTally>,
    chat_timeout: Duration,
}

impl IntegratedAnalysis {
    /// Both components should share `tally` so the report shows every
    /// recovered failure.
    pub fn new(rag: Arc<RagEngine>, legal: Arc<LegalAnalyzer>, tally: Arc<ErrorTally>) -> Self {
        let chat_timeout = rag.config().refine_timeout;
        Self {
            rag,
            legal,
            chat: None,
            tally,
            chat_timeout,
        }
    }

    /// Enables the similar-case lookup.
    pub fn with_chat(mut self, chat: Arc<dyn TextRewriter>) -> Self {
        self.chat = Some(chat);
        self
    }

    pub fn rag(&self) -> &RagEngine {
        &self.rag
    }

    pub fn tally(&self) -> &ErrorTally {
        &self.tally
    }

    /// Runs retrieval and legal analysis concurrently; the optional
    /// similar-case lookup follows retrieval and reuses its embedding.
    ///
    /// # Errors
    /// Only a failed RAG branch (embedding) fails the analysis; legal steps
    /// degrade to `null`.
    pub async fn analyze_document(
        &self,
        text: &str,
        domain: &str,
        use_professional_kb: bool,
    ) -> AppResult<AnalysisReport> {
        info!(
            target: "api::analysis",
            chars = text.chars().count(),
            domain,
            use_professional_kb,
            "analyze_document: start"
        );

        let ((rag, similar_cases), legal) = tokio::join!(
            self.rag_branch(text, use_professional_kb),
            self.legal_branch(text, domain),
        );
        let rag = rag?;

        let report = AnalysisReport {
            domain: domain.to_string(),
            rag_analysis: RagAnalysis {
                keywords: rag.keywords,
                summary: rag.summary,
                refined_summary: rag.refined_summary,
                related_context: rag.context,
                retrieved: rag.retrieved,
            },
            legal_analysis: legal,
            similar_cases,
            error_statistics: self.tally.snapshot(),
            generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        info!(
            target: "api::analysis",
            retrieved = report.rag_analysis.retrieved,
            scored = report.legal_analysis.scoring_results.is_some(),
            similar = report.similar_cases.len(),
            "analyze_document: finished"
        );
        Ok(report)
    }

    /* --------------------- Internals --------------------- */

    async fn legal_branch(&self, text: &str, domain: &str) -> LegalAnalysis {
        let tokens = self.rag.analyzer().tokenize(text);
        let score = self.legal.scoring().score(text, domain, &tokens);

        let compliance = if self.legal.config().template_for(domain).is_some() {
            let assessment = self.legal.compliance().evaluate_compliance(text, domain);
            let advice = self
                .legal
                .compliance()
                .generate_professional_advice(&assessment, domain);
            Some(ComplianceReport { assessment, advice })
        } else {
            self.tally
                .record(COMPLIANCE_STEP, &format!("no compliance template for domain '{domain}'"));
            None
        };

        let risk = compliance
            .as_ref()
            .map_or(RiskLevel::Low, |c| c.assessment.risk_level);
        let keyword_analysis = self.legal.keywords().keyword_analysis(&tokens, risk);
        let structure = self.legal.analyze_legal_structure(text, domain).await;

        let mut recommendations = score.recommendations.clone();
        if let Some(c) = &compliance {
            recommendations.extend(c.advice.specific_recommendations.iter().cloned());
        }
        dedupe_in_order(&mut recommendations);

        let quality_indicators = QualityIndicators {
            total_score: score.total_score,
            grade: score.grade,
            compliance_score: compliance.as_ref().map(|c| c.assessment.compliance_score),
            risk_level: compliance.as_ref().map(|c| c.assessment.risk_level),
            privacy_score: Some(keyword_analysis.privacy_score),
            is_high_risk: Some(keyword_analysis.is_high_risk),
        };

        LegalAnalysis {
            scoring_results: Some(score),
            compliance,
            text_analysis: Some(TextAnalysis {
                keyword_analysis,
                structure,
            }),
            recommendations,
            quality_indicators: Some(quality_indicators),
        }
    }

    /// RAG pipeline, then the similar-case lookup on the same embedding.
    /// The lookup is skipped when the pipeline failed.
    async fn rag_branch(
        &self,
        text: &str,
        use_professional_kb: bool,
    ) -> (Result<QueryResult, RagEngineError>, Vec<SimilarCase>) {
        let rag = self.rag.process_query(text, use_professional_kb).await;
        let similar = match (&rag, &self.chat) {
            (Ok(query), Some(chat)) => {
                find_similar_cases(
                    &self.rag,
                    chat.as_ref(),
                    text,
                    &query.embedding,
                    self.chat_timeout,
                    &self.tally,
                )
                .await
            }
            _ => Vec::new(),
        };
        (rag, similar)
    }
}

fn dedupe_in_order(items: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    items.retain(|s| seen.insert(s.clone()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let mut v = vec!["a".to_string(), "b".into(), "a".into(), "c".into(), "b".into()];
        dedupe_in_order(&mut v);
        assert_eq!(v, vec!["a", "b", "c"]);
    }
}
