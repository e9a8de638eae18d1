//! Legal document analysis.
//!
//! Public API:
//! - [`DocumentScoringEngine::score`]: four quality dimensions, weighted total and grade.
//! - [`ComplianceAnalyzer::evaluate_compliance`] / [`ComplianceAnalyzer::generate_professional_advice`]:
//!   required-section matching against a domain template, risk level, advice.
//! - [`sections::split_into_sections`]: best-effort heading-based splitter.
//! - [`KeywordVoter`]: keyword confidence voting and privacy risk.
//! - [`LegalAnalyzer`]: facade owning the components above plus structure analysis
//!   and the optional LLM section assessment.

pub mod assessment;
pub mod compliance;
pub mod errors;
pub mod keywords;
pub mod scoring;
pub mod sections;
pub mod structs;
pub mod structure;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rag_engine::{ErrorTally, TextRewriter};
use tracing::info;

pub use compliance::ComplianceAnalyzer;
pub use errors::analyzer_error::AnalyzerError;
pub use keywords::KeywordVoter;
pub use scoring::DocumentScoringEngine;
pub use structs::analyzer_config::{AnalyzerConfig, RiskThresholds};
pub use structs::compliance::{
    ComplianceAssessment, ProfessionalAdvice, RiskLevel, Section, SectionCheck, SectionStatus,
};
pub use structs::score::{DocumentScore, Grade, ScoreBreakdown};
pub use structs::text_analysis::{
    Hierarchy, KeywordAnalysis, LlmSectionAssessment, SectionQuality, StructureAnalysis,
    TermDensity, TokenCategory,
};

use crate::errors::analyzer_error::Result;

/// Per-section deadline for the LLM assessment.
pub const DEFAULT_ASSESSMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the analysis components; cheap to share behind `Arc`.
pub struct LegalAnalyzer {
    cfg: Arc<AnalyzerConfig>,
    scoring: DocumentScoringEngine,
    compliance: ComplianceAnalyzer,
    keywords: KeywordVoter,
    rewriter: Option<Arc<dyn TextRewriter>>,
    tally: Arc<ErrorTally>,
    assessment_timeout: Duration,
}

impl LegalAnalyzer {
    pub fn new(cfg: Arc<AnalyzerConfig>) -> Self {
        Self {
            scoring: DocumentScoringEngine::new(cfg.clone()),
            compliance: ComplianceAnalyzer::new(cfg.clone()),
            keywords: KeywordVoter::new(cfg.clone()),
            cfg,
            rewriter: None,
            tally: Arc::new(ErrorTally::new()),
            assessment_timeout: DEFAULT_ASSESSMENT_TIMEOUT,
        }
    }

    /// Enables the per-section LLM assessment.
    pub fn with_rewriter(mut self, rewriter: Arc<dyn TextRewriter>) -> Self {
        self.rewriter = Some(rewriter);
        self
    }

    pub fn with_tally(mut self, tally: Arc<ErrorTally>) -> Self {
        self.tally = tally;
        self
    }

    pub fn with_assessment_timeout(mut self, timeout: Duration) -> Self {
        self.assessment_timeout = timeout;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.cfg
    }

    pub fn scoring(&self) -> &DocumentScoringEngine {
        &self.scoring
    }

    pub fn compliance(&self) -> &ComplianceAnalyzer {
        &self.compliance
    }

    pub fn keywords(&self) -> &KeywordVoter {
        &self.keywords
    }

    pub fn tally(&self) -> &Arc<ErrorTally> {
        &self.tally
    }

    /// Paragraphs, clause hierarchy, paragraph quality, term density and,
    /// when a chat capability is configured, LLM section assessments.
    ///
    /// Failed steps are `None` and counted in `error_statistics`.
    pub async fn analyze_legal_structure(&self, text: &str, domain: &str) -> StructureAnalysis {
        let dictionary = &self.cfg.term_dictionary;
        let paras = structure::paragraphs(text);

        let hierarchy = Some(structure::hierarchy(&paras));
        let section_quality = self.step(
            "section_quality",
            paras
                .iter()
                .map(|p| structure::section_quality(p, dictionary))
                .collect::<Result<Vec<_>>>(),
        );
        let term_density = self.step("term_density", structure::term_density(text, dictionary));
        let llm_assessment = match &self.rewriter {
            Some(rw) => Some(self.assess_sections(rw.as_ref(), text, domain).await),
            None => None,
        };

        info!(
            target: "legal_analyzer::structure",
            paragraphs = paras.len(),
            llm = llm_assessment.is_some(),
            "analyze_legal_structure: finished"
        );

        StructureAnalysis {
            paragraph_count: paras.len(),
            hierarchy,
            section_quality,
            term_density,
            llm_assessment,
            error_statistics: self.tally.snapshot(),
        }
    }

    /* --------------------- Internals --------------------- */

    fn step<T>(&self, name: &str, r: Result<T>) -> Option<T> {
        match r {
            Ok(v) => Some(v),
            Err(e) => {
                self.tally.record(name, &e);
                None
            }
        }
    }

    async fn assess_sections(
        &self,
        rewriter: &dyn TextRewriter,
        text: &str,
        domain: &str,
    ) -> BTreeMap<String, LlmSectionAssessment> {
        let mut out = BTreeMap::new();
        let sections = sections::split_into_sections(text);
        for section in sections.iter().take(self.cfg.llm_section_limit) {
            let a = assessment::assess_section(
                rewriter,
                domain,
                section,
                self.assessment_timeout,
                &self.tally,
            )
            .await;
            let mut key = section.title.clone();
            let mut n = 2;
            while out.contains_key(&key) {
                key = format!("{} ({n})", section.title);
                n += 1;
            }
            out.insert(key, a);
        }
        out
    }
}
