//! Response shape of a document analysis.
//!
//! Every section is always serialized; a failed optional step is `null`.

use std::collections::BTreeMap;

use legal_analyzer::{
    ComplianceAssessment, DocumentScore, Grade, KeywordAnalysis, ProfessionalAdvice, RiskLevel,
    StructureAnalysis,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub domain: String,
    pub rag_analysis: RagAnalysis,
    pub legal_analysis: LegalAnalysis,
    /// Empty when no chat capability is configured or the lookup failed.
    pub similar_cases: Vec<SimilarCase>,
    /// Recovered failures of optional steps, by step name.
    pub error_statistics: BTreeMap<String, u64>,
    pub generated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RagAnalysis {
    pub keywords: Vec<String>,
    pub summary: Vec<String>,
    pub refined_summary: Option<String>,
    pub related_context: String,
    pub retrieved: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LegalAnalysis {
    pub scoring_results: Option<DocumentScore>,
    pub compliance: Option<ComplianceReport>,
    pub text_analysis: Option<TextAnalysis>,
    /// Scoring and compliance recommendations, de-duplicated.
    pub recommendations: Vec<String>,
    pub quality_indicators: Option<QualityIndicators>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplianceReport {
    pub assessment: ComplianceAssessment,
    pub advice: ProfessionalAdvice,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextAnalysis {
    pub keyword_analysis: KeywordAnalysis,
    pub structure: StructureAnalysis,
}

/// Headline numbers for dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct QualityIndicators {
    pub total_score: f64,
    pub grade: Grade,
    pub compliance_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub privacy_score: Option<f64>,
    pub is_high_risk: Option<bool>,
}

/// One retrieved case ranked by the chat capability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarCase {
    pub content: String,
    pub relevance_score: f64,
    pub reasoning: String,
}
