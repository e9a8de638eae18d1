//! Keyword and structure analysis records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenCategory {
    Keyword,
    LegalKeyword,
    NonKeyword,
}

/// Keyword statistics and the derived privacy risk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordAnalysis {
    pub token_count: usize,
    pub total_keywords: usize,
    pub keyword_distribution: BTreeMap<String, usize>,
    pub average_confidence: f64,
    /// Rounded to two decimals.
    pub privacy_score: f64,
    pub threshold: f64,
    pub is_high_risk: bool,
}

/// Main clauses vs. sub-clauses among the paragraphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Hierarchy {
    pub main_clauses: usize,
    pub sub_clauses: usize,
}

/// Heuristic quality of one paragraph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionQuality {
    /// First 30 characters of the paragraph.
    pub excerpt: String,
    pub clarity: f64,
    pub completeness: f64,
    pub consistency: f64,
    pub average: f64,
}

/// Legal-term density over whitespace-separated words.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermDensity {
    pub total_words: usize,
    pub legal_terms_count: usize,
    pub density: f64,
    /// `(term, count)` sorted by count descending, then term.
    pub term_distribution: Vec<(String, usize)>,
}

/// LLM opinion on one section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmSectionAssessment {
    #[serde(default)]
    pub clarity_score: f64,
    #[serde(default)]
    pub completeness_score: f64,
    #[serde(default)]
    pub compliance_score: f64,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Output of [`crate::LegalAnalyzer::analyze_legal_structure`].
///
/// Every step is optional: `None` means it failed and was counted in
/// `error_statistics`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureAnalysis {
    pub paragraph_count: usize,
    pub hierarchy: Option<Hierarchy>,
    pub section_quality: Option<Vec<SectionQuality>>,
    pub term_density: Option<TermDensity>,
    /// Keyed by section title; absent when no chat capability is configured.
    pub llm_assessment: Option<BTreeMap<String, LlmSectionAssessment>>,
    pub error_statistics: BTreeMap<String, u64>,
}
