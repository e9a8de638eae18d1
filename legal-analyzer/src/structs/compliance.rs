//! Compliance records: sections, assessment, risk and advice.

use serde::Serialize;

/// One heuristic section of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionStatus {
    Present,
    Missing,
}

impl SectionStatus {
    /// Label used in user-facing Chinese text.
    pub fn label(self) -> &'static str {
        match self {
            SectionStatus::Present => "存在",
            SectionStatus::Missing => "缺失或不明显",
        }
    }
}

/// Match result for one required section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionCheck {
    pub name: String,
    pub status: SectionStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "低风险",
            RiskLevel::Medium => "中风险",
            RiskLevel::High => "高风险",
        }
    }
}

/// Output of [`crate::ComplianceAnalyzer::evaluate_compliance`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceAssessment {
    /// Weighted share of matched sections, percent with two decimals.
    pub compliance_score: f64,
    /// One entry per required section, in template order.
    pub found_sections: Vec<SectionCheck>,
    /// Names of unmatched sections, in template order.
    pub missing_sections: Vec<String>,
    pub applicable_laws: Vec<String>,
    pub risk_level: RiskLevel,
}

/// Output of [`crate::ComplianceAnalyzer::generate_professional_advice`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfessionalAdvice {
    pub general_assessment: String,
    pub specific_recommendations: Vec<String>,
    pub legal_references: Vec<String>,
    pub risk_mitigation: Vec<String>,
}
