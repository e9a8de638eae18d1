//! Scoring records.

use std::collections::BTreeMap;

use serde::Serialize;

/// Weight of the content-quality dimension.
pub const CONTENT_WEIGHT: f64 = 0.25;
/// Weight of the legal-compliance dimension.
pub const COMPLIANCE_WEIGHT: f64 = 0.30;
/// Weight of the completeness dimension.
pub const COMPLETENESS_WEIGHT: f64 = 0.25;
/// Weight of the clarity dimension.
pub const CLARITY_WEIGHT: f64 = 0.20;

/// One scoring dimension: a score in `[0, 1]` and the metrics behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub score: f64,
    pub supporting_metrics: BTreeMap<String, f64>,
    /// Why the score is zero/neutral when the input could not be scored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ScoreBreakdown {
    /// Clamps `score` into `[0, 1]`; NaN becomes 0.
    pub fn new(score: f64, supporting_metrics: BTreeMap<String, f64>) -> Self {
        Self {
            score: clamp_unit(score),
            supporting_metrics,
            reason: None,
        }
    }

    /// A fixed score explained by `reason` instead of metrics.
    pub fn fallback(score: f64, reason: impl Into<String>) -> Self {
        Self {
            score: clamp_unit(score),
            supporting_metrics: BTreeMap::new(),
            reason: Some(reason.into()),
        }
    }
}

pub(crate) fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

/// Discrete quality label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    Poor,
    VeryPoor,
}

impl Grade {
    /// Bands: excellent ≥ 0.9, good ≥ 0.75, fair ≥ 0.6, poor ≥ 0.4, else very poor.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 0.9 => Grade::Excellent,
            s if s >= 0.75 => Grade::Good,
            s if s >= 0.6 => Grade::Fair,
            s if s >= 0.4 => Grade::Poor,
            _ => Grade::VeryPoor,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Excellent => "excellent",
            Grade::Good => "good",
            Grade::Fair => "fair",
            Grade::Poor => "poor",
            Grade::VeryPoor => "very_poor",
        }
    }
}

/// Output of [`crate::DocumentScoringEngine::score`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentScore {
    pub content_quality: ScoreBreakdown,
    pub legal_compliance: ScoreBreakdown,
    pub completeness: ScoreBreakdown,
    pub clarity: ScoreBreakdown,
    pub total_score: f64,
    pub grade: Grade,
    pub recommendations: Vec<String>,
}
