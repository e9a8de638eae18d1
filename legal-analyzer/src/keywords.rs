//! Keyword classification, confidence voting and privacy risk.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::structs::analyzer_config::AnalyzerConfig;
use crate::structs::compliance::RiskLevel;
use crate::structs::text_analysis::{KeywordAnalysis, TokenCategory};

/// Weight used for keywords absent from `CONFIDENCE_WEIGHTS`.
pub const DEFAULT_BASE_WEIGHT: f64 = 0.5;

/// Token classification outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenClassification {
    pub categories: Vec<(String, TokenCategory)>,
    /// Occurrences of every keyword (general or legal), by keyword.
    pub keyword_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone)]
pub struct KeywordVoter {
    cfg: Arc<AnalyzerConfig>,
}

impl KeywordVoter {
    pub fn new(cfg: Arc<AnalyzerConfig>) -> Self {
        Self { cfg }
    }

    /// Legal terms win over general keywords when a token is both.
    pub fn analyze_tokens(&self, tokens: &[String]) -> TokenClassification {
        let mut out = TokenClassification::default();
        for token in tokens {
            let category = if self.legal_weight(token).is_some() {
                TokenCategory::LegalKeyword
            } else if self.cfg.keywords.iter().any(|k| k == token) {
                TokenCategory::Keyword
            } else {
                TokenCategory::NonKeyword
            };
            if category != TokenCategory::NonKeyword {
                *out.keyword_counts.entry(token.clone()).or_insert(0) += 1;
            }
            out.categories.push((token.clone(), category));
        }
        out
    }

    /// Returns `(average_confidence, total_keywords)`; `(0, 0)` when empty.
    pub fn confidence_voting(&self, keyword_counts: &BTreeMap<String, usize>) -> (f64, usize) {
        let total: usize = keyword_counts.values().sum();
        if total == 0 {
            return (0.0, 0);
        }
        let weighted: f64 = keyword_counts
            .iter()
            .map(|(kw, &count)| {
                let base = self
                    .cfg
                    .confidence_weights
                    .get(kw)
                    .copied()
                    .unwrap_or(DEFAULT_BASE_WEIGHT);
                let legal = self.legal_weight(kw).unwrap_or(1.0);
                base * legal * count as f64
            })
            .sum();
        (weighted / total as f64, total)
    }

    /// Full keyword analysis of a token stream.
    pub fn keyword_analysis(&self, tokens: &[String], risk: RiskLevel) -> KeywordAnalysis {
        let classified = self.analyze_tokens(tokens);
        let (average_confidence, total_keywords) =
            self.confidence_voting(&classified.keyword_counts);
        let privacy_score = privacy_score(average_confidence, total_keywords);
        let threshold = self.cfg.privacy_threshold;
        let is_high_risk = privacy_score >= threshold || risk == RiskLevel::High;

        debug!(
            target: "legal_analyzer::keywords",
            tokens = tokens.len(),
            total_keywords,
            privacy_score,
            is_high_risk,
            "keyword analysis finished"
        );

        KeywordAnalysis {
            token_count: tokens.len(),
            total_keywords,
            keyword_distribution: classified.keyword_counts,
            average_confidence,
            privacy_score,
            threshold,
            is_high_risk,
        }
    }

    /// Weight of the first domain group (in key order) listing `kw`.
    fn legal_weight(&self, kw: &str) -> Option<f64> {
        self.cfg
            .legal_terms
            .values()
            .find(|g| g.keywords.iter().any(|k| k == kw))
            .map(|g| g.weight)
    }
}

/// `min(confidence · ln(1 + count) · k, 1)` rounded to two decimals, where
/// `k` damps sparse (< 3) and boosts dense (> 20) keyword counts.
pub fn privacy_score(confidence: f64, count: usize) -> f64 {
    let k = match count {
        0..3 => 0.8,
        3..=20 => 1.0,
        _ => 1.2,
    };
    let raw = (confidence * (1.0 + count as f64).ln() * k).clamp(0.0, 1.0);
    (raw * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voter() -> KeywordVoter {
        KeywordVoter::new(Arc::new(AnalyzerConfig::default()))
    }

    fn toks(s: &[&str]) -> Vec<String> {
        s.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn empty_counts_vote_zero() {
        assert_eq!(voter().confidence_voting(&BTreeMap::new()), (0.0, 0));
    }

    #[test]
    fn classification_prefers_legal_terms() {
        let c = voter().analyze_tokens(&toks(&["个人信息", "用户", "今天", "用户"]));
        assert_eq!(c.categories[0].1, TokenCategory::LegalKeyword);
        assert_eq!(c.categories[1].1, TokenCategory::Keyword);
        assert_eq!(c.categories[2].1, TokenCategory::NonKeyword);
        assert_eq!(c.keyword_counts["用户"], 2);
        assert!(!c.keyword_counts.contains_key("今天"));
    }

    #[test]
    fn voting_multiplies_base_and_legal_weights() {
        let counts = BTreeMap::from([("个人信息".to_string(), 2), ("用户".to_string(), 2)]);
        let (avg, total) = voter().confidence_voting(&counts);
        assert_eq!(total, 4);
        // (0.9 * 1.2 * 2 + 0.5 * 1.0 * 2) / 4
        assert!((avg - (2.16 + 1.0) / 4.0).abs() < 1e-12);
    }

    #[test]
    fn privacy_score_bands() {
        assert_eq!(privacy_score(0.0, 10), 0.0);
        assert_eq!(privacy_score(1.0, 100), 1.0);
        // 0.5 * ln(3) * 0.8
        assert_eq!(privacy_score(0.5, 2), 0.44);
        // 0.5 * ln(4) * 1.0
        assert_eq!(privacy_score(0.5, 3), 0.69);
    }

    #[test]
    fn high_risk_follows_compliance_risk() {
        let v = voter();
        let low = v.keyword_analysis(&toks(&["今天"]), RiskLevel::Low);
        assert!(!low.is_high_risk);
        let high = v.keyword_analysis(&toks(&["今天"]), RiskLevel::High);
        assert!(high.is_high_risk);
        assert_eq!(high.threshold, 0.7);
    }

    #[test]
    fn dense_privacy_vocabulary_is_high_risk() {
        let tokens: Vec<String> = std::iter::repeat_n("个人信息".to_string(), 12).collect();
        let a = voter().keyword_analysis(&tokens, RiskLevel::Low);
        assert_eq!(a.total_keywords, 12);
        assert!(a.privacy_score >= 0.7);
        assert!(a.is_high_risk);
    }
}
