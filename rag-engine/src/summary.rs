//! Scored extractive summarization.
//!
//! Each sentence gets `0.4·keyword + 0.2·position + 0.2·length + 0.2·pattern`,
//! smoothed against its predecessor (`0.7·raw + 0.3·prev`). The first
//! sentence of the document is always kept; the rest are the best-scored
//! ones, returned in document order.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::text::{TextAnalyzer, ensure_terminated, split_sentences};

const KEYWORD_WEIGHT: f64 = 0.4;
const POSITION_WEIGHT: f64 = 0.2;
const LENGTH_WEIGHT: f64 = 0.2;
const PATTERN_WEIGHT: f64 = 0.2;
const SMOOTHING_RAW: f64 = 0.7;
const SMOOTHING_PREV: f64 = 0.3;

/// Sentences shorter than this (in chars) are not candidates.
pub const MIN_SENTENCE_CHARS: usize = 4;
const IDEAL_MIN_CHARS: usize = 15;
const IDEAL_MAX_CHARS: usize = 80;
/// Keywords used to weight sentences.
const KEYWORD_POOL: usize = 20;

static LEGAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("应当|必须|不得|有权|权利|义务|责任|承担|禁止|约定|规定|违约|赔偿")
        .expect("legal pattern regex")
});

#[derive(Debug, Default, Clone, Copy)]
pub struct ScoredSummarizer;

impl ScoredSummarizer {
    /// Returns at most `n` terminated sentences in document order.
    ///
    /// Falls back to the analyzer's generic baseline when no sentence
    /// qualifies as a candidate.
    pub fn summarize(&self, analyzer: &dyn TextAnalyzer, text: &str, n: usize) -> Vec<String> {
        if n == 0 {
            return Vec::new();
        }
        let sentences = split_sentences(text);
        if !sentences.iter().any(|s| s.chars().count() >= MIN_SENTENCE_CHARS) {
            debug!(target: "rag_engine::summary", "no scorable sentences; using baseline");
            return analyzer.extractive_summary(text, n);
        }

        let weights: HashMap<String, f64> = analyzer
            .keyword_weights(text, KEYWORD_POOL)
            .into_iter()
            .map(|k| (k.word, k.weight))
            .collect();

        let scored = self.smoothed_scores(analyzer, &sentences, &weights);

        // The opening sentence anchors the summary even when it is short.
        let mut rest: Vec<(usize, f64)> = scored.into_iter().filter(|(i, _)| *i != 0).collect();
        rest.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut picked: Vec<usize> = std::iter::once(0)
            .chain(rest.into_iter().take(n - 1).map(|(i, _)| i))
            .collect();
        picked.sort_unstable();

        picked
            .into_iter()
            .map(|i| ensure_terminated(&sentences[i]))
            .collect()
    }

    /// Smoothed scores of the candidate sentences, keyed by sentence index.
    ///
    /// Too-short sentences score 0 but still carry the chain, so every
    /// score is smoothed against the sentence right before it.
    fn smoothed_scores(
        &self,
        analyzer: &dyn TextAnalyzer,
        sentences: &[String],
        weights: &HashMap<String, f64>,
    ) -> Vec<(usize, f64)> {
        let total = sentences.len() as f64;
        let mut prev = 0.0;
        let mut scored = Vec::with_capacity(sentences.len());
        for (idx, sentence) in sentences.iter().enumerate() {
            let chars = sentence.chars().count();
            let candidate = chars >= MIN_SENTENCE_CHARS;
            let raw = if candidate {
                KEYWORD_WEIGHT * self.keyword_score(analyzer, sentence, weights)
                    + POSITION_WEIGHT * (1.0 - idx as f64 / total)
                    + LENGTH_WEIGHT * length_score(chars)
                    + PATTERN_WEIGHT * self.pattern_score(sentence)
            } else {
                0.0
            };
            let smoothed = SMOOTHING_RAW * raw + SMOOTHING_PREV * prev;
            prev = smoothed;
            if candidate {
                scored.push((idx, smoothed));
            }
        }
        scored
    }

    /// Mean TextRank weight of the sentence's tokens that are ranked keywords.
    fn keyword_score(
        &self,
        analyzer: &dyn TextAnalyzer,
        sentence: &str,
        weights: &HashMap<String, f64>,
    ) -> f64 {
        let tokens = analyzer.tokenize(sentence);
        if tokens.is_empty() {
            return 0.0;
        }
        let sum: f64 = tokens.iter().filter_map(|t| weights.get(t)).sum();
        (sum / tokens.len() as f64 * 3.0).min(1.0)
    }

    fn pattern_score(&self, sentence: &str) -> f64 {
        let hits = LEGAL_PATTERN.find_iter(sentence).count();
        (hits as f64 / 2.0).min(1.0)
    }
}

/// 1.0 inside the ideal band, linearly lower outside of it.
fn length_score(chars: usize) -> f64 {
    if chars < IDEAL_MIN_CHARS {
        chars as f64 / IDEAL_MIN_CHARS as f64
    } else if chars <= IDEAL_MAX_CHARS {
        1.0
    } else {
        (IDEAL_MAX_CHARS as f64 / chars as f64).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::DefaultTextAnalyzer;

    const CONTRACT: &str = "本协议由甲方与乙方订立。\
        天气晴朗适合出行。\
        乙方应当按期支付服务费，逾期须承担违约责任。\
        双方约定争议提交仲裁解决。\
        附件列表见下页。";

    #[test]
    fn first_sentence_is_always_kept() {
        let a = DefaultTextAnalyzer::default();
        let s = ScoredSummarizer.summarize(&a, CONTRACT, 2);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0], "本协议由甲方与乙方订立。");
    }

    #[test]
    fn selected_sentences_follow_document_order() {
        let a = DefaultTextAnalyzer::default();
        let s = ScoredSummarizer.summarize(&a, CONTRACT, 3);
        let pos: Vec<_> = s.iter().map(|x| CONTRACT.find(x.as_str()).unwrap()).collect();
        assert!(pos.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn obligation_sentences_beat_filler() {
        let a = DefaultTextAnalyzer::default();
        let s = ScoredSummarizer.summarize(&a, CONTRACT, 2);
        assert!(s[1].contains("违约责任"));
    }

    #[test]
    fn short_opening_sentence_is_still_kept() {
        let a = DefaultTextAnalyzer::default();
        let s = ScoredSummarizer.summarize(&a, "总则。乙方应当按期支付服务费并承担违约责任。天气晴朗。", 2);
        assert_eq!(s, vec!["总则。", "乙方应当按期支付服务费并承担违约责任。"]);
    }

    #[test]
    fn missing_punctuation_is_synthesized() {
        let a = DefaultTextAnalyzer::default();
        let s = ScoredSummarizer.summarize(&a, "用户应当遵守平台规则", 3);
        assert_eq!(s, vec!["用户应当遵守平台规则。"]);
    }

    #[test]
    fn short_fragments_fall_back_to_baseline() {
        let a = DefaultTextAnalyzer::default();
        let s = ScoredSummarizer.summarize(&a, "好。是。", 3);
        assert_eq!(s, vec!["好。", "是。"]);
    }

    #[test]
    fn smoothing_runs_through_short_sentences() {
        let a = DefaultTextAnalyzer::default();
        let long = ["乙方应当按期支付服务费。", "甲方有权解除本协议。"].map(String::from);
        let with_gap = vec![long[0].clone(), "好。".into(), long[1].clone()];
        let weights = HashMap::new();

        let gap = ScoredSummarizer.smoothed_scores(&a, &with_gap, &weights);
        assert_eq!(gap.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![0, 2]);

        // "好。" carries 0.3 of the first score, so the third sentence sees
        // 0.3·0.3·s0 instead of 0.3·s0.
        let s0 = gap[0].1;
        // No keyword weights, so the raw score is position, length and pattern.
        let raw2 = POSITION_WEIGHT * (1.0 - 2.0 / 3.0)
            + LENGTH_WEIGHT * length_score(long[1].chars().count())
            + PATTERN_WEIGHT * ScoredSummarizer.pattern_score(&long[1]);
        let expected = SMOOTHING_RAW * raw2 + SMOOTHING_PREV * SMOOTHING_PREV * s0;
        assert!((gap[1].1 - expected).abs() < 1e-9, "{} vs {expected}", gap[1].1);
    }

    #[test]
    fn length_score_peaks_in_band() {
        assert!(length_score(5) < 1.0);
        assert_eq!(length_score(40), 1.0);
        assert!(length_score(400) < 0.5);
    }
}
