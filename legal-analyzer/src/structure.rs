//! Paragraph-level structure heuristics.
//!
//! Each step returns `Result` so the caller can decide whether a
//! degenerate input is fatal; [`crate::LegalAnalyzer`] turns failures into
//! `None` plus an error-tally entry.

use crate::errors::analyzer_error::{AnalyzerError, Result};
use crate::structs::text_analysis::{Hierarchy, SectionQuality, TermDensity};

const SENTENCE_TERMINALS: [char; 3] = ['。', '！', '？'];
const CLAUSE_PUNCTUATION: [char; 7] = ['，', '。', '；', '：', '！', '？', '、'];
const COMPLETENESS_ELEMENTS: [&str; 5] = ["定义", "范围", "权利", "义务", "责任"];
const EXCERPT_CHARS: usize = 30;

/// Blank-line separated, trimmed, non-empty paragraphs.
pub fn paragraphs(text: &str) -> Vec<&str> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Main clauses start with `第`, `1` or `一`; sub-clauses carry a
/// parenthesis or a `1.`/`1、` marker within their first three characters.
pub fn hierarchy(paragraphs: &[&str]) -> Hierarchy {
    let mut h = Hierarchy {
        main_clauses: 0,
        sub_clauses: 0,
    };
    for p in paragraphs {
        if p.starts_with(['第', '1', '一']) {
            h.main_clauses += 1;
        }
        let head: String = p.chars().take(3).collect();
        if head.contains(['(', '（']) || head.contains("1.") || head.contains("1、") {
            h.sub_clauses += 1;
        }
    }
    h
}

/// Occurrences of each dictionary term in `text`, dictionary order, zeros dropped.
pub fn extract_terms(text: &str, dictionary: &[String]) -> Vec<(String, usize)> {
    dictionary
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| (t.clone(), text.matches(t.as_str()).count()))
        .filter(|(_, n)| *n > 0)
        .collect()
}

/// Clarity, completeness and consistency of one paragraph.
///
/// - clarity: `0.4·(1 − min(avg_sentence_chars/100, 1)) + 0.3·min(term_freq·10, 1) + 0.3·min(punct_ratio·5, 1)`
/// - completeness: share of the five core elements mentioned
/// - consistency: `1 − min(cv, 1)` over term counts, 0 with no terms
pub fn section_quality(paragraph: &str, dictionary: &[String]) -> Result<SectionQuality> {
    let sentences: Vec<&str> = paragraph
        .split(SENTENCE_TERMINALS)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if sentences.is_empty() {
        return Err(AnalyzerError::Degenerate {
            step: "section_quality",
            reason: "paragraph has no sentences".into(),
        });
    }

    let chars = paragraph.chars().count() as f64;
    let avg_sentence =
        sentences.iter().map(|s| s.chars().count()).sum::<usize>() as f64 / sentences.len() as f64;
    let terms = extract_terms(paragraph, dictionary);
    let term_total: usize = terms.iter().map(|(_, n)| n).sum();
    let term_freq = term_total as f64 / chars;
    let punct = paragraph
        .chars()
        .filter(|c| CLAUSE_PUNCTUATION.contains(c))
        .count() as f64;
    let punct_ratio = punct / chars;

    let clarity = 0.4 * (1.0 - (avg_sentence / 100.0).min(1.0))
        + 0.3 * (term_freq * 10.0).min(1.0)
        + 0.3 * (punct_ratio * 5.0).min(1.0);
    let completeness = COMPLETENESS_ELEMENTS
        .iter()
        .filter(|e| paragraph.contains(*e))
        .count() as f64
        / COMPLETENESS_ELEMENTS.len() as f64;
    let consistency = consistency(&terms);

    Ok(SectionQuality {
        excerpt: paragraph.chars().take(EXCERPT_CHARS).collect(),
        clarity,
        completeness,
        consistency,
        average: (clarity + completeness + consistency) / 3.0,
    })
}

/// Legal-term density over whitespace-separated words.
pub fn term_density(text: &str, dictionary: &[String]) -> Result<TermDensity> {
    let total_words = text.split_whitespace().count();
    if total_words == 0 {
        return Err(AnalyzerError::Degenerate {
            step: "term_density",
            reason: "text has no words".into(),
        });
    }
    let mut term_distribution = extract_terms(text, dictionary);
    term_distribution.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    let legal_terms_count = term_distribution.iter().map(|(_, n)| n).sum();

    Ok(TermDensity {
        total_words,
        legal_terms_count,
        density: legal_terms_count as f64 / total_words as f64,
        term_distribution,
    })
}

fn consistency(terms: &[(String, usize)]) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }
    let n = terms.len() as f64;
    let mean = terms.iter().map(|(_, c)| *c as f64).sum::<f64>() / n;
    let var = terms
        .iter()
        .map(|(_, c)| (*c as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    1.0 - (var.sqrt() / mean).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict() -> Vec<String> {
        ["个人信息", "义务", "责任", "同意"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn paragraphs_skip_blank_blocks() {
        assert_eq!(paragraphs("甲\n\n\n\n乙\n丙\n\n  "), vec!["甲", "乙\n丙"]);
        assert!(paragraphs("").is_empty());
    }

    #[test]
    fn hierarchy_counts_markers() {
        let h = hierarchy(&["第一条 总则", "一、定义", "（一）个人信息", "1. 范围", "正文"]);
        assert_eq!(h.main_clauses, 3);
        assert_eq!(h.sub_clauses, 2);
    }

    #[test]
    fn equal_term_counts_are_fully_consistent() {
        let q = section_quality("个人信息处理须经同意。", &dict()).unwrap();
        assert_eq!(q.consistency, 1.0);
        assert!((0.0..=1.0).contains(&q.clarity));
        assert_eq!(q.completeness, 0.0);
    }

    #[test]
    fn no_terms_means_zero_consistency() {
        let q = section_quality("今天天气很好。", &dict()).unwrap();
        assert_eq!(q.consistency, 0.0);
    }

    #[test]
    fn punctuation_only_is_degenerate() {
        assert!(matches!(
            section_quality("。。！", &dict()),
            Err(AnalyzerError::Degenerate { step: "section_quality", .. })
        ));
    }

    #[test]
    fn density_distribution_is_sorted() {
        let d = term_density("责任 义务 责任 其他 同意 责任", &dict()).unwrap();
        assert_eq!(d.total_words, 6);
        assert_eq!(d.legal_terms_count, 5);
        assert_eq!(
            d.term_distribution,
            vec![("责任".to_string(), 3), ("义务".to_string(), 1), ("同意".to_string(), 1)]
        );
        assert!(term_density("   ", &dict()).is_err());
    }
}
