//! Four-dimension document scoring.
//!
//! | dimension        | weight | inputs                                                     |
//! |------------------|--------|------------------------------------------------------------|
//! | content quality  | 0.25   | essential elements, length curve, professional-term density |
//! | legal compliance | 0.30   | mandatory / recommended / penalty keywords per domain       |
//! | completeness     | 0.25   | structure, depth phrases, topic coverage                    |
//! | clarity          | 0.20   | sentence length, type-token ratio, connector density        |
//!
//! Every dimension returns a score in `[0, 1]`; inputs that cannot be scored
//! yield a fixed score with a `reason` instead of an error.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::structs::analyzer_config::AnalyzerConfig;
use crate::structs::score::{
    CLARITY_WEIGHT, COMPLETENESS_WEIGHT, COMPLIANCE_WEIGHT, CONTENT_WEIGHT, DocumentScore, Grade,
    ScoreBreakdown, clamp_unit,
};

/// Score below which a dimension gets a recommendation.
pub const RECOMMENDATION_THRESHOLD: f64 = 0.6;
/// Content score ceiling for texts shorter than [`SHORT_TEXT_CHARS`].
pub const SHORT_TEXT_CAP: f64 = 0.1;
pub const SHORT_TEXT_CHARS: usize = 100;

/// Neutral compliance score for domains without keyword lists.
pub const NEUTRAL_COMPLIANCE: f64 = 0.5;

const ESSENTIAL_ELEMENTS: &[(&str, &[&str])] = &[
    ("purpose", &["目的", "旨在", "为了", "宗旨"]),
    ("scope", &["范围", "适用于", "适用"]),
    ("provisions", &["规定", "条款", "约定", "如下", "具体"]),
    ("responsibilities", &["责任", "义务", "承担"]),
];

const INTRO_MARKERS: &[&str] = &["引言", "前言", "总则", "为了", "旨在", "本政策", "本协议", "本合同"];
const CONCLUSION_MARKERS: &[&str] = &["附则", "生效", "解释权", "联系我们", "其他", "最终", "签署"];
const TITLE_MARKERS: &[&str] = &["政策", "协议", "合同", "条款", "声明", "规则", "须知"];
const DEPTH_PHRASES: &[&str] = &[
    "具体而言", "例如", "包括但不限于", "特别是", "详见", "是指", "指的是", "即",
];
const KEY_TOPICS: &[&str] = &[
    "定义", "权利", "义务", "责任", "期限", "终止", "争议", "法律",
];
const CONNECTORS: &[&str] = &[
    "因此", "但是", "并且", "或者", "如果", "除非", "同时", "此外", "以及", "然而", "否则", "并",
    "且", "但",
];

const IDEAL_SENTENCE_CHARS: f64 = 20.0;
const IDEAL_TTR: f64 = 0.6;

/// Scores documents against the configured keyword lists.
#[derive(Debug, Clone)]
pub struct DocumentScoringEngine {
    cfg: Arc<AnalyzerConfig>,
    professional_terms: HashSet<String>,
}

impl DocumentScoringEngine {
    pub fn new(cfg: Arc<AnalyzerConfig>) -> Self {
        let professional_terms = cfg.term_dictionary.iter().cloned().collect();
        Self {
            cfg,
            professional_terms,
        }
    }

    /// Scores all four dimensions and aggregates them.
    pub fn score(&self, text: &str, domain: &str, tokens: &[String]) -> DocumentScore {
        let content_quality = self.content_quality(text, tokens);
        let legal_compliance = self.legal_compliance(text, domain);
        let completeness = self.completeness(text);
        let clarity = self.clarity(text, tokens);

        let total_score = aggregate(
            content_quality.score,
            legal_compliance.score,
            completeness.score,
            clarity.score,
        );
        let grade = Grade::from_score(total_score);
        let recommendations = recommendations(&[
            content_quality.score,
            legal_compliance.score,
            completeness.score,
            clarity.score,
        ]);

        debug!(
            target: "legal_analyzer::scoring",
            domain,
            total_score,
            grade = grade.as_str(),
            "document scored"
        );

        DocumentScore {
            content_quality,
            legal_compliance,
            completeness,
            clarity,
            total_score,
            grade,
            recommendations,
        }
    }

    /// Richness 0.5, length 0.3, term density 0.2; capped for short texts.
    pub fn content_quality(&self, text: &str, tokens: &[String]) -> ScoreBreakdown {
        let chars = text.trim().chars().count();
        if chars == 0 {
            return ScoreBreakdown::fallback(0.0, "empty text");
        }

        let found = ESSENTIAL_ELEMENTS
            .iter()
            .filter(|(_, markers)| markers.iter().any(|m| text.contains(m)))
            .count();
        let richness = found as f64 / ESSENTIAL_ELEMENTS.len() as f64;
        let length = length_score(chars);
        let density = if tokens.is_empty() {
            0.0
        } else {
            tokens
                .iter()
                .filter(|t| self.professional_terms.contains(t.as_str()))
                .count() as f64
                / tokens.len() as f64
        };
        let density_score = (density * 5.0).min(1.0);

        let mut score = 0.5 * richness + 0.3 * length + 0.2 * density_score;
        if chars < SHORT_TEXT_CHARS {
            score = score.min(SHORT_TEXT_CAP);
        }

        ScoreBreakdown::new(
            score,
            metrics(&[
                ("content_richness", richness),
                ("length_score", length),
                ("term_density", density),
                ("char_count", chars as f64),
            ]),
        )
    }

    /// `max(0, 0.7·mandatory + 0.3·recommended − min(0.1·penalties, 0.3))`.
    pub fn legal_compliance(&self, text: &str, domain: &str) -> ScoreBreakdown {
        let Some(lists) = self.cfg.compliance_keywords_for(domain) else {
            return ScoreBreakdown::fallback(
                NEUTRAL_COMPLIANCE,
                format!("no compliance keyword lists for domain '{domain}'"),
            );
        };

        let ratio = |list: &[String]| -> f64 {
            if list.is_empty() {
                return 0.0;
            }
            list.iter().filter(|k| text.contains(k.as_str())).count() as f64 / list.len() as f64
        };
        let mandatory = ratio(&lists.mandatory);
        let recommended = ratio(&lists.recommended);
        let penalties = lists
            .penalties
            .iter()
            .filter(|k| text.contains(k.as_str()))
            .count();
        let deduction = (0.1 * penalties as f64).min(0.3);
        let score = (0.7 * mandatory + 0.3 * recommended - deduction).max(0.0);

        ScoreBreakdown::new(
            score,
            metrics(&[
                ("mandatory_score", mandatory),
                ("recommended_score", recommended),
                ("penalty_terms", penalties as f64),
                ("penalty_deduction", deduction),
            ]),
        )
    }

    /// Structure 0.4, depth phrases (capped at 3) 0.3, topic coverage 0.3.
    pub fn completeness(&self, text: &str) -> ScoreBreakdown {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return ScoreBreakdown::fallback(0.0, "empty text");
        }

        let elements = structural_elements(trimmed);
        let structure = elements.iter().filter(|(_, present)| *present).count() as f64
            / elements.len() as f64;

        let depth_hits: usize = DEPTH_PHRASES.iter().map(|p| trimmed.matches(p).count()).sum();
        let depth = depth_hits.min(3) as f64 / 3.0;

        let covered = KEY_TOPICS.iter().filter(|t| trimmed.contains(*t)).count();
        let coverage = covered as f64 / KEY_TOPICS.len() as f64;

        let mut m = metrics(&[
            ("structure_score", structure),
            ("depth_indicators", depth_hits as f64),
            ("topic_coverage", coverage),
        ]);
        for (name, present) in elements {
            m.insert(format!("has_{name}"), if present { 1.0 } else { 0.0 });
        }
        ScoreBreakdown::new(0.4 * structure + 0.3 * depth + 0.3 * coverage, m)
    }

    /// Sentence length 0.4, type-token ratio 0.4, connector density 0.2.
    pub fn clarity(&self, text: &str, tokens: &[String]) -> ScoreBreakdown {
        if tokens.is_empty() {
            return ScoreBreakdown::fallback(0.0, "no tokens to analyze");
        }
        let sentences: Vec<&str> = text
            .split(['。', '！', '？'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        if sentences.is_empty() {
            return ScoreBreakdown::fallback(0.0, "no sentences to analyze");
        }

        let avg_len = sentences.iter().map(|s| s.chars().count()).sum::<usize>() as f64
            / sentences.len() as f64;
        let length = 1.0 - ((avg_len - IDEAL_SENTENCE_CHARS).abs() / (2.0 * IDEAL_SENTENCE_CHARS)).min(1.0);

        let unique: HashSet<&str> = tokens.iter().map(String::as_str).collect();
        let ttr = unique.len() as f64 / tokens.len() as f64;
        let vocabulary = 1.0 - ((ttr - IDEAL_TTR).abs() / IDEAL_TTR).min(1.0);

        let connectors = tokens
            .iter()
            .filter(|t| CONNECTORS.contains(&t.as_str()))
            .count();
        let connector_density = connectors as f64 / sentences.len() as f64;
        let connector = connector_density.min(1.0);

        ScoreBreakdown::new(
            0.4 * length + 0.4 * vocabulary + 0.2 * connector,
            metrics(&[
                ("avg_sentence_length", avg_len),
                ("type_token_ratio", ttr),
                ("connector_density", connector_density),
                ("sentence_count", sentences.len() as f64),
            ]),
        )
    }
}

/// Weighted sum of the four dimension scores.
pub fn aggregate(content: f64, compliance: f64, completeness: f64, clarity: f64) -> f64 {
    clamp_unit(
        content * CONTENT_WEIGHT
            + compliance * COMPLIANCE_WEIGHT
            + completeness * COMPLETENESS_WEIGHT
            + clarity * CLARITY_WEIGHT,
    )
}

/// One message per dimension under the threshold, in dimension order.
///
/// `scores` is `[content, compliance, completeness, clarity]`.
pub fn recommendations(scores: &[f64; 4]) -> Vec<String> {
    const MESSAGES: [&str; 4] = [
        "内容质量有待提高：建议补充文档目的、适用范围、具体条款和责任划分等核心要素。",
        "法律合规性不足：建议补充法律要求的必备条款，并删除可能违规的表述。",
        "文档完整性不足：建议完善标题、引言、正文和结尾结构，并覆盖关键法律主题。",
        "表达清晰度有待提高：建议控制句子长度，规范用词，并合理使用连接词。",
    ];
    let out: Vec<String> = scores
        .iter()
        .zip(MESSAGES)
        .filter(|(s, _)| **s < RECOMMENDATION_THRESHOLD)
        .map(|(_, m)| m.to_string())
        .collect();
    if out.is_empty() {
        vec!["文档质量良好，建议保持当前水平。".to_string()]
    } else {
        out
    }
}

/// Peaks at 500–2000 chars; short texts score low, long texts are penalized.
fn length_score(chars: usize) -> f64 {
    let c = chars as f64;
    match chars {
        0..100 => 0.3 * c / 100.0,
        100..500 => 0.5 + 0.5 * (c - 100.0) / 400.0,
        500..=2000 => 1.0,
        2001..=5000 => 1.0 - 0.3 * (c - 2000.0) / 3000.0,
        _ => (0.7 - (c - 5000.0) / 20000.0).max(0.3),
    }
}

fn structural_elements(text: &str) -> [(&'static str, bool); 4] {
    let chars: Vec<char> = text.chars().collect();
    let n = chars.len();
    let head: String = chars[..n.min(200.max(n / 5))].iter().collect();
    let tail: String = chars[n - n.min(200.max(n * 3 / 10))..].iter().collect();

    let first_line = text.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    let has_title = {
        let len = first_line.chars().count();
        (len > 0 && len <= 30 && !first_line.ends_with(['。', '；', ';']))
            || TITLE_MARKERS.iter().any(|m| first_line.contains(m))
    };
    let has_intro = INTRO_MARKERS.iter().any(|m| head.contains(m));
    let sentence_count = text.split(['。', '！', '？', '\n']).filter(|s| !s.trim().is_empty()).count();
    let has_main = sentence_count >= 3;
    let has_conclusion = CONCLUSION_MARKERS.iter().any(|m| tail.contains(m));

    [
        ("title", has_title),
        ("introduction", has_intro),
        ("main_content", has_main),
        ("conclusion", has_conclusion),
    ]
}

fn metrics(items: &[(&str, f64)]) -> BTreeMap<String, f64> {
    items.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> DocumentScoringEngine {
        DocumentScoringEngine::new(Arc::new(AnalyzerConfig::default()))
    }

    fn toks(s: &[&str]) -> Vec<String> {
        s.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn all_mandatory_privacy_terms_give_full_mandatory_credit() {
        let text = "本隐私政策说明个人信息的数据处理方式，处理前须取得用户同意。";
        let b = engine().legal_compliance(text, "privacy");
        assert_eq!(b.supporting_metrics["mandatory_score"], 1.0);
        assert_eq!(b.supporting_metrics["penalty_deduction"], 0.0);
        assert!(b.score >= 0.7);
    }

    #[test]
    fn penalties_are_capped() {
        let text = "强制同意 默认同意 永久保存 不承担任何责任 个人信息";
        let b = engine().legal_compliance(text, "privacy");
        assert_eq!(b.supporting_metrics["penalty_terms"], 4.0);
        assert!((b.supporting_metrics["penalty_deduction"] - 0.3).abs() < 1e-12);
        assert!(b.score >= 0.0);
    }

    #[test]
    fn unknown_domain_is_neutral() {
        let b = engine().legal_compliance("任意", "tax");
        assert_eq!(b.score, NEUTRAL_COMPLIANCE);
        assert!(b.reason.is_some());
    }

    #[test]
    fn short_text_content_is_capped() {
        let text = "为了明确适用范围，本规定约定双方责任与义务。目的清楚，范围明确。";
        assert!(text.chars().count() < SHORT_TEXT_CHARS);
        let tokens = toks(&["目的", "范围", "规定", "责任", "义务"]);
        let b = engine().content_quality(text, &tokens);
        assert!(b.score <= SHORT_TEXT_CAP);
        assert_eq!(b.supporting_metrics["content_richness"], 1.0);
    }

    #[test]
    fn empty_input_scores_zero_with_reasons() {
        let s = engine().score("", "privacy", &[]);
        assert_eq!(s.content_quality.score, 0.0);
        assert_eq!(s.completeness.score, 0.0);
        assert_eq!(s.clarity.score, 0.0);
        assert!(s.clarity.reason.is_some());
        assert!((0.0..=1.0).contains(&s.total_score));
        assert_eq!(s.grade, Grade::from_score(s.total_score));
    }

    #[test]
    fn clarity_without_sentences_has_reason() {
        let b = engine().clarity("。。。", &toks(&["甲"]));
        assert_eq!(b.score, 0.0);
        assert_eq!(b.reason.as_deref(), Some("no sentences to analyze"));
    }

    #[test]
    fn clarity_prefers_ideal_sentences() {
        let good = "甲方应当在合同签订后七日内支付全部费用。乙方收到费用后应当及时开具发票。";
        let tokens = toks(&["甲方", "应当", "合同", "签订", "七日", "支付", "费用", "乙方", "收到", "开具", "发票", "并且"]);
        let b = engine().clarity(good, &tokens);
        assert!(b.score > 0.55, "{b:?}");
    }

    #[test]
    fn length_curve_shape() {
        assert!(length_score(30) < length_score(300));
        assert_eq!(length_score(1000), 1.0);
        assert!(length_score(6000) < length_score(1000));
        assert!(length_score(100_000) >= 0.3);
    }

    #[test]
    fn recommendation_priority_and_default() {
        let r = recommendations(&[0.1, 0.9, 0.5, 0.2]);
        assert_eq!(r.len(), 3);
        assert!(r[0].starts_with("内容质量"));
        assert!(r[1].starts_with("文档完整性"));
        assert!(r[2].starts_with("表达清晰度"));
        assert_eq!(recommendations(&[0.9; 4]), vec!["文档质量良好，建议保持当前水平。"]);
    }

    #[test]
    fn aggregate_is_weighted() {
        assert_eq!(aggregate(1.0, 1.0, 1.0, 1.0), 1.0);
        assert!((aggregate(1.0, 0.0, 0.0, 0.0) - 0.25).abs() < 1e-12);
        assert!((aggregate(0.0, 1.0, 0.0, 0.0) - 0.30).abs() < 1e-12);
    }
}
