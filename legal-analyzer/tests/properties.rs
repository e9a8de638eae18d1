//! Score bounds, grade bands, compliance monotonicity and splitter purity.

use std::sync::Arc;

use legal_analyzer::sections::split_into_sections;
use legal_analyzer::{AnalyzerConfig, ComplianceAnalyzer, DocumentScoringEngine, Grade};
use proptest::prelude::*;
use rag_engine::{DefaultTextAnalyzer, TextAnalyzer};

fn arb_document() -> impl Strategy<Value = String> {
    let pieces = prop::sample::select(vec![
        "第一条 总则", "一、信息收集", "（二）", "1. 范围", "A. 附录", "为了保护个人信息",
        "本隐私政策", "用户同意", "数据处理", "强制同意", "甲方", "乙方应当承担违约责任",
        "例如", "因此", "争议解决", "本协议自签署之日起生效", "天气很好", "",
    ]);
    let seps = prop::sample::select(vec!["。", "\n", "\n\n", "，", "！", " ", ""]);
    proptest::collection::vec((pieces, seps), 0..40)
        .prop_map(|parts| parts.into_iter().map(|(p, s)| format!("{p}{s}")).collect())
}

fn arb_domain() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec!["privacy", "contract", "intellectual_property", "tax", ""])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_dimension_and_total_stay_in_unit_range(text in arb_document(), domain in arb_domain()) {
        let engine = DocumentScoringEngine::new(Arc::new(AnalyzerConfig::default()));
        let tokens = DefaultTextAnalyzer::default().tokenize(&text);
        let s = engine.score(&text, domain, &tokens);
        for d in [&s.content_quality, &s.legal_compliance, &s.completeness, &s.clarity] {
            prop_assert!((0.0..=1.0).contains(&d.score), "{d:?}");
        }
        prop_assert!((0.0..=1.0).contains(&s.total_score));
        prop_assert_eq!(s.grade, Grade::from_score(s.total_score));
        prop_assert!(!s.recommendations.is_empty());
    }

    #[test]
    fn grade_bands_partition_the_unit_interval(score in 0.0f64..=1.0) {
        let bands = [(0.9, 1.01), (0.75, 0.9), (0.6, 0.75), (0.4, 0.6), (0.0, 0.4)];
        let hits = bands.iter().filter(|(lo, hi)| score >= *lo && score < *hi).count();
        prop_assert_eq!(hits, 1);
        let expected = match score {
            s if s >= 0.9 => Grade::Excellent,
            s if s >= 0.75 => Grade::Good,
            s if s >= 0.6 => Grade::Fair,
            s if s >= 0.4 => Grade::Poor,
            _ => Grade::VeryPoor,
        };
        prop_assert_eq!(Grade::from_score(score), expected);
    }

    #[test]
    fn compliance_never_drops_when_sections_are_added(
        picks in proptest::collection::vec(any::<bool>(), 8),
        extra in 0usize..8,
    ) {
        let cfg = Arc::new(AnalyzerConfig::default());
        let required = cfg.template_for("privacy").unwrap().required_sections.clone();
        let analyzer = ComplianceAnalyzer::new(cfg);

        let render = |chosen: &[bool]| -> String {
            required
                .iter()
                .zip(chosen)
                .filter(|(_, on)| **on)
                .map(|(r, _)| format!("{}\n说明。\n", r.name))
                .collect()
        };
        let mut more = picks.clone();
        more[extra] = true;

        let base = analyzer.evaluate_compliance(&render(&picks), "privacy");
        let grown = analyzer.evaluate_compliance(&render(&more), "privacy");
        prop_assert!(grown.compliance_score >= base.compliance_score);
        prop_assert!((0.0..=100.0).contains(&grown.compliance_score));
    }

    #[test]
    fn splitting_is_pure_and_total(text in arb_document()) {
        let a = split_into_sections(&text);
        let b = split_into_sections(&text);
        prop_assert_eq!(&a, &b);
        if !text.trim().is_empty() {
            prop_assert!(!a.is_empty());
        }
    }

    #[test]
    fn splitter_survives_arbitrary_input(text in "\\PC{0,200}") {
        let _ = split_into_sections(&text);
    }
}
