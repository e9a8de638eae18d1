//! Required-section matching, risk classification and professional advice.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::sections::split_into_sections;
use crate::structs::analyzer_config::{AnalyzerConfig, RiskThresholds};
use crate::structs::compliance::{
    ComplianceAssessment, ProfessionalAdvice, RiskLevel, SectionCheck, SectionStatus,
};

/// Template-driven compliance checks for one configured set of domains.
#[derive(Debug, Clone)]
pub struct ComplianceAnalyzer {
    cfg: Arc<AnalyzerConfig>,
}

impl ComplianceAnalyzer {
    pub fn new(cfg: Arc<AnalyzerConfig>) -> Self {
        Self { cfg }
    }

    /// Matches the domain template's required sections against `text`.
    ///
    /// A section is present when its name occurs in a found section title,
    /// one of its keywords occurs in a found section's content, or one of its
    /// keywords occurs anywhere in `text` (all case-insensitive). Unknown
    /// domains have no required sections and score 0.
    pub fn evaluate_compliance(&self, text: &str, domain: &str) -> ComplianceAssessment {
        let required = self
            .cfg
            .template_for(domain)
            .map(|t| t.required_sections.as_slice())
            .unwrap_or(&[]);

        let sections: Vec<(String, String)> = split_into_sections(text)
            .into_iter()
            .map(|s| (s.title.to_lowercase(), s.content.to_lowercase()))
            .collect();
        let whole = text.to_lowercase();

        let mut found_sections = Vec::with_capacity(required.len());
        let mut missing_sections = Vec::new();
        let mut matched_weight = 0.0;
        let mut max_weight = 0.0;

        for req in required {
            max_weight += req.weight;
            let name = req.name.to_lowercase();
            let keywords: Vec<String> = req.keywords.iter().map(|k| k.to_lowercase()).collect();

            let in_sections = sections.iter().any(|(title, content)| {
                title.contains(&name) || keywords.iter().any(|k| content.contains(k.as_str()))
            });
            let present = in_sections || keywords.iter().any(|k| whole.contains(k.as_str()));

            let status = if present {
                matched_weight += req.weight;
                SectionStatus::Present
            } else {
                missing_sections.push(req.name.clone());
                SectionStatus::Missing
            };
            found_sections.push(SectionCheck {
                name: req.name.clone(),
                status,
            });
        }

        let ratio = if max_weight > 0.0 {
            matched_weight / max_weight
        } else {
            0.0
        };
        let compliance_score = round2(ratio * 100.0);
        let risk_level = assess_risk_level(compliance_score, self.cfg.risk_thresholds);

        debug!(
            target: "legal_analyzer::compliance",
            domain,
            compliance_score,
            missing = missing_sections.len(),
            risk = risk_level.label(),
            "compliance evaluated"
        );

        ComplianceAssessment {
            compliance_score,
            found_sections,
            missing_sections,
            applicable_laws: self.cfg.laws_for(domain).to_vec(),
            risk_level,
        }
    }

    /// Deterministic advice derived from an assessment.
    pub fn generate_professional_advice(
        &self,
        assessment: &ComplianceAssessment,
        domain: &str,
    ) -> ProfessionalAdvice {
        ProfessionalAdvice {
            general_assessment: general_assessment(assessment.compliance_score).to_string(),
            specific_recommendations: self.specific_recommendations(assessment, domain),
            legal_references: legal_references(assessment),
            risk_mitigation: risk_mitigation(assessment),
        }
    }

    fn specific_recommendations(&self, a: &ComplianceAssessment, domain: &str) -> Vec<String> {
        let mut out = Vec::new();
        if !a.missing_sections.is_empty() {
            out.push(format!(
                "**关键章节缺失或不明确**：建议补充或明确以下章节：{}。",
                a.missing_sections.join(", ")
            ));
            if let Some(tpl) = self.cfg.template_for(domain) {
                for req in &tpl.required_sections {
                    if let Some(desc) = &req.description {
                        if a.missing_sections.contains(&req.name) {
                            out.push(format!("  - 关于 '{}'：{}", req.name, desc));
                        }
                    }
                }
            }
        }
        match a.risk_level {
            RiskLevel::High => out.push(
                "**高风险提示**：文档存在严重合规问题，可能导致法律风险，请立即组织专业人士进行全面审查和修订。"
                    .into(),
            ),
            RiskLevel::Medium => out.push(
                "**中风险提示**：文档存在一定的合规问题，建议尽快进行审查和修改，以降低潜在风险。"
                    .into(),
            ),
            RiskLevel::Low => {}
        }
        out
    }
}

/// `score < high` → high, `score < medium` → medium, else low.
///
/// Thresholds are upper bounds on a descending risk scale, on the same
/// 0–100 scale as the score.
pub fn assess_risk_level(compliance_score: f64, t: RiskThresholds) -> RiskLevel {
    if compliance_score < t.high {
        RiskLevel::High
    } else if compliance_score < t.medium {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn general_assessment(compliance_score: f64) -> &'static str {
    if compliance_score >= 80.0 {
        "文档整体合规性良好。"
    } else if compliance_score >= 60.0 {
        "文档合规性一般，建议关注缺失或不明确的章节，并进行相应修改。"
    } else if compliance_score >= 40.0 {
        "文档合规性存在较多问题，缺失关键章节或内容不明确，建议进行全面修订。"
    } else {
        "文档合规性存在严重问题，风险较高，强烈建议进行彻底的审查和全面修订。"
    }
}

/// Applicable laws plus a risk reminder; de-duplicated, first-seen order.
fn legal_references(a: &ComplianceAssessment) -> Vec<String> {
    let mut refs: Vec<String> = a.applicable_laws.clone();
    match a.risk_level {
        RiskLevel::High => refs.push(
            "鉴于评估结果为高风险，强烈建议咨询法律专业人士，确保符合所有相关法律法规。".into(),
        ),
        RiskLevel::Medium => refs.push("建议查阅相关法律条文，确保文档内容合规。".into()),
        RiskLevel::Low => {}
    }
    if refs.is_empty() {
        refs.push("暂无具体的法律参考条文可提供，建议进行通用法律咨询。".into());
    }
    let mut seen = HashSet::new();
    refs.retain(|r| seen.insert(r.clone()));
    refs
}

fn risk_mitigation(a: &ComplianceAssessment) -> Vec<String> {
    let mut out: Vec<String> = match a.risk_level {
        RiskLevel::High => vec![
            "建议立即进行全面的法律审查，特别关注缺失的关键章节和条款。".into(),
            "考虑暂停相关业务活动，直到确保所有法律合规要求均已满足。".into(),
        ],
        RiskLevel::Medium => vec![
            "建议尽快补充缺失的章节，并对照法律要求进行全面检查。".into(),
            "考虑对现有合同或政策进行修订，以降低潜在的法律风险。".into(),
        ],
        RiskLevel::Low => vec!["保持现有的合规措施，并定期关注相关法律法规的变化。".into()],
    };
    if !a.missing_sections.is_empty() {
        out.push("以下章节缺失，建议尽快补充：".into());
        out.extend(a.missing_sections.iter().map(|s| format!("  - {s}")));
    }
    out
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> ComplianceAnalyzer {
        ComplianceAnalyzer::new(Arc::new(AnalyzerConfig::default()))
    }

    const FULL_POLICY: &str = "隐私政策\n\
        一、信息收集\n我们收集您的姓名和电话。\n\
        二、信息使用\n收集的信息仅用于提供服务。\n\
        三、信息共享与披露\n未经同意不会向第三方共享。\n\
        四、信息存储与安全\n我们采用加密等安全措施，保存期限为三年。\n\
        五、用户权利\n您可以查阅、更正、删除个人信息。\n\
        六、未成年人保护\n未满十四周岁的儿童须监护人同意。\n\
        七、政策更新\n本政策可能修订。\n\
        八、联系我们\n投诉邮箱：privacy@example.com";

    #[test]
    fn complete_policy_is_low_risk() {
        let a = analyzer().evaluate_compliance(FULL_POLICY, "privacy");
        assert_eq!(a.compliance_score, 100.0);
        assert!(a.missing_sections.is_empty());
        assert_eq!(a.risk_level, RiskLevel::Low);
        assert_eq!(a.found_sections.len(), 8);
        assert!(a.found_sections.iter().all(|s| s.status == SectionStatus::Present));
        assert_eq!(a.applicable_laws.len(), 3);
    }

    #[test]
    fn weighted_score_and_missing_order() {
        // Only 信息收集 (1.5) and 用户权利 (1.5) out of a total weight of 7.5.
        let a = analyzer().evaluate_compliance("我们会收集信息。您可以删除数据。", "privacy");
        assert_eq!(a.compliance_score, 40.0);
        assert_eq!(a.risk_level, RiskLevel::High);
        assert_eq!(
            a.missing_sections,
            vec!["信息使用", "信息共享与披露", "信息存储与安全", "未成年人保护", "政策更新", "联系我们"]
        );
    }

    #[test]
    fn unknown_domain_scores_zero_without_panicking() {
        let a = analyzer().evaluate_compliance("任意文本", "tax");
        assert_eq!(a.compliance_score, 0.0);
        assert!(a.found_sections.is_empty());
        assert_eq!(a.risk_level, RiskLevel::High);
        assert!(a.applicable_laws.is_empty());
    }

    #[test]
    fn title_match_counts_even_without_keywords() {
        let a = analyzer().evaluate_compliance("1. 违约责任\n另行协商。", "contract");
        let check = a.found_sections.iter().find(|c| c.name == "违约责任").unwrap();
        assert_eq!(check.status, SectionStatus::Present);
    }

    #[test]
    fn risk_thresholds_are_strict_upper_bounds() {
        let t = RiskThresholds::default();
        assert_eq!(assess_risk_level(49.99, t), RiskLevel::High);
        assert_eq!(assess_risk_level(50.0, t), RiskLevel::Medium);
        assert_eq!(assess_risk_level(74.99, t), RiskLevel::Medium);
        assert_eq!(assess_risk_level(75.0, t), RiskLevel::Low);
    }

    #[test]
    fn general_assessment_bands() {
        assert_eq!(general_assessment(80.0), "文档整体合规性良好。");
        assert!(general_assessment(60.0).starts_with("文档合规性一般"));
        assert!(general_assessment(40.0).starts_with("文档合规性存在较多问题"));
        assert!(general_assessment(39.99).starts_with("文档合规性存在严重问题"));
    }

    #[test]
    fn advice_for_high_risk_lists_missing_sections() {
        let an = analyzer();
        let a = an.evaluate_compliance("我们会收集信息。", "privacy");
        let advice = an.generate_professional_advice(&a, "privacy");

        assert!(advice.specific_recommendations[0].starts_with("**关键章节缺失或不明确**"));
        assert!(advice
            .specific_recommendations
            .iter()
            .any(|r| r.starts_with("  - 关于 '信息使用'：")));
        // 政策更新 has no description.
        assert!(!advice.specific_recommendations.iter().any(|r| r.contains("'政策更新'")));
        assert!(advice.specific_recommendations.last().unwrap().starts_with("**高风险提示**"));

        assert_eq!(advice.risk_mitigation.len(), 2 + 1 + a.missing_sections.len());
        assert_eq!(advice.risk_mitigation[2], "以下章节缺失，建议尽快补充：");
        assert_eq!(advice.risk_mitigation[3], "  - 信息使用");

        assert_eq!(advice.legal_references.len(), 4);
        assert!(advice.legal_references[3].starts_with("鉴于评估结果为高风险"));
    }

    #[test]
    fn low_risk_advice_is_short() {
        let an = analyzer();
        let a = an.evaluate_compliance(FULL_POLICY, "privacy");
        let advice = an.generate_professional_advice(&a, "privacy");
        assert!(advice.specific_recommendations.is_empty());
        assert_eq!(
            advice.risk_mitigation,
            vec!["保持现有的合规措施，并定期关注相关法律法规的变化。"]
        );
    }

    #[test]
    fn references_fall_back_and_dedupe() {
        let mut a = analyzer().evaluate_compliance(FULL_POLICY, "privacy");
        a.applicable_laws = vec!["甲法".into(), "甲法".into()];
        assert_eq!(legal_references(&a), vec!["甲法"]);
        a.applicable_laws.clear();
        assert_eq!(
            legal_references(&a),
            vec!["暂无具体的法律参考条文可提供，建议进行通用法律咨询。"]
        );
    }
}
