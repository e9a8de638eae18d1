//! Configuration layer: domain templates, keyword lists, reference laws and
//! risk thresholds.
//!
//! Built-in defaults cover the `privacy`, `contract` and
//! `intellectual_property` domains. A JSON file named by `LEGAL_CONFIG_PATH`
//! may replace any top-level table; keys follow the upper-case layout of
//! legacy `legal_config.json` files (`LEGAL_TEMPLATES`, `REFERENCE_LAWS`, ...).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rag_engine::text::lexicon::LEGAL_TERMS;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::analyzer_error::{AnalyzerError, Result};

/// One section a compliant document of a domain must contain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredSection {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default = "default_section_weight")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_section_weight() -> f64 {
    1.0
}

/// Compliance template of one document type (e.g. `privacy_policy`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainTemplate {
    #[serde(default)]
    pub required_sections: Vec<RequiredSection>,
}

/// Keyword lists used by the legal-compliance scoring dimension.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComplianceKeywords {
    #[serde(default)]
    pub mandatory: Vec<String>,
    #[serde(default)]
    pub recommended: Vec<String>,
    #[serde(default)]
    pub penalties: Vec<String>,
}

/// Domain term group used by keyword confidence voting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegalTermGroup {
    pub keywords: Vec<String>,
    pub weight: f64,
}

/// Percentage thresholds (0–100) for risk classification.
///
/// `score < high` is high risk, `score < medium` is medium risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub high: f64,
    pub medium: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            high: 50.0,
            medium: 75.0,
        }
    }
}

/// Everything the analyzer reads; immutable after startup and shared via `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    #[serde(rename = "LEGAL_TEMPLATES")]
    pub templates: BTreeMap<String, DomainTemplate>,
    #[serde(rename = "COMPLIANCE_KEYWORDS")]
    pub compliance_keywords: BTreeMap<String, ComplianceKeywords>,
    #[serde(rename = "REFERENCE_LAWS")]
    pub reference_laws: BTreeMap<String, Vec<String>>,
    /// Domain term groups; looked up in key order.
    #[serde(rename = "LEGAL_TERMS")]
    pub legal_terms: BTreeMap<String, LegalTermGroup>,
    /// General keywords counted by confidence voting.
    #[serde(rename = "KEYWORDS")]
    pub keywords: Vec<String>,
    /// Per-keyword base weight; absent keywords weigh 0.5.
    #[serde(rename = "CONFIDENCE_WEIGHTS")]
    pub confidence_weights: BTreeMap<String, f64>,
    /// Privacy score at or above which a document is flagged high risk.
    #[serde(rename = "THRESHOLD")]
    pub privacy_threshold: f64,
    #[serde(rename = "RISK_LEVELS")]
    pub risk_thresholds: RiskThresholds,
    /// Dictionary used for term density and term-based quality metrics.
    #[serde(rename = "LEGAL_TERM_DICTIONARY")]
    pub term_dictionary: Vec<String>,
    /// Upper bound on sections sent to the LLM assessment per document.
    #[serde(rename = "LLM_SECTION_LIMIT")]
    pub llm_section_limit: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            templates: default_templates(),
            compliance_keywords: default_compliance_keywords(),
            reference_laws: default_reference_laws(),
            legal_terms: default_legal_terms(),
            keywords: strings(&[
                "隐私", "个人信息", "数据", "同意", "收集", "使用", "共享", "第三方", "安全",
                "删除", "授权", "用户", "权利", "义务", "责任",
            ]),
            confidence_weights: [
                ("敏感个人信息", 1.0),
                ("个人信息", 0.9),
                ("隐私", 0.8),
                ("用户同意", 0.8),
                ("第三方", 0.7),
                ("共享", 0.7),
                ("同意", 0.6),
                ("数据", 0.4),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
            privacy_threshold: 0.7,
            risk_thresholds: RiskThresholds::default(),
            term_dictionary: strings(LEGAL_TERMS),
            llm_section_limit: 8,
        }
    }
}

impl AnalyzerConfig {
    /// Built-in defaults, then the optional JSON override, then env thresholds.
    ///
    /// Environment variables used (all optional):
    /// - `LEGAL_CONFIG_PATH`: JSON file replacing top-level tables
    /// - `RISK_HIGH_THRESHOLD` (default: 50)
    /// - `RISK_MEDIUM_THRESHOLD` (default: 75)
    pub fn from_env() -> Result<Self> {
        let mut cfg = match non_empty_env("LEGAL_CONFIG_PATH") {
            Some(path) => Self::from_json_file(Path::new(&path))?,
            None => Self::default(),
        };
        cfg.risk_thresholds.high = read_env("RISK_HIGH_THRESHOLD", cfg.risk_thresholds.high)?;
        cfg.risk_thresholds.medium =
            read_env("RISK_MEDIUM_THRESHOLD", cfg.risk_thresholds.medium)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Loads an override file; missing tables keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| AnalyzerError::Io {
            path: PathBuf::from(path),
            source,
        })?;
        let cfg: Self = serde_json::from_str(&raw).map_err(|source| AnalyzerError::Json {
            path: PathBuf::from(path),
            source,
        })?;
        info!(
            target: "legal_analyzer::config",
            path = %path.display(),
            templates = cfg.templates.len(),
            "legal config loaded"
        );
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        let RiskThresholds { high, medium } = self.risk_thresholds;
        if !(0.0..=100.0).contains(&high) || !(0.0..=100.0).contains(&medium) {
            return Err(AnalyzerError::InvalidConfig(format!(
                "risk thresholds must be within 0..=100 (high={high}, medium={medium})"
            )));
        }
        if high > medium {
            return Err(AnalyzerError::InvalidConfig(format!(
                "high risk threshold ({high}) must not exceed medium threshold ({medium})"
            )));
        }
        for (key, tpl) in &self.templates {
            if let Some(bad) = tpl
                .required_sections
                .iter()
                .find(|s| s.name.trim().is_empty() || s.weight.is_nan() || s.weight < 0.0)
            {
                return Err(AnalyzerError::InvalidConfig(format!(
                    "template '{key}' has an unnamed or negative-weight section: {bad:?}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.privacy_threshold) {
            return Err(AnalyzerError::InvalidConfig(
                "THRESHOLD must be within 0..=1".into(),
            ));
        }
        Ok(())
    }

    /// Maps a user-facing domain to its template key.
    pub fn template_key(domain: &str) -> &str {
        match domain {
            "privacy" => "privacy_policy",
            "contract" => "service_agreement",
            other => other,
        }
    }

    pub fn template_for(&self, domain: &str) -> Option<&DomainTemplate> {
        self.templates.get(Self::template_key(domain))
    }

    /// Keyword lists for `domain`; template keys are accepted as aliases.
    pub fn compliance_keywords_for(&self, domain: &str) -> Option<&ComplianceKeywords> {
        let key = match domain {
            "privacy_policy" => "privacy",
            "service_agreement" => "contract",
            other => other,
        };
        self.compliance_keywords.get(key)
    }

    /// Every configured term the tokenizer must keep whole: the term
    /// dictionary, the legal-term groups and the general keywords.
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.term_dictionary
            .iter()
            .chain(self.legal_terms.values().flat_map(|g| g.keywords.iter()))
            .chain(self.keywords.iter())
            .map(String::as_str)
    }

    pub fn laws_for(&self, domain: &str) -> &[String] {
        self.reference_laws
            .get(domain)
            .or_else(|| self.reference_laws.get(Self::template_key(domain)))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn read_env<T: FromStr>(key: &str, default: T) -> Result<T> {
    match non_empty_env(key) {
        Some(v) => v.parse::<T>().map_err(|_| AnalyzerError::EnvParse {
            key: key.into(),
            value: v,
        }),
        None => Ok(default),
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn section(name: &str, keywords: &[&str], weight: f64, description: &str) -> RequiredSection {
    RequiredSection {
        name: name.into(),
        keywords: strings(keywords),
        weight,
        description: (!description.is_empty()).then(|| description.to_string()),
    }
}

/* --------------------------- built-in tables --------------------------- */

fn default_templates() -> BTreeMap<String, DomainTemplate> {
    let privacy = vec![
        section("信息收集", &["收集", "获取", "采集"], 1.5,
            "应明确说明收集的个人信息类型、收集方式及收集目的。"),
        section("信息使用", &["使用目的", "用于", "用途"], 1.0,
            "应说明个人信息的使用目的和范围，不得超出告知范围使用。"),
        section("信息共享与披露", &["共享", "转让", "公开披露", "委托处理"], 1.0,
            "应说明向第三方共享、转让、公开披露个人信息的情形和保护措施。"),
        section("信息存储与安全", &["存储", "保存期限", "加密", "安全措施"], 1.0,
            "应说明个人信息的存储地点、保存期限及采取的安全保护措施。"),
        section("用户权利", &["查阅", "更正", "删除", "撤回同意", "注销"], 1.5,
            "应告知用户查阅、更正、删除个人信息及撤回同意、注销账号的途径。"),
        section("未成年人保护", &["未成年人", "儿童", "监护人"], 0.5,
            "处理未成年人个人信息时应取得监护人同意并说明特别保护措施。"),
        section("政策更新", &["更新", "修订", "变更"], 0.5, ""),
        section("联系我们", &["联系方式", "联系我们", "投诉", "邮箱"], 0.5,
            "应提供个人信息保护负责人或投诉渠道的联系方式。"),
    ];
    let service = vec![
        section("服务内容", &["服务内容", "服务范围", "提供服务"], 1.0,
            "应明确约定服务的具体内容、范围和标准。"),
        section("权利义务", &["权利", "义务"], 1.5,
            "应分别列明双方的主要权利和义务。"),
        section("费用与支付", &["费用", "付款", "支付", "服务费"], 1.0,
            "应约定费用标准、支付方式和支付期限。"),
        section("违约责任", &["违约", "违约金", "赔偿"], 1.5,
            "应约定违约情形及相应的违约责任和赔偿方式。"),
        section("协议终止", &["终止", "解除"], 1.0, "应约定协议解除或终止的条件及后果。"),
        section("争议解决", &["争议", "仲裁", "诉讼", "管辖"], 1.0,
            "应约定争议解决方式及管辖机构。"),
        section("适用法律", &["适用法律", "法律适用", "中华人民共和国法律"], 0.5, ""),
    ];
    let ip = vec![
        section("权利归属", &["归属", "所有权", "著作权", "知识产权"], 1.5,
            "应明确约定知识产权及工作成果的归属。"),
        section("许可使用", &["许可", "授权", "许可使用"], 1.0,
            "应约定许可的范围、方式、期限及地域。"),
        section("侵权责任", &["侵权", "侵犯", "赔偿"], 1.0,
            "应约定侵权发生时的责任承担与处理方式。"),
        section("保密条款", &["保密", "商业秘密"], 1.0, "应约定保密信息范围和保密期限。"),
        section("争议解决", &["争议", "仲裁", "诉讼"], 0.5, ""),
    ];

    [
        ("privacy_policy", privacy),
        ("service_agreement", service),
        ("intellectual_property", ip),
    ]
    .into_iter()
    .map(|(k, required_sections)| (k.to_string(), DomainTemplate { required_sections }))
    .collect()
}

fn default_compliance_keywords() -> BTreeMap<String, ComplianceKeywords> {
    let privacy = ComplianceKeywords {
        mandatory: strings(&["个人信息", "隐私政策", "数据处理", "用户同意"]),
        recommended: strings(&["数据安全", "删除", "更正", "第三方", "未成年人", "联系方式"]),
        penalties: strings(&["强制同意", "默认同意", "永久保存", "不承担任何责任"]),
    };
    let contract = ComplianceKeywords {
        mandatory: strings(&["甲方", "乙方", "权利", "义务", "违约责任"]),
        recommended: strings(&["争议解决", "不可抗力", "保密", "终止", "通知"]),
        penalties: strings(&["最终解释权", "概不负责", "不承担任何责任", "单方变更"]),
    };
    let ip = ComplianceKeywords {
        mandatory: strings(&["知识产权", "著作权", "许可"]),
        recommended: strings(&["专利", "商标", "商业秘密", "侵权", "保密"]),
        penalties: strings(&["无偿转让", "放弃一切权利", "永久免费使用"]),
    };
    [("privacy", privacy), ("contract", contract), ("intellectual_property", ip)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn default_reference_laws() -> BTreeMap<String, Vec<String>> {
    [
        ("privacy", vec![
            "《中华人民共和国个人信息保护法》",
            "《中华人民共和国数据安全法》",
            "《中华人民共和国网络安全法》",
        ]),
        ("contract", vec!["《中华人民共和国民法典》合同编"]),
        ("intellectual_property", vec![
            "《中华人民共和国著作权法》",
            "《中华人民共和国专利法》",
            "《中华人民共和国商标法》",
        ]),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), strings(&v)))
    .collect()
}

fn default_legal_terms() -> BTreeMap<String, LegalTermGroup> {
    [
        ("privacy".to_string(), LegalTermGroup {
            keywords: strings(&[
                "个人信息", "敏感个人信息", "隐私政策", "数据处理", "用户同意", "明示同意",
                "撤回同意", "去标识化", "匿名化", "跨境传输",
            ]),
            weight: 1.2,
        }),
        ("contract".to_string(), LegalTermGroup {
            keywords: strings(&["违约责任", "违约金", "不可抗力", "争议解决", "仲裁", "管辖"]),
            weight: 1.1,
        }),
        ("intellectual_property".to_string(), LegalTermGroup {
            keywords: strings(&["知识产权", "著作权", "专利权", "商标权", "商业秘密", "许可使用"]),
            weight: 1.1,
        }),
    ]
    .into_iter()
    .collect()
}
