//! Optional LLM quality assessment of document sections.

use std::sync::LazyLock;
use std::time::Duration;

use ai_llm_service::{AiLlmError, ChatMessage, ChatOptions};
use rag_engine::{ErrorTally, TextRewriter};
use regex::Regex;
use tracing::debug;

use crate::structs::compliance::Section;
use crate::structs::text_analysis::LlmSectionAssessment;

/// Tally key for section assessment failures.
pub const ASSESSMENT_STEP: &str = "llm_section_assessment";

const ASSESSMENT_TEMPERATURE: f32 = 0.3;
const ASSESSMENT_MAX_TOKENS: u32 = 1000;

static SUGGESTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("suggestion regex"));

pub fn assessment_messages(domain: &str, section: &Section) -> Vec<ChatMessage> {
    let system = format!(
        "你是一个专业的{domain}领域法律文本评估专家。请对以下文本进行专业评估，重点关注：专业性、完整性、清晰度、合规性。"
    );
    let user = format!(
        "请评估以下章节，并仅以JSON格式返回结果：\n\
         {{\"clarity_score\": 0-10, \"completeness_score\": 0-10, \"compliance_score\": 0-10, \"suggestions\": [\"改进建议\"]}}\n\n\
         章节标题：{}\n章节内容：\n{}",
        section.title, section.content
    );
    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// Parses a model reply: JSON first (optionally wrapped in prose or a code
/// fence), then a lenient regex scan. `None` when nothing is recognizable.
pub fn parse_llm_scores(reply: &str) -> Option<LlmSectionAssessment> {
    if let Some(parsed) = json_object(reply)
        .and_then(|raw| serde_json::from_str::<LlmSectionAssessment>(raw).ok())
    {
        return Some(parsed);
    }

    let clarity = score_field(reply, "clarity");
    let completeness = score_field(reply, "completeness");
    let compliance = score_field(reply, "compliance");
    let suggestions: Vec<String> = SUGGESTION
        .captures_iter(reply)
        .map(|c| c[1].trim().to_string())
        .filter(|s| !s.is_empty() && !is_field_name(s))
        .collect();

    if clarity.is_none() && completeness.is_none() && compliance.is_none() && suggestions.is_empty()
    {
        return None;
    }
    Some(LlmSectionAssessment {
        clarity_score: clarity.unwrap_or(0.0),
        completeness_score: completeness.unwrap_or(0.0),
        compliance_score: compliance.unwrap_or(0.0),
        suggestions,
    })
}

/// Asks `rewriter` to assess one section. Never fails: transport errors,
/// timeouts and unreadable replies yield zero scores plus a note, and are
/// counted in `tally`.
pub async fn assess_section(
    rewriter: &dyn TextRewriter,
    domain: &str,
    section: &Section,
    deadline: Duration,
    tally: &ErrorTally,
) -> LlmSectionAssessment {
    let messages = assessment_messages(domain, section);
    let opts = ChatOptions {
        temperature: Some(ASSESSMENT_TEMPERATURE),
        max_tokens: Some(ASSESSMENT_MAX_TOKENS),
    };

    let reply = match tokio::time::timeout(deadline, rewriter.chat(&messages, opts)).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => return failed(tally, &e),
        Err(_) => return failed(tally, &AiLlmError::Timeout(deadline)),
    };

    match parse_llm_scores(&reply) {
        Some(a) => {
            debug!(
                target: "legal_analyzer::assessment",
                section = %section.title,
                clarity = a.clarity_score,
                "section assessed"
            );
            a
        }
        None => failed(tally, &"unrecognized reply format"),
    }
}

fn failed(tally: &ErrorTally, reason: &dyn std::fmt::Display) -> LlmSectionAssessment {
    tally.record(ASSESSMENT_STEP, reason);
    LlmSectionAssessment {
        suggestions: vec![format!("评估失败: {reason}")],
        ..LlmSectionAssessment::default()
    }
}

fn json_object(reply: &str) -> Option<&str> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    (start < end).then(|| &reply[start..=end])
}

fn score_field(reply: &str, kind: &str) -> Option<f64> {
    let re = Regex::new(&format!(r#""{kind}_score"\s*:\s*(\d+(?:\.\d+)?)"#)).ok()?;
    re.captures(reply)?.get(1)?.as_str().parse().ok()
}

fn is_field_name(s: &str) -> bool {
    matches!(
        s,
        "clarity_score" | "completeness_score" | "compliance_score" | "suggestions"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::error_handler::{Provider, ProviderError, ProviderErrorKind};
    use rag_engine::BoxFuture;

    struct Reply(Result<&'static str, ()>);

    impl TextRewriter for Reply {
        fn chat<'a>(
            &'a self,
            _messages: &'a [ChatMessage],
            _opts: ChatOptions,
        ) -> BoxFuture<'a, Result<String, AiLlmError>> {
            let out = self.0.map(str::to_string).map_err(|_| {
                AiLlmError::Provider(ProviderError::new(Provider::Ollama, ProviderErrorKind::EmptyChoices))
            });
            Box::pin(async move { out })
        }
    }

    fn section() -> Section {
        Section {
            title: "一、信息收集".into(),
            content: "我们收集您的姓名。".into(),
        }
    }

    #[test]
    fn parses_fenced_json() {
        let a = parse_llm_scores(
            "```json\n{\"clarity_score\": 8, \"completeness_score\": 6.5, \"compliance_score\": 7, \"suggestions\": [\"补充收集目的\"]}\n```",
        )
        .unwrap();
        assert_eq!(a.clarity_score, 8.0);
        assert_eq!(a.completeness_score, 6.5);
        assert_eq!(a.suggestions, vec!["补充收集目的"]);
    }

    #[test]
    fn falls_back_to_regex() {
        let a = parse_llm_scores("评分：\"clarity_score\": 7, \"compliance_score\": 5，建议：\"明确保存期限\"")
            .unwrap();
        assert_eq!(a.clarity_score, 7.0);
        assert_eq!(a.completeness_score, 0.0);
        assert_eq!(a.compliance_score, 5.0);
        assert_eq!(a.suggestions, vec!["明确保存期限"]);
    }

    #[test]
    fn prose_is_unrecognized() {
        assert!(parse_llm_scores("这一章节写得不错。").is_none());
    }

    #[test]
    fn prompt_names_domain_and_section() {
        let m = assessment_messages("隐私", &section());
        assert!(m[0].content.contains("专业的隐私领域"));
        assert!(m[1].content.contains("章节标题：一、信息收集"));
    }

    #[tokio::test]
    async fn transport_failure_is_counted() {
        let tally = ErrorTally::new();
        let a = assess_section(&Reply(Err(())), "privacy", &section(), Duration::from_secs(1), &tally).await;
        assert_eq!(a.clarity_score, 0.0);
        assert!(a.suggestions[0].starts_with("评估失败: "));
        assert_eq!(tally.snapshot()[ASSESSMENT_STEP], 1);
    }

    #[tokio::test]
    async fn good_reply_is_not_counted() {
        let tally = ErrorTally::new();
        let a = assess_section(
            &Reply(Ok(r#"{"clarity_score": 9, "completeness_score": 8, "compliance_score": 9, "suggestions": []}"#)),
            "privacy",
            &section(),
            Duration::from_secs(1),
            &tally,
        )
        .await;
        assert_eq!(a.compliance_score, 9.0);
        assert_eq!(tally.total(), 0);
    }
}
