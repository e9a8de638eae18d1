//! Similar-case lookup: retrieve candidate cases, then let the chat
//! capability rank them in one batch call.

use std::time::Duration;

use ai_llm_service::{AiLlmError, ChatMessage, ChatOptions};
use rag_engine::{ErrorTally, MISSING_CONTENT, RagEngine, TextRewriter};
use serde::Deserialize;
use tracing::debug;

use crate::analysis::report::SimilarCase;

/// Tally key for lookup failures.
pub const SIMILAR_CASES_STEP: &str = "similar_cases";

pub const SIMILAR_CASES_TOP_K: usize = 5;

const NO_REASONING: &str = "未提供分析原因";
const SYSTEM_PROMPT: &str = "你是一个法律案例相关性分析专家。请分析多个案例与目标案例的相关性。";

#[derive(Debug, Deserialize)]
struct BatchReply {
    #[serde(default)]
    analyses: Vec<CaseAnalysis>,
}

#[derive(Debug, Deserialize)]
struct CaseAnalysis {
    case_index: usize,
    #[serde(default)]
    relevance_score: f64,
    #[serde(default)]
    reasoning: Option<String>,
}

pub fn batch_messages(target: &str, cases: &[String]) -> Vec<ChatMessage> {
    let listed: String = cases
        .iter()
        .enumerate()
        .map(|(i, c)| format!("案例{}：{}\n\n", i + 1, c))
        .collect();
    let user = format!(
        "目标案例：\n{target}\n\n候选案例：\n{listed}\
         请为每个候选案例给出0到1之间的相关性评分及简要理由，仅返回JSON：\n\
         {{\"analyses\": [{{\"case_index\": 1, \"relevance_score\": 0.8, \"reasoning\": \"...\"}}]}}"
    );
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)]
}

/// Maps a batch reply onto `cases` (1-based `case_index`), best first.
pub fn parse_batch_reply(reply: &str, cases: &[String]) -> Option<Vec<SimilarCase>> {
    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if start >= end {
        return None;
    }
    let parsed: BatchReply = serde_json::from_str(&reply[start..=end]).ok()?;

    let mut out: Vec<(usize, SimilarCase)> = parsed
        .analyses
        .into_iter()
        .filter_map(|a| {
            let content = cases.get(a.case_index.checked_sub(1)?)?;
            Some((
                a.case_index,
                SimilarCase {
                    content: content.clone(),
                    relevance_score: a.relevance_score,
                    reasoning: a
                        .reasoning
                        .filter(|r| !r.trim().is_empty())
                        .unwrap_or_else(|| NO_REASONING.to_string()),
                },
            ))
        })
        .collect();
    out.sort_by(|(ia, a), (ib, b)| {
        b.relevance_score
            .total_cmp(&a.relevance_score)
            .then(ia.cmp(ib))
    });
    Some(out.into_iter().map(|(_, c)| c).collect())
}

/// Looks up candidates near the query `embedding` in the professional
/// collection (falling back to the default one) and ranks them. Never
/// fails: any error yields an empty list and a tally entry.
pub async fn find_similar_cases(
    rag: &RagEngine,
    rewriter: &dyn TextRewriter,
    text: &str,
    embedding: &[f32],
    deadline: Duration,
    tally: &ErrorTally,
) -> Vec<SimilarCase> {
    let rows = rag.nearest(embedding, true, SIMILAR_CASES_TOP_K);
    let cases: Vec<String> = rows
        .into_iter()
        .map(|r| {
            r.content
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| MISSING_CONTENT.to_string())
        })
        .collect();
    if cases.is_empty() {
        return Vec::new();
    }

    let messages = batch_messages(text, &cases);
    let opts = ChatOptions {
        temperature: Some(0.3),
        max_tokens: None,
    };
    let reply = match tokio::time::timeout(deadline, rewriter.chat(&messages, opts)).await {
        Ok(Ok(reply)) => reply,
        Ok(Err(e)) => {
            tally.record(SIMILAR_CASES_STEP, &e);
            return Vec::new();
        }
        Err(_) => {
            tally.record(SIMILAR_CASES_STEP, &AiLlmError::Timeout(deadline));
            return Vec::new();
        }
    };

    match parse_batch_reply(&reply, &cases) {
        Some(ranked) => {
            debug!(
                target: "api::similar_cases",
                candidates = cases.len(),
                ranked = ranked.len(),
                "similar cases ranked"
            );
            ranked
        }
        None => {
            tally.record(SIMILAR_CASES_STEP, &"unrecognized batch reply");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cases() -> Vec<String> {
        vec!["甲案".into(), "乙案".into(), "丙案".into()]
    }

    #[test]
    fn reply_is_ranked_and_mapped_to_cases() {
        let reply = r#"分析如下：{"analyses": [
            {"case_index": 1, "relevance_score": 0.2, "reasoning": "弱相关"},
            {"case_index": 3, "relevance_score": 0.9},
            {"case_index": 9, "relevance_score": 1.0, "reasoning": "越界"}
        ]}"#;
        let ranked = parse_batch_reply(reply, &cases()).unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].content, "丙案");
        assert_eq!(ranked[0].reasoning, NO_REASONING);
        assert_eq!(ranked[1].content, "甲案");
    }

    #[test]
    fn non_json_reply_is_rejected() {
        assert!(parse_batch_reply("无法分析", &cases()).is_none());
        assert!(parse_batch_reply("{\"analyses\": 3}", &cases()).is_none());
    }

    #[test]
    fn prompt_numbers_cases_from_one() {
        let m = batch_messages("目标", &cases());
        assert!(m[1].content.contains("案例1：甲案"));
        assert!(m[1].content.contains("案例3：丙案"));
    }
}
