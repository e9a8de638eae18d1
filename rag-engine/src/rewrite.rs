//! Optional LLM rewriting of the extractive summary.

use std::time::Duration;

use ai_llm_service::service_profiles::LlmServiceProfiles;
use ai_llm_service::{AiLlmError, ChatMessage, ChatOptions};
use tracing::debug;

use crate::embed::BoxFuture;
use crate::tally::ErrorTally;

/// Tally key for refinement failures.
pub const REFINE_STEP: &str = "summary_refine";

const REFINE_SYSTEM_PROMPT: &str =
    "你是一个专业的法律文本优化助手，专门负责改进法律文档摘要的语言表达，使其更加专业、严谨。";

const REFINE_TEMPERATURE: f32 = 0.3;
const REFINE_MAX_TOKENS: u32 = 2000;

/// Chat capability: messages in, assistant text out.
pub trait TextRewriter: Send + Sync {
    fn chat<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        opts: ChatOptions,
    ) -> BoxFuture<'a, Result<String, AiLlmError>>;
}

impl TextRewriter for LlmServiceProfiles {
    fn chat<'a>(
        &'a self,
        messages: &'a [ChatMessage],
        opts: ChatOptions,
    ) -> BoxFuture<'a, Result<String, AiLlmError>> {
        Box::pin(LlmServiceProfiles::chat(self, messages, opts))
    }
}

/// Builds the two-message refinement prompt for `summary`.
pub fn refine_messages(summary: &str) -> Vec<ChatMessage> {
    let user = format!(
        "请对以下法律文本摘要进行专业性和严谨性的优化，要求：\n\
         1. 使用准确的法律术语和规范的法律表达方式\n\
         2. 保持客观、严谨的语气，避免口语化表达\n\
         3. 增强句子间的逻辑连贯性，使用恰当的关联词\n\
         4. 确保每个句子都有完整的标点符号（句号、问号、感叹号、分号、冒号等）\n\
         5. 规范使用法律文书中的标点符号，特别是句号的使用\n\
         6. 调整语序和用词，使表述更加清晰、准确\n\
         7. 保持法律文本的庄重性和权威性\n\n\
         原文摘要：\n{summary}\n\n\
         请直接返回优化后的文本，无需其他解释。"
    );
    vec![ChatMessage::system(REFINE_SYSTEM_PROMPT), ChatMessage::user(user)]
}

/// Rewrites `summary` through `rewriter`; any failure (transport, timeout,
/// blank reply) returns the input unchanged and is recorded in `tally`.
pub async fn refine_summary(
    rewriter: &dyn TextRewriter,
    summary: &str,
    deadline: Duration,
    tally: &ErrorTally,
) -> String {
    if summary.trim().is_empty() {
        return summary.to_string();
    }
    let messages = refine_messages(summary);
    let opts = ChatOptions {
        temperature: Some(REFINE_TEMPERATURE),
        max_tokens: Some(REFINE_MAX_TOKENS),
    };

    match tokio::time::timeout(deadline, rewriter.chat(&messages, opts)).await {
        Ok(Ok(text)) if !text.trim().is_empty() => {
            debug!(target: "rag_engine::rewrite", chars = text.chars().count(), "summary refined");
            text.trim().to_string()
        }
        Ok(Ok(_)) => {
            tally.record(REFINE_STEP, &"empty reply");
            summary.to_string()
        }
        Ok(Err(e)) => {
            tally.record(REFINE_STEP, &e);
            summary.to_string()
        }
        Err(_) => {
            tally.record(REFINE_STEP, &AiLlmError::Timeout(deadline));
            summary.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ai_llm_service::error_handler::{Provider, ProviderError, ProviderErrorKind};

    struct Fixed(Result<String, ()>);

    impl TextRewriter for Fixed {
        fn chat<'a>(
            &'a self,
            _messages: &'a [ChatMessage],
            _opts: ChatOptions,
        ) -> BoxFuture<'a, Result<String, AiLlmError>> {
            let out = self.0.clone().map_err(|_| {
                AiLlmError::Provider(ProviderError::new(Provider::OpenAI, ProviderErrorKind::EmptyChoices))
            });
            Box::pin(async move { out })
        }
    }

    struct Stalls;

    impl TextRewriter for Stalls {
        fn chat<'a>(
            &'a self,
            _messages: &'a [ChatMessage],
            _opts: ChatOptions,
        ) -> BoxFuture<'a, Result<String, AiLlmError>> {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok("late".to_string())
            })
        }
    }

    #[tokio::test]
    async fn success_returns_rewritten_text() {
        let tally = ErrorTally::new();
        let out = refine_summary(&Fixed(Ok(" 优化后。 ".into())), "原文。", Duration::from_secs(1), &tally).await;
        assert_eq!(out, "优化后。");
        assert_eq!(tally.total(), 0);
    }

    #[tokio::test]
    async fn failure_keeps_original_and_is_counted() {
        let tally = ErrorTally::new();
        let out = refine_summary(&Fixed(Err(())), "原文。", Duration::from_secs(1), &tally).await;
        assert_eq!(out, "原文。");
        assert_eq!(tally.snapshot()[REFINE_STEP], 1);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_keeps_original() {
        let tally = ErrorTally::new();
        let out = refine_summary(&Stalls, "原文。", Duration::from_millis(50), &tally).await;
        assert_eq!(out, "原文。");
        assert_eq!(tally.total(), 1);
    }

    #[test]
    fn prompt_embeds_summary() {
        let m = refine_messages("甲方应当付款。");
        assert_eq!(m.len(), 2);
        assert!(m[1].content.contains("原文摘要：\n甲方应当付款。"));
    }
}
