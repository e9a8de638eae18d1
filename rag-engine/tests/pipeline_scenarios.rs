//! End-to-end pipeline behavior with in-memory collections and fake or
//! mocked embedding providers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ai_llm_service::error_handler::ProviderErrorKind;
use ai_llm_service::service_profiles::LlmServiceProfiles;
use ai_llm_service::{AiLlmError, ChatMessage, ChatOptions, LlmModelConfig, LlmProvider};
use rag_engine::{
    BoxFuture, DefaultTextAnalyzer, EmbeddingsProvider, MISSING_CONTENT, RagEngine,
    RagEngineConfig, RagEngineError, TextRewriter,
};
use rag_store::{DocumentMetadata, LocalVectorStore, VectorStore};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Hashes characters into a small bag-of-chars vector; deterministic.
struct CharBagEmbedder {
    calls: AtomicUsize,
}

impl CharBagEmbedder {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

fn char_bag(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; 16];
    for c in text.chars() {
        v[(c as usize) % 16] += 1.0;
    }
    v
}

impl EmbeddingsProvider for CharBagEmbedder {
    fn embed<'a>(&'a self, texts: &'a [String]) -> BoxFuture<'a, Result<Vec<Vec<f32>>, AiLlmError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let out = texts.iter().map(|t| char_bag(t)).collect();
        Box::pin(async move { Ok(out) })
    }
}

struct EchoRewriter;

impl TextRewriter for EchoRewriter {
    fn chat<'a>(
        &'a self,
        _messages: &'a [ChatMessage],
        _opts: ChatOptions,
    ) -> BoxFuture<'a, Result<String, AiLlmError>> {
        Box::pin(async { Ok("经优化的摘要。".to_string()) })
    }
}

fn engine(store: Arc<LocalVectorStore>) -> RagEngine {
    RagEngine::new(
        RagEngineConfig::default(),
        Arc::new(DefaultTextAnalyzer::default()),
        Arc::new(CharBagEmbedder::new()),
        store,
    )
}

const POLICY: &str = "本隐私政策说明我们如何收集和使用您的个人信息。\
    我们仅在获得用户同意后处理个人信息。\
    您有权查阅、更正和删除您的个人信息。";

#[tokio::test]
async fn query_returns_keywords_summary_and_numbered_context() {
    let store = Arc::new(LocalVectorStore::in_memory("kb"));
    let eng = engine(store.clone());
    eng.ingest_document("个人信息保护法规定处理个人信息应当取得个人同意。", "pipl.txt")
        .await
        .unwrap();
    eng.ingest_document("合同双方应当按照约定履行义务。", "contract.txt")
        .await
        .unwrap();

    let res = eng.process_query(POLICY, false).await.unwrap();
    assert!(!res.keywords.is_empty() && res.keywords.len() <= 5);
    assert!(res.summary.len() <= 3);
    assert!(res.summary[0].starts_with("本隐私政策"));
    assert!(res.query_text.starts_with(rag_engine::DEFAULT_QUERY_PREFIX));
    assert_eq!(res.retrieved, 2);
    assert!(res.context.starts_with("相关文档 1: "));
    assert!(res.context.contains("相关文档 2: "));
    assert!(res.refined_summary.is_none());
}

#[tokio::test]
async fn empty_collection_yields_empty_context() {
    let eng = engine(Arc::new(LocalVectorStore::in_memory("kb")));
    let res = eng.process_query(POLICY, false).await.unwrap();
    assert_eq!(res.retrieved, 0);
    assert_eq!(res.context, "");
}

#[tokio::test]
async fn blank_stored_content_keeps_cardinality() {
    let store = Arc::new(LocalVectorStore::in_memory("kb"));
    store
        .add(
            &["   ".to_string()],
            &[char_bag("x")],
            &[DocumentMetadata::new(vec![], "blank.txt")],
        )
        .unwrap();
    let res = engine(store).process_query(POLICY, false).await.unwrap();
    assert_eq!(res.retrieved, 1);
    assert!(res.context.contains(MISSING_CONTENT));
}

#[tokio::test]
async fn professional_kb_falls_back_to_default_collection() {
    let store = Arc::new(LocalVectorStore::in_memory("kb"));
    let eng = engine(store);
    eng.ingest_document("用户有权撤回同意。", "a.txt").await.unwrap();
    let res = eng.process_query(POLICY, true).await.unwrap();
    assert_eq!(res.retrieved, 1);
}

#[tokio::test]
async fn professional_collection_is_used_when_configured() {
    let default = Arc::new(LocalVectorStore::in_memory("kb"));
    let pro = Arc::new(LocalVectorStore::in_memory("pro"));
    pro.add(
        &["专业库条文。".to_string()],
        &[char_bag("专业库条文。")],
        &[DocumentMetadata::new(vec!["专业".into()], "pro.txt")],
    )
    .unwrap();
    let eng = engine(default).with_professional_store(pro);
    let res = eng.process_query(POLICY, true).await.unwrap();
    assert!(res.context.contains("专业库条文。"));
}

#[tokio::test]
async fn refinement_is_applied_when_enabled() {
    let cfg = RagEngineConfig {
        refine_summary: true,
        ..RagEngineConfig::default()
    };
    let eng = RagEngine::new(
        cfg,
        Arc::new(DefaultTextAnalyzer::default()),
        Arc::new(CharBagEmbedder::new()),
        Arc::new(LocalVectorStore::in_memory("kb")),
    )
    .with_rewriter(Arc::new(EchoRewriter));
    let res = eng.process_query(POLICY, false).await.unwrap();
    assert_eq!(res.refined_summary.as_deref(), Some("经优化的摘要。"));
}

#[tokio::test]
async fn ingest_directory_is_sorted_and_skips_blank_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("b.txt"), "乙方应当支付费用。").unwrap();
    std::fs::write(dir.path().join("a.txt"), "甲方应当交付成果。").unwrap();
    std::fs::write(dir.path().join("c.txt"), "   ").unwrap();
    std::fs::write(dir.path().join("d.bin"), [0xffu8, 0xfe, 0x00]).unwrap();

    let store = Arc::new(LocalVectorStore::in_memory("kb"));
    let eng = engine(store.clone());
    let stats = eng.ingest_directory(dir.path()).await.unwrap();
    assert_eq!(stats.indexed, 2);
    assert_eq!(stats.skipped, 2);
    assert_eq!(store.count(), 2);

    let hits = store.query(&char_bag(&eng.retrieval_query("甲方应当交付成果。")), 1);
    assert_eq!(hits[0].metadata.as_ref().unwrap().source, "a.txt");
}

#[tokio::test]
async fn ingest_missing_directory_is_an_io_error() {
    let eng = engine(Arc::new(LocalVectorStore::in_memory("kb")));
    let err = eng
        .ingest_directory(std::path::Path::new("/definitely/not/here"))
        .await
        .unwrap_err();
    assert!(matches!(err, RagEngineError::Io { .. }));
}

fn openai_profile(endpoint: String) -> LlmModelConfig {
    LlmModelConfig {
        provider: LlmProvider::OpenAI,
        model: "m3e-base".into(),
        endpoint,
        api_key: Some("test-key".into()),
        max_tokens: None,
        temperature: None,
        top_p: None,
        timeout_secs: Some(5),
    }
}

#[tokio::test]
async fn upstream_500_fails_the_query_with_a_typed_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&server)
        .await;

    let profiles = Arc::new(LlmServiceProfiles::new(
        openai_profile(server.uri()),
        openai_profile(server.uri()),
    ));
    let eng = RagEngine::new(
        RagEngineConfig::default(),
        Arc::new(DefaultTextAnalyzer::default()),
        profiles,
        Arc::new(LocalVectorStore::in_memory("kb")),
    );

    let err = eng.process_query(POLICY, false).await.unwrap_err();
    match &err {
        RagEngineError::Embedding(AiLlmError::Provider(p)) => {
            assert!(matches!(&p.kind, ProviderErrorKind::HttpStatus(h) if h.status.as_u16() == 500));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    let msg = err.to_string();
    assert!(msg.contains("500"), "{msg}");
    assert!(msg.contains("upstream exploded"), "{msg}");
}

#[tokio::test]
async fn upstream_vectors_drive_retrieval() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{ "index": 0, "embedding": [1.0, 0.0, 0.0] }]
        })))
        .mount(&server)
        .await;

    let store = Arc::new(LocalVectorStore::in_memory("kb"));
    store
        .add(
            &["近".to_string(), "远".to_string()],
            &[vec![1.0, 0.1, 0.0], vec![0.0, 0.0, 1.0]],
            &[
                DocumentMetadata::new(vec!["近".into()], "near.txt"),
                DocumentMetadata::new(vec!["远".into()], "far.txt"),
            ],
        )
        .unwrap();

    let profiles = Arc::new(LlmServiceProfiles::new(
        openai_profile(server.uri()),
        openai_profile(server.uri()),
    ));
    let eng = RagEngine::new(
        RagEngineConfig::default(),
        Arc::new(DefaultTextAnalyzer::default()),
        profiles,
        store,
    );
    let res = eng.process_query(POLICY, false).await.unwrap();
    assert!(res.context.starts_with("相关文档 1: 近\n关键词: 近"));
}
