use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use kbqa_answer::{GenerateError, Generator};
use kbqa_core::error::EmbedError;
use kbqa_core::traits::Embedder;
use kbqa_embed::HashEmbedder;
use kbqa_retrieval::{ContextComposer, Retriever};
use kbqa_server::chat::NO_RELEVANT_INFO;
use kbqa_server::{build_router, ServiceContext};
use kbqa_vector::{ChunkStore, FlatIndex};

const DIM: usize = 64;
const CHUNKS: [&str; 4] = [
    "boil water for one minute to purify it",
    "a bow drill starts a fire from friction",
    "debris shelters trap body heat overnight",
    "signal mirrors flash sunlight at rescuers",
];

enum Reply {
    Answer(&'static str),
    Fail(fn() -> GenerateError),
}

/// Records every call so tests can inspect prompts and keys.
struct StubGenerator {
    reply: Reply,
    calls: Mutex<Vec<(String, Option<String>)>>,
}

impl StubGenerator {
    fn new(reply: Reply) -> Arc<Self> { Arc::new(Self { reply, calls: Mutex::new(Vec::new()) }) }

    fn calls(&self) -> Vec<(String, Option<String>)> { self.calls.lock().unwrap().clone() }
}

#[async_trait]
impl Generator for StubGenerator {
    fn model(&self) -> &str { "stub" }

    async fn generate(&self, prompt: &str, api_key: Option<&str>) -> Result<String, GenerateError> {
        self.calls.lock().unwrap().push((prompt.to_string(), api_key.map(str::to_string)));
        match &self.reply {
            Reply::Answer(text) => Ok((*text).to_string()),
            Reply::Fail(err) => Err(err()),
        }
    }
}

struct FailingEmbedder(fn() -> EmbedError);

#[async_trait]
impl Embedder for FailingEmbedder {
    fn embedder_id(&self) -> &str { "test:failing" }
    fn dim(&self) -> usize { DIM }
    async fn embed(&self, _text: &str, _api_key: Option<&str>) -> Result<Vec<f32>, EmbedError> { Err((self.0)()) }
}

fn corpus(chunks: &[&str]) -> (FlatIndex, ChunkStore) {
    let embedder = HashEmbedder::new(DIM).unwrap();
    let rows: Vec<Vec<f32>> = chunks.iter().map(|c| embedder.embed_text(c)).collect();
    let index = FlatIndex::from_rows(DIM, &rows).unwrap();
    (index, ChunkStore::new(chunks.iter().map(|c| c.to_string()).collect()))
}

fn app_with(embedder: Arc<dyn Embedder>, chunks: &[&str], generator: Arc<dyn Generator>) -> Router {
    let (index, store) = corpus(chunks);
    let retriever = Retriever::new(embedder, Arc::new(index), Arc::new(store)).unwrap();
    let ctx = ServiceContext::new(retriever, ContextComposer::new(None), generator, 3);
    build_router(Arc::new(ctx), Path::new("static"))
}

fn app(chunks: &[&str], generator: Arc<dyn Generator>) -> Router {
    app_with(Arc::new(HashEmbedder::new(DIM).unwrap()), chunks, generator)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_aligned_counts() {
    let req = Request::get("/health").body(Body::empty()).unwrap();
    let (status, body) = send(app(&CHUNKS, StubGenerator::new(Reply::Answer("x"))), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy", "chunks_loaded": 4, "index_size": 4}));
}

#[tokio::test]
async fn index_page_is_html() {
    let app = app(&CHUNKS, StubGenerator::new(Reply::Answer("x")));
    let res = app.oneshot(Request::get("/").body(Body::empty()).unwrap()).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("<html"));
}

#[tokio::test]
async fn search_returns_nearest_chunks_first() {
    let app = app(&CHUNKS, StubGenerator::new(Reply::Answer("x")));
    let (status, body) = send(app, post_json("/search", &json!({"query": "boil water purify", "top_k": 2}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["chunk"], json!(CHUNKS[0]));
    assert_eq!(results[0]["index"], json!(0));
    assert!(results[0]["distance"].as_f64().unwrap() <= results[1]["distance"].as_f64().unwrap());
}

#[tokio::test]
async fn search_defaults_top_k() {
    let app = app(&CHUNKS, StubGenerator::new(Reply::Answer("x")));
    let (status, body) = send(app, post_json("/search", &json!({"query": "fire"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn enormous_top_k_is_bounded_by_the_corpus() {
    let app = app(&CHUNKS, StubGenerator::new(Reply::Answer("x")));
    let (status, body) = send(app, post_json("/search", &json!({"query": "fire", "top_k": 17_592_186_044_416u64}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"].as_array().unwrap().len(), CHUNKS.len());
}

#[tokio::test]
async fn zero_top_k_is_a_bad_request() {
    let app = app(&CHUNKS, StubGenerator::new(Reply::Answer("x")));
    let (status, body) = send(app, post_json("/search", &json!({"query": "fire", "top_k": 0}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["kind"], json!("invalid_request"));
}

#[tokio::test]
async fn blank_query_is_a_bad_request() {
    let app = app(&CHUNKS, StubGenerator::new(Reply::Answer("x")));
    let (status, body) = send(app, post_json("/chat", &json!({"query": "   "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn malformed_body_is_a_bad_request() {
    let app = app(&CHUNKS, StubGenerator::new(Reply::Answer("x")));
    let req = Request::post("/search")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["kind"], json!("invalid_request"));
}

#[tokio::test]
async fn chat_answers_from_retrieved_context() {
    let generator = StubGenerator::new(Reply::Answer("Boil it for a minute."));
    let app = app(&CHUNKS, generator.clone());
    let req = post_json("/chat", &json!({"query": "boil water purify", "top_k": 2, "api_key": "user-key"}));
    let (status, body) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "answer": "Boil it for a minute.", "chunks_used": 2}));

    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    let (prompt, key) = &calls[0];
    assert!(prompt.contains(CHUNKS[0]));
    assert!(prompt.contains("Question: boil water purify"));
    assert_eq!(key.as_deref(), Some("user-key"));
}

#[tokio::test]
async fn chat_without_grounding_skips_generation() {
    let generator = StubGenerator::new(Reply::Answer("should not be used"));
    let app = app(&[], generator.clone());
    let (status, body) = send(app, post_json("/chat", &json!({"query": "anything at all"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!(NO_RELEVANT_INFO));
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn generation_failure_is_a_server_error() {
    let generator = StubGenerator::new(Reply::Fail(|| GenerateError::Unauthorized(403)));
    let (status, body) = send(app(&CHUNKS, generator), post_json("/chat", &json!({"query": "fire"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["kind"], json!("generation"));
}

#[tokio::test]
async fn generation_timeout_is_a_gateway_timeout() {
    let generator = StubGenerator::new(Reply::Fail(|| GenerateError::Timeout));
    let (status, body) = send(app(&CHUNKS, generator), post_json("/chat", &json!({"query": "fire"}))).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["kind"], json!("timeout"));
}

#[tokio::test]
async fn embedding_failure_is_a_retrieval_error() {
    let generator = StubGenerator::new(Reply::Answer("x"));
    let embedder = Arc::new(FailingEmbedder(|| EmbedError::Unauthorized(400)));
    let app = app_with(embedder, &CHUNKS, generator.clone());
    let (status, body) = send(app, post_json("/chat", &json!({"query": "fire"}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["kind"], json!("retrieval"));
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn embedding_timeout_is_a_gateway_timeout() {
    let embedder = Arc::new(FailingEmbedder(|| EmbedError::Timeout));
    let app = app_with(embedder, &CHUNKS, StubGenerator::new(Reply::Answer("x")));
    let (status, body) = send(app, post_json("/search", &json!({"query": "fire"}))).await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["kind"], json!("timeout"));
}
