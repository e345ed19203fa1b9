use std::path::Path;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::{ApiError, ChatRequest, ChatResponse, FailureBody, HealthResponse, SearchRequest, SearchResponse};
use crate::chat::{ChatOutcome, NO_RELEVANT_INFO};
use crate::context::ServiceContext;

const INDEX_HTML: &str = include_str!("../static/index.html");

pub type SharedContext = Arc<ServiceContext>;

pub fn build_router(ctx: SharedContext, static_dir: &Path) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/search", post(search))
        .route("/chat", post(chat))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn index_page() -> Html<&'static str> { Html(INDEX_HTML) }

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|e| ApiError::InvalidRequest(e.body_text()))
}

/// Blank queries are rejected; a missing top_k falls back to the default.
fn checked_top_k(query: &str, top_k: Option<usize>, default_top_k: usize) -> Result<usize, ApiError> {
    if query.trim().is_empty() {
        return Err(ApiError::InvalidRequest("query must not be empty".to_string()));
    }
    match top_k.unwrap_or(default_top_k) {
        0 => Err(ApiError::InvalidRequest("top_k must be a positive integer".to_string())),
        k => Ok(k),
    }
}

async fn search(
    State(ctx): State<SharedContext>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let req = parse_body(payload)?;
    let top_k = checked_top_k(&req.query, req.top_k, ctx.default_top_k)?;
    let results = ctx.search(&req.query, top_k, req.api_key.as_deref()).await?;
    tracing::debug!(top_k, returned = results.len(), "search served");
    Ok(Json(SearchResponse { success: true, results }))
}

async fn chat(
    State(ctx): State<SharedContext>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let req = parse_body(payload)?;
    let top_k = checked_top_k(&req.query, req.top_k, ctx.default_top_k)?;
    match ctx.chat(&req.query, top_k, req.api_key.as_deref()).await? {
        ChatOutcome::Answered { answer, chunks_used } => {
            Ok(Json(ChatResponse { success: true, answer, chunks_used }).into_response())
        }
        ChatOutcome::NoGrounding => Ok(Json(FailureBody::new(NO_RELEVANT_INFO, Some("no_grounding"))).into_response()),
    }
}

async fn health(State(ctx): State<SharedContext>) -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy", chunks_loaded: ctx.chunks_loaded(), index_size: ctx.index_size() })
}
