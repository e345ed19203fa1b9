//! Wire types for the HTTP surface and the mapping from domain failures to
//! status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use kbqa_answer::GenerateError;
use kbqa_core::types::SearchResult;
use kbqa_retrieval::RetrievalError;

use crate::chat::ChatError;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub query: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub success: bool,
    pub answer: String,
    pub chunks_used: usize,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub chunks_loaded: usize,
    pub index_size: usize,
}

#[derive(Debug, Serialize)]
pub struct FailureBody {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

impl FailureBody {
    pub fn new(error: impl Into<String>, kind: Option<&'static str>) -> Self {
        Self { success: false, error: error.into(), kind }
    }
}

#[derive(Debug)]
pub enum ApiError {
    InvalidRequest(String),
    Retrieval(RetrievalError),
    Generation(GenerateError),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) | Self::Retrieval(RetrievalError::InvalidTopK) => "invalid_request",
            Self::Retrieval(e) if e.is_timeout() => "timeout",
            Self::Generation(e) if e.is_timeout() => "timeout",
            Self::Retrieval(_) => "retrieval",
            Self::Generation(_) => "generation",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::Retrieval(RetrievalError::InvalidTopK) => StatusCode::BAD_REQUEST,
            Self::Retrieval(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            Self::Generation(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            Self::Retrieval(_) | Self::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::InvalidRequest(msg) => msg.clone(),
            Self::Retrieval(e) => e.to_string(),
            Self::Generation(e) => e.to_string(),
        }
    }
}

impl From<RetrievalError> for ApiError {
    fn from(e: RetrievalError) -> Self { Self::Retrieval(e) }
}

impl From<GenerateError> for ApiError {
    fn from(e: GenerateError) -> Self { Self::Generation(e) }
}

impl From<ChatError> for ApiError {
    fn from(e: ChatError) -> Self {
        match e {
            ChatError::Retrieval(e) => Self::Retrieval(e),
            ChatError::Generate(e) => Self::Generation(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let message = self.message();
        if status.is_server_error() {
            tracing::error!(%status, kind, error = %message, "request failed");
        } else {
            tracing::warn!(%status, kind, error = %message, "request rejected");
        }
        (status, Json(FailureBody::new(message, Some(kind)))).into_response()
    }
}
