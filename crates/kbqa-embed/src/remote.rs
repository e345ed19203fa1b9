//! Remote embedder backed by the Google Generative Language `embedContent`
//! endpoint.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use kbqa_core::config::EmbedderConfig;
use kbqa_core::credentials::resolve_api_key;
use kbqa_core::error::EmbedError;
use kbqa_core::traits::Embedder;

pub struct RemoteEmbedder {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    dim: usize,
    id: String,
}

#[derive(Debug, Deserialize)]
struct EmbedContentResponse {
    embedding: Option<ContentEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

impl RemoteEmbedder {
    pub fn new(cfg: &EmbedderConfig) -> Result<Self, EmbedError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| EmbedError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            model: cfg.remote_model.clone(),
            api_key: cfg.api_key.clone(),
            dim: cfg.dim,
            id: format!("remote:{}:d{}", cfg.remote_model, cfg.dim),
        })
    }
}

fn transport_error(e: &reqwest::Error) -> EmbedError {
    if e.is_timeout() { EmbedError::Timeout } else { EmbedError::Transport(e.to_string()) }
}

#[async_trait]
impl Embedder for RemoteEmbedder {
    fn embedder_id(&self) -> &str { &self.id }

    fn dim(&self) -> usize { self.dim }

    async fn embed(&self, text: &str, api_key: Option<&str>) -> Result<Vec<f32>, EmbedError> {
        let key = resolve_api_key(api_key, self.api_key.as_deref()).ok_or(EmbedError::MissingApiKey)?;
        let url = format!("{}/models/{}:embedContent", self.endpoint, self.model);
        let body = json!({
            "model": format!("models/{}", self.model),
            "content": { "parts": [{ "text": text }] },
        });

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error(&e))?;

        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(EmbedError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            // The API reports a bad key as 400 with this reason code.
            if body.contains("API_KEY_INVALID") {
                return Err(EmbedError::Unauthorized(status.as_u16()));
            }
            return Err(EmbedError::Api { status: status.as_u16(), body });
        }

        let parsed: EmbedContentResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() { EmbedError::Timeout } else { EmbedError::MalformedResponse(e.to_string()) }
        })?;
        let values = parsed
            .embedding
            .map(|e| e.values)
            .ok_or_else(|| EmbedError::MalformedResponse("missing embedding.values".to_string()))?;
        if values.len() != self.dim {
            return Err(EmbedError::Dimension { expected: self.dim, got: values.len() });
        }
        tracing::trace!(embedder = %self.id, "remote embedding received");
        Ok(values)
    }
}
