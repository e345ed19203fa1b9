//! Google Generative Language `generateContent` adapter.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use kbqa_core::config::GeneratorConfig;
use kbqa_core::credentials::resolve_api_key;

use crate::error::GenerateError;
use crate::Generator;

pub struct GeminiGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiGenerator {
    pub fn new(cfg: &GeneratorConfig) -> Result<Self, GenerateError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| GenerateError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone(),
        })
    }
}

fn transport_error(e: &reqwest::Error) -> GenerateError {
    if e.is_timeout() { GenerateError::Timeout } else { GenerateError::Transport(e.to_string()) }
}

fn answer_text(resp: GenerateContentResponse) -> Result<String, GenerateError> {
    let Some(candidate) = resp.candidates.into_iter().next() else {
        let reason = resp
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(GenerateError::Blocked(reason));
    };
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        return Err(GenerateError::Blocked(candidate.finish_reason.unwrap_or_else(|| "empty".to_string())));
    }
    Ok(text)
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn model(&self) -> &str { &self.model }

    async fn generate(&self, prompt: &str, api_key: Option<&str>) -> Result<String, GenerateError> {
        let key = resolve_api_key(api_key, self.api_key.as_deref()).ok_or(GenerateError::MissingApiKey)?;
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = json!({ "contents": [{ "parts": [{ "text": prompt }] }] });

        tracing::debug!(model = %self.model, prompt_chars = prompt.len(), "calling generation service");
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
            return Err(GenerateError::Unauthorized(status.as_u16()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            if body.contains("API_KEY_INVALID") {
                return Err(GenerateError::Unauthorized(status.as_u16()));
            }
            return Err(GenerateError::Api { status: status.as_u16(), body });
        }

        let parsed: GenerateContentResponse = resp.json().await.map_err(|e| {
            if e.is_timeout() { GenerateError::Timeout } else { GenerateError::MalformedResponse(e.to_string()) }
        })?;
        answer_text(parsed)
    }
}
