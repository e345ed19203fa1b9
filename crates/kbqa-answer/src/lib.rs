//! Answer generation boundary: prompt construction and the hosted-model call.

use async_trait::async_trait;

pub mod error;
pub mod gemini;
pub mod prompt;

pub use error::GenerateError;
pub use gemini::GeminiGenerator;
pub use prompt::build_prompt;

/// Prompt in, text out.
#[async_trait]
pub trait Generator: Send + Sync {
    fn model(&self) -> &str;
    async fn generate(&self, prompt: &str, api_key: Option<&str>) -> Result<String, GenerateError>;
}
