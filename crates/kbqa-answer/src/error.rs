use thiserror::Error;

/// Failure of the answer-generation call; distinct from retrieval failures.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("No API key supplied for the generation service")]
    MissingApiKey,

    #[error("Generation service rejected the API key ({0})")]
    Unauthorized(u16),

    #[error("Generation service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Generation request timed out")]
    Timeout,

    #[error("Generation request failed: {0}")]
    Transport(String),

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),

    #[error("Generation returned no answer (finish reason: {0})")]
    Blocked(String),
}

impl GenerateError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}
