mod openai;
mod reply;

pub use openai::OpenAiAgent;
pub use reply::{parse_reply, MalformedReply, ReplyParts};

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum EnrichError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected AI response shape: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("AI response contained no {0}")]
    EmptyResponse(&'static str),
}

/// Seam between the submit handler and the generative-AI backend.
/// Implemented by [`OpenAiAgent`] in production and by scripted doubles in
/// tests.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// One completion that summarizes the feedback and derives an image
    /// prompt. Returns the raw reply text; see [`parse_reply`] for the
    /// expected two-line shape.
    async fn summarize(&self, feedback: &str) -> Result<String, EnrichError>;

    /// Turns an image prompt into one hosted image URL.
    async fn generate_image(&self, prompt: &str) -> Result<String, EnrichError>;
}
