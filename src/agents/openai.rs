use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

use super::{EnrichError, Enricher};

const CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const IMAGE_URL: &str = "https://api.openai.com/v1/images/generations";

const CHAT_MODEL: &str = "gpt-4-1106-preview";
const IMAGE_MODEL: &str = "dall-e-3";

const SYSTEM_PROMPT: &str = "You are a helpful assistant that summarizes feedback and generates \
a creative visual prompt for DALL·E. Reply with exactly two lines: the first starting with \
\"Summary:\" and the second with \"DALL·E Prompt:\".";

const MAX_RETRIES: u32 = 3;

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ImageRequest {
    model: String,
    prompt: String,
    size: String,
    n: u32,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

pub struct OpenAiAgent {
    client: Client,
    api_key: String,
}

impl OpenAiAgent {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, api_key }
    }

    /// POSTs `body` to `url`, retrying 429 and 5xx responses with exponential
    /// backoff. Returns the successful response body text.
    async fn post_with_retry<B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<String, EnrichError> {
        let mut retry_count = 0;
        let mut backoff = 2u64;

        loop {
            let response = self
                .client
                .post(url)
                .bearer_auth(&self.api_key)
                .json(body)
                .send()
                .await?;

            let status = response.status();
            let text = response.text().await?;

            if status.is_success() {
                return Ok(text);
            }

            let retryable = status.as_u16() == 429 || status.is_server_error();
            if retryable && retry_count < MAX_RETRIES {
                warn!("AI call to {} returned {}, retrying in {}s", url, status, backoff);
                retry_count += 1;
                tokio::time::sleep(Duration::from_secs(backoff)).await;
                backoff *= 2;
                continue;
            }

            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message)
                .unwrap_or(text);
            return Err(EnrichError::Api {
                status: status.as_u16(),
                message,
            });
        }
    }
}

#[async_trait]
impl Enricher for OpenAiAgent {
    async fn summarize(&self, feedback: &str) -> Result<String, EnrichError> {
        info!("Requesting feedback summary ({} chars)", feedback.len());

        let body = ChatRequest {
            model: CHAT_MODEL.to_string(),
            max_tokens: 300,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: format!(
                        "Summarize this feedback in one sentence and generate a DALL·E prompt \
                         that visually represents it: '{feedback}'"
                    ),
                },
            ],
        };

        let text = self.post_with_retry(CHAT_URL, &body).await?;
        let parsed: ChatResponse = serde_json::from_str(&text)?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(EnrichError::EmptyResponse("completion"))
    }

    async fn generate_image(&self, prompt: &str) -> Result<String, EnrichError> {
        info!("Requesting illustration for prompt ({} chars)", prompt.len());

        let body = ImageRequest {
            model: IMAGE_MODEL.to_string(),
            prompt: prompt.to_string(),
            size: "1024x1024".to_string(),
            n: 1,
        };

        let text = self.post_with_retry(IMAGE_URL, &body).await?;
        let parsed: ImageResponse = serde_json::from_str(&text)?;

        parsed
            .data
            .into_iter()
            .next()
            .and_then(|d| d.url)
            .ok_or(EnrichError::EmptyResponse("image"))
    }
}
