//! Text-generation client.
//!
//! The pipeline only needs "send a system + user message, get a string
//! back", so the service sits behind the [`TextGenerator`] trait. The real
//! implementation talks to an OpenAI-compatible `/chat/completions`
//! endpoint over HTTP.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use articlepress_shared::{ArticlePressError, GenerationTuning, LlmConfig, Result};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("ArticlePress/", env!("CARGO_PKG_VERSION"));

/// Maximum number of characters of an error body kept in error messages.
const ERROR_BODY_EXCERPT: usize = 300;

// ---------------------------------------------------------------------------
// Request type + trait
// ---------------------------------------------------------------------------

/// A single-turn chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Ask the service for a JSON object reply.
    pub json_response: bool,
}

impl ChatRequest {
    /// Build a request using the given sampling settings.
    pub fn new(system: impl Into<String>, user: impl Into<String>, tuning: GenerationTuning) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: tuning.temperature,
            max_tokens: tuning.max_tokens,
            json_response: false,
        }
    }

    /// Request a JSON object reply.
    pub fn json(mut self) -> Self {
        self.json_response = true;
        self
    }
}

/// Something that turns a chat request into reply text.
pub trait TextGenerator {
    /// Send `request` and return the trimmed reply text.
    fn complete(&self, request: &ChatRequest) -> impl Future<Output = Result<String>>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ApiReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

// ---------------------------------------------------------------------------
// OpenAI-compatible client
// ---------------------------------------------------------------------------

/// HTTP client for an OpenAI-compatible chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Build a client from the `[llm]` config and a resolved API key.
    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ArticlePressError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            model: config.model.clone(),
        })
    }

    /// Model ID sent with every request.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl TextGenerator for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.model, json = request.json_response))]
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let body = ApiRequest {
            model: &self.model,
            messages: vec![
                ApiMessage {
                    role: "system",
                    content: &request.system,
                },
                ApiMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request
                .json_response
                .then_some(ResponseFormat { kind: "json_object" }),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ArticlePressError::Network(format!("request to {} failed: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let excerpt: String = text.chars().take(ERROR_BODY_EXCERPT).collect();
            return Err(ArticlePressError::Llm(format!(
                "API returned {status}: {excerpt}"
            )));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| ArticlePressError::Llm(format!("invalid API response: {e}")))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                tokens_in = usage.prompt_tokens,
                tokens_out = usage.completion_tokens,
                "completion received"
            );
        }

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ArticlePressError::Llm("no choices in API response".into()))?
            .message
            .content
            .ok_or_else(|| ArticlePressError::Llm("empty message in API response".into()))?;

        Ok(content.trim().to_string())
    }
}
