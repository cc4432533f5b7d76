//! Generative language model seam used for explanations and translations.
//!
//! A handle is chosen once at startup: a chat-completions client when a
//! credential is configured and degraded mode is off, otherwise [`DisabledModel`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::AssistantConfig;

const TEMPERATURE: f32 = 0.2;
pub const MAX_TOKENS: u32 = 220;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("language model disabled")]
    Disabled,
    #[error("language model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("language model returned status {0}")]
    Status(u16),
    #[error("language model returned no content")]
    EmptyResponse,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// False for handles that never reach a model.
    fn is_available(&self) -> bool {
        true
    }

    /// Single-attempt completion for one user prompt.
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;
}

/// Null handle used without a credential or in degraded mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledModel;

#[async_trait]
impl LanguageModel for DisabledModel {
    fn is_available(&self) -> bool {
        false
    }

    async fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
        Err(ModelError::Disabled)
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible `/chat/completions` client.
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl ChatCompletionsClient {
    pub fn new(config: &AssistantConfig, api_key: &str) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: completions_endpoint(&config.base_url),
            model: config.model.clone(),
            api_key: api_key.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn completions_endpoint(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_string()
    } else if base.ends_with("/v1") {
        format!("{base}/chat/completions")
    } else {
        format!("{base}/v1/chat/completions")
    }
}

#[async_trait]
impl LanguageModel for ChatCompletionsClient {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ModelError::Status(status.as_u16()));
        }

        let payload: ChatResponse = response.json().await?;
        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(ModelError::EmptyResponse)?;

        debug!(model = %self.model, chars = content.len(), "language model completed");
        Ok(content)
    }
}

/// Picks the model handle for the process lifetime.
pub fn select_model(config: &AssistantConfig) -> Arc<dyn LanguageModel> {
    let api_key = match (&config.api_key, config.degraded) {
        (Some(key), false) => key,
        (_, true) => {
            debug!("degraded mode: language model disabled");
            return Arc::new(DisabledModel);
        }
        (None, false) => {
            debug!("no API key configured: language model disabled");
            return Arc::new(DisabledModel);
        }
    };

    match ChatCompletionsClient::new(config, api_key) {
        Ok(client) => Arc::new(client),
        Err(err) => {
            warn!(error = %err, "could not build language model client, continuing without it");
            Arc::new(DisabledModel)
        }
    }
}
