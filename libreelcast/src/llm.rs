//! Chat-completion backend for content generation
//!
//! The generation service talks to the model through the `ChatBackend`
//! trait so tests can substitute a fake. The real implementation wraps
//! the async-openai client and works against any OpenAI-compatible API.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::config::{Config, ENV_OPENAI_API_KEY, ENV_OPENAI_BASE_URL};
use crate::error::{GenerationError, Result};

/// A single system+user chat exchange
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Run one exchange and return the first completion's text.
    ///
    /// An empty completion is returned as an empty string, not an error.
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String>;
}

/// Backend over an OpenAI-compatible chat-completion API
pub struct OpenAiBackend {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiBackend {
    pub fn new(api_key: String, model: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        Self {
            client: Arc::new(Client::with_config(config)),
            model,
        }
    }

    pub fn with_api_base(api_key: String, model: String, api_base: String) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key)
            .with_api_base(api_base);
        Self {
            client: Arc::new(Client::with_config(config)),
            model,
        }
    }

    /// Build a backend from environment credentials
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::NotConfigured` if the API key is absent.
    pub fn from_env(model: String) -> Result<Self> {
        let api_key = std::env::var(ENV_OPENAI_API_KEY).map_err(|_| {
            GenerationError::NotConfigured(format!(
                "text generation credentials missing. Set {} in your environment.",
                ENV_OPENAI_API_KEY
            ))
        })?;

        Ok(match std::env::var(ENV_OPENAI_BASE_URL) {
            Ok(api_base) => Self::with_api_base(api_key, model, api_base),
            Err(_) => Self::new(api_key, model),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    async fn complete(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()
                .map_err(|e| GenerationError::Api(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()
                .map_err(|e| GenerationError::Api(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(temperature)
            .build()
            .map_err(|e| GenerationError::Api(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| GenerationError::Api(e.to_string()))?;

        debug!(
            model = %self.model,
            choices = response.choices.len(),
            "received chat completion"
        );

        Ok(response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default())
    }
}

/// Backend used when no API key is configured
///
/// Every call reports a configuration error without attempting a network
/// request, so posting-only workflows work on machines without a key.
pub struct UnconfiguredBackend;

#[async_trait]
impl ChatBackend for UnconfiguredBackend {
    async fn complete(&self, _system: &str, _user: &str, _temperature: f32) -> Result<String> {
        Err(GenerationError::NotConfigured(format!(
            "text generation credentials missing. Set {} in your environment.",
            ENV_OPENAI_API_KEY
        ))
        .into())
    }
}

/// Build the chat backend from configuration and environment
///
/// Presence of the API key gates whether real calls are attempted; absence
/// yields a backend that fails fast with a configuration error.
pub fn backend_from_env(config: &Config) -> Arc<dyn ChatBackend> {
    match OpenAiBackend::from_env(config.generation.model.clone()) {
        Ok(backend) => Arc::new(backend),
        Err(_) => Arc::new(UnconfiguredBackend),
    }
}
