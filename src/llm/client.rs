//! Hosted OpenAI-compatible client configuration (Groq by default).

use super::ChatModel;
use crate::config::ModelSettings;
use crate::error::{MathGptError, Result};
use crate::session::Credential;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs, Stop,
};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Create a client for an OpenAI-compatible endpoint with the given key and timeout.
pub fn create_client(
    api_base: &str,
    credential: &Credential,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let api_base = url::Url::parse(api_base)
        .map_err(|e| MathGptError::Config(format!("Invalid model API base '{}': {}", api_base, e)))?;

    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| MathGptError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let config = OpenAIConfig::new()
        .with_api_base(api_base.as_str().trim_end_matches('/'))
        .with_api_key(credential.expose());

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Chat model served by a hosted completion API.
pub struct HostedModel {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl HostedModel {
    /// Create a hosted model handle from settings and the session credential.
    pub fn new(settings: &ModelSettings, credential: &Credential) -> Result<Self> {
        let client = create_client(
            &settings.api_base,
            credential,
            Duration::from_secs(settings.timeout_secs),
        )?;

        Ok(Self {
            client,
            model: settings.name.clone(),
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl ChatModel for HostedModel {
    #[instrument(skip(self, prompt, stop), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn complete(&self, prompt: &str, stop: &[String]) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| MathGptError::Model(e.to_string()))?
                .into(),
        ];

        let mut request = CreateChatCompletionRequestArgs::default();
        request
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature);
        if !stop.is_empty() {
            request.stop(Stop::StringArray(stop.to_vec()));
        }
        let request = request
            .build()
            .map_err(|e| MathGptError::Model(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| MathGptError::Model(format!("Completion request failed: {}", e)))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| MathGptError::Model("Empty response from model".to_string()))?;

        debug!("Model returned {} characters", content.len());
        Ok(content)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
