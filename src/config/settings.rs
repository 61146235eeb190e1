//! Configuration settings for MathGPT.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub model: ModelSettings,
    pub agent: AgentSettings,
    pub knowledge: KnowledgeSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
    /// Greeting used to seed every new conversation.
    pub greeting: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            greeting: crate::session::DEFAULT_GREETING.to_string(),
        }
    }
}

/// Hosted chat-completion model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Model name sent with every completion request.
    pub name: String,
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// Environment variable the API key is read from.
    pub api_key_env: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: "gemma2-9b-it".to_string(),
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            temperature: 0.7,
            timeout_secs: 300,
        }
    }
}

/// Agent dispatcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// Maximum number of model calls in one run.
    pub max_iterations: usize,
    /// Feed malformed model output back to the model instead of failing.
    pub handle_parsing_errors: bool,
    /// Number of malformed outputs tolerated per run.
    pub max_parse_errors: usize,
    /// Prior conversation messages rendered into the agent prompt (0 = latest question only).
    pub history_window: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            handle_parsing_errors: true,
            max_parse_errors: 3,
            history_window: 0,
        }
    }
}

/// Wikipedia lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeSettings {
    /// Wikipedia language edition.
    pub lang: String,
    /// MediaWiki API endpoint; `{lang}` is replaced with the language.
    pub api_url: String,
    /// Number of pages summarized per lookup.
    pub top_k_results: usize,
    /// Maximum characters returned to the agent.
    pub max_chars: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for KnowledgeSettings {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            api_url: "https://{lang}.wikipedia.org/w/api.php".to_string(),
            top_k_results: 3,
            max_chars: 4000,
            timeout_secs: 30,
        }
    }
}

impl KnowledgeSettings {
    /// Endpoint with the language substituted.
    pub fn endpoint(&self) -> String {
        self.api_url.replace("{lang}", &self.lang)
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::MathGptError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathgpt")
            .join("config.toml")
    }

    /// Read the API key from the configured environment variable.
    pub fn api_key_from_env(&self) -> Option<String> {
        std::env::var(&self.model.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}
