//! Error types for MathGPT.

use thiserror::Error;

/// Library-level error type for MathGPT operations.
#[derive(Error, Debug)]
pub enum MathGptError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing API key: {0}")]
    MissingCredential(String),

    #[error("Model API error: {0}")]
    Model(String),

    #[error("Knowledge lookup failed: {0}")]
    Knowledge(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Could not parse agent output: {0}")]
    Parse(String),

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for MathGPT operations.
pub type Result<T> = std::result::Result<T, MathGptError>;
