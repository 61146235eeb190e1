//! Chat-completion model abstraction.
//!
//! The agent, the calculator and the reasoning tool all talk to the model
//! through [`ChatModel`], so the hosted client can be swapped out.

mod client;
#[cfg(test)]
pub(crate) mod scripted;

pub use client::{create_client, HostedModel};

use crate::error::Result;
use async_trait::async_trait;

/// A model that completes a single user prompt.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete `prompt`, cutting the completion at the first of `stop`.
    async fn complete(&self, prompt: &str, stop: &[String]) -> Result<String>;

    /// Model name, for logging.
    fn name(&self) -> &str;
}
