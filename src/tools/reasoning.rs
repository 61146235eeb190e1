//! Single-turn reasoning tool.

use super::Tool;
use crate::config::Prompts;
use crate::error::Result;
use crate::llm::ChatModel;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

/// Applies the reasoning template to the query and returns the completion.
pub struct ReasoningTool {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
}

impl ReasoningTool {
    pub fn new(model: Arc<dyn ChatModel>, prompts: Prompts) -> Self {
        Self { model, prompts }
    }
}

#[async_trait]
impl Tool for ReasoningTool {
    fn name(&self) -> &str {
        "Reasoning Tool"
    }

    fn description(&self) -> &str {
        "Answer logic-based and reasoning questions."
    }

    #[instrument(skip(self), fields(tool = "Reasoning Tool"))]
    async fn invoke(&self, query: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), query.to_string());
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.reasoning.template, &vars);

        self.model.complete(&prompt, &[]).await
    }
}
