//! Tools the agent can call.
//!
//! Every tool takes a text query and returns a text result. The agent picks
//! tools by name, using each tool's description to decide.

mod calculator;
mod expr;
mod knowledge;
mod reasoning;

pub use calculator::CalculatorTool;
pub use expr::{evaluate, format_number};
pub use knowledge::WikipediaTool;
pub use reasoning::ReasoningTool;

use crate::config::{Prompts, Settings};
use crate::error::{MathGptError, Result};
use crate::llm::ChatModel;
use async_trait::async_trait;
use std::sync::Arc;

/// A named capability the agent can invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model uses to select the tool.
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// Run the tool on a text query.
    async fn invoke(&self, query: &str) -> Result<String>;
}

/// Ordered set of tools with unique names.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The three built-in tools: Wikipedia, Calculator and Reasoning Tool.
    pub fn standard(settings: &Settings, prompts: &Prompts, model: Arc<dyn ChatModel>) -> Result<Self> {
        let mut registry = Self::new();
        registry.register(Arc::new(WikipediaTool::new(&settings.knowledge)?))?;
        registry.register(Arc::new(CalculatorTool::new(model.clone(), prompts.clone())))?;
        registry.register(Arc::new(ReasoningTool::new(model, prompts.clone())))?;
        Ok(registry)
    }

    /// Add a tool. Names must be unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        if self.get(tool.name()).is_some() {
            return Err(MathGptError::Config(format!(
                "Tool '{}' is already registered",
                tool.name()
            )));
        }
        self.tools.push(tool);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// One `name: description` line per tool.
    pub fn describe(&self) -> String {
        self.tools
            .iter()
            .map(|t| format!("{}: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FixedTool;
    use super::*;
    use crate::llm::scripted::ScriptedModel;

    #[test]
    fn test_standard_registry_order() {
        let model = Arc::new(ScriptedModel::new(Vec::<String>::new()));
        let registry = ToolRegistry::standard(&Settings::default(), &Prompts::default(), model).unwrap();

        assert_eq!(registry.names(), ["Wikipedia", "Calculator", "Reasoning Tool"]);
        assert_eq!(
            registry.describe(),
            "Wikipedia: Search the Internet for relevant information.\n\
             Calculator: Answer math-related questions.\n\
             Reasoning Tool: Answer logic-based and reasoning questions."
        );
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut registry = ToolRegistry::new();
        registry.register(FixedTool::ok("Echo", "a")).unwrap();
        let err = registry.register(FixedTool::ok("Echo", "b")).unwrap_err();
        assert!(matches!(err, MathGptError::Config(_)));
        assert_eq!(registry.len(), 1);
    }
}
