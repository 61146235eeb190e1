//! Configuration module for MathGPT.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, CalculatorPrompts, Prompts, ReasoningPrompts};
pub use settings::{
    AgentSettings, GeneralSettings, KnowledgeSettings, ModelSettings, PromptSettings, Settings,
};
