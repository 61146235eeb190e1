//! Submission flow: credential gate, dispatch and transcript updates.
//!
//! Every surface (one-shot CLI, terminal chat, HTTP API) hands a question and
//! the user's [`Session`] to [`Assistant::submit`] and renders the returned
//! [`Submission`].

use crate::agent::{Agent, TraceStep};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::llm::{ChatModel, HostedModel};
use crate::session::{Credential, Message, Session};
use crate::tools::ToolRegistry;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Shown while no API key has been supplied.
pub const MISSING_CREDENTIAL_NOTICE: &str = "Please add your Groq API key to continue";

/// Shown when the question is empty.
pub const EMPTY_QUESTION_WARNING: &str = "Please enter a question.";

/// Builds an agent bound to one credential.
pub trait AgentFactory: Send + Sync {
    fn build(&self, credential: &Credential) -> Result<Agent>;
}

/// Agents backed by the hosted model and the standard tools.
pub struct HostedAgentFactory {
    settings: Settings,
    prompts: Prompts,
}

impl HostedAgentFactory {
    /// Create a factory, loading custom prompts if configured.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;
        Ok(Self { settings, prompts })
    }

    /// Use a specific model name instead of the configured one.
    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.settings.model.name = model;
        }
        self
    }
}

impl AgentFactory for HostedAgentFactory {
    fn build(&self, credential: &Credential) -> Result<Agent> {
        let model: Arc<dyn ChatModel> = Arc::new(HostedModel::new(&self.settings.model, credential)?);
        let tools = ToolRegistry::standard(&self.settings, &self.prompts, model.clone())?;

        Ok(Agent::new(model, tools)
            .with_settings(&self.settings.agent)
            .with_prompts(self.prompts.clone()))
    }
}

/// Outcome of one submission.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Submission {
    /// No credential; nothing happened.
    Locked { notice: String },
    /// Blank question; nothing happened.
    EmptyQuestion { warning: String },
    /// The agent answered; question and answer were appended.
    Answered {
        answer: String,
        trace: Vec<TraceStep>,
        iterations: usize,
    },
    /// The run failed; only the question was appended.
    Failed { error: String },
}

/// Runs submissions against sessions.
pub struct Assistant {
    settings: Settings,
    factory: Arc<dyn AgentFactory>,
}

impl Assistant {
    pub fn new(settings: Settings, factory: Arc<dyn AgentFactory>) -> Self {
        Self { settings, factory }
    }

    /// Assistant backed by the hosted model.
    pub fn hosted(settings: Settings, model: Option<String>) -> Result<Self> {
        let factory = HostedAgentFactory::new(settings.clone())?.with_model(model);
        Ok(Self::new(settings, Arc::new(factory)))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// A fresh session seeded with the configured greeting.
    pub fn new_session(&self, credential: Option<Credential>) -> Session {
        Session::new(&self.settings.general.greeting).with_credential(credential)
    }

    /// Answer one question for a session.
    #[instrument(skip(self, session), fields(session = %session.id))]
    pub async fn submit(&self, session: &mut Session, question: &str) -> Submission {
        let Some(credential) = session.credential() else {
            info!("Submission refused: no credential");
            return Submission::Locked {
                notice: MISSING_CREDENTIAL_NOTICE.to_string(),
            };
        };

        let question = question.trim();
        if question.is_empty() {
            return Submission::EmptyQuestion {
                warning: EMPTY_QUESTION_WARNING.to_string(),
            };
        }

        let agent = match self.factory.build(credential) {
            Ok(agent) => agent,
            Err(e) => {
                error!("Could not set up agent: {}", e);
                return Submission::Failed {
                    error: e.to_string(),
                };
            }
        };

        let conversation = session.conversation_mut();
        let history = conversation.recent(agent.history_window()).to_vec();
        conversation.append(Message::user(question));

        match agent.run(question, &history).await {
            Ok(response) => {
                conversation.append(Message::assistant(response.answer.clone()));
                Submission::Answered {
                    answer: response.answer,
                    trace: response.trace,
                    iterations: response.iterations,
                }
            }
            Err(e) => {
                error!("Agent run failed: {}", e);
                Submission::Failed {
                    error: format!("Agent failed: {}", e),
                }
            }
        }
    }
}
