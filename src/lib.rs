//! MathGPT - AI Math & Knowledge Assistant
//!
//! A chat assistant that answers questions with a zero-shot ReAct agent
//! running on a hosted, OpenAI-compatible model (Groq by default).
//!
//! # Overview
//!
//! The agent can call three tools:
//! - `Wikipedia` - summaries of the best matching Wikipedia pages
//! - `Calculator` - the model writes an expression, a local evaluator computes it
//! - `Reasoning Tool` - a single templated step-by-step completion
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `session` - Credential, conversation transcript and session table
//! - `llm` - Chat model abstraction and the hosted client
//! - `tools` - Tool trait, registry and the built-in tools
//! - `agent` - Output parser and the think/act/observe loop
//! - `assistant` - Credential gate and submission flow
//! - `cli` - Command line, terminal chat and HTTP API
//!
//! # Example
//!
//! ```rust,no_run
//! use mathgpt::assistant::{Assistant, Submission};
//! use mathgpt::config::Settings;
//! use mathgpt::session::Credential;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let assistant = Assistant::hosted(settings, None)?;
//!     let mut session = assistant.new_session(Credential::new("gsk_..."));
//!
//!     if let Submission::Answered { answer, .. } =
//!         assistant.submit(&mut session, "What is 12 * (3 + 4)?").await
//!     {
//!         println!("{}", answer);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod error;
pub mod llm;
pub mod session;
pub mod tools;

pub use error::{MathGptError, Result};
