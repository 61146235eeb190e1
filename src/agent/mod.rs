//! Zero-shot ReAct agent.
//!
//! The model is prompted with the tool descriptions and a fixed
//! Thought/Action/Action Input/Observation format. Each completion is parsed
//! into an [`AgentStep`]; actions run exactly one tool and the raw output is
//! fed back as the observation until the model gives a final answer.

mod parser;
mod runner;

pub use parser::{parse_output, AgentStep};
pub use runner::{Agent, AgentResponse, StepAction, TraceStep};
