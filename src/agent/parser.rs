//! Parsing of ReAct-formatted model output.

use regex::Regex;
use std::sync::OnceLock;

const FINAL_ANSWER: &str = "Final Answer:";

pub const MISSING_ACTION: &str = "Invalid Format: Missing 'Action:' after 'Thought:'";
pub const MISSING_ACTION_INPUT: &str = "Invalid Format: Missing 'Action Input:' after 'Action:'";
pub const ACTION_AND_ANSWER: &str =
    "Parsing LLM output produced both a final answer and a parse-able action";

/// What the model decided to do in one thinking step.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStep {
    /// Invoke `tool` with `input`.
    Act {
        tool: String,
        input: String,
        log: String,
    },
    /// Stop with an answer.
    Finish { answer: String, log: String },
    /// The output did not follow the format.
    ParseError { message: String, log: String },
}

fn action_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
            .expect("valid action regex")
    })
}

fn action_only_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)").expect("valid action regex"))
}

fn action_input_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)").expect("valid action input regex")
    })
}

/// Classify one model completion.
pub fn parse_output(text: &str) -> AgentStep {
    let log = text.to_string();
    let includes_answer = text.contains(FINAL_ANSWER);

    if let Some(caps) = action_regex().captures(text) {
        if includes_answer {
            return AgentStep::ParseError {
                message: format!("{}: {}", ACTION_AND_ANSWER, text.trim()),
                log,
            };
        }

        let tool = caps[1].trim().to_string();
        let input = caps[2].trim().trim_matches('"').to_string();
        return AgentStep::Act { tool, input, log };
    }

    if includes_answer {
        let answer = text
            .rsplit(FINAL_ANSWER)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        return AgentStep::Finish { answer, log };
    }

    let message = if !action_only_regex().is_match(text) {
        MISSING_ACTION.to_string()
    } else if !action_input_regex().is_match(text) {
        MISSING_ACTION_INPUT.to_string()
    } else {
        format!("Could not parse LLM output: `{}`", text.trim())
    };

    AgentStep::ParseError { message, log }
}
