//! Agent runner: the think/act/observe loop.

use super::parser::{parse_output, AgentStep};
use crate::config::{AgentSettings, Prompts};
use crate::error::{MathGptError, Result};
use crate::llm::ChatModel;
use crate::session::Message;
use crate::tools::ToolRegistry;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// The model stops before writing an observation itself.
const STOP_SEQUENCES: [&str; 2] = ["\nObservation:", "\n\tObservation:"];

/// Zero-shot ReAct agent over a fixed tool registry.
pub struct Agent {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    prompts: Prompts,
    max_iterations: usize,
    handle_parsing_errors: bool,
    max_parse_errors: usize,
    history_window: usize,
}

/// Dispatcher states. A run starts in `Thinking` and ends in `Finished`.
enum RunState {
    Thinking,
    Acting {
        tool: String,
        input: String,
        log: String,
    },
    Observing(TraceStep),
    Finished(String),
}

impl Agent {
    /// Create an agent with default agent settings and prompts.
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry) -> Self {
        let defaults = AgentSettings::default();
        Self {
            model,
            tools,
            prompts: Prompts::default(),
            max_iterations: defaults.max_iterations,
            handle_parsing_errors: defaults.handle_parsing_errors,
            max_parse_errors: defaults.max_parse_errors,
            history_window: defaults.history_window,
        }
    }

    /// Apply iteration, parsing and history settings.
    pub fn with_settings(mut self, settings: &AgentSettings) -> Self {
        self.max_iterations = settings.max_iterations;
        self.handle_parsing_errors = settings.handle_parsing_errors;
        self.max_parse_errors = settings.max_parse_errors;
        self.history_window = settings.history_window;
        self
    }

    /// Set custom prompts.
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Whether malformed output is fed back to the model, and how often.
    pub fn with_parsing_errors(mut self, handle: bool, max_errors: usize) -> Self {
        self.handle_parsing_errors = handle;
        self.max_parse_errors = max_errors;
        self
    }

    /// Number of previous conversation messages shown to the model.
    pub fn with_history_window(mut self, messages: usize) -> Self {
        self.history_window = messages;
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// How many prior messages callers should pass to [`Agent::run`].
    pub fn history_window(&self) -> usize {
        self.history_window
    }

    /// Answer `question`. `history` holds the prior messages shown to the model.
    #[instrument(skip(self, history), fields(model = self.model.name()))]
    pub async fn run(&self, question: &str, history: &[Message]) -> Result<AgentResponse> {
        let stop: Vec<String> = STOP_SEQUENCES.iter().map(|s| s.to_string()).collect();
        let mut trace: Vec<TraceStep> = Vec::new();
        let mut iterations = 0;
        let mut parse_errors = 0;
        let mut state = RunState::Thinking;

        loop {
            state = match state {
                RunState::Thinking => {
                    iterations += 1;
                    if iterations > self.max_iterations {
                        return Err(MathGptError::Agent(format!(
                            "Agent exceeded maximum iterations ({})",
                            self.max_iterations
                        )));
                    }

                    debug!("Agent iteration {}", iterations);

                    let prompt = self.build_prompt(question, history, &trace);
                    let reply = self.model.complete(&prompt, &stop).await?;
                    let reply = truncate_at_stop(&reply, &stop);

                    match parse_output(reply) {
                        AgentStep::Act { tool, input, log } => RunState::Acting { tool, input, log },
                        AgentStep::Finish { answer, .. } => RunState::Finished(answer),
                        AgentStep::ParseError { message, log } => {
                            parse_errors += 1;
                            if !self.handle_parsing_errors || parse_errors > self.max_parse_errors {
                                return Err(MathGptError::Parse(message));
                            }
                            warn!("Malformed agent output ({}/{}): {}", parse_errors, self.max_parse_errors, message);
                            RunState::Observing(TraceStep {
                                log,
                                action: StepAction::InvalidOutput,
                                observation: message,
                            })
                        }
                    }
                }

                RunState::Acting { tool, input, log } => {
                    let observation = self.invoke_tool(&tool, &input).await;
                    RunState::Observing(TraceStep {
                        log,
                        action: StepAction::Tool { tool, input },
                        observation,
                    })
                }

                RunState::Observing(step) => {
                    debug!("Observation: {}", step.observation);
                    trace.push(step);
                    RunState::Thinking
                }

                RunState::Finished(answer) => {
                    info!("Agent finished after {} iteration(s)", iterations);
                    return Ok(AgentResponse {
                        answer,
                        trace,
                        iterations,
                    });
                }
            };
        }
    }

    /// Run one tool. Failures become observation text.
    async fn invoke_tool(&self, name: &str, input: &str) -> String {
        let Some(tool) = self.tools.get(name) else {
            warn!("Agent selected unknown tool: {}", name);
            return format!(
                "{} is not a valid tool, try one of [{}].",
                name,
                self.tools.names().join(", ")
            );
        };

        info!("Agent calling tool: {} with input: {}", name, input);

        match tool.invoke(input).await {
            Ok(output) => output,
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                format!("Tool error: {}", e)
            }
        }
    }

    fn build_prompt(&self, question: &str, history: &[Message], trace: &[TraceStep]) -> String {
        let prompts = &self.prompts;

        let mut vars = HashMap::new();
        vars.insert("tool_names".to_string(), self.tools.names().join(", "));
        let format_instructions = prompts.render_with_custom(&prompts.agent.format_instructions, &vars);

        let mut vars = HashMap::new();
        vars.insert("input".to_string(), question.to_string());
        vars.insert("agent_scratchpad".to_string(), scratchpad(trace));
        let suffix = prompts.render_with_custom(&prompts.agent.suffix, &vars);

        let mut prompt = format!(
            "{}\n\n{}\n\n{}\n\n",
            prompts.agent.prefix,
            self.tools.describe(),
            format_instructions
        );

        if !history.is_empty() {
            prompt.push_str("Previous conversation:\n");
            for message in history {
                prompt.push_str(&format!("{}: {}\n", message.role, message.content));
            }
            prompt.push('\n');
        }

        prompt.push_str(&suffix);
        prompt
    }
}

/// Render completed steps the way the model is expected to continue them.
fn scratchpad(trace: &[TraceStep]) -> String {
    trace
        .iter()
        .map(|step| format!("{}\nObservation: {}\nThought: ", step.log, step.observation))
        .collect()
}

/// Cut a completion at the first stop sequence, for providers that overrun it.
fn truncate_at_stop<'a>(reply: &'a str, stop: &[String]) -> &'a str {
    stop.iter()
        .filter_map(|s| reply.find(s.as_str()))
        .min()
        .map_or(reply, |end| &reply[..end])
}

/// Response from an agent run.
#[derive(Debug, Clone, Serialize)]
pub struct AgentResponse {
    /// The final answer.
    pub answer: String,
    /// Every step taken before the answer.
    pub trace: Vec<TraceStep>,
    /// Number of model calls used.
    pub iterations: usize,
}

/// One think/act/observe step.
#[derive(Debug, Clone, Serialize)]
pub struct TraceStep {
    /// Raw model output for this step.
    pub log: String,
    #[serde(flatten)]
    pub action: StepAction,
    /// Raw tool output, or the correction fed back after malformed output.
    pub observation: String,
}

/// What a trace step did.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepAction {
    Tool { tool: String, input: String },
    InvalidOutput,
}

impl std::fmt::Display for TraceStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.action {
            StepAction::Tool { tool, input } => write!(f, "{}({})", tool, input),
            StepAction::InvalidOutput => write!(f, "<invalid output>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::scripted::ScriptedModel;
    use crate::tools::testing::FixedTool;
    use crate::tools::CalculatorTool;

    fn registry(tools: Vec<Arc<dyn crate::tools::Tool>>) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register(tool).unwrap();
        }
        registry
    }

    #[tokio::test]
    async fn test_calculator_scenario() {
        let model = Arc::new(ScriptedModel::new([
            " I should compute this.\nAction: Calculator\nAction Input: 12 * (3 + 4)",
            "```text\n12 * (3 + 4)\n```\n",
            " I now know the final answer\nFinal Answer: 12 * (3 + 4) = 84",
        ]));
        let tools = registry(vec![Arc::new(CalculatorTool::new(model.clone(), Prompts::default()))]);
        let agent = Agent::new(model.clone(), tools);

        let response = agent.run("What is 12 * (3 + 4)?", &[]).await.unwrap();

        assert!(response.answer.contains("84"));
        assert_eq!(response.iterations, 2);
        assert_eq!(response.trace.len(), 1);
        assert_eq!(
            response.trace[0].action,
            StepAction::Tool {
                tool: "Calculator".to_string(),
                input: "12 * (3 + 4)".to_string()
            }
        );
        assert_eq!(response.trace[0].observation, "84");

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[0].contains("Calculator: Answer math-related questions."));
        assert!(prompts[0].ends_with("Question: What is 12 * (3 + 4)?\nThought:"));
        assert!(prompts[2].ends_with(
            "Action Input: 12 * (3 + 4)\nObservation: 84\nThought: "
        ));
    }

    #[tokio::test]
    async fn test_knowledge_scenario_records_observation_verbatim() {
        let summary = "Page: Alan Turing\nSummary: English mathematician and computer scientist.";
        let wiki = FixedTool::ok("Wikipedia", summary);
        let model = Arc::new(ScriptedModel::new([
            "Thought: look him up\nAction: Wikipedia\nAction Input: Alan Turing",
            " I now know the final answer\nFinal Answer: Alan Turing was an English mathematician and computer scientist.",
        ]));
        let agent = Agent::new(model.clone(), registry(vec![wiki.clone()]));

        let response = agent.run("Who was Alan Turing?", &[]).await.unwrap();

        assert!(response.answer.contains("English mathematician"));
        assert_eq!(wiki.inputs(), ["Alan Turing"]);
        assert_eq!(response.trace[0].observation, summary);
        assert!(model.prompts()[1].contains(&format!("Observation: {}\nThought: ", summary)));
    }

    #[tokio::test]
    async fn test_stop_sequences_sent_and_enforced() {
        let model = Arc::new(ScriptedModel::new([
            "Action: Echo\nAction Input: hi\nObservation: made up\nThought: done\nFinal Answer: wrong",
            "Final Answer: right",
        ]));
        let echo = FixedTool::ok("Echo", "hi back");
        let agent = Agent::new(model.clone(), registry(vec![echo.clone()]));

        let response = agent.run("say hi", &[]).await.unwrap();

        assert_eq!(response.answer, "right");
        assert_eq!(response.trace[0].observation, "hi back");
        assert_eq!(model.stops()[0], ["\nObservation:", "\n\tObservation:"]);
    }

    #[tokio::test]
    async fn test_parse_error_is_fed_back_when_tolerated() {
        let model = Arc::new(ScriptedModel::new(["I think it is four.", "Final Answer: 4"]));
        let agent = Agent::new(model.clone(), registry(vec![FixedTool::ok("Echo", "x")]));

        let response = agent.run("2 + 2?", &[]).await.unwrap();

        assert_eq!(response.answer, "4");
        assert_eq!(response.trace[0].action, StepAction::InvalidOutput);
        assert!(response.trace[0].observation.contains("Missing 'Action:'"));
        assert!(model.prompts()[1].contains("I think it is four.\nObservation: Invalid Format"));
    }

    #[tokio::test]
    async fn test_parse_error_fatal_when_not_tolerated() {
        let model = Arc::new(ScriptedModel::new(["no format here", "Final Answer: never"]));
        let agent = Agent::new(model.clone(), registry(vec![FixedTool::ok("Echo", "x")]))
            .with_parsing_errors(false, 3);

        let err = agent.run("q", &[]).await.unwrap_err();
        assert!(matches!(err, MathGptError::Parse(_)));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_parse_error_tolerance_is_bounded() {
        let model = Arc::new(ScriptedModel::new(["bad", "still bad", "Final Answer: late"]));
        let agent = Agent::new(model.clone(), registry(vec![FixedTool::ok("Echo", "x")]))
            .with_parsing_errors(true, 1);

        let err = agent.run("q", &[]).await.unwrap_err();
        assert!(matches!(err, MathGptError::Parse(_)));
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn test_unknown_tool_becomes_observation() {
        let model = Arc::new(ScriptedModel::new([
            "Action: Search\nAction Input: cats",
            "Final Answer: no idea",
        ]));
        let agent = Agent::new(
            model,
            registry(vec![FixedTool::ok("Wikipedia", "w"), FixedTool::ok("Calculator", "c")]),
        );

        let response = agent.run("cats?", &[]).await.unwrap();
        assert_eq!(
            response.trace[0].observation,
            "Search is not a valid tool, try one of [Wikipedia, Calculator]."
        );
    }

    #[tokio::test]
    async fn test_tool_error_is_not_fatal() {
        let model = Arc::new(ScriptedModel::new([
            "Action: Wikipedia\nAction Input: Turing",
            "Final Answer: I could not look that up.",
        ]));
        let agent = Agent::new(model, registry(vec![FixedTool::failing("Wikipedia", "connection refused")]));

        let response = agent.run("Who was Turing?", &[]).await.unwrap();
        assert!(response.trace[0].observation.starts_with("Tool error:"));
        assert!(response.trace[0].observation.contains("connection refused"));
        assert_eq!(response.answer, "I could not look that up.");
    }

    #[tokio::test]
    async fn test_model_error_is_fatal() {
        let model = Arc::new(ScriptedModel::with_results([Err(MathGptError::Model(
            "401 invalid api key".to_string(),
        ))]));
        let agent = Agent::new(model, registry(vec![FixedTool::ok("Echo", "x")]));

        let err = agent.run("q", &[]).await.unwrap_err();
        assert!(matches!(err, MathGptError::Model(_)));
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let model = Arc::new(ScriptedModel::new([
            "Action: Echo\nAction Input: 1",
            "Action: Echo\nAction Input: 2",
            "Action: Echo\nAction Input: 3",
        ]));
        let echo = FixedTool::ok("Echo", "again");
        let agent = Agent::new(model.clone(), registry(vec![echo.clone()])).with_max_iterations(2);

        let err = agent.run("loop", &[]).await.unwrap_err();
        assert!(matches!(err, MathGptError::Agent(_)));
        assert_eq!(model.calls(), 2);
        assert_eq!(echo.inputs(), ["1", "2"]);
    }

    #[tokio::test]
    async fn test_history_rendered_before_question() {
        let history = vec![Message::user("What is 2 + 2?"), Message::assistant("4")];

        let model = Arc::new(ScriptedModel::new(["Final Answer: 8", "Final Answer: 8"]));
        let agent = Agent::new(model.clone(), registry(vec![FixedTool::ok("Echo", "x")]));
        agent.run("And doubled?", &[]).await.unwrap();
        assert!(!model.prompts()[0].contains("Previous conversation"));

        agent.run("And doubled?", &history).await.unwrap();
        let prompt = &model.prompts()[1];
        assert!(prompt.contains("Previous conversation:\nuser: What is 2 + 2?\nassistant: 4\n\nBegin!"));
    }

    #[test]
    fn test_history_window_from_settings() {
        let model = Arc::new(ScriptedModel::new(Vec::<String>::new()));
        let settings = AgentSettings {
            history_window: 4,
            ..AgentSettings::default()
        };
        let agent = Agent::new(model, ToolRegistry::new()).with_settings(&settings);
        assert_eq!(agent.history_window(), 4);
        assert_eq!(agent.with_history_window(0).history_window(), 0);
    }

    #[test]
    fn test_truncate_at_stop() {
        let stop = vec!["\nObservation:".to_string()];
        assert_eq!(truncate_at_stop("a\nObservation: b", &stop), "a");
        assert_eq!(truncate_at_stop("plain", &stop), "plain");
    }

    #[test]
    fn test_trace_step_display_and_json() {
        let step = TraceStep {
            log: "Action: Calculator\nAction Input: 1+1".to_string(),
            action: StepAction::Tool {
                tool: "Calculator".to_string(),
                input: "1+1".to_string(),
            },
            observation: "2".to_string(),
        };
        assert_eq!(step.to_string(), "Calculator(1+1)");

        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["kind"], "tool");
        assert_eq!(json["tool"], "Calculator");
        assert_eq!(json["observation"], "2");
    }
}
