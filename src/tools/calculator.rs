//! Calculator tool: the model writes an expression, the evaluator computes it.

use super::expr::{evaluate, format_number};
use super::Tool;
use crate::config::Prompts;
use crate::error::{MathGptError, Result};
use crate::llm::ChatModel;
use async_trait::async_trait;
use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tracing::{debug, instrument};

const STOP: &str = "```output";

fn expression_block() -> &'static Regex {
    static BLOCK: OnceLock<Regex> = OnceLock::new();
    BLOCK.get_or_init(|| Regex::new(r"(?s)```text(.*?)```").expect("valid expression regex"))
}

/// Answers math questions by translating them into an expression.
pub struct CalculatorTool {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
}

impl CalculatorTool {
    pub fn new(model: Arc<dyn ChatModel>, prompts: Prompts) -> Self {
        Self { model, prompts }
    }

    /// Turn the model's reply into a result string.
    fn interpret(reply: &str) -> Result<String> {
        let reply = reply.trim();

        if let Some(caps) = expression_block().captures(reply) {
            let expression = caps[1].trim();
            debug!("Evaluating expression: {}", expression);
            let value = evaluate(expression).map_err(|e| match e {
                MathGptError::Evaluation(msg) => {
                    MathGptError::Evaluation(format!("{} (expression: {})", msg, expression))
                }
                other => other,
            })?;
            return Ok(format_number(value));
        }

        if let Some((_, answer)) = reply.rsplit_once("Answer:") {
            return Ok(answer.trim().to_string());
        }

        Err(MathGptError::Evaluation(format!(
            "unknown format from LLM: {}",
            reply
        )))
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "Calculator"
    }

    fn description(&self) -> &str {
        "Answer math-related questions."
    }

    #[instrument(skip(self), fields(tool = "Calculator"))]
    async fn invoke(&self, query: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), query.to_string());
        let prompt = self
            .prompts
            .render_with_custom(&self.prompts.calculator.template, &vars);

        let reply = self.model.complete(&prompt, &[STOP.to_string()]).await?;
        Self::interpret(&reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::scripted::ScriptedModel;

    #[test]
    fn test_interpret_expression_block() {
        let reply = "```text\n12 * (3 + 4)\n```\n...calculator.evaluate(\"12 * (3 + 4)\")...\n";
        assert_eq!(CalculatorTool::interpret(reply).unwrap(), "84");
    }

    #[test]
    fn test_interpret_direct_answer() {
        assert_eq!(CalculatorTool::interpret("Answer: 42").unwrap(), "42");
        assert_eq!(
            CalculatorTool::interpret("It is simple.\nAnswer: 7 apples").unwrap(),
            "7 apples"
        );
    }

    #[test]
    fn test_interpret_unknown_format() {
        let err = CalculatorTool::interpret("I don't know").unwrap_err();
        assert!(err.to_string().contains("unknown format from LLM"));
    }

    #[test]
    fn test_interpret_bad_expression_names_it() {
        let err = CalculatorTool::interpret("```text\n1 / 0\n```").unwrap_err();
        assert!(err.to_string().contains("not a finite number"));
        assert!(err.to_string().contains("1 / 0"));
    }

    #[test]
    fn test_interpret_deeply_nested_block_is_error() {
        let reply = format!("```text\n{}2{}\n```", "(".repeat(10_000), ")".repeat(10_000));
        let err = CalculatorTool::interpret(&reply).unwrap_err();
        assert!(matches!(err, MathGptError::Evaluation(_)));
    }

    #[tokio::test]
    async fn test_invoke_renders_question_and_stops_at_output() {
        let model = Arc::new(ScriptedModel::new(["```text\n37593 * 67\n```\n"]));
        let tool = CalculatorTool::new(model.clone(), Prompts::default());

        let result = tool.invoke("What is 37593 times 67?").await.unwrap();
        assert_eq!(result, "2518731");

        let prompts = model.prompts();
        assert!(prompts[0].ends_with("Question: What is 37593 times 67?\n"));
        assert_eq!(model.stops()[0], vec!["```output".to_string()]);
    }
}
