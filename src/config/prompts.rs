//! Prompt templates for MathGPT.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Prompts {
    pub agent: AgentPrompts,
    pub calculator: CalculatorPrompts,
    pub reasoning: ReasoningPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for the zero-shot ReAct agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub prefix: String,
    /// Uses `{{tool_names}}`.
    pub format_instructions: String,
    /// Uses `{{input}}` and `{{agent_scratchpad}}`.
    pub suffix: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            prefix: "Answer the following questions as best you can. You have access to the following tools:"
                .to_string(),

            format_instructions: r#"Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{{tool_names}}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question"#
                .to_string(),

            suffix: r#"Begin!

Question: {{input}}
Thought:{{agent_scratchpad}}"#
                .to_string(),
        }
    }
}

/// Prompt for translating a math question into a calculator expression.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorPrompts {
    /// Uses `{{question}}`.
    pub template: String,
}

impl Default for CalculatorPrompts {
    fn default() -> Self {
        Self {
            template: r#"Translate a math problem into a single expression that a calculator can evaluate. The calculator understands numbers, + - * / % ^ **, parentheses, the constants pi and e, and the functions sqrt, abs, sin, cos, tan, asin, acos, atan, ln, log10, log2, exp, floor, ceil and round. Use the output of the calculator to answer the question.

Question: ${Question with math problem.}
```text
${single line mathematical expression that solves the problem}
```
...calculator.evaluate(text)...
```output
${Output of running the calculator}
```
Answer: ${Answer}

Begin.

Question: What is 37593 * 67?
```text
37593 * 67
```
...calculator.evaluate("37593 * 67")...
```output
2518731
```
Answer: 2518731

Question: 37593^(1/5)
```text
37593**(1/5)
```
...calculator.evaluate("37593**(1/5)")...
```output
8.222831614237718
```
Answer: 8.222831614237718

Question: {{question}}
"#
            .to_string(),
        }
    }
}

/// Prompt for the single-turn reasoning tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasoningPrompts {
    /// Uses `{{question}}`.
    pub template: String,
}

impl Default for ReasoningPrompts {
    fn default() -> Self {
        Self {
            template: r#"
You are an agent tasked with solving users' mathematical questions. Provide a clear and logical step-by-step explanation.
Question: {{question}}
Answer:
"#
            .to_string(),
        }
    }
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{\s*(\w+)\s*\}\}").expect("valid placeholder regex"))
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let agent_path = custom_path.join("agent.toml");
            if agent_path.exists() {
                let content = std::fs::read_to_string(&agent_path)?;
                prompts.agent = toml::from_str(&content)?;
            }

            let calculator_path = custom_path.join("calculator.toml");
            if calculator_path.exists() {
                let content = std::fs::read_to_string(&calculator_path)?;
                prompts.calculator = toml::from_str(&content)?;
            }

            let reasoning_path = custom_path.join("reasoning.toml");
            if reasoning_path.exists() {
                let content = std::fs::read_to_string(&reasoning_path)?;
                prompts.reasoning = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single pass: text inserted for one placeholder is never
    /// scanned again. Unknown placeholders are left untouched.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        placeholder()
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.agent.format_instructions.contains("{{tool_names}}"));
        assert!(prompts.reasoning.template.contains("Question: {{question}}\nAnswer:"));
        assert!(prompts.calculator.template.ends_with("Question: {{question}}\n"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let mut vars = HashMap::new();
        vars.insert("input".to_string(), "what is {{secret}}?".to_string());
        vars.insert("secret".to_string(), "leaked".to_string());

        let result = Prompts::render("Q: {{input}} / {{missing}}", &vars);
        assert_eq!(result, "Q: what is {{secret}}? / {{missing}}");
    }

    #[test]
    fn test_custom_variables_are_overridden_by_call_site() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("tone".to_string(), "formal".to_string());
        prompts.variables.insert("question".to_string(), "ignored".to_string());

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), "2+2?".to_string());

        let rendered = prompts.render_with_custom("[{{tone}}] {{question}}", &vars);
        assert_eq!(rendered, "[formal] 2+2?");
    }

    #[test]
    fn test_load_custom_reasoning_prompt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("reasoning.toml"),
            "template = \"Think hard. {{question}}\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.reasoning.template, "Think hard. {{question}}");
        assert!(prompts.agent.prefix.starts_with("Answer the following questions"));
    }
}
