//! CLI output formatting utilities.

use crate::agent::{StepAction, TraceStep};
use crate::session::{Message, Role};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print one transcript message.
    pub fn message(message: &Message) {
        let speaker = match message.role {
            Role::User => style("You:").green().bold(),
            Role::Assistant => style("MathGPT:").cyan().bold(),
        };
        println!("{} {}", speaker, message.content);
    }

    /// Print the intermediate steps of an agent run.
    pub fn trace(steps: &[TraceStep]) {
        if steps.is_empty() {
            return;
        }

        Output::header(&format!("Steps ({})", steps.len()));
        for step in steps {
            match &step.action {
                StepAction::Tool { tool, input } => {
                    println!("  {} {} {}", style("*").cyan(), style(tool).bold(), truncate(input, 60));
                }
                StepAction::InvalidOutput => {
                    println!("  {} {}", style("*").yellow(), style("invalid output").dim());
                }
            }
            println!("    {} {}", style("→").dim(), style(truncate(&step.observation, 200)).dim());
        }
        println!();
    }

    /// Create a spinner.
    pub fn spinner(msg: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }
}

/// Single-line preview, cut at `max_chars` characters.
fn truncate(s: &str, max_chars: usize) -> String {
    let flat = s.replace('\n', " ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let cut: String = flat.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("line one\nline two", 100), "line one line two");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
        assert_eq!(truncate("ééééééé", 5), "éé...");
    }
}
