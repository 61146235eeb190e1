//! Ask command implementation.

use crate::assistant::{Assistant, Submission};
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    api_key: Option<&str>,
    model: Option<String>,
    settings: Settings,
) -> Result<()> {
    // Pre-flight checks
    let credential = match preflight::require_credential(api_key, &settings) {
        Ok(credential) => credential,
        Err(e) => {
            Output::error(&format!("{}", e));
            return Err(e.into());
        }
    };

    let assistant = Assistant::hosted(settings, model)?;
    let mut session = assistant.new_session(Some(credential));

    let spinner = Output::spinner("Thinking...");
    let outcome = assistant.submit(&mut session, question).await;
    spinner.finish_and_clear();

    match outcome {
        Submission::Answered {
            answer,
            trace,
            iterations,
        } => {
            println!("\n{}\n", answer);
            Output::trace(&trace);
            Output::info(&format!("Completed in {} iteration(s)", iterations));
        }
        Submission::EmptyQuestion { warning } => {
            Output::warning(&warning);
        }
        Submission::Locked { notice } => {
            Output::info(&notice);
        }
        Submission::Failed { error } => {
            Output::error(&error);
            anyhow::bail!(error);
        }
    }

    Ok(())
}
