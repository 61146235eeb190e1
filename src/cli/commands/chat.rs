//! Interactive chat command.

use crate::assistant::{Assistant, Submission, MISSING_CREDENTIAL_NOTICE};
use crate::cli::preflight;
use crate::cli::Output;
use crate::config::Settings;
use crate::session::{Credential, Session};
use anyhow::Result;
use console::{style, Term};
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(api_key: Option<&str>, model: Option<String>, settings: Settings) -> Result<()> {
    let assistant = Assistant::hosted(settings.clone(), model)?;

    println!("\n{}", style("MathGPT").bold().cyan());
    println!(
        "{}\n",
        style("Type your questions, 'history' to show the conversation, or 'exit' to quit.").dim()
    );

    let credential = match preflight::credential(api_key, &settings) {
        Some(credential) => Some(credential),
        None => prompt_for_key()?,
    };
    let Some(credential) = credential else {
        Output::info(MISSING_CREDENTIAL_NOTICE);
        return Ok(());
    };

    let mut session = assistant.new_session(Some(credential));
    for message in session.conversation().all() {
        Output::message(message);
    }
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("history") {
            print_history(&session);
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        let outcome = assistant.submit(&mut session, input).await;
        spinner.finish_and_clear();

        match outcome {
            Submission::Answered { answer, trace, .. } => {
                Output::trace(&trace);
                println!("\n{} {}\n", style("MathGPT:").cyan().bold(), answer);
            }
            Submission::EmptyQuestion { warning } => Output::warning(&warning),
            Submission::Locked { notice } => Output::info(&notice),
            Submission::Failed { error } => Output::error(&error),
        }
    }

    Ok(())
}

/// Ask for the key without echoing it. Blank input means no key.
fn prompt_for_key() -> Result<Option<Credential>> {
    let term = Term::stdout();
    term.write_str(&format!("{} ", style("Groq API Key:").bold()))?;
    let key = term.read_secure_line()?;
    Ok(Credential::new(key))
}

fn print_history(session: &Session) {
    Output::header("Conversation");
    for message in session.conversation().all() {
        Output::message(message);
    }
    println!();
}
