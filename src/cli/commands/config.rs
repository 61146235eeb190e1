//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the config command.
pub fn run_config(action: &ConfigAction, config_path: Option<&Path>, settings: Settings) -> Result<()> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(Settings::default_config_path);

    match action {
        ConfigAction::Show => show(&path, &settings),
        ConfigAction::Init { force } => init(&path, &settings, *force),
        ConfigAction::Edit => edit(&path, &settings),
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
    }
}

fn show(path: &Path, settings: &Settings) -> Result<()> {
    let rendered = toml::to_string_pretty(settings).context("Failed to serialize config")?;
    println!("{}", rendered);

    Output::header("Resolved");
    let source = if path.exists() { "file" } else { "built-in defaults" };
    Output::kv("Config", &format!("{} ({})", path.display(), source));
    Output::kv("Model", &format!("{} @ {}", settings.model.name, settings.model.api_base));
    Output::kv("Knowledge API", &settings.knowledge.endpoint());
    let key_state = if settings.api_key_from_env().is_some() {
        "set"
    } else {
        "not set"
    };
    Output::kv("API key", &format!("${} {}", settings.model.api_key_env, key_state));
    Ok(())
}

fn init(path: &Path, settings: &Settings, force: bool) -> Result<()> {
    if path.exists() && !force {
        Output::warning(&format!(
            "{} already exists; use --force to overwrite it.",
            path.display()
        ));
        return Ok(());
    }

    settings.save_to(&path.to_path_buf())?;
    Output::success(&format!("Wrote config to {}", path.display()));
    Ok(())
}

fn edit(path: &Path, settings: &Settings) -> Result<()> {
    if !path.exists() {
        settings.save_to(&path.to_path_buf())?;
        Output::info(&format!("Created default config at {}", path.display()));
    }

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());
    Output::info(&format!("Opening config in {}...", editor));

    match std::process::Command::new(&editor).arg(path).status() {
        Ok(status) if status.success() => {
            // Catch syntax errors now rather than on the next run.
            match Settings::load_from(Some(&path.to_path_buf())) {
                Ok(_) => Output::success("Config saved."),
                Err(e) => Output::warning(&format!("Config saved but does not parse: {}", e)),
            }
        }
        Ok(_) => Output::warning("Editor exited with non-zero status."),
        Err(e) => {
            Output::error(&format!("Failed to open editor: {}", e));
            Output::info(&format!("Config file is at: {}", path.display()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_and_respects_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.model.name = "first".to_string();
        run_config(&ConfigAction::Init { force: false }, Some(&path), settings).unwrap();
        assert_eq!(Settings::load_from(Some(&path)).unwrap().model.name, "first");

        let mut settings = Settings::default();
        settings.model.name = "second".to_string();
        run_config(&ConfigAction::Init { force: false }, Some(&path), settings.clone()).unwrap();
        assert_eq!(Settings::load_from(Some(&path)).unwrap().model.name, "first");

        run_config(&ConfigAction::Init { force: true }, Some(&path), settings).unwrap();
        assert_eq!(Settings::load_from(Some(&path)).unwrap().model.name, "second");
    }
}
