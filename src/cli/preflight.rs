//! Pre-flight checks before talking to the model.
//!
//! Resolves the API key so commands fail early with a clear message instead
//! of on the first request.

use crate::config::Settings;
use crate::error::{MathGptError, Result};
use crate::session::Credential;

/// Pick the API key: the command-line flag wins over the environment.
pub fn credential(flag: Option<&str>, settings: &Settings) -> Option<Credential> {
    flag.and_then(Credential::new)
        .or_else(|| settings.api_key_from_env().and_then(Credential::new))
}

/// Like [`credential`], but a missing key is an error.
pub fn require_credential(flag: Option<&str>, settings: &Settings) -> Result<Credential> {
    credential(flag, settings).ok_or_else(|| {
        MathGptError::MissingCredential(format!(
            "pass --api-key or set it with: export {}='gsk_...'",
            settings.model.api_key_env
        ))
    })
}
