//! Authentication methods for the Codex CLI.
//!
//! The CLI authenticates itself. This module only decides which credential,
//! if any, is injected into the child's environment:
//!
//! - an API key, given directly or read from the environment
//! - a stored login created by `codex login`
//! - nothing at all, letting the CLI use whatever it finds (the default)
//!
//! # Example
//!
//! ```no_run
//! use libcodex::config::auth::{has_cli_credentials, AuthMethod};
//!
//! let auth = if has_cli_credentials() {
//!     AuthMethod::CliLogin
//! } else {
//!     AuthMethod::ApiKeyFromEnv
//! };
//! # let _ = auth;
//! ```

use std::path::PathBuf;

use crate::{Error, Result};

/// Authentication method for the Codex CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthMethod {
    /// Use API key directly (passed via CODEX_API_KEY env var to subprocess).
    ApiKey(String),
    /// Read API key from CODEX_API_KEY, falling back to OPENAI_API_KEY.
    ApiKeyFromEnv,
    /// Require the stored login in `$CODEX_HOME/auth.json`.
    CliLogin,
    /// Inject nothing; the CLI resolves credentials on its own.
    #[default]
    Auto,
}

/// Environment variable the CLI reads its API key from.
pub const ENV_API_KEY: &str = "CODEX_API_KEY";
/// Secondary variable checked by [`AuthMethod::ApiKeyFromEnv`].
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable overriding the CLI's home directory.
pub const ENV_CODEX_HOME: &str = "CODEX_HOME";

/// The CLI's home directory: `$CODEX_HOME`, or `~/.codex`.
pub fn codex_home() -> PathBuf {
    match std::env::var_os(ENV_CODEX_HOME) {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".codex"),
    }
}

/// Where the CLI persists thread history, keyed by thread id.
pub fn sessions_dir() -> PathBuf {
    codex_home().join("sessions")
}

fn credentials_path() -> PathBuf {
    codex_home().join("auth.json")
}

/// Check if a stored CLI login exists.
///
/// This only checks for file existence, not validity.
pub fn has_cli_credentials() -> bool {
    credentials_path().exists()
}

/// Resolve an [`AuthMethod`] to the API key to inject, if any.
///
/// Returns an error if the method names a credential that cannot be found.
pub(crate) fn resolve_auth(method: &AuthMethod) -> Result<Option<String>> {
    match method {
        AuthMethod::ApiKey(key) => Ok(Some(key.clone())),

        AuthMethod::ApiKeyFromEnv => [ENV_API_KEY, ENV_OPENAI_API_KEY]
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|key| !key.is_empty()))
            .map(Some)
            .ok_or(Error::EnvVarNotFound { var: ENV_API_KEY }),

        AuthMethod::CliLogin => {
            let path = credentials_path();
            if path.exists() {
                Ok(None)
            } else {
                Err(Error::CredentialsNotFound {
                    path: path.display().to_string(),
                })
            }
        }

        AuthMethod::Auto => Ok(None),
    }
}
