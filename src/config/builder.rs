//! Client configuration and builder.
//!
//! This module provides the builder pattern for configuring the Codex CLI client.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use libcodex::config::ClientConfig;
//!
//! let config = ClientConfig::builder()
//!     .api_key("sk-...")
//!     .base_url("https://proxy.internal/v1")
//!     .timeout(Duration::from_secs(600))
//!     .build()?;
//! # Ok::<(), libcodex::Error>(())
//! ```

use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::auth::{resolve_auth, AuthMethod, ENV_API_KEY};
use crate::observer::ItemObserver;
use crate::{Error, Result};

/// Variable the CLI uses to tag the calling client.
pub const ENV_ORIGINATOR: &str = "CODEX_INTERNAL_ORIGINATOR_OVERRIDE";
/// Originator value set when the caller has not chosen one.
pub const ORIGINATOR: &str = "codex_sdk_rs";
/// Variable carrying the API endpoint override.
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";

/// Configuration for the Codex CLI client.
///
/// Use [`ClientConfig::builder()`] to create a new configuration. A config is
/// immutable once built and is shared by every thread of a client.
#[derive(Clone)]
pub struct ClientConfig {
    // Authentication
    pub(crate) auth_method: AuthMethod,
    pub(crate) api_key: Option<String>,
    pub(crate) base_url: Option<String>,

    // Process options
    pub(crate) cli_path: Option<PathBuf>,
    pub(crate) env_vars: HashMap<String, String>,
    pub(crate) inherit_env: bool,
    pub(crate) timeout: Option<Duration>,

    pub(crate) observer: Option<Arc<dyn ItemObserver>>,
}

impl ClientConfig {
    /// Create a new builder for ClientConfig.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Get the endpoint override if set.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn auth_method(&self) -> &AuthMethod {
        &self.auth_method
    }

    /// Get the CLI path override if set.
    pub fn cli_path(&self) -> Option<&PathBuf> {
        self.cli_path.as_ref()
    }

    /// Get the timeout for buffered turns if set.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn inherit_env(&self) -> bool {
        self.inherit_env
    }

    /// Get the item observer if set.
    pub fn observer(&self) -> Option<&Arc<dyn ItemObserver>> {
        self.observer.as_ref()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("auth_method", &redacted(&self.auth_method))
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("cli_path", &self.cli_path)
            .field("env_vars", &self.env_vars.keys().collect::<Vec<_>>())
            .field("inherit_env", &self.inherit_env)
            .field("timeout", &self.timeout)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

fn redacted(method: &AuthMethod) -> &'static str {
    match method {
        AuthMethod::ApiKey(_) => "ApiKey(<redacted>)",
        AuthMethod::ApiKeyFromEnv => "ApiKeyFromEnv",
        AuthMethod::CliLogin => "CliLogin",
        AuthMethod::Auto => "Auto",
    }
}

/// Builder for [`ClientConfig`].
///
/// This builder validates the configuration when [`build()`](ClientConfigBuilder::build) is called,
/// so credential problems surface before any process is spawned.
#[derive(Clone)]
pub struct ClientConfigBuilder {
    auth_method: AuthMethod,
    base_url: Option<String>,
    cli_path: Option<PathBuf>,
    env_vars: HashMap<String, String>,
    inherit_env: bool,
    timeout: Option<Duration>,
    observer: Option<Arc<dyn ItemObserver>>,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            auth_method: AuthMethod::default(),
            base_url: None,
            cli_path: None,
            env_vars: HashMap::new(),
            inherit_env: true, // Default: inherit parent environment
            timeout: None,
            observer: None,
        }
    }
}

impl fmt::Debug for ClientConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfigBuilder")
            .field("auth_method", &redacted(&self.auth_method))
            .field("base_url", &self.base_url)
            .field("cli_path", &self.cli_path)
            .field("inherit_env", &self.inherit_env)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ClientConfigBuilder {
    // -------------------------------------------------------------------------
    // Authentication methods
    // -------------------------------------------------------------------------

    /// Use API key directly (passed as CODEX_API_KEY to subprocess).
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.auth_method = AuthMethod::ApiKey(key.into());
        self
    }

    /// Read API key from CODEX_API_KEY or OPENAI_API_KEY at build time.
    pub fn api_key_from_env(mut self) -> Self {
        self.auth_method = AuthMethod::ApiKeyFromEnv;
        self
    }

    /// Require a stored login (run `codex login` first).
    pub fn cli_login(mut self) -> Self {
        self.auth_method = AuthMethod::CliLogin;
        self
    }

    /// Let the CLI find credentials itself (default behavior).
    pub fn auth_auto(mut self) -> Self {
        self.auth_method = AuthMethod::Auto;
        self
    }

    /// Set the authentication method explicitly.
    pub fn auth(mut self, method: AuthMethod) -> Self {
        self.auth_method = method;
        self
    }

    /// API endpoint override (passed as OPENAI_BASE_URL to subprocess).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    // -------------------------------------------------------------------------
    // Process options
    // -------------------------------------------------------------------------

    /// Path to codex CLI binary (default: bundled binary, then PATH).
    pub fn cli_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cli_path = Some(path.into());
        self
    }

    /// Timeout for buffered turns.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Add/override environment variable for subprocess.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Use exactly this environment for the subprocess.
    ///
    /// Replaces variables added with [`env`](Self::env) and disables
    /// inheritance of the parent environment.
    pub fn environment<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.env_vars = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self.inherit_env = false;
        self
    }

    /// Don't inherit parent environment (default: inherit).
    pub fn inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }

    /// Set an observer notified of item events for every turn.
    pub fn observer(mut self, observer: Arc<dyn ItemObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    // -------------------------------------------------------------------------
    // Build
    // -------------------------------------------------------------------------

    /// Build the configuration.
    ///
    /// This validates:
    /// - Authentication can be resolved
    /// - `base_url` is non-empty if set
    /// - `timeout` is non-zero if set
    ///
    /// Note: CLI existence is checked lazily at spawn time.
    pub fn build(self) -> Result<ClientConfig> {
        let api_key = resolve_auth(&self.auth_method)?;

        if let Some(ref url) = self.base_url {
            if url.trim().is_empty() {
                return Err(Error::InvalidConfig("base_url must not be empty".into()));
            }
        }

        if self.timeout == Some(Duration::ZERO) {
            return Err(Error::InvalidConfig("timeout must be non-zero".into()));
        }

        Ok(ClientConfig {
            auth_method: self.auth_method,
            api_key,
            base_url: self.base_url,
            cli_path: self.cli_path,
            env_vars: self.env_vars,
            inherit_env: self.inherit_env,
            timeout: self.timeout,
            observer: self.observer,
        })
    }
}

impl ClientConfig {
    /// Get the environment for the subprocess.
    ///
    /// `inherited` is the parent environment; it is ignored unless
    /// `inherit_env` is set. Entries are kept as `OsString` so inherited
    /// values that are not UTF-8 pass through untouched. Caller variables
    /// override inherited ones, and the reserved variables override both.
    pub(crate) fn build_env<I, K, V>(&self, inherited: I) -> HashMap<OsString, OsString>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let mut env: HashMap<OsString, OsString> = if self.inherit_env {
            inherited
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect()
        } else {
            HashMap::new()
        };
        env.extend(
            self.env_vars
                .iter()
                .map(|(k, v)| (OsString::from(k), OsString::from(v))),
        );

        env.entry(OsString::from(ENV_ORIGINATOR))
            .or_insert_with(|| OsString::from(ORIGINATOR));
        if let Some(ref url) = self.base_url {
            env.insert(ENV_BASE_URL.into(), url.into());
        }
        if let Some(ref key) = self.api_key {
            env.insert(ENV_API_KEY.into(), key.into());
        }

        env
    }
}
