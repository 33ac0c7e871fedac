//! High-level Codex client for starting and resuming threads.
//!
//! This module provides [`CodexClient`], the main entry point for running
//! the Codex agent.
//!
//! # Example
//!
//! ```no_run
//! use libcodex::{CodexClient, Result, ThreadOptions, TurnOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = CodexClient::builder().api_key_from_env().build()?;
//!
//!     // Buffered turn
//!     let thread = client.start_thread(ThreadOptions::default());
//!     let turn = thread.run("What does this repository do?", TurnOptions::default()).await?;
//!     println!("{}", turn.final_response);
//!
//!     // Streaming turn on the same thread
//!     use futures::StreamExt;
//!     let mut stream = thread.run_streamed("Add a CHANGELOG entry", TurnOptions::default()).await?;
//!     while let Some(event) = stream.next().await {
//!         println!("{:?}", event?);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use crate::config::{AuthMethod, ClientConfig, ClientConfigBuilder, ThreadId, ThreadOptions};
use crate::observer::ItemObserver;
use crate::thread::Thread;
use crate::Result;

/// A client for running the Codex agent.
///
/// `CodexClient` holds the configuration and hands out [`Thread`]s:
/// - New conversations ([`start_thread`](Self::start_thread))
/// - Existing conversations by id ([`resume_thread`](Self::resume_thread))
///
/// # Thread Safety
///
/// `CodexClient` is `Send + Sync` and can be safely shared across tasks.
/// Each turn spawns a new CLI process, so concurrent threads are supported.
#[derive(Debug, Clone)]
pub struct CodexClient {
    config: Arc<ClientConfig>,
}

impl CodexClient {
    /// Create a new client with default configuration.
    ///
    /// This uses [`AuthMethod::Auto`], which leaves authentication to the
    /// CLI (stored login or inherited environment).
    pub fn new() -> Result<Self> {
        let config = ClientConfig::builder().build()?;
        Ok(Self::with_config(config))
    }

    /// Create a new client with the given configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Create a builder for configuring a new client.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use libcodex::CodexClient;
    ///
    /// let client = CodexClient::builder()
    ///     .api_key("sk-...")
    ///     .base_url("https://api.openai.com/v1")
    ///     .timeout(Duration::from_secs(900))
    ///     .build()?;
    /// # let _ = client;
    /// # Ok::<(), libcodex::Error>(())
    /// ```
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Start a new conversation.
    ///
    /// No process is spawned until the first turn runs; the thread id is
    /// known once that turn emits `thread.started`.
    pub fn start_thread(&self, options: ThreadOptions) -> Thread {
        Thread::new(Arc::clone(&self.config), options, None)
    }

    /// Resume a conversation persisted by the CLI.
    ///
    /// The next turn passes `resume <id>`. The id is not checked here.
    pub fn resume_thread(&self, id: impl Into<ThreadId>, options: ThreadOptions) -> Thread {
        Thread::new(Arc::clone(&self.config), options, Some(id.into()))
    }

    /// Get a reference to the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// Builder for creating a [`CodexClient`].
///
/// This provides a fluent API for configuring the client. All methods
/// from [`ClientConfigBuilder`] are available.
#[derive(Debug, Clone, Default)]
pub struct ClientBuilder {
    inner: ClientConfigBuilder,
}

impl ClientBuilder {
    /// Create a new client builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the client.
    pub fn build(self) -> Result<CodexClient> {
        let config = self.inner.build()?;
        Ok(CodexClient::with_config(config))
    }

    // -------------------------------------------------------------------------
    // Authentication methods
    // -------------------------------------------------------------------------

    /// Use API key directly (passed as CODEX_API_KEY to subprocess).
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.inner = self.inner.api_key(key);
        self
    }

    /// Read API key from CODEX_API_KEY or OPENAI_API_KEY.
    pub fn api_key_from_env(mut self) -> Self {
        self.inner = self.inner.api_key_from_env();
        self
    }

    /// Require a stored `codex login`.
    pub fn cli_login(mut self) -> Self {
        self.inner = self.inner.cli_login();
        self
    }

    /// Let the CLI find credentials itself (default).
    pub fn auth_auto(mut self) -> Self {
        self.inner = self.inner.auth_auto();
        self
    }

    pub fn auth(mut self, method: AuthMethod) -> Self {
        self.inner = self.inner.auth(method);
        self
    }

    /// API endpoint override.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.inner = self.inner.base_url(url);
        self
    }

    // -------------------------------------------------------------------------
    // Process options
    // -------------------------------------------------------------------------

    /// Path to codex CLI binary.
    pub fn cli_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.inner = self.inner.cli_path(path);
        self
    }

    /// Timeout for buffered turns.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.inner = self.inner.timeout(duration);
        self
    }

    /// Add/override environment variable for subprocess.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.inner = self.inner.env(key, value);
        self
    }

    /// Use exactly this environment for the subprocess.
    pub fn environment<K, V>(mut self, vars: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.inner = self.inner.environment(vars);
        self
    }

    /// Don't inherit parent environment.
    pub fn inherit_env(mut self, inherit: bool) -> Self {
        self.inner = self.inner.inherit_env(inherit);
        self
    }

    // -------------------------------------------------------------------------
    // Item observer
    // -------------------------------------------------------------------------

    /// Set an observer for item events.
    pub fn observer(mut self, observer: Arc<dyn ItemObserver>) -> Self {
        self.inner = self.inner.observer(observer);
        self
    }
}
