//! Configuration and authentication for the Codex CLI client.
//!
//! This module provides:
//!
//! - [`ClientConfig`] and [`ClientConfigBuilder`] for configuring the client
//! - [`AuthMethod`] for specifying authentication
//! - Per-thread and per-turn options: [`ThreadOptions`], [`TurnOptions`]
//! - Turn input: [`Input`] and [`UserInput`]
//!
//! # Example
//!
//! ```no_run
//! use libcodex::config::{ClientConfig, SandboxMode, ThreadOptions};
//!
//! let config = ClientConfig::builder()
//!     .api_key_from_env()
//!     .build()?;
//!
//! let options = ThreadOptions::new()
//!     .model("gpt-5-codex")
//!     .sandbox_mode(SandboxMode::WorkspaceWrite)
//!     .working_directory("/path/to/repo");
//! # let _ = (config, options);
//! # Ok::<(), libcodex::Error>(())
//! ```

pub mod auth;
pub mod builder;
pub mod options;

// Re-export commonly used types
pub use auth::{
    codex_home, has_cli_credentials, sessions_dir, AuthMethod, ENV_API_KEY, ENV_CODEX_HOME,
    ENV_OPENAI_API_KEY,
};
pub use builder::{ClientConfig, ClientConfigBuilder};
pub use options::{
    ApprovalPolicy, Input, ReasoningEffort, SandboxMode, ThreadId, ThreadOptions, TurnOptions,
    UserInput,
};
