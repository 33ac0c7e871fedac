//! # libcodex
//!
//! Async Rust wrapper for the Codex CLI.
//!
//! This library runs `codex exec --experimental-json` as a subprocess and
//! exposes its output as typed events, supporting:
//! - Streaming turns with async iterators
//! - Buffered turns with the final response and token usage
//! - Multi-turn threads that resume by id
//! - Item observation callbacks
//!
//! ## Quick Start
//!
//! ```no_run
//! use libcodex::{CodexClient, Result, ThreadOptions, TurnOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = CodexClient::new()?;
//!     let thread = client.start_thread(ThreadOptions::default());
//!     let turn = thread.run("Summarize the README", TurnOptions::default()).await?;
//!     println!("{}", turn.final_response);
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! ```no_run
//! use futures::StreamExt;
//! use libcodex::{CodexClient, ThreadEvent, ThreadOptions, TurnOptions};
//!
//! # async fn example() -> libcodex::Result<()> {
//! let thread = CodexClient::new()?.start_thread(ThreadOptions::default());
//! let mut stream = thread.run_streamed("Fix the lint warnings", TurnOptions::default()).await?;
//! while let Some(event) = stream.next().await {
//!     if let ThreadEvent::ItemCompleted { item } = event? {
//!         println!("{}: {}", item.kind(), item.id());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Structured Output
//!
//! ```no_run
//! use libcodex::{CodexClient, ThreadOptions, TurnOptions};
//! use serde_json::json;
//!
//! # async fn example() -> libcodex::Result<()> {
//! let thread = CodexClient::new()?.start_thread(ThreadOptions::default());
//! let schema = json!({
//!     "type": "object",
//!     "properties": {"status": {"type": "string"}},
//!     "required": ["status"],
//!     "additionalProperties": false
//! });
//! let turn = thread
//!     .run("Report the CI status", TurnOptions::new().output_schema(schema))
//!     .await?;
//! let report: serde_json::Value = turn.parse_response()?;
//! # let _ = report;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! ```no_run
//! use libcodex::{ApprovalPolicy, CodexClient, SandboxMode, ThreadOptions};
//!
//! # fn example() -> libcodex::Result<()> {
//! let client = CodexClient::builder()
//!     .api_key("sk-...")
//!     .base_url("https://api.openai.com/v1")
//!     .build()?;
//! let thread = client.start_thread(
//!     ThreadOptions::new()
//!         .model("gpt-5-codex")
//!         .sandbox_mode(SandboxMode::WorkspaceWrite)
//!         .approval_policy(ApprovalPolicy::Never),
//! );
//! # let _ = thread;
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
mod error;
pub mod observer;
pub mod process;
pub mod protocol;
pub mod stream;
mod thread;

pub use error::{Error, Result};

// Re-export the main client types at crate root
pub use client::{ClientBuilder, CodexClient};
pub use thread::Thread;

// Re-export commonly used config types at crate root
pub use config::{
    ApprovalPolicy, AuthMethod, ClientConfig, ClientConfigBuilder, Input, ReasoningEffort,
    SandboxMode, ThreadId, ThreadOptions, TurnOptions, UserInput,
};

// Re-export commonly used protocol types at crate root
pub use protocol::{decode_event, ThreadEvent, ThreadItem, Usage};

// Re-export commonly used stream types at crate root
pub use stream::{EventStream, Turn};

pub use observer::{ItemObserver, LogLevel, LoggingObserver};
