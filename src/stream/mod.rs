//! Turn execution: streaming events and buffered results.
//!
//! # Overview
//!
//! Every turn is driven by a background task that reads the CLI output,
//! decodes each line and forwards it through a bounded channel. The main
//! types are:
//!
//! - [`EventStream`] - An async stream of [`ThreadEvent`](crate::ThreadEvent)s from one turn
//! - [`Turn`] - The buffered result of a completed turn
//! - [`TurnCollector`] - Folds events into a [`Turn`]
//!
//! # Example
//!
//! ```no_run
//! use futures::StreamExt;
//! use libcodex::{CodexClient, ThreadEvent, ThreadOptions, TurnOptions};
//!
//! # async fn example() -> libcodex::Result<()> {
//! let thread = CodexClient::new()?.start_thread(ThreadOptions::default());
//! let mut stream = thread.run_streamed("Run the tests", TurnOptions::default()).await?;
//!
//! while let Some(event) = stream.next().await {
//!     match event? {
//!         ThreadEvent::ThreadStarted { thread_id } => println!("thread {thread_id}"),
//!         ThreadEvent::ItemCompleted { item } => println!("{} done", item.kind()),
//!         ThreadEvent::TurnCompleted { usage } => println!("{} tokens", usage.total_tokens()),
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Cancellation
//!
//! Dropping an [`EventStream`] will:
//! 1. Cancel the background driver task
//! 2. Kill the CLI subprocess
//!
//! This ensures clean resource cleanup even when not consuming the full stream.

pub mod response;
pub mod turn;

pub use response::{with_timeout, EventStream};
pub use turn::{Turn, TurnCollector};
