//! Item observer trait and implementations.
//!
//! The CLI runs commands, edits files and calls tools on its own; an
//! [`ItemObserver`] only watches those items go by.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//! use libcodex::{CodexClient, ItemObserver, ThreadItem};
//!
//! #[derive(Default)]
//! struct CommandCounter(AtomicUsize);
//!
//! impl ItemObserver for CommandCounter {
//!     fn on_item_completed(&self, item: &ThreadItem) {
//!         if item.as_command_execution().is_some() {
//!             self.0.fetch_add(1, Ordering::Relaxed);
//!         }
//!     }
//! }
//!
//! let client = CodexClient::builder()
//!     .observer(Arc::new(CommandCounter::default()))
//!     .build()?;
//! # let _ = client;
//! # Ok::<(), libcodex::Error>(())
//! ```

use crate::protocol::{ThreadItem, Usage};

/// Observer for item and turn events.
///
/// # Implementation Notes
///
/// - Implementations must be lightweight; blocking delays stream processing.
/// - Methods have default empty implementations for selective observation.
/// - Observers are called synchronously by the turn driver, before the
///   event reaches the consumer.
pub trait ItemObserver: Send + Sync {
    /// Called for `item.started`.
    fn on_item_started(&self, item: &ThreadItem) {
        let _ = item;
    }

    /// Called for `item.updated`.
    fn on_item_updated(&self, item: &ThreadItem) {
        let _ = item;
    }

    /// Called for `item.completed`.
    fn on_item_completed(&self, item: &ThreadItem) {
        let _ = item;
    }

    /// Called for `turn.completed` with the turn's token usage.
    fn on_turn_completed(&self, usage: &Usage) {
        let _ = usage;
    }
}

/// Simple logging observer that logs item events using tracing.
#[derive(Debug, Clone, Default)]
pub struct LoggingObserver {
    level: LogLevel,
}

/// Log level for LoggingObserver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Log at trace level.
    Trace,
    /// Log at debug level (default).
    #[default]
    Debug,
    /// Log at info level.
    Info,
}

impl LoggingObserver {
    /// Create a new logging observer with debug level.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logging observer with a specific level.
    pub fn with_level(level: LogLevel) -> Self {
        Self { level }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    fn log_item(&self, phase: &'static str, item: &ThreadItem) {
        let id = item.id();
        let kind = item.kind();
        match self.level {
            LogLevel::Trace => tracing::trace!(item_id = %id, item_type = kind, phase, "item"),
            LogLevel::Debug => tracing::debug!(item_id = %id, item_type = kind, phase, "item"),
            LogLevel::Info => tracing::info!(item_id = %id, item_type = kind, phase, "item"),
        }
    }
}

impl ItemObserver for LoggingObserver {
    fn on_item_started(&self, item: &ThreadItem) {
        self.log_item("started", item);
    }

    fn on_item_updated(&self, item: &ThreadItem) {
        self.log_item("updated", item);
    }

    fn on_item_completed(&self, item: &ThreadItem) {
        self.log_item("completed", item);
    }

    fn on_turn_completed(&self, usage: &Usage) {
        let (input, cached, output) = (
            usage.input_tokens,
            usage.cached_input_tokens,
            usage.output_tokens,
        );
        match self.level {
            LogLevel::Trace => {
                tracing::trace!(input, cached, output, "turn_completed");
            }
            LogLevel::Debug => {
                tracing::debug!(input, cached, output, "turn_completed");
            }
            LogLevel::Info => {
                tracing::info!(input, cached, output, "turn_completed");
            }
        }
    }
}
