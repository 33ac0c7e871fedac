//! JSON protocol types for Codex CLI communication.
//!
//! `codex exec --experimental-json` prints one JSON object per line. Each
//! object has a `type` field selecting a [`ThreadEvent`] variant:
//!
//! - `thread.started`: the CLI assigned a thread id
//! - `turn.started` / `turn.completed` / `turn.failed`: turn lifecycle
//! - `item.started` / `item.updated` / `item.completed`: [`ThreadItem`] lifecycle
//! - `error`: fatal stream error
//!
//! # Example
//!
//! ```
//! use libcodex::protocol::{decode_event, ThreadEvent};
//!
//! let event = decode_event(r#"{"type":"thread.started","thread_id":"t1"}"#).unwrap();
//! assert!(matches!(event, ThreadEvent::ThreadStarted { ref thread_id } if thread_id == "t1"));
//! ```

mod decode;
mod events;
mod items;
mod usage;

pub use decode::decode_event;
pub use events::{ThreadEvent, TurnError};
pub use items::{
    AgentMessageItem, CommandExecutionItem, ErrorItem, ExecutionStatus, FileChangeItem,
    FileUpdateChange, McpContentBlock, McpToolCallError, McpToolCallItem, McpToolCallResult,
    PatchApplyStatus, PatchChangeKind, ReasoningItem, ThreadItem, TodoItem, TodoListItem,
    WebSearchItem,
};
pub use usage::Usage;
