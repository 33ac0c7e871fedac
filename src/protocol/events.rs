//! Top-level events emitted by `codex exec --experimental-json`.

use serde::{Deserialize, Serialize};

use super::items::ThreadItem;
use super::usage::Usage;

/// One line of CLI output.
///
/// The `type` field selects the variant. The set is closed: a line with any
/// other `type` is a decode error, see [`decode_event`](super::decode_event).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ThreadEvent {
    /// First event of a new thread; carries the id the CLI assigned.
    #[serde(rename = "thread.started")]
    ThreadStarted { thread_id: String },

    /// The prompt was handed to the model.
    #[serde(rename = "turn.started")]
    TurnStarted,

    /// The turn finished successfully.
    #[serde(rename = "turn.completed")]
    TurnCompleted {
        #[serde(default)]
        usage: Usage,
    },

    /// The turn failed.
    #[serde(rename = "turn.failed")]
    TurnFailed { error: TurnError },

    /// A new item was added to the thread, typically in progress.
    #[serde(rename = "item.started")]
    ItemStarted { item: ThreadItem },

    /// An in-progress item changed.
    #[serde(rename = "item.updated")]
    ItemUpdated { item: ThreadItem },

    /// An item reached a terminal state, either success or failure.
    #[serde(rename = "item.completed")]
    ItemCompleted { item: ThreadItem },

    /// Unrecoverable error emitted directly by the event stream.
    #[serde(rename = "error")]
    Error { message: String },
}

/// Error payload of `turn.failed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnError {
    pub message: String,
}

impl ThreadEvent {
    /// Every `type` tag the decoder accepts.
    pub const KNOWN_TYPES: [&'static str; 8] = [
        "thread.started",
        "turn.started",
        "turn.completed",
        "turn.failed",
        "item.started",
        "item.updated",
        "item.completed",
        "error",
    ];

    /// The wire `type` tag of this event.
    pub fn event_type(&self) -> &'static str {
        match self {
            ThreadEvent::ThreadStarted { .. } => "thread.started",
            ThreadEvent::TurnStarted => "turn.started",
            ThreadEvent::TurnCompleted { .. } => "turn.completed",
            ThreadEvent::TurnFailed { .. } => "turn.failed",
            ThreadEvent::ItemStarted { .. } => "item.started",
            ThreadEvent::ItemUpdated { .. } => "item.updated",
            ThreadEvent::ItemCompleted { .. } => "item.completed",
            ThreadEvent::Error { .. } => "error",
        }
    }

    /// Whether this event ends the turn.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ThreadEvent::TurnCompleted { .. }
                | ThreadEvent::TurnFailed { .. }
                | ThreadEvent::Error { .. }
        )
    }

    /// The item carried by an `item.*` event.
    pub fn item(&self) -> Option<&ThreadItem> {
        match self {
            ThreadEvent::ItemStarted { item }
            | ThreadEvent::ItemUpdated { item }
            | ThreadEvent::ItemCompleted { item } => Some(item),
            _ => None,
        }
    }
}
