//! Buffered turn results.

use crate::protocol::{ThreadEvent, ThreadItem, Usage};
use crate::{Error, Result};

/// The result of a completed turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Turn {
    /// Completed items, in the order they completed.
    pub items: Vec<ThreadItem>,
    /// Text of the last completed agent message; empty if there was none.
    pub final_response: String,
    /// Token usage reported by `turn.completed`.
    pub usage: Usage,
}

impl Turn {
    /// Parse the final response as JSON, for turns run with an output schema.
    pub fn parse_response<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.final_response)?)
    }

    /// Iterate over completed items of one wire type, e.g. `"command_execution"`.
    pub fn items_of_kind<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a ThreadItem> {
        self.items.iter().filter(move |item| item.kind() == kind)
    }
}

/// Folds a turn's events into a [`Turn`].
#[derive(Debug, Default)]
pub struct TurnCollector {
    turn: Turn,
}

impl TurnCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one event.
    ///
    /// `turn.failed` and `error` end the fold with an error.
    pub fn push(&mut self, event: ThreadEvent) -> Result<()> {
        match event {
            ThreadEvent::ItemCompleted { item } => {
                if let ThreadItem::AgentMessage(ref message) = item {
                    self.turn.final_response = message.text.clone();
                }
                self.turn.items.push(item);
            }
            ThreadEvent::TurnCompleted { usage } => {
                self.turn.usage = usage;
            }
            ThreadEvent::TurnFailed { error } => {
                return Err(Error::TurnFailed {
                    message: error.message,
                });
            }
            ThreadEvent::Error { message } => {
                return Err(Error::ThreadError { message });
            }
            ThreadEvent::ThreadStarted { .. }
            | ThreadEvent::TurnStarted
            | ThreadEvent::ItemStarted { .. }
            | ThreadEvent::ItemUpdated { .. } => {}
        }
        Ok(())
    }

    pub fn finish(self) -> Turn {
        self.turn
    }
}
