//! Line decoder for the CLI event stream.

use serde_json::Value;

use super::events::ThreadEvent;
use crate::{Error, Result};

/// Decode one line of CLI output into a [`ThreadEvent`].
///
/// Pure: no I/O. A line whose `type` is outside [`ThreadEvent::KNOWN_TYPES`]
/// yields [`Error::UnknownEvent`]; any other malformed line yields
/// [`Error::Decode`]. Both carry the raw line.
pub fn decode_event(line: &str) -> Result<ThreadEvent> {
    let line = line.trim();
    match serde_json::from_str::<ThreadEvent>(line) {
        Ok(event) => Ok(event),
        Err(source) => Err(classify(source, line)),
    }
}

/// Tell an unrecognized discriminator apart from a broken payload.
fn classify(source: serde_json::Error, line: &str) -> Error {
    let event_type = serde_json::from_str::<Value>(line)
        .ok()
        .and_then(|value| value.get("type").and_then(Value::as_str).map(str::to_owned));

    match event_type {
        Some(event_type) if !ThreadEvent::KNOWN_TYPES.contains(&event_type.as_str()) => {
            Error::UnknownEvent {
                event_type,
                line: line.to_string(),
            }
        }
        _ => Error::decode(source, line),
    }
}
