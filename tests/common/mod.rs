//! Test utilities for libcodex integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;

use libcodex::process::LineReader;
use libcodex::{Error, Result};
use serde_json::{json, Value};

/// A mock line reader that returns pre-defined lines.
///
/// Lines are returned in order, then `Ok(None)` is returned to signal EOF.
pub struct MockReader {
    lines: VecDeque<Result<String>>,
    hang_at_eof: bool,
}

impl MockReader {
    /// Create a new mock reader with the given lines.
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines: lines.into_iter().map(Ok).collect(),
            hang_at_eof: false,
        }
    }

    /// Create a mock reader that never reaches EOF, like a child that keeps
    /// running after its last line.
    pub fn hanging(lines: Vec<String>) -> Self {
        Self {
            hang_at_eof: true,
            ..Self::new(lines)
        }
    }

    /// Create a mock reader that will return an error after the lines.
    pub fn with_error(lines: Vec<String>, error: Error) -> Self {
        let mut queue: VecDeque<Result<String>> = lines.into_iter().map(Ok).collect();
        queue.push_back(Err(error));
        Self {
            lines: queue,
            hang_at_eof: false,
        }
    }
}

impl LineReader for MockReader {
    async fn next_line(&mut self) -> Result<Option<String>> {
        match self.lines.pop_front() {
            Some(Ok(line)) => Ok(Some(line)),
            Some(Err(e)) => Err(e),
            None if self.hang_at_eof => std::future::pending().await,
            None => Ok(None),
        }
    }
}

/// Builder for creating realistic `codex exec --experimental-json` output.
pub struct ScenarioBuilder {
    lines: Vec<String>,
    thread_id: String,
    next_item: usize,
}

impl ScenarioBuilder {
    /// Create a new scenario builder.
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            thread_id: "0199a213-81c0-7800-8aa1-bbab2a035a53".to_string(),
            next_item: 0,
        }
    }

    /// Set the thread ID.
    pub fn thread_id(mut self, id: impl Into<String>) -> Self {
        self.thread_id = id.into();
        self
    }

    fn push(mut self, value: Value) -> Self {
        self.lines.push(value.to_string());
        self
    }

    fn item_id(&mut self) -> String {
        let id = format!("item_{}", self.next_item);
        self.next_item += 1;
        id
    }

    /// Add a raw output line.
    pub fn raw(mut self, line: &str) -> Self {
        self.lines.push(line.to_string());
        self
    }

    /// Add `thread.started`.
    pub fn thread_started(self) -> Self {
        let thread_id = self.thread_id.clone();
        self.push(json!({"type": "thread.started", "thread_id": thread_id}))
    }

    /// Add `turn.started`.
    pub fn turn_started(self) -> Self {
        self.push(json!({"type": "turn.started"}))
    }

    /// Add a completed reasoning item.
    pub fn reasoning(mut self, text: &str) -> Self {
        let id = self.item_id();
        self.push(json!({
            "type": "item.completed",
            "item": {"id": id, "type": "reasoning", "text": text}
        }))
    }

    /// Add a command execution that starts, streams output, and completes.
    pub fn command(mut self, command: &str, output: &str, exit_code: i32) -> Self {
        let id = self.item_id();
        let status = if exit_code == 0 { "completed" } else { "failed" };
        self.push(json!({
            "type": "item.started",
            "item": {"id": id, "type": "command_execution", "command": command,
                     "aggregated_output": "", "exit_code": null, "status": "in_progress"}
        }))
        .push(json!({
            "type": "item.updated",
            "item": {"id": id, "type": "command_execution", "command": command,
                     "aggregated_output": output, "exit_code": null, "status": "in_progress"}
        }))
        .push(json!({
            "type": "item.completed",
            "item": {"id": id, "type": "command_execution", "command": command,
                     "aggregated_output": output, "exit_code": exit_code, "status": status}
        }))
    }

    /// Add a completed agent message.
    pub fn agent_message(mut self, text: &str) -> Self {
        let id = self.item_id();
        self.push(json!({
            "type": "item.completed",
            "item": {"id": id, "type": "agent_message", "text": text}
        }))
    }

    /// Add `turn.completed` with usage.
    pub fn turn_completed(self, input: u64, cached: u64, output: u64) -> Self {
        self.push(json!({
            "type": "turn.completed",
            "usage": {"input_tokens": input, "cached_input_tokens": cached, "output_tokens": output}
        }))
    }

    /// Add `turn.failed`.
    pub fn turn_failed(self, message: &str) -> Self {
        self.push(json!({"type": "turn.failed", "error": {"message": message}}))
    }

    /// Add a fatal `error` event.
    pub fn fatal_error(self, message: &str) -> Self {
        self.push(json!({"type": "error", "message": message}))
    }

    /// The output lines.
    pub fn lines(self) -> Vec<String> {
        self.lines
    }

    /// The output as a single stdout payload.
    pub fn stdout(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    /// Build the mock reader.
    pub fn build(self) -> MockReader {
        MockReader::new(self.lines)
    }
}

impl Default for ScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}
