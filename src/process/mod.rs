//! Process management for the Codex CLI.
//!
//! This module handles locating, spawning and communicating with the
//! `codex` subprocess. Each turn spawns a new `codex exec` process; a thread
//! continues across turns by passing `resume <thread_id>`.
//!
//! # Architecture
//!
//! ```text
//! libcodex                           codex exec
//! ┌──────────────┐                   ┌─────────────┐
//! │ CodexProcess │───stdin (prompt)─▶│             │
//! │              │◀──stdout (JSONL)──│             │
//! │              │◀──stderr (logs)───│             │
//! └──────────────┘                   └─────────────┘
//! ```
//!
//! # Input Protocol
//!
//! The prompt is written to stdin in full, then stdin is closed. Options and
//! images travel as arguments, see [`build_args`].
//!
//! # Output Protocol
//!
//! The CLI outputs newline-delimited JSON to stdout. Each line decodes into a
//! [`ThreadEvent`](crate::protocol::ThreadEvent). Stderr is captured for
//! error reporting.

mod io;
mod locate;
mod schema;
mod spawn;

pub use io::{LineReader, ProcessReader, ProcessWriter, StderrReader, MAX_STDERR_CAPTURE};
pub use locate::{bundled_path, resolve_executable, target_triple, CODEX_BINARY};
pub use schema::OutputSchemaFile;
pub use spawn::{build_args, CodexProcess, ExecRequest, ExitOutcome};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CodexProcess>();
        assert_send_sync::<ProcessReader>();
        assert_send_sync::<OutputSchemaFile>();
    }

    #[test]
    fn constants_are_reasonable() {
        assert!(MAX_STDERR_CAPTURE >= 4 * 1024, "stderr capture should keep at least 4KB");
        assert!(!CODEX_BINARY.is_empty());
    }
}
