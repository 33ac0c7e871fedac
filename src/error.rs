use std::time::Duration;

/// Errors that can occur when using libcodex.
///
/// Errors are organized by category:
/// - Configuration errors: detected at `build()` time
/// - Spawn errors: failed to locate or start the CLI process
/// - IO errors: communication failures with the subprocess
/// - Protocol errors: malformed or unexpected CLI output
/// - Runtime errors: failures reported while a turn runs
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // -------------------------------------------------------------------------
    // Configuration errors (detected at build() time)
    // -------------------------------------------------------------------------
    /// Environment variable required for authentication is not set.
    #[error("environment variable {var} not set")]
    EnvVarNotFound { var: &'static str },

    /// Stored CLI login not found.
    ///
    /// Run `codex login` to authenticate.
    #[error("codex credentials not found at {path} (run `codex login` first)")]
    CredentialsNotFound { path: String },

    /// Invalid configuration provided to a builder.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // -------------------------------------------------------------------------
    // Spawn errors
    // -------------------------------------------------------------------------
    /// Codex CLI binary could not be located.
    #[error("codex CLI not found (searched: {searched})")]
    CliNotFound { searched: String },

    /// Failed to spawn the codex subprocess.
    #[error("failed to spawn codex process: {0}")]
    ProcessSpawn(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // IO errors
    // -------------------------------------------------------------------------
    /// IO error communicating with the codex subprocess.
    #[error("IO error: {0}")]
    Io(#[source] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol errors
    // -------------------------------------------------------------------------
    /// An output line could not be decoded into an event.
    #[error("failed to decode event: {source} (line: {})", truncate(.line))]
    Decode {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// An output line carried an event type outside the known vocabulary.
    #[error("unknown event type {event_type:?} (line: {})", truncate(.line))]
    UnknownEvent { event_type: String, line: String },

    /// Serializing data for the CLI failed.
    #[error("JSON error: {0}")]
    Json(#[source] serde_json::Error),

    /// Output ended before the turn reached a terminal event.
    #[error("stream closed before the turn completed")]
    StreamClosed,

    // -------------------------------------------------------------------------
    // Runtime errors
    // -------------------------------------------------------------------------
    /// The CLI reported `turn.failed`.
    #[error("turn failed: {message}")]
    TurnFailed { message: String },

    /// The CLI reported an unrecoverable stream error.
    #[error("thread error: {message}")]
    ThreadError { message: String },

    /// The thread previously hit a fatal error and accepts no more turns.
    #[error("thread is closed after a fatal error: {message}")]
    ThreadClosed { message: String },

    /// CLI exited unsuccessfully without reporting a terminal event.
    #[error("codex exec exited with {}: {}", describe_code(.code), trim_end(.stderr))]
    ProcessExit { code: Option<i32>, stderr: String },

    /// Turn exceeded the configured timeout.
    #[error("turn timed out after {0:?}")]
    Timeout(Duration),

    /// Turn was cancelled by the caller.
    #[error("turn cancelled")]
    Cancelled,
}

/// A specialized Result type for libcodex operations.
pub type Result<T> = std::result::Result<T, Error>;

fn truncate(line: &str) -> String {
    line.chars().take(100).collect()
}

fn trim_end(text: &str) -> &str {
    text.trim_end()
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}

impl Error {
    /// Create an IO error.
    pub fn io(source: std::io::Error) -> Self {
        Self::Io(source)
    }

    /// Create a decode error for the given raw line.
    pub fn decode(source: serde_json::Error, line: &str) -> Self {
        Self::Decode {
            line: line.to_string(),
            source,
        }
    }

    /// The offending output line, for protocol errors.
    pub fn raw_line(&self) -> Option<&str> {
        match self {
            Error::Decode { line, .. } | Error::UnknownEvent { line, .. } => Some(line),
            _ => None,
        }
    }

    /// Check if this error came from caller cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    /// Check if this error is retryable.
    ///
    /// The library never retries on its own; this is a hint for callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Timeout(_) | Error::Io(_) | Error::StreamClosed)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}
