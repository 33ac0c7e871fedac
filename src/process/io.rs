//! I/O primitives for communicating with the Codex CLI subprocess.

use std::future::Future;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStderr, ChildStdin, ChildStdout};

use crate::{Error, Result};

/// Most stderr bytes kept for error reporting.
pub const MAX_STDERR_CAPTURE: usize = 64 * 1024;

/// A source of output lines for the turn driver.
///
/// [`ProcessReader`] reads a live child's stdout; tests can feed canned
/// lines through [`EventStream::from_reader`](crate::stream::EventStream::from_reader).
pub trait LineReader: Send + 'static {
    /// Read the next non-empty line, without its line terminator.
    ///
    /// Returns `Ok(None)` at end of output.
    fn next_line(&mut self) -> impl Future<Output = Result<Option<String>>> + Send;
}

/// Reads newline-delimited output from the CLI stdout.
///
/// Lines are yielded as soon as they are complete. Invalid UTF-8 is replaced
/// rather than rejected, and blank lines are skipped.
pub struct ProcessReader {
    reader: BufReader<ChildStdout>,
    buffer: Vec<u8>,
}

impl ProcessReader {
    /// Create a new reader from a child process stdout.
    pub fn new(stdout: ChildStdout) -> Self {
        Self {
            reader: BufReader::new(stdout),
            buffer: Vec::with_capacity(4096),
        }
    }
}

impl LineReader for ProcessReader {
    async fn next_line(&mut self) -> Result<Option<String>> {
        loop {
            self.buffer.clear();

            let bytes_read = self
                .reader
                .read_until(b'\n', &mut self.buffer)
                .await
                .map_err(Error::io)?;

            if bytes_read == 0 {
                return Ok(None);
            }

            let line = String::from_utf8_lossy(&self.buffer);
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                continue;
            }

            tracing::trace!(line, "stdout");
            return Ok(Some(line.to_string()));
        }
    }
}

/// Writes the prompt to the CLI stdin.
pub struct ProcessWriter {
    stdin: ChildStdin,
}

impl ProcessWriter {
    /// Create a new writer from a child process stdin.
    pub fn new(stdin: ChildStdin) -> Self {
        Self { stdin }
    }

    /// Write a prompt to the CLI stdin and close it.
    ///
    /// The prompt is written as raw bytes followed by closing the stdin,
    /// which signals to the CLI that input is complete.
    pub async fn write_prompt(mut self, prompt: &str) -> Result<()> {
        self.stdin
            .write_all(prompt.as_bytes())
            .await
            .map_err(Error::io)?;
        self.stdin.shutdown().await.map_err(Error::io)?;
        Ok(())
    }
}

/// Reads stderr output from the CLI process.
///
/// Stderr typically contains logs and failure details. Everything is read so
/// the child never blocks on a full pipe; at most [`MAX_STDERR_CAPTURE`]
/// bytes are kept.
pub struct StderrReader {
    reader: BufReader<ChildStderr>,
}

impl StderrReader {
    /// Create a new stderr reader.
    pub fn new(stderr: ChildStderr) -> Self {
        Self {
            reader: BufReader::new(stderr),
        }
    }

    /// Read all remaining stderr output.
    ///
    /// This consumes the reader and returns the captured output. A read
    /// error ends the capture early; whatever was read is kept.
    pub async fn read_all(mut self) -> String {
        let mut output = String::new();
        let mut line = Vec::new();
        loop {
            line.clear();
            match self.reader.read_until(b'\n', &mut line).await {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&line);
                    tracing::trace!(line = %text.trim_end(), "stderr");
                    push_capped(&mut output, &text, MAX_STDERR_CAPTURE);
                }
                Err(e) => {
                    tracing::debug!(error = %e, "stderr read failed");
                    break;
                }
            }
        }
        output
    }
}

fn push_capped(output: &mut String, text: &str, limit: usize) {
    let room = limit.saturating_sub(output.len());
    if room == 0 {
        return;
    }
    if text.len() <= room {
        output.push_str(text);
        return;
    }
    let mut end = room;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    output.push_str(&text[..end]);
}
