//! Multi-turn conversation threads.
//!
//! This module provides [`Thread`] for running turns against one Codex
//! conversation. The CLI keeps the history under
//! [`sessions_dir`](crate::config::sessions_dir); a thread only remembers
//! its id and passes `resume <id>` on every turn after the first.
//!
//! # Example
//!
//! ```no_run
//! use libcodex::{CodexClient, Result, ThreadOptions, TurnOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = CodexClient::new()?;
//!     let thread = client.start_thread(ThreadOptions::new().skip_git_repo_check(true));
//!
//!     let turn = thread.run("Diagnose the test failure", TurnOptions::default()).await?;
//!     println!("{}", turn.final_response);
//!
//!     // Same conversation; the CLI resumes by id.
//!     let turn = thread.run("Now propose a fix", TurnOptions::default()).await?;
//!     println!("{} ({} tokens)", turn.final_response, turn.usage.total_tokens());
//!     Ok(())
//! }
//! ```

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{ClientConfig, Input, ThreadId, ThreadOptions, TurnOptions};
use crate::process::{CodexProcess, ExecRequest, OutputSchemaFile};
use crate::stream::{with_timeout, EventStream, Turn};
use crate::{Error, Result};

/// State shared between a [`Thread`] and the drivers of its turns.
#[derive(Debug, Default)]
pub(crate) struct ThreadState {
    inner: Mutex<StateInner>,
}

#[derive(Debug, Default)]
struct StateInner {
    id: Option<ThreadId>,
    /// Message of the fatal error that closed the thread.
    closed: Option<String>,
}

impl ThreadState {
    pub(crate) fn new(id: Option<ThreadId>) -> Self {
        Self {
            inner: Mutex::new(StateInner { id, closed: None }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn id(&self) -> Option<ThreadId> {
        self.lock().id.clone()
    }

    pub(crate) fn set_id(&self, id: ThreadId) {
        let mut inner = self.lock();
        if inner.id.as_ref().is_some_and(|current| current != &id) {
            tracing::debug!(previous = ?inner.id, new = %id, "thread id changed");
        }
        inner.id = Some(id);
    }

    pub(crate) fn close(&self, message: String) {
        self.lock().closed = Some(message);
    }

    pub(crate) fn closed(&self) -> Option<String> {
        self.lock().closed.clone()
    }
}

/// A conversation with the Codex agent.
///
/// A thread has zero or more consecutive turns. Each turn spawns one
/// `codex exec` process; after the first `thread.started` event the id is
/// remembered so later turns resume the same conversation.
///
/// # Thread Safety
///
/// `Thread` is `Send + Sync` and can be shared across tasks. Turns are not
/// serialized: running two turns of one thread at once is a caller error
/// and the CLI decides what happens to the history.
///
/// # Fatal errors
///
/// After the CLI reports an `error` event the thread is closed, and every
/// later turn fails with [`Error::ThreadClosed`].
#[derive(Debug, Clone)]
pub struct Thread {
    config: Arc<ClientConfig>,
    options: ThreadOptions,
    state: Arc<ThreadState>,
}

/// A turn ready to spawn.
struct PreparedTurn {
    request: ExecRequest,
    schema_file: Option<OutputSchemaFile>,
}

impl Thread {
    pub(crate) fn new(config: Arc<ClientConfig>, options: ThreadOptions, id: Option<ThreadId>) -> Self {
        Self {
            config,
            options,
            state: Arc::new(ThreadState::new(id)),
        }
    }

    /// Get the thread ID.
    ///
    /// `None` for a new thread until its first turn emits `thread.started`.
    /// Can be read while a turn is streaming.
    pub fn id(&self) -> Option<ThreadId> {
        self.state.id()
    }

    /// Default options applied to every turn.
    pub fn options(&self) -> &ThreadOptions {
        &self.options
    }

    /// Whether a fatal error closed this thread.
    pub fn is_closed(&self) -> bool {
        self.state.closed().is_some()
    }

    /// Run a turn and return a stream of its events.
    ///
    /// Spawn failures are returned directly; everything after that arrives
    /// through the stream. Dropping the stream cancels the turn.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use futures::StreamExt;
    /// # use libcodex::{Thread, TurnOptions};
    /// # async fn example(thread: Thread) -> libcodex::Result<()> {
    /// let mut stream = thread.run_streamed("List the crates in this workspace", TurnOptions::default()).await?;
    /// while let Some(event) = stream.next().await {
    ///     println!("{}", event?.event_type());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_streamed(
        &self,
        input: impl Into<Input>,
        options: TurnOptions,
    ) -> Result<EventStream> {
        let PreparedTurn {
            request,
            schema_file,
        } = self.prepare(input.into(), options)?;

        let process = CodexProcess::spawn(&self.config, &request).await?;
        let observer = self.config.observer().cloned();
        EventStream::from_process(process, schema_file, Arc::clone(&self.state), observer)
    }

    /// Run a turn and wait for its result.
    ///
    /// `turn.failed` becomes [`Error::TurnFailed`] and an `error` event
    /// becomes [`Error::ThreadError`]. The result is returned at the
    /// terminal event; the subprocess is reaped in the background. The
    /// client timeout, if set, covers spawning up to the terminal event.
    pub async fn run(&self, input: impl Into<Input>, options: TurnOptions) -> Result<Turn> {
        let input = input.into();
        let turn = async move {
            let stream = self.run_streamed(input, options).await?;
            stream.collect_turn().await
        };

        // Process stream with optional timeout
        match self.config.timeout() {
            Some(timeout) => with_timeout(timeout, turn).await,
            None => turn.await,
        }
    }

    /// Run a turn unless `signal` completes first.
    ///
    /// If the signal wins before the terminal event, the subprocess is
    /// killed and [`Error::Cancelled`] is returned. A signal after the
    /// terminal event has no effect.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use libcodex::{Thread, TurnOptions};
    /// # async fn example(thread: Thread) -> libcodex::Result<()> {
    /// let ctrl_c = async {
    ///     let _ = tokio::signal::ctrl_c().await;
    /// };
    /// let turn = thread
    ///     .run_with_cancellation("Refactor the parser", TurnOptions::default(), ctrl_c)
    ///     .await?;
    /// # let _ = turn;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_with_cancellation<S>(
        &self,
        input: impl Into<Input>,
        options: TurnOptions,
        signal: S,
    ) -> Result<Turn>
    where
        S: Future<Output = ()>,
    {
        tokio::select! {
            result = self.run(input, options) => result,
            () = signal => {
                tracing::debug!(thread_id = ?self.id(), "turn cancelled");
                Err(Error::Cancelled)
            }
        }
    }

    /// Build the request for one turn.
    fn prepare(&self, input: Input, options: TurnOptions) -> Result<PreparedTurn> {
        if let Some(message) = self.state.closed() {
            return Err(Error::ThreadClosed { message });
        }

        let effective = self.options.merged_with(&options.overrides);
        let (prompt, images) = input.normalize();
        let schema_file = options
            .output_schema
            .as_ref()
            .map(OutputSchemaFile::create)
            .transpose()?;

        let request = ExecRequest {
            prompt,
            images,
            thread_id: self.state.id(),
            options: effective,
            output_schema: schema_file.as_ref().map(|file| file.path().to_path_buf()),
        };

        Ok(PreparedTurn {
            request,
            schema_file,
        })
    }
}
