//! Event stream implementation.
//!
//! This module provides [`EventStream`], which implements [`futures::Stream`]
//! to yield [`ThreadEvent`]s from a running `codex exec` process.

use std::collections::HashSet;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use tokio::sync::mpsc;
use tokio::time::timeout as tokio_timeout;

use super::turn::{Turn, TurnCollector};
use crate::config::ThreadId;
use crate::observer::ItemObserver;
use crate::process::{CodexProcess, LineReader, OutputSchemaFile};
use crate::protocol::{decode_event, ThreadEvent};
use crate::thread::ThreadState;
use crate::{Error, Result};

/// Capacity of the channel between the driver and the consumer.
const CHANNEL_CAPACITY: usize = 64;

/// A stream of events from one turn.
///
/// This stream yields [`ThreadEvent`]s in the order the CLI printed them.
/// It implements [`futures::Stream`] for use with async combinators.
/// After a terminal event the stream ends; a failure is yielded as a final
/// `Err` item.
///
/// # Cancellation
///
/// Dropping an `EventStream`, or calling [`cancel`](Self::cancel), will:
/// 1. Stop the background driver task
/// 2. Kill the subprocess
///
/// # Example
///
/// ```no_run
/// use futures::StreamExt;
/// use libcodex::{CodexClient, ThreadEvent, ThreadOptions, TurnOptions};
///
/// # async fn example() -> libcodex::Result<()> {
/// let client = CodexClient::new()?;
/// let thread = client.start_thread(ThreadOptions::default());
/// let mut stream = thread.run_streamed("Fix the failing test", TurnOptions::default()).await?;
/// while let Some(event) = stream.next().await {
///     match event? {
///         ThreadEvent::ItemCompleted { item } => println!("{}: {}", item.kind(), item.id()),
///         ThreadEvent::TurnCompleted { usage } => println!("{} tokens", usage.total_tokens()),
///         _ => {}
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct EventStream {
    rx: mpsc::Receiver<Result<ThreadEvent>>,
    task_handle: Option<tokio::task::JoinHandle<()>>,
    thread_id: Option<ThreadId>,
    cancelled: bool,
}

impl EventStream {
    /// Create a stream over an arbitrary line source.
    ///
    /// No process is involved: end of input is treated as a clean exit.
    /// Useful for replaying recorded output and for tests.
    pub fn from_reader<R: LineReader>(reader: R) -> Self {
        Self::start(Driver::new(reader), None)
    }

    /// Create a stream driving a spawned process.
    ///
    /// The schema file, if any, is kept alive until the driver finishes.
    pub(crate) fn from_process(
        mut process: CodexProcess,
        schema_file: Option<OutputSchemaFile>,
        state: Arc<ThreadState>,
        observer: Option<Arc<dyn ItemObserver>>,
    ) -> Result<Self> {
        let reader = process.take_reader().ok_or(Error::StreamClosed)?;
        let thread_id = state.id();

        let mut driver = Driver::new(reader);
        driver.process = Some(process);
        driver.schema_file = schema_file;
        driver.state = Some(state);
        driver.observer = observer;

        Ok(Self::start(driver, thread_id))
    }

    fn start<R: LineReader>(driver: Driver<R>, thread_id: Option<ThreadId>) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        // Spawn background driver task
        let task_handle = tokio::spawn(driver.run(tx));

        Self {
            rx,
            task_handle: Some(task_handle),
            thread_id,
            cancelled: false,
        }
    }

    /// The thread id, once known.
    ///
    /// Set up front for resumed threads, and from `thread.started` as soon
    /// as that event has been yielded.
    pub fn thread_id(&self) -> Option<&ThreadId> {
        self.thread_id.as_ref()
    }

    /// Stop the turn: abort the driver and kill the subprocess.
    ///
    /// The stream yields nothing afterwards.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
        self.rx.close();
        self.cancelled = true;
    }

    /// Consume the stream and fold it into a [`Turn`].
    ///
    /// Returns as soon as the terminal event arrives. The driver is then
    /// detached rather than aborted: it drains the remaining output and
    /// reaps the child on its own.
    pub async fn collect_turn(mut self) -> Result<Turn> {
        use futures::StreamExt;

        let mut collector = TurnCollector::new();
        while let Some(event) = self.next().await {
            let event = event?;
            let terminal = event.is_terminal();
            collector.push(event)?;
            if terminal {
                // Dropping the handle detaches the task without aborting it.
                drop(self.task_handle.take());
                break;
            }
        }
        Ok(collector.finish())
    }
}

impl Stream for EventStream {
    type Item = Result<ThreadEvent>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.cancelled {
            return Poll::Ready(None);
        }

        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(Ok(event))) => {
                if let ThreadEvent::ThreadStarted { ref thread_id } = event {
                    this.thread_id = Some(ThreadId::new(thread_id.clone()));
                }
                Poll::Ready(Some(Ok(event)))
            }
            other => other,
        }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        // Cancel the background task; the process is killed when the
        // driver is dropped.
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

/// Background task owning one turn's output.
struct Driver<R> {
    reader: R,
    process: Option<CodexProcess>,
    schema_file: Option<OutputSchemaFile>,
    state: Option<Arc<ThreadState>>,
    observer: Option<Arc<dyn ItemObserver>>,
    lifecycle: ItemLifecycle,
}

impl<R: LineReader> Driver<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            process: None,
            schema_file: None,
            state: None,
            observer: None,
            lifecycle: ItemLifecycle::default(),
        }
    }

    async fn run(mut self, tx: mpsc::Sender<Result<ThreadEvent>>) {
        let result = self.read_loop(&tx).await;
        self.remove_schema_file();
        match result {
            Ok(()) | Err(Error::Cancelled) => {}
            Err(e) => {
                // Try to send the error, ignore if receiver is gone
                let _ = tx.send(Err(e)).await;
            }
        }
        // Dropping self kills the process if it is still running.
    }

    /// The CLI reads the schema at startup; it is not needed once the turn
    /// has ended.
    fn remove_schema_file(&mut self) {
        if let Some(file) = self.schema_file.take() {
            tracing::trace!(path = %file.path().display(), "removing output schema file");
        }
    }

    /// Read lines until EOF, forwarding decoded events.
    async fn read_loop(&mut self, tx: &mpsc::Sender<Result<ThreadEvent>>) -> Result<()> {
        let mut terminal_seen = false;

        while let Some(line) = self.reader.next_line().await? {
            if terminal_seen {
                tracing::warn!(line = %line, "discarding output after terminal event");
                continue;
            }

            let event = decode_event(&line)?;
            self.lifecycle.check(&event);
            self.record(&event);
            self.notify(&event);
            terminal_seen = event.is_terminal();
            if terminal_seen {
                self.remove_schema_file();
            }

            if tx.send(Ok(event)).await.is_err() {
                // Receiver dropped
                return Err(Error::Cancelled);
            }
        }

        if let Some(process) = self.process.as_mut() {
            let outcome = process.wait().await?;
            if !outcome.success() {
                if !terminal_seen {
                    return Err(Error::ProcessExit {
                        code: outcome.code(),
                        stderr: outcome.stderr,
                    });
                }
                tracing::warn!(
                    code = ?outcome.code(),
                    stderr = %outcome.stderr.trim_end(),
                    "codex exited unsuccessfully after the turn ended"
                );
            }
        }

        if !terminal_seen {
            return Err(Error::StreamClosed);
        }
        Ok(())
    }

    /// Update thread state from the event.
    fn record(&self, event: &ThreadEvent) {
        let Some(ref state) = self.state else {
            return;
        };
        match event {
            ThreadEvent::ThreadStarted { thread_id } => {
                state.set_id(ThreadId::new(thread_id.clone()));
            }
            ThreadEvent::Error { message } => state.close(message.clone()),
            _ => {}
        }
    }

    /// Dispatch the event to the item observer.
    fn notify(&self, event: &ThreadEvent) {
        let Some(ref observer) = self.observer else {
            return;
        };
        match event {
            ThreadEvent::ItemStarted { item } => observer.on_item_started(item),
            ThreadEvent::ItemUpdated { item } => observer.on_item_updated(item),
            ThreadEvent::ItemCompleted { item } => observer.on_item_completed(item),
            ThreadEvent::TurnCompleted { usage } => observer.on_turn_completed(usage),
            _ => {}
        }
    }
}

/// Tracks which items are open, to flag out-of-order item events.
///
/// Violations are logged, not enforced. Items without an id are not tracked.
#[derive(Debug, Default)]
struct ItemLifecycle {
    open: HashSet<String>,
    completed: HashSet<String>,
}

impl ItemLifecycle {
    /// Check the event and return whether it fit the lifecycle.
    fn check(&mut self, event: &ThreadEvent) -> bool {
        let (phase, item) = match event {
            ThreadEvent::ItemStarted { item } => ("started", item),
            ThreadEvent::ItemUpdated { item } => ("updated", item),
            ThreadEvent::ItemCompleted { item } => ("completed", item),
            _ => return true,
        };
        let id = item.id();
        if id.is_empty() {
            return true;
        }

        let ok = if self.completed.contains(id) {
            false
        } else {
            match phase {
                "started" => self.open.insert(id.to_string()),
                "updated" => self.open.contains(id),
                _ => {
                    let was_open = self.open.remove(id);
                    self.completed.insert(id.to_string());
                    was_open
                }
            }
        };

        if !ok {
            tracing::warn!(item_id = %id, item_type = item.kind(), phase, "item event out of order");
        }
        ok
    }
}

/// Run a future with a timeout.
///
/// Returns an error if the future doesn't complete within the specified duration.
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    match tokio_timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(duration)),
    }
}
