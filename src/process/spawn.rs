//! Process spawning and lifecycle management.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tokio::task::JoinHandle;

use super::io::{ProcessReader, ProcessWriter, StderrReader};
use super::locate::resolve_executable;
use crate::config::{ClientConfig, ThreadId, ThreadOptions};
use crate::{Error, Result};

/// Everything one `codex exec` invocation needs.
#[derive(Debug, Clone, Default)]
pub struct ExecRequest {
    /// Prompt text written to stdin.
    pub prompt: String,
    /// Images passed with `--image`, in order.
    pub images: Vec<PathBuf>,
    /// Thread to resume, if any.
    pub thread_id: Option<ThreadId>,
    /// Effective options for this turn (thread defaults merged with overrides).
    pub options: ThreadOptions,
    /// Path of the output schema file, if the turn has a schema.
    pub output_schema: Option<PathBuf>,
}

/// How the child process ended.
#[derive(Debug)]
pub struct ExitOutcome {
    pub status: ExitStatus,
    /// Captured stderr, possibly truncated.
    pub stderr: String,
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }
}

/// A running Codex CLI process.
///
/// This struct manages the lifecycle of a single CLI invocation.
/// Each turn spawns a new process.
///
/// # Cancellation
///
/// Dropping a `CodexProcess` will kill the subprocess if it's still running.
pub struct CodexProcess {
    child: Child,
    reader: Option<ProcessReader>,
    stderr_task: Option<JoinHandle<String>>,
}

impl CodexProcess {
    /// Spawn `codex exec` for the given request.
    ///
    /// The prompt is written to the subprocess stdin, which is then closed.
    pub async fn spawn(config: &ClientConfig, request: &ExecRequest) -> Result<Self> {
        let env = config.build_env(std::env::vars_os());
        let program = resolve_executable(config, &env)?;
        let args = build_args(request);

        tracing::debug!(program = %program.display(), ?args, "spawning codex");

        let mut cmd = Command::new(&program);
        cmd.args(&args);
        cmd.env_clear();
        cmd.envs(&env);
        if let Some(ref dir) = request.options.working_directory {
            if !dir.is_dir() {
                return Err(Error::InvalidConfig(format!(
                    "working directory {} is not a directory",
                    dir.display()
                )));
            }
            cmd.current_dir(dir);
        }
        cmd.stdin(Stdio::piped());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            // ENOENT also covers a cwd that vanished after the check above.
            if e.kind() == std::io::ErrorKind::NotFound && !program.exists() {
                Error::CliNotFound {
                    searched: program.display().to_string(),
                }
            } else {
                Error::ProcessSpawn(e)
            }
        })?;

        let stdin = child.stdin.take().ok_or_else(|| missing_pipe("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing_pipe("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing_pipe("stderr"))?;

        let mut process = Self {
            child,
            reader: Some(ProcessReader::new(stdout)),
            stderr_task: Some(tokio::spawn(StderrReader::new(stderr).read_all())),
        };

        match ProcessWriter::new(stdin).write_prompt(&request.prompt).await {
            Ok(()) => {}
            // The child exited without reading its input; its exit status
            // and stderr describe the failure.
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                tracing::debug!(pid = ?process.pid(), "codex closed stdin early");
            }
            Err(e) => {
                let _ = process.start_kill();
                return Err(e);
            }
        }

        Ok(process)
    }

    /// Take the line reader from this process.
    ///
    /// This transfers ownership of the reader, allowing it to be used
    /// independently of the process struct. The reader can only be taken once.
    pub fn take_reader(&mut self) -> Option<ProcessReader> {
        self.reader.take()
    }

    /// Get the process ID of the running CLI.
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Wait for the process to exit and collect its stderr.
    pub async fn wait(&mut self) -> Result<ExitOutcome> {
        let status = self.child.wait().await.map_err(Error::io)?;
        let stderr = match self.stderr_task.take() {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };
        tracing::debug!(%status, "codex exited");
        Ok(ExitOutcome { status, stderr })
    }

    /// Try to kill the process without waiting.
    pub fn start_kill(&mut self) -> Result<()> {
        self.child.start_kill().map_err(Error::io)
    }
}

impl Drop for CodexProcess {
    fn drop(&mut self) {
        // Try to kill the process if it's still running
        let _ = self.start_kill();
        if let Some(task) = self.stderr_task.take() {
            task.abort();
        }
    }
}

fn missing_pipe(name: &str) -> Error {
    Error::ProcessSpawn(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("child {name} was not captured"),
    ))
}

/// Build CLI arguments (prompt is sent via stdin, not as argument).
pub fn build_args(request: &ExecRequest) -> Vec<String> {
    let options = &request.options;
    let mut args = vec!["exec".to_string(), "--experimental-json".to_string()];

    if let Some(ref model) = options.model {
        args.push("--model".to_string());
        args.push(model.clone());
    }

    if let Some(mode) = options.sandbox_mode {
        args.push("--sandbox".to_string());
        args.push(mode.to_string());
    }

    if let Some(ref dir) = options.working_directory {
        args.push("--cd".to_string());
        args.push(dir.display().to_string());
    }

    for dir in &options.additional_directories {
        args.push("--add-dir".to_string());
        args.push(dir.display().to_string());
    }

    if options.skip_git_repo_check {
        args.push("--skip-git-repo-check".to_string());
    }

    if let Some(ref path) = request.output_schema {
        args.push("--output-schema".to_string());
        args.push(path.display().to_string());
    }

    if let Some(effort) = options.model_reasoning_effort {
        args.push("--config".to_string());
        args.push(format!("model_reasoning_effort=\"{effort}\""));
    }

    if let Some(enabled) = options.network_access_enabled {
        args.push("--config".to_string());
        args.push(format!("sandbox_workspace_write.network_access={enabled}"));
    }

    if let Some(enabled) = options.web_search_enabled {
        args.push("--config".to_string());
        args.push(format!("features.web_search_request={enabled}"));
    }

    if let Some(policy) = options.approval_policy {
        args.push("--config".to_string());
        args.push(format!("approval_policy=\"{policy}\""));
    }

    for image in &request.images {
        args.push("--image".to_string());
        args.push(image.display().to_string());
    }

    if let Some(ref id) = request.thread_id {
        args.push("resume".to_string());
        args.push(id.to_string());
    }

    args
}
