//! Type-safe thread and turn options for the Codex CLI.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sandbox policy for commands the agent runs (`--sandbox`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SandboxMode {
    /// Read-only access to the filesystem.
    ReadOnly,
    /// Writes allowed inside the working directory and added directories.
    WorkspaceWrite,
    /// No sandbox at all (use with caution).
    DangerFullAccess,
}

impl fmt::Display for SandboxMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SandboxMode::ReadOnly => write!(f, "read-only"),
            SandboxMode::WorkspaceWrite => write!(f, "workspace-write"),
            SandboxMode::DangerFullAccess => write!(f, "danger-full-access"),
        }
    }
}

/// Reasoning effort requested from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Minimal,
    Low,
    Medium,
    High,
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReasoningEffort::Minimal => write!(f, "minimal"),
            ReasoningEffort::Low => write!(f, "low"),
            ReasoningEffort::Medium => write!(f, "medium"),
            ReasoningEffort::High => write!(f, "high"),
        }
    }
}

/// When the agent must ask before running a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalPolicy {
    /// Never ask; failures are returned to the model.
    Never,
    /// The model decides when to ask.
    OnRequest,
    /// Ask only when a sandboxed command fails.
    OnFailure,
    /// Ask for anything outside a small trusted set.
    Untrusted,
}

impl fmt::Display for ApprovalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApprovalPolicy::Never => write!(f, "never"),
            ApprovalPolicy::OnRequest => write!(f, "on-request"),
            ApprovalPolicy::OnFailure => write!(f, "on-failure"),
            ApprovalPolicy::Untrusted => write!(f, "untrusted"),
        }
    }
}

/// Newtype for thread IDs to prevent string mixups.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub String);

impl ThreadId {
    /// Create a new ThreadId from a string.
    pub fn new(id: impl Into<String>) -> Self {
        ThreadId(id.into())
    }

    /// Get the thread ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ThreadId {
    fn from(s: String) -> Self {
        ThreadId(s)
    }
}

impl From<&str> for ThreadId {
    fn from(s: &str) -> Self {
        ThreadId(s.to_string())
    }
}

impl AsRef<str> for ThreadId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Per-thread defaults, applied to every turn unless a turn overrides them.
///
/// Every field defaults to "unset", which means the matching CLI flag is not
/// passed and the CLI's own configuration applies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadOptions {
    pub model: Option<String>,
    pub sandbox_mode: Option<SandboxMode>,
    pub working_directory: Option<PathBuf>,
    pub additional_directories: Vec<PathBuf>,
    /// Run even when the working directory is not a Git repository.
    pub skip_git_repo_check: bool,
    pub model_reasoning_effort: Option<ReasoningEffort>,
    pub network_access_enabled: Option<bool>,
    pub web_search_enabled: Option<bool>,
    pub approval_policy: Option<ApprovalPolicy>,
}

impl ThreadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the model to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn sandbox_mode(mut self, mode: SandboxMode) -> Self {
        self.sandbox_mode = Some(mode);
        self
    }

    /// Working directory for the agent (`--cd`, and the child's cwd).
    pub fn working_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(path.into());
        self
    }

    /// Grant access to one more directory (`--add-dir`).
    pub fn additional_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.additional_directories.push(path.into());
        self
    }

    pub fn skip_git_repo_check(mut self, skip: bool) -> Self {
        self.skip_git_repo_check = skip;
        self
    }

    pub fn model_reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.model_reasoning_effort = Some(effort);
        self
    }

    pub fn network_access_enabled(mut self, enabled: bool) -> Self {
        self.network_access_enabled = Some(enabled);
        self
    }

    pub fn web_search_enabled(mut self, enabled: bool) -> Self {
        self.web_search_enabled = Some(enabled);
        self
    }

    pub fn approval_policy(mut self, policy: ApprovalPolicy) -> Self {
        self.approval_policy = Some(policy);
        self
    }

    /// Resolve the options for one turn: values set in `overrides` win.
    ///
    /// `additional_directories` is replaced when the override list is
    /// non-empty; `skip_git_repo_check` is set if either side sets it.
    pub fn merged_with(&self, overrides: &ThreadOptions) -> ThreadOptions {
        ThreadOptions {
            model: overrides.model.clone().or_else(|| self.model.clone()),
            sandbox_mode: overrides.sandbox_mode.or(self.sandbox_mode),
            working_directory: overrides
                .working_directory
                .clone()
                .or_else(|| self.working_directory.clone()),
            additional_directories: if overrides.additional_directories.is_empty() {
                self.additional_directories.clone()
            } else {
                overrides.additional_directories.clone()
            },
            skip_git_repo_check: overrides.skip_git_repo_check || self.skip_git_repo_check,
            model_reasoning_effort: overrides
                .model_reasoning_effort
                .or(self.model_reasoning_effort),
            network_access_enabled: overrides
                .network_access_enabled
                .or(self.network_access_enabled),
            web_search_enabled: overrides.web_search_enabled.or(self.web_search_enabled),
            approval_policy: overrides.approval_policy.or(self.approval_policy),
        }
    }
}

/// Options for a single turn.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnOptions {
    /// JSON schema the final agent message must conform to.
    ///
    /// The schema is written to a temporary file for the CLI; it is not
    /// validated here.
    pub output_schema: Option<Value>,
    /// Thread options overridden for this turn only.
    pub overrides: ThreadOptions,
}

impl TurnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain the final response to a JSON schema.
    pub fn output_schema(mut self, schema: Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Override thread defaults for this turn.
    pub fn overrides(mut self, overrides: ThreadOptions) -> Self {
        self.overrides = overrides;
        self
    }
}

/// One entry of a structured turn input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UserInput {
    /// Prompt text.
    Text { text: String },
    /// An image on the local filesystem, passed with `--image`.
    LocalImage { path: PathBuf },
}

impl UserInput {
    pub fn text(text: impl Into<String>) -> Self {
        UserInput::Text { text: text.into() }
    }

    pub fn local_image(path: impl Into<PathBuf>) -> Self {
        UserInput::LocalImage { path: path.into() }
    }
}

/// Input for a turn: a plain prompt or a list of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Items(Vec<UserInput>),
}

impl Input {
    /// Split into the stdin prompt and the image paths, in order.
    ///
    /// Text entries are joined with a blank line.
    pub fn normalize(self) -> (String, Vec<PathBuf>) {
        match self {
            Input::Text(text) => (text, Vec::new()),
            Input::Items(items) => {
                let mut texts = Vec::new();
                let mut images = Vec::new();
                for item in items {
                    match item {
                        UserInput::Text { text } => texts.push(text),
                        UserInput::LocalImage { path } => images.push(path),
                    }
                }
                (texts.join("\n\n"), images)
            }
        }
    }
}

impl From<String> for Input {
    fn from(s: String) -> Self {
        Input::Text(s)
    }
}

impl From<&str> for Input {
    fn from(s: &str) -> Self {
        Input::Text(s.to_string())
    }
}

impl From<Vec<UserInput>> for Input {
    fn from(items: Vec<UserInput>) -> Self {
        Input::Items(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_plain_text() {
        let (prompt, images) = Input::from("list files").normalize();
        assert_eq!(prompt, "list files");
        assert!(images.is_empty());
    }

    #[test]
    fn normalize_items_joins_text_and_collects_images() {
        let input = Input::from(vec![
            UserInput::text("Describe these screenshots."),
            UserInput::local_image("/tmp/a.png"),
            UserInput::text("Focus on the header."),
            UserInput::local_image("/tmp/b.png"),
        ]);
        let (prompt, images) = input.normalize();
        assert_eq!(prompt, "Describe these screenshots.\n\nFocus on the header.");
        assert_eq!(
            images,
            vec![PathBuf::from("/tmp/a.png"), PathBuf::from("/tmp/b.png")]
        );
    }

    #[test]
    fn normalize_images_only() {
        let (prompt, images) = Input::Items(vec![UserInput::local_image("x.jpg")]).normalize();
        assert_eq!(prompt, "");
        assert_eq!(images.len(), 1);
    }

    #[test]
    fn user_input_serde_shape() {
        let value = serde_json::to_value(UserInput::local_image("a.png")).unwrap();
        assert_eq!(value["type"], "local_image");
        assert_eq!(value["path"], "a.png");
    }

    #[test]
    fn enum_display_matches_cli_values() {
        assert_eq!(SandboxMode::ReadOnly.to_string(), "read-only");
        assert_eq!(SandboxMode::WorkspaceWrite.to_string(), "workspace-write");
        assert_eq!(SandboxMode::DangerFullAccess.to_string(), "danger-full-access");
        assert_eq!(ReasoningEffort::Minimal.to_string(), "minimal");
        assert_eq!(ReasoningEffort::High.to_string(), "high");
        assert_eq!(ApprovalPolicy::OnRequest.to_string(), "on-request");
        assert_eq!(ApprovalPolicy::OnFailure.to_string(), "on-failure");
        assert_eq!(ApprovalPolicy::Untrusted.to_string(), "untrusted");
    }

    #[test]
    fn enum_serde_matches_display() {
        for mode in [
            SandboxMode::ReadOnly,
            SandboxMode::WorkspaceWrite,
            SandboxMode::DangerFullAccess,
        ] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{mode}\""));
        }
        for policy in [
            ApprovalPolicy::Never,
            ApprovalPolicy::OnRequest,
            ApprovalPolicy::OnFailure,
            ApprovalPolicy::Untrusted,
        ] {
            let json = serde_json::to_string(&policy).unwrap();
            assert_eq!(json, format!("\"{policy}\""));
        }
    }

    #[test]
    fn thread_id_usage() {
        let id = ThreadId::new("0199a213-81c0-7800-8aa1-bbab2a035a53");
        assert_eq!(id.as_str(), "0199a213-81c0-7800-8aa1-bbab2a035a53");
        assert_eq!(id.to_string(), id.as_str());

        let other: ThreadId = "t2".into();
        assert_eq!(other.as_ref(), "t2");
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"t2\"");
    }

    #[test]
    fn defaults_are_unset() {
        let options = ThreadOptions::default();
        assert!(options.model.is_none());
        assert!(options.sandbox_mode.is_none());
        assert!(options.additional_directories.is_empty());
        assert!(!options.skip_git_repo_check);
    }

    #[test]
    fn merge_prefers_turn_values() {
        let thread = ThreadOptions::new()
            .model("gpt-5-codex")
            .sandbox_mode(SandboxMode::ReadOnly)
            .working_directory("/repo")
            .model_reasoning_effort(ReasoningEffort::Low)
            .web_search_enabled(false);
        let turn = ThreadOptions::new()
            .sandbox_mode(SandboxMode::WorkspaceWrite)
            .model_reasoning_effort(ReasoningEffort::High);

        let merged = thread.merged_with(&turn);
        assert_eq!(merged.model.as_deref(), Some("gpt-5-codex"));
        assert_eq!(merged.sandbox_mode, Some(SandboxMode::WorkspaceWrite));
        assert_eq!(merged.working_directory, Some(PathBuf::from("/repo")));
        assert_eq!(merged.model_reasoning_effort, Some(ReasoningEffort::High));
        assert_eq!(merged.web_search_enabled, Some(false));
        assert_eq!(merged.approval_policy, None);
    }

    #[test]
    fn merge_directories_and_flags() {
        let thread = ThreadOptions::new()
            .additional_directory("/data")
            .skip_git_repo_check(true);

        let merged = thread.merged_with(&ThreadOptions::default());
        assert_eq!(merged.additional_directories, vec![PathBuf::from("/data")]);
        assert!(merged.skip_git_repo_check);

        let turn = ThreadOptions::new().additional_directory("/scratch");
        let merged = thread.merged_with(&turn);
        assert_eq!(merged.additional_directories, vec![PathBuf::from("/scratch")]);
        assert!(merged.skip_git_repo_check);
    }

    #[test]
    fn merge_with_default_is_identity() {
        let thread = ThreadOptions::new()
            .model("o4-mini")
            .network_access_enabled(true)
            .approval_policy(ApprovalPolicy::Never);
        assert_eq!(thread.merged_with(&ThreadOptions::default()), thread);
    }

    #[test]
    fn turn_options_builder() {
        let schema = serde_json::json!({"type": "object"});
        let options = TurnOptions::new()
            .output_schema(schema.clone())
            .overrides(ThreadOptions::new().model("gpt-5"));
        assert_eq!(options.output_schema, Some(schema));
        assert_eq!(options.overrides.model.as_deref(), Some("gpt-5"));
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ThreadOptions>();
        assert_send_sync::<TurnOptions>();
        assert_send_sync::<ThreadId>();
    }
}
