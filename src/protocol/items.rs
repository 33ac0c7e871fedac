//! Thread items: units of agent activity surfaced inside a turn.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One unit of agent activity, carried by `item.*` events.
///
/// Every item keeps the same `id` across its started/updated/completed events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThreadItem {
    /// Response from the agent: natural-language text, or JSON when an
    /// output schema was requested.
    AgentMessage(AgentMessageItem),
    /// The agent's reasoning summary.
    Reasoning(ReasoningItem),
    /// A command executed by the agent.
    CommandExecution(CommandExecutionItem),
    /// A set of file changes made by the agent.
    FileChange(FileChangeItem),
    /// A call to an MCP tool.
    McpToolCall(McpToolCallItem),
    /// A web search request.
    WebSearch(WebSearchItem),
    /// The agent's running to-do list.
    TodoList(TodoListItem),
    /// A non-fatal error surfaced as an item.
    Error(ErrorItem),
}

impl ThreadItem {
    /// The stable item id. Empty if the CLI did not send one.
    pub fn id(&self) -> &str {
        match self {
            ThreadItem::AgentMessage(item) => &item.id,
            ThreadItem::Reasoning(item) => &item.id,
            ThreadItem::CommandExecution(item) => &item.id,
            ThreadItem::FileChange(item) => &item.id,
            ThreadItem::McpToolCall(item) => &item.id,
            ThreadItem::WebSearch(item) => &item.id,
            ThreadItem::TodoList(item) => &item.id,
            ThreadItem::Error(item) => &item.id,
        }
    }

    /// The wire name of this item's type.
    pub fn kind(&self) -> &'static str {
        match self {
            ThreadItem::AgentMessage(_) => "agent_message",
            ThreadItem::Reasoning(_) => "reasoning",
            ThreadItem::CommandExecution(_) => "command_execution",
            ThreadItem::FileChange(_) => "file_change",
            ThreadItem::McpToolCall(_) => "mcp_tool_call",
            ThreadItem::WebSearch(_) => "web_search",
            ThreadItem::TodoList(_) => "todo_list",
            ThreadItem::Error(_) => "error",
        }
    }

    /// Get the agent message if this is one.
    pub fn as_agent_message(&self) -> Option<&AgentMessageItem> {
        match self {
            ThreadItem::AgentMessage(item) => Some(item),
            _ => None,
        }
    }

    /// Get the command execution if this is one.
    pub fn as_command_execution(&self) -> Option<&CommandExecutionItem> {
        match self {
            ThreadItem::CommandExecution(item) => Some(item),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentMessageItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
}

/// Status of a command execution or MCP tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    InProgress,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandExecutionItem {
    #[serde(default)]
    pub id: String,
    pub command: String,
    /// Combined stdout/stderr captured so far.
    #[serde(default)]
    pub aggregated_output: String,
    /// Set once the command exits.
    #[serde(default)]
    pub exit_code: Option<i32>,
    pub status: ExecutionStatus,
}

/// Kind of change applied to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchChangeKind {
    Add,
    Delete,
    Update,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpdateChange {
    pub path: String,
    pub kind: PatchChangeKind,
}

/// Status of a patch application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchApplyStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChangeItem {
    #[serde(default)]
    pub id: String,
    pub changes: Vec<FileUpdateChange>,
    pub status: PatchApplyStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolCallResult {
    #[serde(default)]
    pub content: Vec<McpContentBlock>,
    #[serde(default)]
    pub structured_content: Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McpToolCallError {
    pub message: String,
}

/// Starts when the invocation is dispatched; completes when the MCP server
/// reports success or failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolCallItem {
    #[serde(default)]
    pub id: String,
    pub server: String,
    pub tool: String,
    #[serde(default)]
    pub arguments: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<McpToolCallResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<McpToolCallError>,
    pub status: ExecutionStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSearchItem {
    #[serde(default)]
    pub id: String,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    pub text: String,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoListItem {
    #[serde(default)]
    pub id: String,
    pub items: Vec<TodoItem>,
}

impl TodoListItem {
    /// Number of completed entries.
    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorItem {
    #[serde(default)]
    pub id: String,
    pub message: String,
}
