use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default sandbox root every task directory must live under.
pub const DEFAULT_WORKSPACE_ROOT: &str = "/workspace";

/// Fixed name of the generated document inside a task directory.
pub const PREVIEW_FILE_NAME: &str = "index.html";

/// Language assumed when the caller does not provide one.
pub const DEFAULT_LANGUAGE: &str = "html";

/// Message returned alongside a freshly generated document.
pub const GENERATE_SUCCESS_MESSAGE: &str = "Code generated and saved successfully";

/// Raw arguments as received from the host framework.
///
/// Every field is optional here so that missing values surface as
/// `MissingArgument` instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolArguments {
    pub action: Option<String>,
    pub prompt: Option<String>,
    pub language: Option<String>,
    pub task_dir: Option<String>,
}

/// The action a caller asked for.
///
/// Unknown actions are carried through validation so that path checks run
/// before the action is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestedAction {
    Generate,
    Preview,
    Unsupported(String),
}

impl RequestedAction {
    pub fn parse(action: &str) -> Self {
        match action {
            "generate" => Self::Generate,
            "preview" => Self::Preview,
            other => Self::Unsupported(other.to_string()),
        }
    }
}

/// Arguments that passed the synchronous checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub action: RequestedAction,
    /// Non-empty whenever `action` is `Generate`.
    pub prompt: Option<String>,
    pub language: String,
    pub task_dir: PathBuf,
}

/// Role of a single conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One turn of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// What a model backend handed back.
///
/// Backends either return a message record exposing a `content` field or a
/// bare string. Both shapes deserialize from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelResponse {
    Message { content: Option<String> },
    Text(String),
}

/// Envelope returned by `generate`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateOutput {
    pub code: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Envelope returned by `preview`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewOutput {
    pub code: String,
    pub file_path: String,
}

/// Result of a successful tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Generated(GenerateOutput),
    Previewed(PreviewOutput),
}

impl ToolOutput {
    pub fn code(&self) -> &str {
        match self {
            Self::Generated(output) => &output.code,
            Self::Previewed(output) => &output.code,
        }
    }

    pub fn file_path(&self) -> &str {
        match self {
            Self::Generated(output) => &output.file_path,
            Self::Previewed(output) => &output.file_path,
        }
    }

    /// The textual JSON envelope handed back to the host framework.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl GenerateOutput {
    /// Envelope for a document that was just written to `file_path`.
    pub fn saved(code: impl Into<String>, file_path: &Path) -> Self {
        Self {
            code: code.into(),
            file_path: file_path.display().to_string(),
            message: Some(GENERATE_SUCCESS_MESSAGE.to_string()),
        }
    }
}

impl PreviewOutput {
    pub fn new(code: impl Into<String>, file_path: &Path) -> Self {
        Self {
            code: code.into(),
            file_path: file_path.display().to_string(),
        }
    }
}
