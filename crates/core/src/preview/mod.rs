pub mod document;
pub mod error;
pub mod history;
pub mod prompt;
pub mod types;
pub mod validate;

pub use document::{extract_text, finalize_response, normalize_document, wrap_document};
pub use error::PreviewError;
pub use history::{FileHistory, SharedHistory};
pub use prompt::{build_messages, SYSTEM_PROMPT};
pub use types::{
    ChatMessage, GenerateOutput, ModelResponse, PreviewOutput, RequestedAction, Role,
    ToolArguments, ToolOutput, ValidatedRequest, DEFAULT_LANGUAGE, DEFAULT_WORKSPACE_ROOT,
    GENERATE_SUCCESS_MESSAGE, PREVIEW_FILE_NAME,
};
pub use validate::{
    check_sandbox_path, missing_parent, parent_dir, preview_file_path, validate_arguments,
};
