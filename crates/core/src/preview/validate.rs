use std::path::{Component, Path, PathBuf};

use super::error::PreviewError;
use super::types::{
    RequestedAction, ToolArguments, ValidatedRequest, DEFAULT_LANGUAGE, PREVIEW_FILE_NAME,
};

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Run the checks that need no filesystem access.
///
/// Order matters: missing arguments first, then the sandbox root. The
/// action itself is only parsed here; rejecting an unknown action happens
/// after the parent directory check.
pub fn validate_arguments(
    args: &ToolArguments,
    workspace_root: &Path,
) -> Result<ValidatedRequest, PreviewError> {
    let action = non_empty(&args.action)
        .ok_or_else(|| PreviewError::MissingArgument("Action is required".to_string()))?;
    let action = RequestedAction::parse(action);

    let task_dir = non_empty(&args.task_dir)
        .ok_or_else(|| PreviewError::MissingArgument("Task directory is required".to_string()))?;

    let prompt = non_empty(&args.prompt).map(str::to_string);
    if action == RequestedAction::Generate && prompt.is_none() {
        return Err(PreviewError::MissingArgument(
            "Prompt is required for code generation".to_string(),
        ));
    }

    let task_dir = check_sandbox_path(task_dir, workspace_root)?;

    Ok(ValidatedRequest {
        action,
        prompt,
        language: non_empty(&args.language)
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string(),
        task_dir,
    })
}

/// Ensure `path` is absolute, rooted at `workspace_root`, and free of `..`.
pub fn check_sandbox_path(path: &str, workspace_root: &Path) -> Result<PathBuf, PreviewError> {
    let candidate = Path::new(path);

    let escapes = candidate
        .components()
        .any(|c| matches!(c, Component::ParentDir));

    if !candidate.is_absolute() || escapes || !candidate.starts_with(workspace_root) {
        return Err(PreviewError::InvalidPath(format!(
            "The path {path} is not a valid path"
        )));
    }

    Ok(candidate.to_path_buf())
}

/// Parent of the task directory; the root itself is its own parent.
pub fn parent_dir(task_dir: &Path) -> PathBuf {
    task_dir
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| task_dir.to_path_buf())
}

pub fn missing_parent(parent: &Path) -> PreviewError {
    PreviewError::InvalidPath(format!(
        "The parent directory {} does not exist. Please create it first.",
        parent.display()
    ))
}

/// Location of the single preview document for a task directory.
pub fn preview_file_path(task_dir: &Path) -> PathBuf {
    task_dir.join(PREVIEW_FILE_NAME)
}
