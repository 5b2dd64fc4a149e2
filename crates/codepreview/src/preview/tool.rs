use std::path::{Path, PathBuf};
use std::sync::Arc;

use codepreview_core::preview::{
    build_messages, finalize_response, missing_parent, parent_dir, preview_file_path,
    validate_arguments, FileHistory, GenerateOutput, PreviewError, PreviewOutput,
    RequestedAction, SharedHistory, ToolArguments, ToolOutput, ValidatedRequest,
    DEFAULT_LANGUAGE, DEFAULT_WORKSPACE_ROOT,
};

use super::model::ModelClient;
use super::operator::FileOperator;

pub const TOOL_NAME: &str = "code_preview";

pub const TOOL_DESCRIPTION: &str = "Generate and preview HTML pages. \
The 'generate' action asks a language model for a complete HTML document built from the prompt \
and saves it as index.html inside task_dir, overwriting any previous version. \
The 'preview' action returns the saved index.html. \
task_dir must be an absolute path under the sandbox root \
and its parent directory must already exist.";

/// JSON schema describing the tool arguments.
pub fn input_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "action": {
                "type": "string",
                "description": "The action to perform",
                "enum": ["generate", "preview"]
            },
            "prompt": {
                "type": "string",
                "description": "Description of the page to generate (required for 'generate')"
            },
            "language": {
                "type": "string",
                "description": "Target language of the generated code",
                "default": DEFAULT_LANGUAGE
            },
            "task_dir": {
                "type": "string",
                "description": "Absolute task directory that holds index.html"
            }
        },
        "required": ["action", "task_dir"]
    })
}

/// Generates HTML pages with a model and stores them as `<task_dir>/index.html`.
///
/// The file operator, model and history store are injected once at
/// construction. Concurrent `generate` calls on the same task directory are
/// not serialized: the last write wins and history keeps both documents.
#[derive(Clone)]
pub struct CodePreviewTool {
    operator: Arc<dyn FileOperator>,
    model: Arc<dyn ModelClient>,
    history: SharedHistory,
    workspace_root: PathBuf,
}

impl CodePreviewTool {
    pub fn new(
        operator: Arc<dyn FileOperator>,
        model: Arc<dyn ModelClient>,
        history: SharedHistory,
    ) -> Self {
        Self {
            operator,
            model,
            history,
            workspace_root: PathBuf::from(DEFAULT_WORKSPACE_ROOT),
        }
    }

    pub fn with_workspace_root(mut self, workspace_root: impl Into<PathBuf>) -> Self {
        self.workspace_root = workspace_root.into();
        self
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn history(&self) -> &SharedHistory {
        &self.history
    }

    /// Documents generated for `file_path`, oldest first.
    pub fn history_for(&self, file_path: &Path) -> Vec<String> {
        self.with_history(|history| history.entries(file_path))
    }

    fn with_history<T>(&self, f: impl FnOnce(&mut FileHistory) -> T) -> T {
        // A poisoned lock only means another call panicked mid-append.
        let mut guard = self
            .history
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    /// Run the tool and return the JSON envelope as text.
    pub async fn execute(&self, args: ToolArguments) -> Result<String, PreviewError> {
        let output = self.run(args).await?;
        output.to_json().map_err(PreviewError::generation)
    }

    /// Run the tool and return the structured result.
    pub async fn run(&self, args: ToolArguments) -> Result<ToolOutput, PreviewError> {
        let request = self.validate(&args).await?;

        log::debug!(
            "code_preview {:?} in {} (language: {})",
            request.action,
            request.task_dir.display(),
            request.language
        );

        match request.action {
            RequestedAction::Generate => {
                let prompt = request.prompt.as_deref().unwrap_or_default();
                self.generate(prompt, &request.task_dir)
                    .await
                    .map(ToolOutput::Generated)
            }
            RequestedAction::Preview => self
                .preview(&request.task_dir)
                .await
                .map(ToolOutput::Previewed),
            RequestedAction::Unsupported(action) => Err(PreviewError::UnsupportedAction(action)),
        }
    }

    async fn validate(&self, args: &ToolArguments) -> Result<ValidatedRequest, PreviewError> {
        let request = validate_arguments(args, &self.workspace_root)?;

        let parent = parent_dir(&request.task_dir);
        let parent_exists = self.operator.exists(&parent).await.map_err(|e| {
            PreviewError::InvalidPath(format!(
                "Failed to check parent directory {}: {e}",
                parent.display()
            ))
        })?;

        if !parent_exists {
            return Err(missing_parent(&parent));
        }

        Ok(request)
    }

    /// Generate a page for `prompt` and store it in `task_dir`.
    ///
    /// Nothing is written unless the model produced a usable document.
    pub async fn generate(
        &self,
        prompt: &str,
        task_dir: &Path,
    ) -> Result<GenerateOutput, PreviewError> {
        self.generate_and_write(prompt, task_dir)
            .await
            .map_err(PreviewError::into_generation)
    }

    async fn generate_and_write(
        &self,
        prompt: &str,
        task_dir: &Path,
    ) -> Result<GenerateOutput, PreviewError> {
        let document = self.generate_document(prompt).await?;

        self.operator
            .create_dir_all(task_dir)
            .await
            .map_err(PreviewError::generation)?;

        let file_path = preview_file_path(task_dir);
        self.operator
            .write_file(&file_path, &document)
            .await
            .map_err(PreviewError::generation)?;

        self.with_history(|history| history.record(&file_path, document.clone()));

        log::info!(
            "Saved {} bytes of HTML to {}",
            document.len(),
            file_path.display()
        );

        Ok(GenerateOutput::saved(document, &file_path))
    }

    /// Ask the model for a page and normalize whatever comes back.
    pub async fn generate_document(&self, prompt: &str) -> Result<String, PreviewError> {
        let messages = build_messages(prompt);

        let response = self
            .model
            .execute(&messages)
            .await
            .map_err(PreviewError::generation)?;

        finalize_response(response).inspect_err(|e| log::warn!("Rejected model output: {e}"))
    }

    /// Read back the stored page for `task_dir`.
    pub async fn preview(&self, task_dir: &Path) -> Result<PreviewOutput, PreviewError> {
        let file_path = preview_file_path(task_dir);

        let exists = self
            .operator
            .exists(&file_path)
            .await
            .map_err(|e| PreviewError::NotFound(format!("No preview file found: {e}")))?;
        if !exists {
            return Err(PreviewError::NotFound("No preview file found".to_string()));
        }

        let code = self
            .operator
            .read_file(&file_path)
            .await
            .map_err(|e| PreviewError::NotFound(format!("Failed to read preview file: {e}")))?;

        Ok(PreviewOutput::new(code, &file_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::operator::LocalFileOperator;
    use crate::preview::testing::{MemoryFileOperator, StubModel};
    use codepreview_core::preview::{ModelResponse, GENERATE_SUCCESS_MESSAGE};
    use tempfile::TempDir;

    const PAGE_A: &str = "<!DOCTYPE html><html><body><h1>A</h1></body></html>";
    const PAGE_B: &str = "<!DOCTYPE html><html><body><h1>B</h1></body></html>";

    fn tool(operator: Arc<MemoryFileOperator>, model: Arc<StubModel>) -> CodePreviewTool {
        CodePreviewTool::new(operator, model, FileHistory::default().shared())
    }

    fn generate_args(prompt: &str, task_dir: &str) -> ToolArguments {
        ToolArguments {
            action: Some("generate".to_string()),
            prompt: Some(prompt.to_string()),
            language: None,
            task_dir: Some(task_dir.to_string()),
        }
    }

    fn preview_args(task_dir: &str) -> ToolArguments {
        ToolArguments {
            action: Some("preview".to_string()),
            prompt: None,
            language: None,
            task_dir: Some(task_dir.to_string()),
        }
    }

    #[tokio::test]
    async fn test_generate_wraps_fragment_and_writes_file() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace"]));
        let model = Arc::new(StubModel::replying(&["<p>hello</p>"]));
        let tool = tool(operator.clone(), model.clone());

        let json = tool
            .execute(generate_args("P", "/workspace/task-1"))
            .await
            .unwrap();
        let envelope: GenerateOutput = serde_json::from_str(&json).unwrap();

        assert!(envelope.code.starts_with("<!DOCTYPE html>"));
        assert!(envelope.code.contains("<body>"));
        assert!(envelope.code.contains("</body>"));
        assert!(envelope.code.contains("<p>hello</p>"));
        assert_eq!(envelope.file_path, "/workspace/task-1/index.html");
        assert_eq!(envelope.message.as_deref(), Some(GENERATE_SUCCESS_MESSAGE));

        assert_eq!(
            operator.file("/workspace/task-1/index.html").as_deref(),
            Some(envelope.code.as_str())
        );
    }

    #[tokio::test]
    async fn test_generate_sends_system_and_user_turns() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace"]));
        let model = Arc::new(StubModel::replying(&[PAGE_A]));
        let tool = tool(operator, model.clone());

        tool.execute(generate_args("A pricing table", "/workspace/t"))
            .await
            .unwrap();

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], build_messages("A pricing table"));
    }

    #[tokio::test]
    async fn test_generate_accepts_structured_response() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace"]));
        let model = Arc::new(StubModel::default());
        model.push(Ok(ModelResponse::Message {
            content: Some(PAGE_A.to_string()),
        }));
        let tool = tool(operator.clone(), model);

        tool.execute(generate_args("P", "/workspace/t"))
            .await
            .unwrap();

        assert_eq!(
            operator.file("/workspace/t/index.html").as_deref(),
            Some(PAGE_A)
        );
    }

    #[tokio::test]
    async fn test_doctype_without_body_fails_without_writing() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace"]));
        let model = Arc::new(StubModel::replying(&[
            "<!DOCTYPE html><html><head></head></html>",
        ]));
        let tool = tool(operator.clone(), model);

        let err = tool
            .execute(generate_args("P", "/workspace/t"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PreviewError::GenerationFailed("Generated code is missing body tags".to_string())
        );
        assert_eq!(operator.file_count(), 0);
        assert!(tool.history_for(Path::new("/workspace/t/index.html")).is_empty());
    }

    #[tokio::test]
    async fn test_empty_model_output_fails_without_writing() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace"]));
        let model = Arc::new(StubModel::replying(&[""]));
        let tool = tool(operator.clone(), model);

        let err = tool
            .execute(generate_args("P", "/workspace/t"))
            .await
            .unwrap_err();

        assert!(matches!(err, PreviewError::GenerationFailed(_)));
        assert_eq!(operator.file_count(), 0);
    }

    #[tokio::test]
    async fn test_model_error_is_wrapped() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace"]));
        let model = Arc::new(StubModel::failing("connection refused"));
        let tool = tool(operator.clone(), model);

        let err = tool
            .execute(generate_args("P", "/workspace/t"))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            PreviewError::GenerationFailed(
                "Code generation failed: Model error: connection refused".to_string()
            )
        );
        assert_eq!(operator.file_count(), 0);
    }

    #[tokio::test]
    async fn test_second_generate_overwrites_and_appends_history() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace"]));
        let model = Arc::new(StubModel::replying(&[PAGE_A, PAGE_B]));
        let tool = tool(operator.clone(), model);

        tool.execute(generate_args("first", "/workspace/t"))
            .await
            .unwrap();
        tool.execute(generate_args("second", "/workspace/t"))
            .await
            .unwrap();

        assert_eq!(
            operator.file("/workspace/t/index.html").as_deref(),
            Some(PAGE_B)
        );
        assert_eq!(
            tool.history_for(Path::new("/workspace/t/index.html")),
            vec![PAGE_A.to_string(), PAGE_B.to_string()]
        );
    }

    #[tokio::test]
    async fn test_history_is_shared_with_owner() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace"]));
        let model = Arc::new(StubModel::replying(&[PAGE_A]));
        let history = FileHistory::new(4, 4).shared();
        let tool = CodePreviewTool::new(operator, model, history.clone());

        tool.execute(generate_args("P", "/workspace/t"))
            .await
            .unwrap();

        let owned = history.lock().unwrap();
        assert_eq!(
            owned.latest(Path::new("/workspace/t/index.html")),
            Some(PAGE_A)
        );
    }

    #[tokio::test]
    async fn test_path_outside_sandbox_rejected_before_any_call() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace", "/tmp"]));
        let model = Arc::new(StubModel::replying(&[PAGE_A]));
        let tool = tool(operator.clone(), model.clone());

        for task_dir in ["/tmp/t", "/home/user/t", "workspace/t"] {
            let err = tool
                .execute(generate_args("P", task_dir))
                .await
                .unwrap_err();
            assert!(matches!(err, PreviewError::InvalidPath(_)), "{task_dir}");
        }

        assert_eq!(operator.call_count(), 0);
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_parent_rejected_before_model_call() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace"]));
        let model = Arc::new(StubModel::replying(&[PAGE_A]));
        let tool = tool(operator.clone(), model.clone());

        let err = tool
            .execute(generate_args("P", "/workspace/missing/t"))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "The parent directory /workspace/missing does not exist. Please create it first."
        );
        assert_eq!(model.call_count(), 0);
        assert_eq!(operator.file_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_arguments() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace"]));
        let model = Arc::new(StubModel::default());
        let tool = tool(operator, model);

        let mut args = generate_args("P", "/workspace/t");
        args.task_dir = None;
        assert!(matches!(
            tool.execute(args).await.unwrap_err(),
            PreviewError::MissingArgument(_)
        ));

        let mut args = generate_args("", "/workspace/t");
        args.prompt = None;
        assert!(matches!(
            tool.execute(args).await.unwrap_err(),
            PreviewError::MissingArgument(_)
        ));
    }

    #[tokio::test]
    async fn test_unsupported_action_after_path_checks() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace"]));
        let model = Arc::new(StubModel::default());
        let tool = tool(operator, model);

        let mut args = preview_args("/workspace/t");
        args.action = Some("deploy".to_string());
        assert_eq!(
            tool.execute(args).await.unwrap_err(),
            PreviewError::UnsupportedAction("deploy".to_string())
        );

        let mut args = preview_args("/workspace/missing/t");
        args.action = Some("deploy".to_string());
        assert!(matches!(
            tool.execute(args).await.unwrap_err(),
            PreviewError::InvalidPath(_)
        ));
    }

    #[tokio::test]
    async fn test_preview_without_generate_is_not_found() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace"]));
        let model = Arc::new(StubModel::default());
        let tool = tool(operator, model.clone());

        let err = tool.execute(preview_args("/workspace/t")).await.unwrap_err();

        assert_eq!(
            err,
            PreviewError::NotFound("No preview file found".to_string())
        );
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn test_preview_returns_written_document() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace"]));
        let model = Arc::new(StubModel::replying(&["<p>hello</p>"]));
        let tool = tool(operator.clone(), model);

        let generated = tool
            .run(generate_args("P", "/workspace/t"))
            .await
            .unwrap();
        let previewed = tool.run(preview_args("/workspace/t")).await.unwrap();

        assert_eq!(previewed.code(), generated.code());
        assert_eq!(previewed.file_path(), "/workspace/t/index.html");

        let json: serde_json::Value =
            serde_json::from_str(&tool.execute(preview_args("/workspace/t")).await.unwrap())
                .unwrap();
        assert_eq!(json["code"], generated.code());
        assert!(json.get("message").is_none());
    }

    #[tokio::test]
    async fn test_preview_does_not_touch_history() {
        let operator = Arc::new(MemoryFileOperator::with_dirs(&["/workspace"]));
        let model = Arc::new(StubModel::replying(&[PAGE_A]));
        let tool = tool(operator.clone(), model);

        tool.execute(generate_args("P", "/workspace/t"))
            .await
            .unwrap();
        let writes = operator.writes.load(std::sync::atomic::Ordering::SeqCst);

        tool.execute(preview_args("/workspace/t")).await.unwrap();
        tool.execute(preview_args("/workspace/t")).await.unwrap();

        assert_eq!(
            operator.writes.load(std::sync::atomic::Ordering::SeqCst),
            writes
        );
        assert_eq!(
            tool.history_for(Path::new("/workspace/t/index.html")).len(),
            1
        );
    }

    #[tokio::test]
    async fn test_local_operator_end_to_end() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        let task_dir = root.join("site");
        let model = Arc::new(StubModel::replying(&["<p>hello</p>"]));

        let tool = CodePreviewTool::new(
            Arc::new(LocalFileOperator),
            model,
            FileHistory::default().shared(),
        )
        .with_workspace_root(&root);

        let generated = tool
            .run(generate_args("P", task_dir.to_str().unwrap()))
            .await
            .unwrap();

        let on_disk = std::fs::read_to_string(task_dir.join("index.html")).unwrap();
        assert_eq!(on_disk, generated.code());

        let previewed = tool
            .run(preview_args(task_dir.to_str().unwrap()))
            .await
            .unwrap();
        assert_eq!(previewed.code(), on_disk);
    }
}
