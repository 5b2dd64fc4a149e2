use std::path::PathBuf;
use std::sync::Arc;

use codepreview_core::preview::history::{DEFAULT_ENTRIES_PER_PATH, DEFAULT_MAX_PATHS};
use codepreview_core::preview::{FileHistory, DEFAULT_WORKSPACE_ROOT};

use super::model::{ModelClient, OllamaModel, OpenAiModel};
use super::operator::{FileOperator, LocalFileOperator, SandboxFileOperator};
use super::tool::CodePreviewTool;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Provider {
    /// Local Ollama server
    Ollama,
    /// Any OpenAI-compatible chat completions API
    Openai,
}

/// Settings shared by every command that builds the tool.
#[derive(Debug, Clone, clap::Args)]
pub struct ToolConfig {
    /// Sandbox root every task directory must live under
    #[clap(
        long,
        env = "CODEPREVIEW_WORKSPACE_ROOT",
        global = true,
        default_value = DEFAULT_WORKSPACE_ROOT
    )]
    pub workspace_root: PathBuf,

    /// Read and write files inside a docker container instead of the host
    #[clap(long, env = "CODEPREVIEW_USE_SANDBOX", global = true, default_value = "false")]
    pub sandbox: bool,

    /// Container used when --sandbox is set
    #[clap(
        long,
        env = "CODEPREVIEW_SANDBOX_CONTAINER",
        global = true,
        default_value = "codepreview-sandbox"
    )]
    pub sandbox_container: String,

    /// Model provider used for generation
    #[clap(
        long,
        env = "CODEPREVIEW_PROVIDER",
        global = true,
        value_enum,
        default_value = "ollama"
    )]
    pub provider: Provider,

    /// Model name for generation
    #[clap(long, env = "CODEPREVIEW_MODEL", global = true, default_value = "qwen2.5-coder")]
    pub model: String,

    /// Ollama base URL
    #[clap(long, env = "OLLAMA_URL", global = true, default_value = "http://localhost:11434")]
    pub ollama_url: String,

    /// Base URL of the OpenAI-compatible API
    #[clap(
        long,
        env = "OPENAI_BASE_URL",
        global = true,
        default_value = "https://api.openai.com/v1"
    )]
    pub openai_base_url: String,

    /// API key for the OpenAI-compatible API
    #[clap(long, env = "OPENAI_API_KEY", global = true, hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Generated documents remembered per file
    #[clap(
        long,
        env = "CODEPREVIEW_HISTORY_PER_PATH",
        global = true,
        default_value_t = DEFAULT_ENTRIES_PER_PATH
    )]
    pub history_per_path: usize,

    /// Files remembered in the generation history
    #[clap(
        long,
        env = "CODEPREVIEW_HISTORY_PATHS",
        global = true,
        default_value_t = DEFAULT_MAX_PATHS
    )]
    pub history_paths: usize,
}

impl ToolConfig {
    pub fn file_operator(&self) -> Arc<dyn FileOperator> {
        if self.sandbox {
            Arc::new(SandboxFileOperator::new(&self.sandbox_container))
        } else {
            Arc::new(LocalFileOperator)
        }
    }

    pub fn model_client(&self) -> Result<Arc<dyn ModelClient>, Error> {
        match self.provider {
            Provider::Ollama => Ok(Arc::new(OllamaModel::new(&self.ollama_url, &self.model)?)),
            Provider::Openai => {
                let api_key = self
                    .openai_api_key
                    .as_deref()
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| {
                        Error::Config(
                            "OPENAI_API_KEY (or --openai-api-key) is required for openai"
                                .to_string(),
                        )
                    })?;
                Ok(Arc::new(OpenAiModel::new(
                    &self.openai_base_url,
                    api_key,
                    &self.model,
                )))
            }
        }
    }

    /// Build the tool with a fresh history store.
    pub fn build_tool(&self) -> Result<CodePreviewTool, Error> {
        let history = FileHistory::new(self.history_per_path, self.history_paths).shared();

        Ok(
            CodePreviewTool::new(self.file_operator(), self.model_client()?, history)
                .with_workspace_root(&self.workspace_root),
        )
    }
}
