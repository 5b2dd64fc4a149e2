use async_trait::async_trait;
use codepreview_core::preview::{ChatMessage, ModelResponse, Role};
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::ollama;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A language model that answers a conversation.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn execute(&self, messages: &[ChatMessage]) -> Result<ModelResponse, Error>;
}

/// Join every turn with the given role, in order.
fn collect_role(messages: &[ChatMessage], role: Role) -> String {
    messages
        .iter()
        .filter(|m| m.role == role)
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Local Ollama model through rig.
///
/// System turns become the agent preamble, user turns the prompt.
pub struct OllamaModel {
    client: ollama::Client,
    model: String,
}

impl OllamaModel {
    pub fn new(ollama_url: &str, model: impl Into<String>) -> Result<Self, Error> {
        use rig::client::Nothing;

        let client = ollama::Client::builder()
            .api_key(Nothing)
            .base_url(ollama_url)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create Ollama client: {e}")))?;

        Ok(Self {
            client,
            model: model.into(),
        })
    }
}

#[async_trait]
impl ModelClient for OllamaModel {
    async fn execute(&self, messages: &[ChatMessage]) -> Result<ModelResponse, Error> {
        let preamble = collect_role(messages, Role::System);
        let prompt = collect_role(messages, Role::User);

        let agent = self.client.agent(&self.model).preamble(&preamble).build();

        let response = agent
            .prompt(&prompt)
            .await
            .map_err(|e| Error::Model(e.to_string()))?;

        Ok(ModelResponse::Text(response))
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ModelResponse,
}

/// Any OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAiModel {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiModel {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ModelClient for OpenAiModel {
    async fn execute(&self, messages: &[ChatMessage]) -> Result<ModelResponse, Error> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Model(format!("Request to {} failed: {e}", self.endpoint())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Model(format!(
                "Model API returned status {status}: {body}"
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Model(format!("Failed to parse model response: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| Error::Model("Model response contained no choices".to_string()))
    }
}
