//! MoonshotProvider - chat-completion client for the Moonshot (Kimi) API.
//!
//! Talks to the OpenAI-compatible `/chat/completions` endpoint directly.
//! One request per turn, 30-second timeout, no retries at this layer.

use std::time::Duration;

use async_trait::async_trait;
use mentor_core::{AssistantConfig, MentorError, Result, Role};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::provider::{ChatOutcome, ChatProvider, ToolCallRequest};
use crate::tools::{default_tools, ToolDefinition};

const BASE_URL: &str = "https://api.moonshot.cn/v1/chat/completions";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider implementation for the Moonshot chat-completion API.
pub struct MoonshotProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    tools: Vec<ToolDefinition>,
}

impl MoonshotProvider {
    /// Creates a provider with the given API key and model parameters.
    ///
    /// # Errors
    ///
    /// `Provider` when the HTTP client cannot be constructed; a client
    /// without the request timeout is never handed out.
    pub fn new(api_key: impl Into<String>, config: &AssistantConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MentorError::provider(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            tools: default_tools(),
        })
    }

    /// Overrides the endpoint after construction.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn send_request(&self, body: &ChatCompletionRequest<'_>) -> Result<ChatOutcome> {
        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| MentorError::provider(format!("chat request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(MentorError::provider(format!(
                "chat request returned {status}: {body_text}"
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| MentorError::provider(format!("failed to parse chat response: {e}")))?;

        Ok(extract_outcome(parsed))
    }
}

#[async_trait]
impl ChatProvider for MoonshotProvider {
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[(Role, String)],
    ) -> Result<ChatOutcome> {
        let mut wire_messages = Vec::with_capacity(messages.len() + 1);
        wire_messages.push(WireMessage {
            role: "system".to_string(),
            content: system_prompt.to_string(),
        });
        for (role, content) in messages {
            wire_messages.push(WireMessage {
                role: match role {
                    Role::User => "user".to_string(),
                    Role::Assistant => "assistant".to_string(),
                },
                content: content.clone(),
            });
        }

        let request = ChatCompletionRequest {
            model: &self.model,
            messages: wire_messages,
            tools: &self.tools,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        tracing::debug!(
            "sending {} messages to {} (model {})",
            request.messages.len(),
            self.base_url,
            self.model
        );
        self.send_request(&request).await
    }
}

fn extract_outcome(response: ChatCompletionResponse) -> ChatOutcome {
    let Some(choice) = response.choices.into_iter().next() else {
        return ChatOutcome::default();
    };

    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .map(|call| ToolCallRequest {
            name: call.function.name,
            arguments: serde_json::from_str(&call.function.arguments)
                .unwrap_or(serde_json::Value::Null),
        })
        .collect();

    ChatOutcome {
        text: choice.message.content.filter(|text| !text.is_empty()),
        tool_calls,
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    tools: &'a [ToolDefinition],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct WireMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Deserialize)]
struct WireToolCall {
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    /// JSON-encoded argument object, per the OpenAI wire format.
    arguments: String,
}
