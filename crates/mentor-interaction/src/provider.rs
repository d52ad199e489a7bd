//! Chat provider contract.

use async_trait::async_trait;
use mentor_core::{Result, Role};

/// A tool invocation requested by the assistant.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    pub name: String,
    /// Parsed tool arguments; `Null` when the upstream payload was not
    /// valid JSON.
    pub arguments: serde_json::Value,
}

impl ToolCallRequest {
    /// Convenience accessor for a string argument.
    pub fn string_argument(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(serde_json::Value::as_str)
    }
}

/// What came back from one completion exchange.
#[derive(Debug, Clone, Default)]
pub struct ChatOutcome {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCallRequest>,
}

/// An upstream chat-completion service.
///
/// One blocking exchange per user turn: the session loop awaits the reply
/// before reading the next input. Retry and backoff policy is deliberately
/// not part of this contract.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends the system prompt and the trailing context window upstream.
    ///
    /// # Errors
    ///
    /// `Provider` for transport failures, non-success statuses, and
    /// unparsable response bodies.
    async fn complete(
        &self,
        system_prompt: &str,
        messages: &[(Role, String)],
    ) -> Result<ChatOutcome>;
}
