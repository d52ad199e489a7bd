//! Assistant configuration model.
//!
//! Defaults live here; the JSON overlay loading lives in
//! `mentor-infrastructure`. Every field is optional in the file — missing
//! keys keep their default, so a partial `config.json` is valid.

use serde::{Deserialize, Serialize};

/// System prompt used when the configuration does not override it.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are a professional Python programming tutor. Help the user learn Python \
with clear, approachable explanations and practical, runnable code examples.

Follow these principles:
1. Answer concisely, then show a code example when one helps
2. Explain how the code works and the key concepts involved
3. Recommend best practices and idiomatic Python
4. Adjust depth to the user's level and encourage hands-on practice
5. Suggest directions for further study

When the user asks for a demonstration, use the code_runner tool to \
execute the example.";

/// Runtime configuration for the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Upstream chat-completion model name.
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Capacity of the bounded history log.
    pub max_history: usize,
    /// Number of trailing records sent upstream per turn.
    pub context_length: usize,
    /// Timeout for locally executed code snippets.
    pub code_timeout_secs: u64,
    /// Save the session automatically on exit.
    pub auto_save_sessions: bool,
    /// Offset label for the session clock; absent means host-local.
    pub timezone: Option<String>,
    /// Override for the built-in system prompt.
    pub system_prompt: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            model: "kimi-k2-0711-preview".to_string(),
            temperature: 0.3,
            max_tokens: 2048,
            max_history: 50,
            context_length: 8,
            code_timeout_secs: 10,
            auto_save_sessions: true,
            timezone: None,
            system_prompt: None,
        }
    }
}

impl AssistantConfig {
    /// The effective system prompt (configured override or built-in).
    pub fn system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT)
    }
}
