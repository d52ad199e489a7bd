//! Upstream chat-completion client for the Mentor assistant.
//!
//! The rest of the system only knows the [`ChatProvider`] contract: send a
//! system prompt plus a bounded message window, get back assistant text
//! and/or tool-call requests. Protocol details, auth headers, and endpoint
//! choice live entirely in this crate.

mod moonshot;
mod provider;
mod tools;

pub use moonshot::MoonshotProvider;
pub use provider::{ChatOutcome, ChatProvider, ToolCallRequest};
pub use tools::{default_tools, ToolDefinition};
