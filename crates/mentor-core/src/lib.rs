//! Core domain layer for the Mentor terminal learning assistant.
//!
//! Contains the timezone-aware clock, the bounded conversation history log,
//! the analytics derived from it, the configuration model, and the session
//! repository contract. No filesystem or network I/O happens in this crate.

pub mod clock;
pub mod config;
pub mod error;
pub mod repository;
pub mod session;

pub use clock::{Clock, Instant};
pub use config::AssistantConfig;
pub use error::{MentorError, Result};
pub use repository::{SavedSession, SessionFileInfo, SessionRepository};
pub use session::{HistoryLog, Metadata, MessageRecord, Role};
