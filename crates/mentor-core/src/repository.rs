//! Session repository trait.
//!
//! Defines the interface for session persistence, decoupling the domain
//! from the storage format. There is exactly one implementation (the JSON
//! file store in `mentor-infrastructure`); the seam exists so the CLI and
//! tests depend on the contract, not the filesystem.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::clock::Instant;
use crate::error::Result;
use crate::session::history::HistoryLog;
use crate::session::message::MessageRecord;

/// The reconstruction data read back from a stored session.
#[derive(Debug, Clone)]
pub struct SavedSession {
    /// Records in their original conversation order.
    pub records: Vec<MessageRecord>,
    /// Anchor for elapsed-time computations, exactly as saved.
    pub session_start: Instant,
    /// Human-readable duration recorded at save time.
    pub duration_formatted: String,
}

/// A one-line listing entry for a stored session file.
#[derive(Debug, Clone)]
pub struct SessionFileInfo {
    pub filename: String,
    pub start_time: String,
    pub message_count: usize,
}

/// An abstract store for durable session records.
///
/// Implementations perform no caching across calls: every `save` recomputes
/// statistics from the live log, and every `load` re-reads the source.
///
/// # Errors
///
/// - `save` fails with [`Persistence`](crate::MentorError::Persistence)
///   when the destination cannot be written; the in-memory session state
///   is unaffected and no partial file is left behind.
/// - `load` fails with [`NotFound`](crate::MentorError::NotFound) for a
///   missing source and [`MalformedRecord`](crate::MentorError::MalformedRecord)
///   for an unparsable, schema-mismatched, or unrecognized-version record.
///   Partial or corrupt records are rejected wholesale.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Serializes the log plus session-level timing and statistics to a
    /// durable record. `filename` defaults to a timestamped name derived
    /// from the log's clock. Returns the resolved location.
    async fn save(&self, log: &HistoryLog, filename: Option<&str>) -> Result<PathBuf>;

    /// Reads and parses a stored record, returning everything needed to
    /// reconstruct a [`HistoryLog`] with its original `session_start`.
    async fn load(&self, source: &str) -> Result<SavedSession>;

    /// Lists stored sessions, most recent first.
    async fn list(&self) -> Result<Vec<SessionFileInfo>>;
}
