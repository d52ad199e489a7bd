//! Durable session record, version 1.0.
//!
//! DTOs decouple the persisted JSON shape from the domain model: the store
//! serializes `SessionRecordV1`, never the domain types directly. There is
//! a single format version; anything else is rejected wholesale at load
//! time rather than partially recovered.

use mentor_core::clock::{self, Clock};
use mentor_core::session::analytics::{self, SessionStats};
use mentor_core::{HistoryLog, MentorError, Metadata, MessageRecord, Result, Role};
use serde::{Deserialize, Serialize};

/// The only recognized value of `session_info.format_version`.
pub const FORMAT_VERSION: &str = "1.0";

/// Top-level durable record: session timing, statistics, and the full
/// serialized history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecordV1 {
    pub session_info: SessionInfoV1,
    pub session_stats: SessionStats,
    pub history: Vec<MessageRecordV1>,
}

/// Session-level timing and provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfoV1 {
    pub start_time: String,
    pub end_time: String,
    pub duration_seconds: f64,
    pub duration_formatted: String,
    pub offset_label: String,
    #[serde(default)]
    pub created_by: Option<String>,
    pub format_version: String,
}

/// One serialized message record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecordV1 {
    pub role: Role,
    pub content: String,
    /// RFC 3339, sub-second precision, offset preserved.
    pub timestamp: String,
    /// Display form, `YYYY-MM-DD HH:MM:SS` in the session's offset.
    pub timestamp_formatted: String,
    pub elapsed_seconds: f64,
    #[serde(default)]
    pub metadata: Metadata,
}

impl SessionRecordV1 {
    /// Assembles a durable record from a live log snapshot.
    ///
    /// Statistics and timing are recomputed here, on every save.
    pub fn from_log(log: &HistoryLog) -> Self {
        let time_info = analytics::time_info(log);
        Self {
            session_info: SessionInfoV1 {
                start_time: time_info.start_time,
                end_time: time_info.end_time,
                duration_seconds: time_info.duration_seconds,
                duration_formatted: time_info.duration_formatted,
                offset_label: time_info.offset_label,
                created_by: Some(format!("Mentor v{}", env!("CARGO_PKG_VERSION"))),
                format_version: FORMAT_VERSION.to_string(),
            },
            session_stats: analytics::statistics(log),
            history: log
                .records()
                .map(|record| MessageRecordV1::from_domain(record, log.clock()))
                .collect(),
        }
    }

    /// Schema-level validation applied before any field is consumed.
    ///
    /// # Errors
    ///
    /// `MalformedRecord` for an unrecognized format version, a history
    /// length that contradicts the recorded total, or an end time earlier
    /// than the start time.
    pub fn validate(&self) -> Result<()> {
        if self.session_info.format_version != FORMAT_VERSION {
            return Err(MentorError::malformed(format!(
                "unrecognized format version '{}' (expected '{}')",
                self.session_info.format_version, FORMAT_VERSION
            )));
        }
        if self.history.len() != self.session_stats.total_messages {
            return Err(MentorError::malformed(format!(
                "history length {} does not match recorded total_messages {}",
                self.history.len(),
                self.session_stats.total_messages
            )));
        }
        let start = Clock::parse_iso(&self.session_info.start_time)?;
        let end = Clock::parse_iso(&self.session_info.end_time)?;
        if end < start {
            return Err(MentorError::malformed(format!(
                "end time {} precedes start time {}",
                self.session_info.end_time, self.session_info.start_time
            )));
        }
        Ok(())
    }
}

impl MessageRecordV1 {
    /// Serializes a domain record, formatting timestamps with the clock
    /// that stamped them.
    pub fn from_domain(record: &MessageRecord, clock: &Clock) -> Self {
        Self {
            role: record.role,
            content: record.content.clone(),
            timestamp: Clock::to_iso(&record.created_at),
            timestamp_formatted: clock.format(&record.created_at, "%Y-%m-%d %H:%M:%S"),
            elapsed_seconds: clock::duration_to_seconds(&record.elapsed_since_start),
            metadata: record.metadata.clone(),
        }
    }

    /// Reconstructs the domain record.
    ///
    /// # Errors
    ///
    /// `MalformedRecord` when the stored timestamp is unparsable.
    pub fn into_domain(self) -> Result<MessageRecord> {
        Ok(MessageRecord {
            role: self.role,
            content: self.content,
            created_at: Clock::parse_iso(&self.timestamp)?,
            elapsed_since_start: clock::duration_from_seconds(self.elapsed_seconds),
            metadata: self.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> SessionRecordV1 {
        let mut log = HistoryLog::new(10, Clock::utc());
        log.append(Role::User, "what is a tuple?", None);
        log.append(Role::Assistant, "an immutable sequence", None);
        SessionRecordV1::from_log(&log)
    }

    #[test]
    fn from_log_records_version_and_counts() {
        let record = sample_record();
        assert_eq!(record.session_info.format_version, "1.0");
        assert_eq!(record.history.len(), 2);
        assert_eq!(record.session_stats.total_messages, 2);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn validate_rejects_unknown_version() {
        let mut record = sample_record();
        record.session_info.format_version = "2.0".to_string();
        assert!(record.validate().unwrap_err().is_malformed());
    }

    #[test]
    fn validate_rejects_count_mismatch() {
        let mut record = sample_record();
        record.session_stats.total_messages = 99;
        assert!(record.validate().unwrap_err().is_malformed());
    }

    #[test]
    fn validate_rejects_inverted_time_range() {
        let mut record = sample_record();
        record.session_info.start_time = "2030-01-01T00:00:00+00:00".to_string();
        assert!(record.validate().unwrap_err().is_malformed());
    }

    #[test]
    fn message_round_trip_preserves_fields() {
        let mut log = HistoryLog::new(10, Clock::new(Some("Asia/Shanghai")));
        let mut metadata = Metadata::new();
        metadata.insert("topic".to_string(), "dicts".into());
        log.append(Role::User, "explain dicts", Some(metadata));

        let original = log.records().next().unwrap().clone();
        let dto = MessageRecordV1::from_domain(&original, log.clock());
        let restored = dto.into_domain().unwrap();

        assert_eq!(restored.role, original.role);
        assert_eq!(restored.content, original.content);
        assert_eq!(restored.created_at, original.created_at);
        assert_eq!(restored.metadata, original.metadata);
    }
}
