//! Bounded, append-only conversation log.

use std::collections::VecDeque;

use chrono::Duration;

use crate::clock::{self, Clock, Instant};
use crate::session::message::{Metadata, MessageRecord, Role};

/// Default number of records retained before eviction begins.
pub const DEFAULT_CAPACITY: usize = 50;

/// An ordered, bounded sequence of message records.
///
/// The log is a conversation window, not a full archive: appending beyond
/// capacity evicts the oldest record first (FIFO). Records are created only
/// through [`HistoryLog::append`] and never mutated afterwards.
///
/// The log owns its [`Clock`]; `session_start` is fixed at construction
/// (or at load time, via [`HistoryLog::from_records`]) and anchors the
/// elapsed time attached to every record.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    records: VecDeque<MessageRecord>,
    capacity: usize,
    session_start: Instant,
    clock: Clock,
}

impl HistoryLog {
    /// Creates an empty log with `session_start` pinned to the current time.
    ///
    /// A zero capacity is clamped to one: a log that can hold nothing
    /// cannot represent a conversation.
    pub fn new(capacity: usize, clock: Clock) -> Self {
        let session_start = clock.now();
        Self {
            records: VecDeque::new(),
            capacity: capacity.max(1),
            session_start,
            clock,
        }
    }

    /// Reconstructs a log from previously saved records.
    ///
    /// Used by the session store's load path. Records keep their original
    /// order; if there are more than `capacity` of them, only the last
    /// `capacity` are retained, exactly as live eviction would have done.
    pub fn from_records(
        capacity: usize,
        clock: Clock,
        session_start: Instant,
        records: Vec<MessageRecord>,
    ) -> Self {
        let mut log = Self {
            records: records.into(),
            capacity: capacity.max(1),
            session_start,
            clock,
        };
        log.evict_overflow();
        log
    }

    /// Appends a message to the log. Always succeeds.
    ///
    /// The record is stamped with the clock's current time and the elapsed
    /// duration since session start (clamped to zero if the system clock
    /// moved backward). Two timing tags are supplemented into the metadata
    /// at creation time: `session_elapsed` (formatted duration) and
    /// `message_time` (HH:MM:SS).
    pub fn append(&mut self, role: Role, content: impl Into<String>, metadata: Option<Metadata>) {
        let created_at = self.clock.now();
        let elapsed = self.clock.elapsed_or_zero(&self.session_start);

        let mut metadata = metadata.unwrap_or_default();
        let _ = metadata.insert(
            "session_elapsed".to_string(),
            clock::format_duration(&elapsed).into(),
        );
        let _ = metadata.insert(
            "message_time".to_string(),
            self.clock.format(&created_at, "%H:%M:%S").into(),
        );

        self.records.push_back(MessageRecord {
            role,
            content: content.into(),
            created_at,
            elapsed_since_start: elapsed,
            metadata,
        });
        self.evict_overflow();
    }

    /// The last `n` records as bare `(role, content)` pairs, oldest first.
    ///
    /// This is exactly what goes upstream: metadata and timestamps are
    /// stripped, and `n` bounds the outbound payload size. `n == 0` yields
    /// an empty window.
    pub fn context_window(&self, n: usize) -> Vec<(Role, String)> {
        let skip = self.records.len().saturating_sub(n);
        self.records
            .iter()
            .skip(skip)
            .map(|record| (record.role, record.content.clone()))
            .collect()
    }

    /// Number of retained records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no records are retained.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of records retained before eviction.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The instant that anchors every record's elapsed duration.
    pub fn session_start(&self) -> &Instant {
        &self.session_start
    }

    /// The clock that stamps this log's records.
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Duration since session start, clamped to zero on clock regression.
    pub fn session_elapsed(&self) -> Duration {
        self.clock.elapsed_or_zero(&self.session_start)
    }

    /// Iterates retained records in conversation order.
    pub fn records(&self) -> impl Iterator<Item = &MessageRecord> {
        self.records.iter()
    }

    /// Drops oldest records until the capacity invariant holds.
    ///
    /// Eviction is normal operation, not a failure mode.
    fn evict_overflow(&mut self) {
        while self.records.len() > self.capacity {
            if let Some(evicted) = self.records.pop_front() {
                tracing::trace!(
                    "evicted oldest record ({:?}, {} chars) to stay within capacity {}",
                    evicted.role,
                    evicted.content.len(),
                    self.capacity
                );
            }
        }
    }
}
