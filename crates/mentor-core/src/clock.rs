//! Timezone-aware clock service.
//!
//! Wraps the system clock with a fixed, explicitly-configured UTC offset and
//! provides formatting, ISO round-trip serialization, and duration
//! arithmetic. Every timestamp attached to a message record comes from here.

use chrono::{DateTime, Duration, FixedOffset, Local, Offset, Utc};

use crate::error::{MentorError, Result};

/// An absolute point in time tagged with a fixed offset from UTC.
///
/// Once attached to a record the offset is never silently changed;
/// conversions produce a new value rather than mutating in place.
pub type Instant = DateTime<FixedOffset>;

/// A clock with a fixed, explicitly-configured UTC offset.
///
/// Offset selection happens once at construction. The supported labels are
/// a small fixed set; anything unrecognized silently falls back to the
/// host-local offset. That fallback is documented behavior, not a defect:
/// a misconfigured timezone must never prevent the assistant from starting.
#[derive(Debug, Clone)]
pub struct Clock {
    offset: FixedOffset,
    label: String,
}

impl Clock {
    /// Creates a clock for the given offset label.
    ///
    /// Supported labels: `UTC` (case-insensitive), `Asia/Shanghai` /
    /// `Asia/Beijing` (UTC+8), `US/Eastern` (UTC-5, no DST), and
    /// `Europe/London` (UTC+0). `None` or an unrecognized label selects
    /// the host-local offset and the label `"local"`.
    pub fn new(label: Option<&str>) -> Self {
        match label {
            Some(name) => match named_offset(name) {
                Some(offset) => Self {
                    offset,
                    label: name.to_string(),
                },
                None => {
                    tracing::debug!(
                        "unrecognized timezone label '{}', falling back to host-local offset",
                        name
                    );
                    Self::local()
                }
            },
            None => Self::local(),
        }
    }

    /// Creates a clock using the host-local UTC offset.
    pub fn local() -> Self {
        Self {
            offset: Local::now().offset().fix(),
            label: "local".to_string(),
        }
    }

    /// Creates a clock fixed to UTC.
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
            label: "UTC".to_string(),
        }
    }

    /// The label this clock was configured with (`"local"` after fallback).
    pub fn offset_label(&self) -> &str {
        &self.label
    }

    /// Current time tagged with the configured offset.
    pub fn now(&self) -> Instant {
        Utc::now().with_timezone(&self.offset)
    }

    /// Formats an instant with a strftime pattern.
    ///
    /// Deterministic and locale-independent: the same instant and pattern
    /// always produce the same text.
    pub fn format(&self, instant: &Instant, pattern: &str) -> String {
        instant.format(pattern).to_string()
    }

    /// Serializes an instant to RFC 3339, preserving sub-second precision
    /// and the attached offset.
    pub fn to_iso(instant: &Instant) -> String {
        instant.to_rfc3339()
    }

    /// Parses an RFC 3339 string back into an instant.
    ///
    /// Round-trip lossless: `parse_iso(&to_iso(&x))` reproduces `x`,
    /// including sub-second components and the offset.
    pub fn parse_iso(value: &str) -> Result<Instant> {
        DateTime::parse_from_rfc3339(value)
            .map_err(|e| MentorError::malformed(format!("cannot parse timestamp '{value}': {e}")))
    }

    /// Computes `now() - since`.
    ///
    /// # Errors
    ///
    /// Returns [`MentorError::InvalidRange`] when `since` is later than the
    /// current time (the system clock moved backward). Callers are expected
    /// to treat that as "duration is roughly zero", not as fatal.
    pub fn elapsed(&self, since: &Instant) -> Result<Duration> {
        let now = self.now();
        if *since > now {
            return Err(MentorError::invalid_range(format!(
                "start time {} is later than current time {}",
                Self::to_iso(since),
                Self::to_iso(&now)
            )));
        }
        Ok(now - *since)
    }

    /// Like [`Clock::elapsed`], but clamps a backwards clock to zero.
    pub fn elapsed_or_zero(&self, since: &Instant) -> Duration {
        self.elapsed(since).unwrap_or_else(|_| Duration::zero())
    }

    /// Generates a timestamped session file name, e.g.
    /// `mentor_session_20240101_120000.json`.
    pub fn session_filename(&self, prefix: &str) -> String {
        format!("{}_{}.json", prefix, self.format(&self.now(), "%Y%m%d_%H%M%S"))
    }
}

/// Renders a duration using its largest applicable unit.
///
/// `2 hours 5 minutes 3 seconds`, `3 minutes 2 seconds`, `42 seconds`.
/// Anything under one second renders as `0 seconds`.
pub fn format_duration(duration: &Duration) -> String {
    let total = duration.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!(
            "{} {} {}",
            unit(hours, "hour"),
            unit(minutes, "minute"),
            unit(seconds, "second")
        )
    } else if minutes > 0 {
        format!("{} {}", unit(minutes, "minute"), unit(seconds, "second"))
    } else {
        unit(seconds, "second")
    }
}

/// Converts a duration to fractional seconds for serialization.
pub fn duration_to_seconds(duration: &Duration) -> f64 {
    duration
        .num_microseconds()
        .map_or_else(|| duration.num_milliseconds() as f64 / 1e3, |us| us as f64 / 1e6)
}

/// Reconstructs a duration from fractional seconds.
///
/// Negative or non-finite input clamps to zero; stored elapsed values are
/// derived data and must never poison a load.
pub fn duration_from_seconds(seconds: f64) -> Duration {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Duration::zero();
    }
    Duration::from_std(std::time::Duration::from_secs_f64(seconds))
        .unwrap_or_else(|_| Duration::zero())
}

fn named_offset(name: &str) -> Option<FixedOffset> {
    let seconds = if name.eq_ignore_ascii_case("UTC") || name == "Europe/London" {
        0
    } else if name == "Asia/Shanghai" || name == "Asia/Beijing" {
        8 * 3600
    } else if name == "US/Eastern" {
        -5 * 3600
    } else {
        return None;
    };
    FixedOffset::east_opt(seconds)
}

fn unit(count: i64, name: &str) -> String {
    if count == 1 {
        format!("1 {name}")
    } else {
        format!("{count} {name}s")
    }
}
