//! Derived session analytics.
//!
//! Pure, read-only functions over a [`HistoryLog`] snapshot. Everything here
//! is recomputed on demand from the live log: no caching, no hidden state,
//! no I/O, and no failure modes (absent statistics are modeled as `None`,
//! not errors).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::clock::{self, Clock};
use crate::session::history::HistoryLog;
use crate::session::message::Role;

/// Counts and aggregates derived from a history snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    /// User records tagged `command: true`.
    pub commands_executed: usize,
    /// User records tagged `code_execution: true`.
    pub code_executions: usize,
    /// Distinct non-empty `topic` tags, case-sensitive.
    pub topics_covered: Vec<String>,
    /// Occurrences of each `difficulty` tag across all records.
    pub difficulty_distribution: BTreeMap<String, usize>,
    /// Mean of adjacent user→assistant latencies, in seconds.
    /// Absent (not zero) when no adjacent pair exists.
    #[serde(rename = "average_response_time")]
    pub average_response_seconds: Option<f64>,
}

/// How deep the session's material went.
///
/// Ordering matters: variants are declared weakest-first so the most
/// advanced observed tag wins a `max` comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Depth {
    Unknown,
    Beginner,
    Intermediate,
    Advanced,
}

/// Engagement classification on raw record count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engagement {
    Low,
    Moderate,
    High,
}

/// Learning-progress classification for the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningProgress {
    pub topics_explored: usize,
    pub depth: Depth,
    pub hands_on_practice: bool,
    pub engagement: Engagement,
}

/// Session timing as rendered for display and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeInfo {
    pub start_time: String,
    pub end_time: String,
    pub duration_seconds: f64,
    pub duration_formatted: String,
    pub offset_label: String,
}

/// Composite summary: recomputed on demand, never persisted directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub time_info: TimeInfo,
    pub statistics: SessionStats,
    pub learning_progress: LearningProgress,
}

/// Computes counts, topics, and mean response latency for a log snapshot.
pub fn statistics(log: &HistoryLog) -> SessionStats {
    let mut user_messages = 0;
    let mut assistant_messages = 0;
    let mut commands_executed = 0;
    let mut code_executions = 0;
    let mut topics = BTreeSet::new();
    let mut difficulty_distribution: BTreeMap<String, usize> = BTreeMap::new();

    for record in log.records() {
        match record.role {
            Role::User => {
                user_messages += 1;
                if record.metadata_flag("command") {
                    commands_executed += 1;
                }
                if record.metadata_flag("code_execution") {
                    code_executions += 1;
                }
            }
            Role::Assistant => assistant_messages += 1,
        }

        if let Some(topic) = record.metadata_str("topic") {
            let _ = topics.insert(topic.to_string());
        }
        if let Some(difficulty) = record.metadata_str("difficulty") {
            *difficulty_distribution.entry(difficulty.to_string()).or_insert(0) += 1;
        }
    }

    SessionStats {
        total_messages: log.len(),
        user_messages,
        assistant_messages,
        commands_executed,
        code_executions,
        topics_covered: topics.into_iter().collect(),
        difficulty_distribution,
        average_response_seconds: average_response_seconds(log),
    }
}

/// Mean latency over strictly adjacent user→assistant pairs.
///
/// Pairs separated by any other record are excluded. Two assistant
/// messages in a row contribute nothing; the adjacent-only policy
/// deliberately mirrors observed behavior rather than guessing a broader
/// intent.
fn average_response_seconds(log: &HistoryLog) -> Option<f64> {
    let records: Vec<_> = log.records().collect();
    let mut latencies = Vec::new();

    for pair in records.windows(2) {
        if pair[0].role == Role::User && pair[1].role == Role::Assistant {
            let delta = pair[1].created_at - pair[0].created_at;
            latencies.push(clock::duration_to_seconds(&delta));
        }
    }

    if latencies.is_empty() {
        return None;
    }
    Some(latencies.iter().sum::<f64>() / latencies.len() as f64)
}

/// Classifies the session's learning progress.
///
/// Depth picks the most advanced `difficulty` tag observed anywhere in
/// metadata: a single `advanced` tag upgrades the whole session regardless
/// of position or frequency.
pub fn learning_progress(log: &HistoryLog) -> LearningProgress {
    let mut topics = BTreeSet::new();
    let mut depth = Depth::Unknown;
    let mut hands_on_practice = false;

    for record in log.records() {
        if let Some(topic) = record.metadata_str("topic") {
            let _ = topics.insert(topic.to_string());
        }
        if let Some(difficulty) = record.metadata_str("difficulty") {
            depth = depth.max(parse_depth(difficulty));
        }
        if record.metadata_flag("code_execution") {
            hands_on_practice = true;
        }
    }

    let engagement = if log.len() > 10 {
        Engagement::High
    } else if log.len() > 5 {
        Engagement::Moderate
    } else {
        Engagement::Low
    };

    LearningProgress {
        topics_explored: topics.len(),
        depth,
        hands_on_practice,
        engagement,
    }
}

/// Session timing derived from the log's clock and start anchor.
pub fn time_info(log: &HistoryLog) -> TimeInfo {
    let end = log.clock().now();
    let duration = log.session_elapsed();
    TimeInfo {
        start_time: Clock::to_iso(log.session_start()),
        end_time: Clock::to_iso(&end),
        duration_seconds: clock::duration_to_seconds(&duration),
        duration_formatted: clock::format_duration(&duration),
        offset_label: log.clock().offset_label().to_string(),
    }
}

/// Composes timing, statistics, and learning progress into one summary.
pub fn summary(log: &HistoryLog) -> SessionSummary {
    SessionSummary {
        time_info: time_info(log),
        statistics: statistics(log),
        learning_progress: learning_progress(log),
    }
}

fn parse_depth(tag: &str) -> Depth {
    match tag {
        "advanced" => Depth::Advanced,
        "intermediate" => Depth::Intermediate,
        "beginner" => Depth::Beginner,
        _ => Depth::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::session::message::{Metadata, MessageRecord};
    use chrono::Duration;
    use serde_json::json;

    fn record_at(role: Role, seconds_offset: i64, metadata: Metadata) -> MessageRecord {
        let base = Clock::parse_iso("2024-01-01T10:00:00+00:00").unwrap();
        MessageRecord {
            role,
            content: format!("{role:?} at {seconds_offset}"),
            created_at: base + Duration::seconds(seconds_offset),
            elapsed_since_start: Duration::seconds(seconds_offset),
            metadata,
        }
    }

    fn tagged(pairs: &[(&str, serde_json::Value)]) -> Metadata {
        let mut metadata = Metadata::new();
        for (key, value) in pairs {
            metadata.insert((*key).to_string(), value.clone());
        }
        metadata
    }

    fn log_from(records: Vec<MessageRecord>) -> HistoryLog {
        let session_start = Clock::parse_iso("2024-01-01T10:00:00+00:00").unwrap();
        HistoryLog::from_records(100, Clock::utc(), session_start, records)
    }

    #[test]
    fn statistics_counts_tags_and_topics() {
        let log = log_from(vec![
            record_at(Role::User, 0, tagged(&[("topic", json!("variables"))])),
            record_at(Role::Assistant, 1, Metadata::new()),
            record_at(
                Role::User,
                2,
                tagged(&[("topic", json!("strings")), ("command", json!(true))]),
            ),
            record_at(Role::User, 3, tagged(&[("code_execution", json!(true))])),
        ]);

        let stats = statistics(&log);
        assert_eq!(stats.total_messages, 4);
        assert_eq!(stats.user_messages, 3);
        assert_eq!(stats.assistant_messages, 1);
        assert_eq!(stats.commands_executed, 1);
        assert_eq!(stats.code_executions, 1);
        assert_eq!(stats.topics_covered, vec!["strings", "variables"]);
    }

    #[test]
    fn duplicate_topics_collapse_case_sensitively() {
        let log = log_from(vec![
            record_at(Role::User, 0, tagged(&[("topic", json!("Loops"))])),
            record_at(Role::User, 1, tagged(&[("topic", json!("loops"))])),
            record_at(Role::User, 2, tagged(&[("topic", json!("loops"))])),
            record_at(Role::User, 3, tagged(&[("topic", json!(""))])),
        ]);

        let stats = statistics(&log);
        assert_eq!(stats.topics_covered, vec!["Loops", "loops"]);
    }

    #[test]
    fn command_tags_on_assistant_records_do_not_count() {
        let log = log_from(vec![
            record_at(Role::Assistant, 0, tagged(&[("command", json!(true))])),
            record_at(
                Role::Assistant,
                1,
                tagged(&[("code_execution", json!(true))]),
            ),
        ]);

        let stats = statistics(&log);
        assert_eq!(stats.commands_executed, 0);
        assert_eq!(stats.code_executions, 0);
    }

    #[test]
    fn average_latency_over_adjacent_pairs() {
        // Three user→assistant pairs with 1s, 2s, and 3s deltas.
        let log = log_from(vec![
            record_at(Role::User, 0, Metadata::new()),
            record_at(Role::Assistant, 1, Metadata::new()),
            record_at(Role::User, 10, Metadata::new()),
            record_at(Role::Assistant, 12, Metadata::new()),
            record_at(Role::User, 20, Metadata::new()),
            record_at(Role::Assistant, 23, Metadata::new()),
        ]);

        let stats = statistics(&log);
        let average = stats.average_response_seconds.unwrap();
        assert!((average - 2.0).abs() < 1e-9);
    }

    #[test]
    fn average_latency_absent_without_adjacent_pair() {
        // Two consecutive user records, then one assistant record adjacent
        // to the second user only.
        let log = log_from(vec![
            record_at(Role::User, 0, Metadata::new()),
            record_at(Role::User, 5, Metadata::new()),
            record_at(Role::Assistant, 30, Metadata::new()),
        ]);
        let stats = statistics(&log);
        // The u@5 → a@30 pair is adjacent, so it does count.
        assert!((stats.average_response_seconds.unwrap() - 25.0).abs() < 1e-9);

        // No user→assistant adjacency at all: absent, not zero.
        let log = log_from(vec![
            record_at(Role::Assistant, 0, Metadata::new()),
            record_at(Role::User, 5, Metadata::new()),
        ]);
        assert_eq!(statistics(&log).average_response_seconds, None);

        let empty = log_from(vec![]);
        assert_eq!(statistics(&empty).average_response_seconds, None);
    }

    #[test]
    fn depth_picks_most_advanced_tag_anywhere() {
        let log = log_from(vec![
            record_at(Role::User, 0, tagged(&[("difficulty", json!("beginner"))])),
            record_at(Role::User, 1, tagged(&[("difficulty", json!("beginner"))])),
            record_at(Role::User, 2, tagged(&[("difficulty", json!("advanced"))])),
            record_at(Role::User, 3, tagged(&[("difficulty", json!("beginner"))])),
        ]);

        assert_eq!(learning_progress(&log).depth, Depth::Advanced);
    }

    #[test]
    fn depth_unknown_without_difficulty_tags() {
        let log = log_from(vec![
            record_at(Role::User, 0, Metadata::new()),
            record_at(Role::User, 1, tagged(&[("difficulty", json!("expert"))])),
        ]);
        assert_eq!(learning_progress(&log).depth, Depth::Unknown);
    }

    #[test]
    fn engagement_thresholds_on_raw_record_count() {
        let mk = |n: usize| {
            log_from(
                (0..n)
                    .map(|i| record_at(Role::User, i as i64, Metadata::new()))
                    .collect(),
            )
        };

        assert_eq!(learning_progress(&mk(4)).engagement, Engagement::Low);
        assert_eq!(learning_progress(&mk(8)).engagement, Engagement::Moderate);
        assert_eq!(learning_progress(&mk(11)).engagement, Engagement::High);
        // Boundary cases.
        assert_eq!(learning_progress(&mk(5)).engagement, Engagement::Low);
        assert_eq!(learning_progress(&mk(6)).engagement, Engagement::Moderate);
        assert_eq!(learning_progress(&mk(10)).engagement, Engagement::Moderate);
    }

    #[test]
    fn hands_on_practice_from_any_code_execution() {
        let log = log_from(vec![
            record_at(Role::User, 0, Metadata::new()),
            record_at(Role::User, 1, tagged(&[("code_execution", json!(true))])),
        ]);
        assert!(learning_progress(&log).hands_on_practice);

        let log = log_from(vec![record_at(Role::User, 0, Metadata::new())]);
        assert!(!learning_progress(&log).hands_on_practice);
    }

    #[test]
    fn summary_composes_all_three_parts() {
        let mut log = HistoryLog::new(10, Clock::utc());
        log.append(Role::User, "what is a list?", None);
        log.append(Role::Assistant, "an ordered collection", None);

        let summary = summary(&log);
        assert_eq!(summary.statistics.total_messages, 2);
        assert_eq!(summary.learning_progress.engagement, Engagement::Low);
        assert_eq!(summary.time_info.offset_label, "UTC");
        assert!(summary.time_info.duration_seconds >= 0.0);
        assert_eq!(
            Clock::parse_iso(&summary.time_info.start_time).unwrap(),
            *log.session_start()
        );
    }
}
