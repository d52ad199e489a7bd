//! Session domain: message records, the bounded history log, and the
//! analytics derived from it.

pub mod analytics;
pub mod history;
pub mod message;

pub use analytics::{
    Depth, Engagement, LearningProgress, SessionStats, SessionSummary, TimeInfo,
};
pub use history::HistoryLog;
pub use message::{Metadata, MessageRecord, Role};
