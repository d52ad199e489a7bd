//! Error types for the Mentor application.

use thiserror::Error;

/// A shared error type for the entire Mentor application.
///
/// Every variant is recoverable at the call site: the surrounding CLI
/// decides whether to report and continue or abort. History mutation and
/// analytics never produce errors at all.
#[derive(Error, Debug)]
pub enum MentorError {
    /// A requested session file does not exist
    #[error("Session not found: '{0}'")]
    NotFound(String),

    /// The session destination could not be written
    #[error("Failed to persist session '{path}': {message}")]
    Persistence { path: String, message: String },

    /// A stored session record is unparsable or schema-mismatched
    #[error("Malformed session record: {0}")]
    MalformedRecord(String),

    /// A time computation produced a negative duration (clock moved backward)
    #[error("Invalid time range: {0}")]
    InvalidRange(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Upstream chat provider error
    #[error("Chat provider error: {0}")]
    Provider(String),
}

impl MentorError {
    /// Creates a NotFound error
    pub fn not_found(source: impl Into<String>) -> Self {
        Self::NotFound(source.into())
    }

    /// Creates a Persistence error
    pub fn persistence(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Persistence {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a MalformedRecord error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord(message.into())
    }

    /// Creates an InvalidRange error
    pub fn invalid_range(message: impl Into<String>) -> Self {
        Self::InvalidRange(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a MalformedRecord error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedRecord(_))
    }

    /// Check if this is an InvalidRange error
    pub fn is_invalid_range(&self) -> bool {
        matches!(self, Self::InvalidRange(_))
    }
}

impl From<std::io::Error> for MentorError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MentorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<chrono::ParseError> for MentorError {
    fn from(err: chrono::ParseError) -> Self {
        Self::MalformedRecord(format!("invalid timestamp: {err}"))
    }
}

/// A type alias for `Result<T, MentorError>`.
pub type Result<T> = std::result::Result<T, MentorError>;
