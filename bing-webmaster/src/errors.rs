//! Error types for the webmaster client.
//!
//! Three failure families exist: local input validation, cross-page
//! consistency violations, and opaque failures of the remote collaborator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WebmasterError>;

/// The main error type for webmaster client operations.
#[derive(Debug, Error)]
pub enum WebmasterError {
    /// Input was rejected before any remote call.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The remote side broke a pagination invariant.
    #[error("{0}")]
    Consistency(#[from] ConsistencyError),

    /// The remote collaborator failed.
    #[error("{0}")]
    Remote(#[from] RemoteError),

    /// A multi-page retrieval was cancelled by the caller.
    #[error("Retrieval cancelled: {0}")]
    Cancelled(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WebmasterError {
    /// Creates a cancellation error, falling back to a generic reason.
    #[must_use]
    pub fn cancelled(reason: Option<String>) -> Self {
        Self::Cancelled(reason.unwrap_or_else(|| "cancelled by caller".to_string()))
    }

    /// Short, stable name of the error family.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Validation(e) => match e.kind {
                ValidationErrorKind::InvalidFormat => "InvalidFormat",
                ValidationErrorKind::InvalidRange => "InvalidRange",
            },
            Self::Consistency(_) => "DuplicateRecord",
            Self::Remote(_) => "RemoteError",
            Self::Cancelled(_) => "Cancelled",
            Self::Config(_) => "ConfigError",
            Self::Serialization(_) => "SerializationError",
            Self::Io(_) => "IoError",
        }
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("type".to_string(), serde_json::json!(self.kind_name()));
        map.insert("message".to_string(), serde_json::json!(self.to_string()));

        match self {
            Self::Validation(e) => {
                map.insert("field".to_string(), serde_json::json!(e.field));
            }
            Self::Consistency(e) => {
                map.insert("page".to_string(), serde_json::json!(e.page));
                map.insert("key".to_string(), serde_json::json!(e.key));
            }
            _ => {}
        }

        map
    }
}

/// The way an input failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationErrorKind {
    /// The value does not have the accepted lexical shape.
    InvalidFormat,
    /// The value is outside the accepted numeric range.
    InvalidRange,
}

impl fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFormat => write!(f, "invalid format"),
            Self::InvalidRange => write!(f, "invalid range"),
        }
    }
}

/// Error raised locally for malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field} ({kind}): {message}")]
pub struct ValidationError {
    /// What went wrong.
    pub kind: ValidationErrorKind,
    /// The offending input field.
    pub field: String,
    /// Human readable detail.
    pub message: String,
}

impl ValidationError {
    /// Creates a format error.
    #[must_use]
    pub fn invalid_format(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ValidationErrorKind::InvalidFormat,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a range error.
    #[must_use]
    pub fn invalid_range(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ValidationErrorKind::InvalidRange,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The way remote data broke a pagination invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsistencyErrorKind {
    /// A record already returned by an earlier page showed up again.
    DuplicateRecord,
}

/// Error raised when aggregated pages overlap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Duplicate record on page {page}: {key}")]
pub struct ConsistencyError {
    /// What went wrong.
    pub kind: ConsistencyErrorKind,
    /// Page on which the repeated record appeared.
    pub page: u64,
    /// Rendered duplicate-detection key.
    pub key: String,
}

impl ConsistencyError {
    /// Creates a duplicate record error.
    #[must_use]
    pub fn duplicate_record(page: u64, key: impl Into<String>) -> Self {
        Self {
            kind: ConsistencyErrorKind::DuplicateRecord,
            page,
            key: key.into(),
        }
    }
}

/// Opaque failure of the remote collaborator.
#[derive(Debug, Error)]
#[error("Remote call failed: {cause}")]
pub struct RemoteError {
    /// The transport's own error, uninterpreted.
    #[source]
    pub cause: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl RemoteError {
    /// Wraps a transport error.
    pub fn new(cause: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        Self {
            cause: cause.into(),
        }
    }

    /// Creates a remote error from a plain message.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(message.into())
    }
}

impl From<serde_json::Error> for WebmasterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
