//! Layered error definitions
//!
//! Categorized by RPC class: argument / lookup / transport / admission / protocol / config

use thiserror::Error;

/// RPC status class of a [`LoggingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    InvalidArgument,
    NotFound,
    Unavailable,
    ResourceExhausted,
    Cancelled,
    Unimplemented,
    Internal,
}

impl StatusCode {
    /// Stable lowercase label, used for metrics and log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::Unavailable => "unavailable",
            Self::ResourceExhausted => "resource_exhausted",
            Self::Cancelled => "cancelled",
            Self::Unimplemented => "unimplemented",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type
#[derive(Debug, Error)]
pub enum LoggingError {
    // ===== Request Errors =====
    /// Malformed request (e.g. empty event_source, foreign page token)
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// No matching item or options
    #[error("not found: {message}")]
    NotFound { message: String },

    // ===== Transport Errors =====
    /// Network or server failure
    #[error("unavailable: {message}")]
    Unavailable { message: String },

    /// Async admission rejected
    #[error("too many outstanding async calls: {in_flight} in flight, limit {limit}")]
    ResourceExhausted { in_flight: usize, limit: usize },

    /// Call state dropped before the transport completed
    #[error("cancelled: {message}")]
    Cancelled { message: String },

    // ===== Protocol Errors =====
    /// Method not supported by the server
    #[error("unimplemented: {method}")]
    Unimplemented { method: String },

    /// Protocol mismatch or server bug
    #[error("internal error: {message}")]
    Internal { message: String },

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoggingError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::Cancelled {
            message: message.into(),
        }
    }

    pub fn unimplemented(method: impl Into<String>) -> Self {
        Self::Unimplemented {
            method: method.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// RPC class of this error.
    ///
    /// Configuration and IO failures happen before any call is issued and
    /// map to `InvalidArgument` and `Unavailable` respectively.
    pub fn code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument { .. } => StatusCode::InvalidArgument,
            Self::NotFound { .. } => StatusCode::NotFound,
            Self::Unavailable { .. } => StatusCode::Unavailable,
            Self::ResourceExhausted { .. } => StatusCode::ResourceExhausted,
            Self::Cancelled { .. } => StatusCode::Cancelled,
            Self::Unimplemented { .. } => StatusCode::Unimplemented,
            Self::Internal { .. } => StatusCode::Internal,
            Self::ConfigParse { .. } | Self::ConfigValidation { .. } => {
                StatusCode::InvalidArgument
            }
            Self::Io(_) => StatusCode::Unavailable,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == StatusCode::NotFound
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, LoggingError>;
