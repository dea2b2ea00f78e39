//! Error types for zonesync
//!
//! The reconciliation itself cannot fail. Every variant here belongs to a
//! collaborator boundary: zone file input, provider lookups, or provider
//! mutations.

use thiserror::Error;

/// Result type alias for zonesync operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for zonesync
#[derive(Error, Debug)]
pub enum Error {
    /// Zone file could not be parsed
    #[error("Zone file parse error: {0}")]
    Parse(String),

    /// Reading the zone file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Zone or record not found at the provider
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP client errors (from provider APIs)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Rate limiting errors
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },

    /// A create/update/delete call failed part way through applying a plan.
    ///
    /// Operations applied before the failure stay applied.
    #[error("Failed to {operation} record {record} after {applied} applied operation(s): {source}")]
    Apply {
        /// The operation that failed
        operation: Operation,
        /// Rendered record the operation targeted
        record: String,
        /// Number of operations that succeeded before this one
        applied: usize,
        /// Underlying provider error
        #[source]
        source: Box<Error>,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// A single provider mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Delete,
    Create,
    Update,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Operation::Delete => "delete",
            Operation::Create => "add",
            Operation::Update => "update",
        })
    }
}

impl Error {
    /// Create a zone file parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a rate limit error
    pub fn rate_limited(msg: impl Into<String>) -> Self {
        Self::RateLimited(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Wrap a provider failure that interrupted a plan
    pub fn apply(operation: Operation, record: impl Into<String>, applied: usize, source: Error) -> Self {
        Self::Apply {
            operation,
            record: record.into(),
            applied,
            source: Box::new(source),
        }
    }

    /// True for errors caused by the zone file or the local configuration
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Error::Parse(_) | Error::Io(_) | Error::Config(_) | Error::InvalidInput(_)
        )
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
