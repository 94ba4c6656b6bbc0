//! Error types for the studio ledger.

use std::fmt;

/// Result type for ledger and store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the studio ledger.
///
/// Every store and ledger operation returns `Result<T>`. Lookups that
/// reference an absent id on update/delete are not errors: those return
/// `Option`/`bool` and leave the aggregate untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A required field was missing or blank.
    ///
    /// Raised before any mutation is attempted, so the aggregate is
    /// unchanged. Examples:
    /// - customer with an empty `name` or `phone`
    /// - payment with a non-positive `amount`
    /// - message with a blank template
    ValidationError(String),

    /// A referenced record does not exist.
    ///
    /// Only returned where the operation cannot proceed without the record
    /// (e.g. sending a message to an unknown customer). Plain
    /// update/delete calls signal absence with `None`/`false` instead.
    NotFound {
        /// Collection name as it appears in the persisted layout
        collection: &'static str,
        /// The id that was looked up
        id: String,
    },

    /// Sending would cost more message credits than are available.
    ///
    /// Nothing is recorded and no credits are debited.
    InsufficientCredits {
        /// Credits the message (or batch) would consume
        required: i64,
        /// Credits currently on the counter
        available: i64,
    },

    /// Serializing the aggregate failed.
    SerializationError(String),

    /// The persisted aggregate could not be parsed.
    ///
    /// Common causes:
    /// - the stored value is not a JSON object
    /// - a field holds a value of the wrong shape (e.g. an unknown event type)
    ///
    /// **Recovery:** the stored value is left as is; fix or clear it.
    DeserializationError(String),

    /// Storage backend error (file system, Redis, ...).
    ///
    /// In-memory state is not rolled back and nothing is retried.
    BackendError(String),

    /// The backend refused a write because it would exceed its quota.
    QuotaExceeded {
        /// Configured quota in bytes
        limit: usize,
        /// Bytes the store would hold after the write
        requested: usize,
    },

    /// Snapshot bytes do not carry the expected envelope header.
    InvalidSnapshot(String),

    /// Snapshot was written by an incompatible format version.
    VersionMismatch {
        /// Version this build writes and reads
        expected: u32,
        /// Version found in the snapshot
        found: u32,
    },

    /// Invalid store configuration.
    ConfigError(String),

    /// Operation not supported by this backend.
    NotImplemented(String),

    /// Generic error with custom message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Error::NotFound { collection, id } => {
                write!(f, "Not found: {} has no record {}", collection, id)
            }
            Error::InsufficientCredits {
                required,
                available,
            } => write!(
                f,
                "Insufficient credits: need {} but only have {}",
                required, available
            ),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::QuotaExceeded { limit, requested } => write!(
                f,
                "Storage quota exceeded: {} bytes requested, limit is {}",
                requested, limit
            ),
            Error::InvalidSnapshot(msg) => write!(f, "Invalid snapshot: {}", msg),
            Error::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Snapshot version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::NotImplemented(msg) => write!(f, "Not implemented: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// True for the storage-side failures (backend and quota).
    pub fn is_resource(&self) -> bool {
        matches!(self, Error::BackendError(_) | Error::QuotaExceeded { .. })
    }
}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::BackendError(e.to_string())
        } else if e.is_syntax() || e.is_data() || e.is_eof() {
            Error::DeserializationError(e.to_string())
        } else {
            Error::SerializationError(e.to_string())
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::BackendError(e.to_string())
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for Error {
    fn from(e: redis::RedisError) -> Self {
        Error::BackendError(format!("Redis error: {}", e))
    }
}
