//! Error types for the contacts layer
//!
//! Validation and listener errors carry the exact message text callers
//! match on. Store failures are produced by [`ContactStore`] implementations
//! and pass through this layer untouched.
//!
//! [`ContactStore`]: crate::traits::ContactStore

use thiserror::Error;

/// Result type alias for contacts operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message raised when a contact argument is absent, not an object, or empty
pub const NON_EMPTY_OBJECT: &str = "contact must be a non-empty object";

/// Message raised by `setup()` on an already active listener
pub const ALREADY_ACTIVE: &str = "An observer is already observing contact changes.";

/// Message raised by `remove()` on an idle listener
pub const NO_ACTIVE_OBSERVER: &str = "No observers are currently observing contact changes.";

/// Core error type for the contacts layer
#[derive(Error, Debug)]
pub enum Error {
    /// Wrong-shaped or wrong-typed argument, raised before any store call
    #[error("{0}")]
    InvalidArgument(String),

    /// Well-typed argument that fails a content constraint
    #[error("{0}")]
    InvalidFormat(String),

    /// `setup()` called while a subscription is already active
    #[error("{}", ALREADY_ACTIVE)]
    AlreadyActive,

    /// `remove()` called while no subscription is active
    #[error("{}", NO_ACTIVE_OBSERVER)]
    NoActiveObserver,

    /// The store could not resolve the target record
    #[error("Contact not found: {0}")]
    NotFound(String),

    /// The store resolved the target to more than one record
    #[error("Ambiguous contact: {0}")]
    Ambiguous(String),

    /// The store refused access (authorization not granted)
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Any other failure reported by the store collaborator
    #[error("Contact store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Coarse classification callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidArgument,
    InvalidFormat,
    AlreadyActive,
    NoActiveObserver,
    StoreFailure,
    Config,
    Internal,
}

impl ErrorKind {
    /// Stable name used on the host bridge wire
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::InvalidFormat => "InvalidFormat",
            ErrorKind::AlreadyActive => "AlreadyActive",
            ErrorKind::NoActiveObserver => "NoActiveObserver",
            ErrorKind::StoreFailure => "StoreFailure",
            ErrorKind::Config => "Config",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create an invalid format error
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an "ambiguous target" error
    pub fn ambiguous(msg: impl Into<String>) -> Self {
        Self::Ambiguous(msg.into())
    }

    /// Create an access denied error
    pub fn access_denied(msg: impl Into<String>) -> Self {
        Self::AccessDenied(msg.into())
    }

    /// Create a generic store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The error's taxonomy bucket
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::InvalidFormat(_) => ErrorKind::InvalidFormat,
            Error::AlreadyActive => ErrorKind::AlreadyActive,
            Error::NoActiveObserver => ErrorKind::NoActiveObserver,
            Error::NotFound(_) | Error::Ambiguous(_) | Error::AccessDenied(_) | Error::Store(_) => {
                ErrorKind::StoreFailure
            }
            Error::Config(_) => ErrorKind::Config,
            Error::Json(_) | Error::Other(_) => ErrorKind::Internal,
        }
    }

    /// Whether the error was raised locally before reaching the store
    pub fn is_validation(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::InvalidArgument | ErrorKind::InvalidFormat
        )
    }
}
