//! Error types for bag operations.

use thiserror::Error;

/// Errors that can occur when operating on an attribute bag.
///
/// Every failure is synchronous, immediate, and non-retryable; a failed
/// operation leaves the bag's prior state untouched.
#[derive(Debug, Error)]
pub enum BagError {
    /// A key outside the whitelist was written to a restricted bag.
    #[error("attribute [{key}] is not fillable in {bag}")]
    AttributeNotAllowed { key: String, bag: &'static str },

    /// The fluent call interface was invoked with an argument count other
    /// than one.
    #[error("method [{key}] taking {arity} arguments does not exist in {bag}")]
    UnsupportedOperation {
        key: String,
        arity: usize,
        bag: &'static str,
    },

    /// A JSON payload could not be parsed.
    #[error("invalid JSON payload: {0}")]
    Parse(#[from] serde_json::Error),

    /// A JSON payload parsed, but its top level is not an object.
    #[error("JSON payload must be an object, found {found}")]
    NotAnObject { found: &'static str },
}

/// Convenience type alias for bag operations.
pub type Result<T> = std::result::Result<T, BagError>;
