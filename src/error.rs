//! Error types for the outline toolkit.
//!
//! This module defines all error types that can occur while loading,
//! validating, clearing, or writing a document outline.

/// Result type alias for outline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during outline processing.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Referenced object not found in the object store
    #[error("Object not found: {0}")]
    ObjectNotFound(crate::object::ObjectRef),

    /// Object has wrong type
    #[error("Invalid object type: expected {expected}, found {found}")]
    InvalidObjectType {
        /// Expected object type
        expected: String,
        /// Actual object type found
        found: String,
    },

    /// A required structural link is missing or not an indirect reference
    #[error("invalid outline structure: {0}")]
    Structure(String),

    /// An in-memory outline tree failed invariant validation
    #[error("invalid outline: {0}")]
    InvalidOutline(&'static str),

    /// A destination's page number does not resolve to an existing page
    #[error("page {0} does not exist")]
    PageNotFound(usize),

    /// Attempted to write an outline into a document that already has one
    #[error("outline already exists")]
    OutlineExists,
}
