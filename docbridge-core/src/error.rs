//! Error types and result types for repository operations.
//!
//! This module provides error handling for every layer of the access stack.
//! Use [`RepositoryResult<T>`] as the return type for fallible operations.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when working with entities
/// through a repository.
///
/// The variants split into three groups: construction-time configuration
/// failures, predicate build failures raised before any store I/O, and
/// failures reported by the external store or by entity/document conversion.
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Invalid or missing store connection parameters.
    /// Raised while constructing a backend, before any store interaction.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A filter criterion named a field the entity type does not declare.
    /// Raised at predicate build time, before any store I/O.
    #[error("Unknown field `{field}` on entity type {entity}")]
    UnknownField {
        /// The unresolvable field name from the criterion.
        field: String,
        /// The entity type the field was resolved against.
        entity: &'static str,
    },
    /// A filter criterion carried a value that is not comparable with the
    /// resolved field. Raised at predicate build time, before any store I/O.
    #[error("Value type mismatch on field `{field}`: expected {expected}, got {actual}")]
    ValueTypeMismatch {
        /// The field the criterion targets.
        field: String,
        /// What the field's declared kind accepts.
        expected: &'static str,
        /// What the criterion actually carried.
        actual: &'static str,
    },
    /// Entity/document conversion failed in either direction: the document's
    /// shape does not satisfy the entity type, or the entity did not
    /// serialize to a document.
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// A document lacks the well-known identity field.
    #[error("Missing identity: {0}")]
    MissingIdentity(String),
    /// A failure reported by the external document store.
    #[error("Store error: {0}")]
    Store(String),
}

/// A specialized `Result` type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<BsonError> for RepositoryError {
    fn from(err: BsonError) -> Self {
        RepositoryError::Deserialization(err.to_string())
    }
}

impl From<SerdeJsonError> for RepositoryError {
    fn from(err: SerdeJsonError) -> Self {
        RepositoryError::Deserialization(err.to_string())
    }
}
