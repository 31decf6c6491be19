//! Error types and result types for document store operations.
//!
//! Every fallible operation in the store returns [`DocumentStoreResult<T>`]. The variants
//! split into three client-visible classes: a missing document, malformed client input,
//! and failures inside the storage engine.

use serde_json::Error as SerdeJsonError;
use thiserror::Error;

/// Represents all possible errors that can occur when interacting with a document store.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// The requested document was not found in the collection.
    /// The first argument is the document ID, the second is the collection name.
    #[error("Document not found {0} in collection {1}")]
    DocumentNotFound(String, String),
    /// The request body could not be decoded into a JSON object.
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    /// The collection name failed the identifier allow-list.
    #[error("Invalid collection name: {0:?}")]
    InvalidCollectionName(String),
    /// A stored payload or timestamp could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization or connection setup.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// The storage engine rejected or failed a statement.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DocumentStoreError {
    /// Returns `true` for errors caused by the caller rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DocumentStoreError::DocumentNotFound(..)
                | DocumentStoreError::MalformedInput(_)
                | DocumentStoreError::InvalidCollectionName(_)
        )
    }
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}
