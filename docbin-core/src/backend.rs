//! Storage backend abstraction for the document store.
//!
//! A [`StoreBackend`] is the query executor: it provisions collections, runs the count and
//! windowed select for list requests, and performs single-document reads and writes by
//! identifier. Backends return undecoded [`RawDocument`] rows; decoding is the job of the
//! [`document`](crate::document) codec.
//!
//! # Examples
//!
//! ```ignore
//! use docbin::backend::StoreBackend;
//! use docbin::query::ListQuery;
//!
//! backend.ensure_collection("widgets").await?;
//! let total = backend.count_documents("widgets", &[]).await?;
//! let rows = backend.list_documents("widgets", &ListQuery::new()).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    document::RawDocument,
    error::DocumentStoreResult,
    query::{ListQuery, Predicate},
};

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` and tolerate concurrent readers and writers within
/// one collection and across collections. No operation may rely on an in-process lock held
/// across calls; consistency comes from the engine's single-statement guarantees.
///
/// # Identifiers
///
/// Collection names reaching a backend have already passed the identifier allow-list.
/// Every other value must be passed to the engine as a bound parameter.
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Guarantees that the named collection exists.
    ///
    /// Must be idempotent and safe under concurrent first use: issuing the creation more than
    /// once is acceptable, creating duplicate structure is not.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine refuses the creation statement.
    async fn ensure_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Counts documents matching every predicate, ignoring pagination.
    async fn count_documents(
        &self,
        collection: &str,
        filter: &[Predicate],
    ) -> DocumentStoreResult<usize>;

    /// Returns one window of matching documents, newest first.
    async fn list_documents(
        &self,
        collection: &str,
        query: &ListQuery,
    ) -> DocumentStoreResult<Vec<RawDocument>>;

    /// Fetches a document by identifier, or `None` if absent.
    async fn get_document(
        &self,
        collection: &str,
        id: &str,
    ) -> DocumentStoreResult<Option<RawDocument>>;

    /// Inserts a new document. Timestamps are assigned by the engine.
    ///
    /// The payload must be validated by the engine at write time; malformed JSON fails the
    /// write.
    async fn insert_document(
        &self,
        collection: &str,
        id: &str,
        payload: &str,
    ) -> DocumentStoreResult<()>;

    /// Replaces a document's payload and refreshes its `updated` timestamp.
    ///
    /// Returns the number of affected documents; zero means the identifier is absent.
    async fn update_document(
        &self,
        collection: &str,
        id: &str,
        payload: &str,
    ) -> DocumentStoreResult<u64>;

    /// Removes a document.
    ///
    /// Returns the number of affected documents; zero means the identifier is absent.
    async fn delete_document(&self, collection: &str, id: &str) -> DocumentStoreResult<u64>;

    /// Cleanly shuts down the backend, releasing all resources.
    ///
    /// The default implementation is a no-op.
    async fn shutdown(self) -> DocumentStoreResult<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
