//! Main document store interface.
//!
//! [`DocumentStore`] owns a backend and hands out [`Collection`] handles. Obtaining a handle
//! is the provisioning step of every request: the name is validated, then the backend is
//! asked to create the collection if it is absent.
//!
//! # Example
//!
//! ```ignore
//! use docbin::store::DocumentStore;
//!
//! let store = DocumentStore::new(backend);
//! let widgets = store.collection("widgets").await?;
//! ```

use tracing::{debug, warn};

use crate::{
    backend::StoreBackend,
    collection::{Collection, CollectionName},
    error::DocumentStoreResult,
};

/// A document store bound to a specific backend implementation.
///
/// The store keeps no state between requests beyond the backend itself; collections are
/// provisioned on every call to [`collection`](Self::collection) through the backend's
/// idempotent primitive, never behind an application-level lock.
#[derive(Debug)]
pub struct DocumentStore<B: StoreBackend> {
    backend: B,
}

impl<B: StoreBackend> DocumentStore<B> {
    /// Creates a new document store with the given backend.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Returns the underlying backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Validates `name`, provisions the collection and returns a handle to it.
    ///
    /// A provisioning failure is logged and swallowed: the handle is still returned, and
    /// operations against a collection that does not exist then fail with a storage error.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidCollectionName`](crate::error::DocumentStoreError::InvalidCollectionName)
    /// if the name fails the identifier allow-list.
    pub async fn collection<'a>(&'a self, name: &str) -> DocumentStoreResult<Collection<'a, B>> {
        let name = CollectionName::parse(name)?;

        match self
            .backend
            .ensure_collection(name.as_str())
            .await
        {
            Ok(()) => debug!("Collection {} provisioned", name),
            Err(e) => warn!("Failed to provision collection {}: {}", name, e),
        }

        Ok(Collection::new(name, &self.backend))
    }

    /// Shuts down the store and releases backend resources.
    ///
    /// # Errors
    ///
    /// Returns an error if the shutdown operation fails.
    pub async fn shutdown(self) -> DocumentStoreResult<()> {
        self.backend.shutdown().await?;

        Ok(())
    }
}
