//! Collection handles and the per-request operation pipeline.
//!
//! A [`Collection`] is obtained from [`DocumentStore::collection`](crate::store::DocumentStore::collection),
//! which validates the name and provisions storage first. Every operation then runs against
//! the backend and decodes the result:
//!
//! ```ignore
//! let widgets = store.collection("widgets").await?;
//!
//! let id = widgets.create(&data).await?;
//! let page = widgets.list(&ListQuery::from_params(&params)).await?;
//! let doc = widgets.get(&id).await?;
//! ```

use std::fmt;

use tracing::trace;
use uuid::Uuid;

use crate::{
    backend::StoreBackend,
    document::{self, Document, DocumentData},
    error::{DocumentStoreError, DocumentStoreResult},
    page::Page,
    query::{ListQuery, is_allowed_identifier},
};

/// A collection name that passed the identifier allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionName(String);

impl CollectionName {
    /// Validates `name` with the same allow-list used for filter fields.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::InvalidCollectionName`] if the name is empty or contains
    /// anything other than ASCII alphanumerics and underscores.
    pub fn parse(name: &str) -> DocumentStoreResult<Self> {
        if is_allowed_identifier(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(DocumentStoreError::InvalidCollectionName(name.to_string()))
        }
    }

    /// Returns the validated name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A provisioned collection bound to a storage backend.
///
/// # Type Parameters
///
/// * `'a` - Lifetime of the backend reference
/// * `B` - The storage backend type
#[derive(Debug)]
pub struct Collection<'a, B: StoreBackend> {
    name: CollectionName,
    backend: &'a B,
}

impl<'a, B: StoreBackend> Collection<'a, B> {
    /// Creates a new collection reference (internal use).
    pub(crate) fn new(name: CollectionName, backend: &'a B) -> Self {
        Self { name, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Lists one page of documents matching the query, newest first.
    ///
    /// `total_items` counts every match regardless of the window.
    ///
    /// # Errors
    ///
    /// Returns a storage error if either statement fails, or a serialization error if a
    /// stored row cannot be decoded.
    pub async fn list(&self, query: &ListQuery) -> DocumentStoreResult<Page<Document>> {
        trace!(
            "Listing {} with {} predicates, limit {}, offset {}",
            self.name,
            query.filter.len(),
            query.pagination.limit,
            query.pagination.offset
        );

        let total = self
            .backend
            .count_documents(self.name(), &query.filter)
            .await?;

        let items = self
            .backend
            .list_documents(self.name(), query)
            .await?
            .into_iter()
            .map(Document::try_from)
            .collect::<DocumentStoreResult<Vec<_>>>()?;

        Ok(Page::new(items, total, query.pagination))
    }

    /// Retrieves a document by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::DocumentNotFound`] if no document has this identifier.
    pub async fn get(&self, id: &str) -> DocumentStoreResult<Document> {
        trace!("Getting document {} from {}", id, self.name);

        match self
            .backend
            .get_document(self.name(), id)
            .await?
        {
            Some(raw) => Document::try_from(raw),
            None => Err(self.not_found(id)),
        }
    }

    /// Inserts a new document and returns its generated identifier.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the engine rejects the write.
    pub async fn create(&self, data: &DocumentData) -> DocumentStoreResult<String> {
        let id = Uuid::new_v4().to_string();
        trace!("Creating document {} in {}", id, self.name);

        self.backend
            .insert_document(self.name(), &id, &document::encode(data)?)
            .await?;

        Ok(id)
    }

    /// Replaces a document's payload wholesale. `id` and `created` are untouched.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::DocumentNotFound`] if no document has this identifier.
    pub async fn update(&self, id: &str, data: &DocumentData) -> DocumentStoreResult<()> {
        trace!("Updating document {} in {}", id, self.name);

        let affected = self
            .backend
            .update_document(self.name(), id, &document::encode(data)?)
            .await?;

        if affected == 0 {
            return Err(self.not_found(id));
        }

        Ok(())
    }

    /// Removes a document permanently.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::DocumentNotFound`] if no document has this identifier.
    pub async fn delete(&self, id: &str) -> DocumentStoreResult<()> {
        trace!("Deleting document {} from {}", id, self.name);

        let affected = self
            .backend
            .delete_document(self.name(), id)
            .await?;

        if affected == 0 {
            return Err(self.not_found(id));
        }

        Ok(())
    }

    fn not_found(&self, id: &str) -> DocumentStoreError {
        DocumentStoreError::DocumentNotFound(id.to_string(), self.name.to_string())
    }
}
