//! Convenient re-exports of commonly used types from docbin.
//!
//! ```ignore
//! use docbin::prelude::*;
//! ```

pub use docbin_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    collection::{Collection, CollectionName},
    document::{Document, DocumentData},
    error::{DocumentStoreError, DocumentStoreResult},
    page::{Page, Pagination},
    query::{ListQuery, Predicate, QueryParams, QueryVisitor},
    store::DocumentStore,
};
