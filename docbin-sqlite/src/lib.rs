//! SQLite backend implementation for docbin.
//!
//! This crate provides an SQLite-based implementation of the `StoreBackend` trait, using the
//! engine purely as a keyed JSON blob store: one table per collection, one row per document,
//! and the JSON1 functions for payload validation and field extraction.
//!
//! # Features
//!
//! - **Lazy provisioning** - `CREATE TABLE IF NOT EXISTS` on first reference to a collection
//! - **Parameterized filtering** - Predicates compile to clauses with bound values only
//! - **Pooled connections** - Concurrent requests share an async `sqlx` pool in WAL mode
//!
//! # Example
//!
//! ```ignore
//! use docbin::{backend::StoreBackendBuilder, sqlite::SqliteStore, store::DocumentStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let backend = SqliteStore::builder("sqlite://data.db").build().await?;
//!     let store = DocumentStore::new(backend);
//!
//!     store.collection("widgets").await?;
//!
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docbin_sqlite;

pub mod store;
pub mod query;
mod identifier;

pub use store::{SqliteStore, SqliteStoreBuilder};
