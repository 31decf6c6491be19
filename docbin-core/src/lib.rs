//! Core of a schema-less JSON document store backed by a relational engine.
//!
//! Clients name a collection, the store provisions it on first use, and documents are kept
//! as JSON payloads keyed by a generated identifier. This crate holds everything that does
//! not depend on a particular engine:
//!
//! - **Error handling** ([`error`]) - The error taxonomy and result type
//! - **Documents** ([`document`]) - The codec between stored text and item envelopes
//! - **Filtering** ([`query`]) - Compilation of query parameters into safe predicates
//! - **Pagination** ([`page`]) - Window controls and the page envelope
//! - **Store backend abstraction** ([`backend`]) - The trait engines implement
//! - **Collections** ([`collection`]) - The per-request operation pipeline
//! - **Document store** ([`store`]) - Collection provisioning and handles
//!
//! # Example
//!
//! ```ignore
//! use docbin::{store::DocumentStore, query::ListQuery};
//! use serde_json::json;
//!
//! let store = DocumentStore::new(backend);
//! let widgets = store.collection("widgets").await?;
//!
//! let data = json!({ "color": "red" }).as_object().cloned().unwrap();
//! let id = widgets.create(&data).await?;
//!
//! let page = widgets
//!     .list(&ListQuery::from_params(&[("color".into(), "red".into())]))
//!     .await?;
//! assert_eq!(page.items[0].id, id);
//! ```

#[allow(unused_extern_crates)]
extern crate self as docbin_core;

pub mod backend;
pub mod collection;
pub mod document;
pub mod error;
pub mod page;
pub mod query;
pub mod store;
