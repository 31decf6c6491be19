//! Schema-less JSON document store over HTTP.
//!
//! `docbin` stores arbitrary JSON objects in named collections. Collections are created on
//! first reference, documents get server-assigned ids and timestamps, and listings support
//! equality filters on top-level fields, range filters on the timestamps and bounded
//! pagination.
//!
//! This crate is the entry point: it re-exports the core types, exposes the SQLite backend
//! and provides the HTTP server.
//!
//! # Quick Start
//!
//! ```ignore
//! use docbin::{prelude::*, query::FieldName, sqlite::SqliteStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(SqliteStore::builder("sqlite://data.db").build().await?);
//!     let widgets = store.collection("widgets").await?;
//!
//!     let mut data = DocumentData::new();
//!     data.insert("color".into(), "red".into());
//!     let id = widgets.create(&data).await?;
//!
//!     let color = FieldName::parse("color").ok_or("invalid field")?;
//!     let page = widgets
//!         .list(&ListQuery::builder().filter(Predicate::eq(color, "red")).build())
//!         .await?;
//!     println!("{} of {} ({id})", page.items.len(), page.total_items);
//!
//!     store.shutdown().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Serving
//!
//! ```ignore
//! use std::sync::Arc;
//! use docbin::{prelude::*, server, sqlite::SqliteStore};
//!
//! let store = Arc::new(DocumentStore::new(SqliteStore::builder("sqlite://data.db").build().await?));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, server::router(store)).await?;
//! ```

use std::{sync::Arc, time::Duration};

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub mod config;
pub mod logging;
pub mod prelude;
pub mod server;

pub use docbin_core::{backend, collection, document, error, page, query, store};

/// SQLite storage backend implementations.
pub mod sqlite {
    pub use docbin_sqlite::{SqliteStore, SqliteStoreBuilder};
}

use crate::{
    backend::{StoreBackend, StoreBackendBuilder},
    config::Config,
    error::DocumentStoreError,
    sqlite::SqliteStore,
    store::DocumentStore,
};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Store error: {0}")]
    Store(#[from] DocumentStoreError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Opens the store described by `config` and serves it until interrupted.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or the listener cannot be bound.
pub async fn run(config: Config) -> Result<(), ServerError> {
    let backend = SqliteStore::builder(&config.database_url)
        .with_max_connections(config.max_connections)
        .with_busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .build()
        .await?;
    let store = Arc::new(DocumentStore::new(backend.clone()));

    let listener = TcpListener::bind(&config.listen).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, server::router(store))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    backend.shutdown().await?;
    info!("Store closed");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
    }

    info!("Shutting down");
}
