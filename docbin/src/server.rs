//! HTTP surface: routing, request normalization and response mapping.
//!
//! | method   | path                 | operation                 |
//! |----------|----------------------|---------------------------|
//! | `GET`    | `/{collection}`      | list (page envelope)      |
//! | `GET`    | `/{collection}/{id}` | get (item envelope)       |
//! | `POST`   | `/{collection}`      | create, `201 {"id"}`      |
//! | `POST`   | `/{collection}/{id}` | create, the id is ignored |
//! | `PUT`    | `/{collection}/{id}` | update                    |
//! | `DELETE` | `/{collection}/{id}` | delete                    |
//!
//! Any other method and path combination is answered with `405` by the router.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

use docbin_core::{
    backend::StoreBackend,
    document::{self, Document},
    error::DocumentStoreError,
    page::Page,
    query::{ListQuery, QueryParams},
    store::DocumentStore,
};

/// Shared state handed to every handler.
pub type AppState<B> = Arc<DocumentStore<B>>;

/// Builds the router serving every collection in `store`.
pub fn router<B: StoreBackend + 'static>(store: AppState<B>) -> Router {
    Router::new()
        .route(
            "/{collection}",
            get(list_documents::<B>).post(create_document::<B>),
        )
        .route(
            "/{collection}/{id}",
            get(get_document::<B>)
                .post(create_document_ignoring_id::<B>)
                .put(update_document::<B>)
                .delete(delete_document::<B>),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(store)
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// A store error rendered as an HTTP response.
///
/// Client errors carry their cause; server errors are logged and answered with the status
/// reason only.
#[derive(Debug)]
pub struct ApiError(pub DocumentStoreError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DocumentStoreError::DocumentNotFound(..) => StatusCode::NOT_FOUND,
            DocumentStoreError::MalformedInput(_) | DocumentStoreError::InvalidCollectionName(_) => {
                StatusCode::BAD_REQUEST
            }
            DocumentStoreError::Serialization(_)
            | DocumentStoreError::Initialization(_)
            | DocumentStoreError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DocumentStoreError> for ApiError {
    fn from(err: DocumentStoreError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }

        let message = match &self.0 {
            DocumentStoreError::MalformedInput(_) | DocumentStoreError::InvalidCollectionName(_) => {
                self.0.to_string()
            }
            _ => status
                .canonical_reason()
                .unwrap_or_default()
                .to_string(),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

async fn list_documents<B: StoreBackend + 'static>(
    State(store): State<AppState<B>>,
    Path(collection): Path<String>,
    Query(params): Query<QueryParams>,
) -> ApiResult<Json<Page<Document>>> {
    let collection = store.collection(&collection).await?;
    let query = ListQuery::from_params(&params);

    Ok(Json(collection.list(&query).await?))
}

async fn get_document<B: StoreBackend + 'static>(
    State(store): State<AppState<B>>,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult<Json<Document>> {
    Ok(Json(
        store
            .collection(&collection)
            .await?
            .get(&id)
            .await?,
    ))
}

async fn create_document<B: StoreBackend + 'static>(
    State(store): State<AppState<B>>,
    Path(collection): Path<String>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    create(&store, &collection, &body).await
}

async fn create_document_ignoring_id<B: StoreBackend + 'static>(
    State(store): State<AppState<B>>,
    Path((collection, _id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    create(&store, &collection, &body).await
}

async fn create<B: StoreBackend>(
    store: &DocumentStore<B>,
    collection: &str,
    body: &[u8],
) -> ApiResult<(StatusCode, Json<CreatedResponse>)> {
    let collection = store.collection(collection).await?;
    let id = collection
        .create(&document::decode_body(body)?)
        .await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

async fn update_document<B: StoreBackend + 'static>(
    State(store): State<AppState<B>>,
    Path((collection, id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<StatusResponse>> {
    let collection = store.collection(&collection).await?;
    collection
        .update(&id, &document::decode_body(&body)?)
        .await?;

    Ok(Json(StatusResponse { status: "updated" }))
}

async fn delete_document<B: StoreBackend + 'static>(
    State(store): State<AppState<B>>,
    Path((collection, id)): Path<(String, String)>,
) -> ApiResult<Json<StatusResponse>> {
    store
        .collection(&collection)
        .await?
        .delete(&id)
        .await?;

    Ok(Json(StatusResponse { status: "deleted" }))
}
