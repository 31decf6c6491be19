use std::time::Duration;

use futures::future::join_all;
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};

use docbin_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    document::{DocumentData, format_timestamp},
    error::DocumentStoreError,
    query::{ListQuery, QueryParams},
    store::DocumentStore,
};
use docbin_sqlite::SqliteStore;

async fn open(dir: &TempDir) -> DocumentStore<SqliteStore> {
    let url = format!("sqlite://{}", dir.path().join("docbin.db").display());
    let backend = SqliteStore::builder(&url)
        .build()
        .await
        .unwrap();

    DocumentStore::new(backend)
}

fn data(value: Value) -> DocumentData {
    value.as_object().cloned().unwrap()
}

fn params(pairs: &[(&str, &str)]) -> QueryParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn query(pairs: &[(&str, &str)]) -> ListQuery {
    ListQuery::from_params(&params(pairs))
}

async fn tick() {
    tokio::time::sleep(Duration::from_millis(15)).await;
}

#[tokio::test]
async fn test_concurrent_provisioning_creates_one_table() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;

    let results = join_all((0..16).map(|_| store.collection("widgets"))).await;
    assert!(results.iter().all(Result::is_ok));

    store.collection("widgets").await.unwrap();

    let pool = store.backend().pool();
    let tables: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?")
        .bind("widgets")
        .fetch_one(pool)
        .await
        .unwrap();
    let columns: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_table_info(?)")
        .bind("widgets")
        .fetch_all(pool)
        .await
        .unwrap();

    assert_eq!(tables, 1);
    assert_eq!(columns, vec!["id", "data", "created", "updated"]);
}

#[tokio::test]
async fn test_reprovisioning_keeps_existing_documents() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;

    let id = store
        .collection("widgets")
        .await
        .unwrap()
        .create(&data(json!({"color": "red"})))
        .await
        .unwrap();

    let widgets = store.collection("widgets").await.unwrap();
    assert_eq!(widgets.get(&id).await.unwrap().data["color"], "red");
}

#[tokio::test]
async fn test_invalid_collection_name_is_rejected() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;

    for name in ["wid-gets", "a;DROP TABLE b", ""] {
        assert!(matches!(
            store.collection(name).await,
            Err(DocumentStoreError::InvalidCollectionName(_))
        ));
    }
}

#[tokio::test]
async fn test_refused_provisioning_surfaces_as_storage_error() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;

    // Allow-listed, but the engine reserves the prefix.
    let reserved = store.collection("sqlite_widgets").await.unwrap();

    assert!(matches!(
        reserved.list(&ListQuery::new()).await,
        Err(DocumentStoreError::Storage(_))
    ));
    assert!(matches!(
        reserved.create(&data(json!({"a": 1}))).await,
        Err(DocumentStoreError::Storage(_))
    ));
}

#[tokio::test]
async fn test_equality_filter_matches_field_as_text() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;
    let things = store.collection("things").await.unwrap();

    let first = things.create(&data(json!({"a": "1"}))).await.unwrap();
    things.create(&data(json!({"a": "2"}))).await.unwrap();

    let page = things
        .list(&ListQuery::from_params(&params(&[("a", "1")])))
        .await
        .unwrap();

    assert_eq!(page.total_items, 1);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, first);
}

#[tokio::test]
async fn test_numbers_and_booleans_compare_by_text_form() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;
    let things = store.collection("things").await.unwrap();

    things.create(&data(json!({"n": 1, "flag": true}))).await.unwrap();
    things.create(&data(json!({"n": 2, "flag": false}))).await.unwrap();

    let by_number = things
        .list(&ListQuery::from_params(&params(&[("n", "1")])))
        .await
        .unwrap();
    let by_flag = things
        .list(&ListQuery::from_params(&params(&[("flag", "0")])))
        .await
        .unwrap();

    assert_eq!(by_number.items[0].data["n"], 1);
    assert_eq!(by_flag.items[0].data["n"], 2);
}

#[tokio::test]
async fn test_keys_outside_allow_list_are_ignored() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;
    let things = store.collection("things").await.unwrap();

    things.create(&data(json!({"a": "1"}))).await.unwrap();
    things.create(&data(json!({"a": "2"}))).await.unwrap();

    let page = things
        .list(&ListQuery::from_params(&params(&[
            ("unknown-key", "x"),
            ("a') OR ('1'='1", "x"),
        ])))
        .await
        .unwrap();

    assert_eq!(page.total_items, 2);
}

#[tokio::test]
async fn test_allow_listed_key_for_absent_field_matches_nothing() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;
    let things = store.collection("things").await.unwrap();

    things.create(&data(json!({"a": "1"}))).await.unwrap();

    let page = things
        .list(&ListQuery::from_params(&params(&[("unknownkey", "x")])))
        .await
        .unwrap();

    assert_eq!(page.total_items, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_pagination_windows_cover_every_match_once() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;
    let things = store.collection("things").await.unwrap();

    let mut created = Vec::new();
    for n in 0..7 {
        created.push(things.create(&data(json!({"n": n, "kind": "x"}))).await.unwrap());
    }
    things.create(&data(json!({"kind": "y"}))).await.unwrap();

    let mut seen = Vec::new();
    let mut has_more = Vec::new();
    for offset in [0, 3, 6] {
        let page = things
            .list(&ListQuery::from_params(&params(&[
                ("kind", "x"),
                ("limit", "3"),
                ("offset", offset.to_string().as_str()),
            ])))
            .await
            .unwrap();

        assert_eq!(page.total_items, 7);
        assert_eq!(page.limit, 3);
        assert_eq!(page.offset, offset);
        has_more.push(page.has_more);
        seen.extend(page.items.into_iter().map(|doc| doc.id));
    }

    created.reverse();
    assert_eq!(seen, created);
    assert_eq!(has_more, vec![true, true, false]);
}

#[tokio::test]
async fn test_default_and_clamped_limits() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;
    let things = store.collection("things").await.unwrap();

    for n in 0..12 {
        things.create(&data(json!({"n": n}))).await.unwrap();
    }

    let default = things
        .list(&ListQuery::from_params(&params(&[("limit", "abc")])))
        .await
        .unwrap();
    let clamped = things
        .list(&ListQuery::from_params(&params(&[("limit", "1000")])))
        .await
        .unwrap();

    assert_eq!((default.items.len(), default.limit, default.has_more), (10, 10, true));
    assert_eq!((clamped.items.len(), clamped.limit, clamped.has_more), (12, 100, false));
}

#[tokio::test]
async fn test_range_filters_on_created() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;
    let things = store.collection("things").await.unwrap();

    let older = things.create(&data(json!({"n": 1}))).await.unwrap();
    tick().await;
    let newer = things.create(&data(json!({"n": 2}))).await.unwrap();

    let boundary = format_timestamp(&things.get(&newer).await.unwrap().created);

    let from = things
        .list(&ListQuery::from_params(&params(&[("created_gte", boundary.as_str())])))
        .await
        .unwrap();
    let before = things
        .list(&ListQuery::from_params(&params(&[("created_lt", boundary.as_str())])))
        .await
        .unwrap();

    assert_eq!(from.items.iter().map(|d| &d.id).collect::<Vec<_>>(), vec![&newer]);
    assert_eq!(before.items.iter().map(|d| &d.id).collect::<Vec<_>>(), vec![&older]);
}

#[tokio::test]
async fn test_range_filters_on_updated() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;
    let things = store.collection("things").await.unwrap();

    let edited = things.create(&data(json!({"n": 1}))).await.unwrap();
    let untouched = things.create(&data(json!({"n": 2}))).await.unwrap();
    tick().await;
    things.update(&edited, &data(json!({"n": 3}))).await.unwrap();

    let untouched_at = format_timestamp(&things.get(&untouched).await.unwrap().updated);
    let edited_at = format_timestamp(&things.get(&edited).await.unwrap().updated);

    let after = things.list(&query(&[("updated_gt", untouched_at.as_str())])).await.unwrap();
    let up_to = things.list(&query(&[("updated_lte", untouched_at.as_str())])).await.unwrap();
    let from_edit = things.list(&query(&[("updated_gte", edited_at.as_str())])).await.unwrap();
    let before_edit = things.list(&query(&[("updated_lt", edited_at.as_str())])).await.unwrap();

    assert_eq!(after.items.iter().map(|d| &d.id).collect::<Vec<_>>(), vec![&edited]);
    assert_eq!(up_to.items.iter().map(|d| &d.id).collect::<Vec<_>>(), vec![&untouched]);
    assert_eq!(from_edit.items.iter().map(|d| &d.id).collect::<Vec<_>>(), vec![&edited]);
    assert_eq!(before_edit.items.iter().map(|d| &d.id).collect::<Vec<_>>(), vec![&untouched]);
}

#[tokio::test]
async fn test_updates_keep_identity_and_advance_updated() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;
    let things = store.collection("things").await.unwrap();

    let id = things.create(&data(json!({"v": 0}))).await.unwrap();
    let original = things.get(&id).await.unwrap();
    assert_eq!(original.created, original.updated);

    let mut last_updated = original.updated;
    for v in 1..=50 {
        things.update(&id, &data(json!({"v": v}))).await.unwrap();

        let current = things.get(&id).await.unwrap();
        assert_eq!(current.id, id);
        assert_eq!(current.created, original.created);
        assert!(current.updated > last_updated);
        assert_eq!(current.data, data(json!({"v": v})));
        last_updated = current.updated;
    }
}

#[tokio::test]
async fn test_update_replaces_payload_wholesale() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;
    let things = store.collection("things").await.unwrap();

    let id = things.create(&data(json!({"a": 1, "b": 2}))).await.unwrap();
    things.update(&id, &data(json!({"c": 3}))).await.unwrap();

    assert_eq!(things.get(&id).await.unwrap().data, data(json!({"c": 3})));
}

#[tokio::test]
async fn test_missing_ids_are_not_found() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;
    let things = store.collection("things").await.unwrap();
    let missing = uuid_like();

    assert!(matches!(things.get(&missing).await, Err(DocumentStoreError::DocumentNotFound(..))));
    assert!(matches!(
        things.update(&missing, &data(json!({}))).await,
        Err(DocumentStoreError::DocumentNotFound(..))
    ));
    assert!(matches!(things.delete(&missing).await, Err(DocumentStoreError::DocumentNotFound(..))));
}

#[tokio::test]
async fn test_delete_is_permanent() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;
    let things = store.collection("things").await.unwrap();

    let id = things.create(&data(json!({"a": 1}))).await.unwrap();
    things.delete(&id).await.unwrap();

    assert!(matches!(things.get(&id).await, Err(DocumentStoreError::DocumentNotFound(..))));
    assert!(matches!(things.delete(&id).await, Err(DocumentStoreError::DocumentNotFound(..))));
    assert_eq!(things.list(&ListQuery::new()).await.unwrap().total_items, 0);
}

#[tokio::test]
async fn test_engine_rejects_malformed_payload() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;
    store.collection("things").await.unwrap();

    let result = store
        .backend()
        .insert_document("things", "raw-1", "{\"a\":")
        .await;

    assert!(matches!(result, Err(DocumentStoreError::Storage(_))));
    assert!(store.backend().get_document("things", "raw-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_keyword_collection_names_work() {
    let dir = tempdir().unwrap();
    let store = open(&dir).await;
    let orders = store.collection("order").await.unwrap();

    let id = orders.create(&data(json!({"total": 5}))).await.unwrap();

    assert_eq!(orders.get(&id).await.unwrap().data["total"], 5);
}

fn uuid_like() -> String {
    "00000000-0000-4000-8000-000000000000".to_string()
}
