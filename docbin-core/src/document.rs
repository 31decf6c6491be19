//! Document representation and the codec between stored text and in-memory values.
//!
//! A stored row arrives from a backend as a [`RawDocument`]: every column is text exactly as
//! the engine returned it. The codec turns that into a [`Document`], whose serialized form is
//! the item envelope returned to clients:
//!
//! ```json
//! { "id": "…", "data": { … }, "created": "2024-01-01T12:00:00.000Z", "updated": "…" }
//! ```

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DocumentStoreError, DocumentStoreResult};

/// The schema-less payload of a document: an ordered mapping of field name to JSON value.
pub type DocumentData = Map<String, Value>;

/// Textual form of every timestamp the store writes and returns.
///
/// Fixed width and UTC, so lexicographic order equals temporal order and a value read from a
/// response can be passed back verbatim to a range filter.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Format accepted for rows written with the engine's plain `CURRENT_TIMESTAMP` default.
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A row as returned by a storage backend, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    /// The document identifier.
    pub id: String,
    /// The stored JSON payload text.
    pub data: String,
    /// Creation timestamp text.
    pub created: String,
    /// Last update timestamp text.
    pub updated: String,
}

/// A decoded document, serialized as the item envelope.
///
/// The envelope carries exactly four keys: `id`, `data`, `created` and `updated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Opaque identifier assigned at creation.
    pub id: String,
    /// The document payload.
    pub data: DocumentData,
    /// Set once at insertion.
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    /// Refreshed on every successful update.
    #[serde(with = "timestamp")]
    pub updated: DateTime<Utc>,
}

impl Document {
    /// Builds an item envelope from its parts.
    pub fn new(
        id: impl Into<String>,
        data: DocumentData,
        created: DateTime<Utc>,
        updated: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            data,
            created,
            updated,
        }
    }
}

impl TryFrom<RawDocument> for Document {
    type Error = DocumentStoreError;

    fn try_from(raw: RawDocument) -> DocumentStoreResult<Self> {
        Ok(Document::new(
            raw.id,
            decode(&raw.data)?,
            parse_timestamp(&raw.created)?,
            parse_timestamp(&raw.updated)?,
        ))
    }
}

/// Decodes stored payload text into document data.
///
/// # Errors
///
/// Returns [`DocumentStoreError::Serialization`] if the text is not JSON or is not an object.
pub fn decode(raw: &str) -> DocumentStoreResult<DocumentData> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(map),
        other => Err(DocumentStoreError::Serialization(format!(
            "stored payload is not a JSON object: {}",
            json_kind(&other)
        ))),
    }
}

/// Encodes document data into compact JSON text for the write paths.
///
/// # Errors
///
/// Returns [`DocumentStoreError::Serialization`] if serialization fails.
pub fn encode(data: &DocumentData) -> DocumentStoreResult<String> {
    Ok(serde_json::to_string(data)?)
}

/// Decodes a request body into document data.
///
/// # Errors
///
/// Returns [`DocumentStoreError::MalformedInput`] if the body is not a JSON object.
pub fn decode_body(body: &[u8]) -> DocumentStoreResult<DocumentData> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(DocumentStoreError::MalformedInput(format!(
            "expected a JSON object, found {}",
            json_kind(&other)
        ))),
        Err(e) => Err(DocumentStoreError::MalformedInput(e.to_string())),
    }
}

/// Parses a stored timestamp.
///
/// # Errors
///
/// Returns [`DocumentStoreError::Serialization`] if the text matches no known format.
pub fn parse_timestamp(raw: &str) -> DocumentStoreResult<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, LEGACY_TIMESTAMP_FORMAT)
        .map(|ts| ts.and_utc())
        .map_err(|e| DocumentStoreError::Serialization(format!("invalid timestamp {raw:?}: {e}")))
}

/// Formats a timestamp in [`TIMESTAMP_FORMAT`].
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serde adapter writing timestamps in [`TIMESTAMP_FORMAT`].
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{TIMESTAMP_FORMAT, parse_timestamp};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}
