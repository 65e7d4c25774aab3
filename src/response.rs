//! Typed engine responses and the response-shape decoder.
//!
//! The engine's HTTP API returns structurally different JSON payloads per
//! endpoint, with no discriminant field, and sometimes embeds an error inside
//! a successful-looking container. Decoding therefore classifies the payload
//! by field presence before deserializing, in a fixed order:
//!
//! 1. a bare `{"error": "..."}` object is a terminal engine failure;
//! 2. a top-level array is a [`MainResponse`] of per-statement blocks, where
//!    a non-empty `error` in block 0 is still a terminal engine failure;
//! 3. an object with `items` is a [`BulkResponse`];
//! 4. any other object is a [`DocumentResponse`].
//!
//! The predicates are mutually exclusive, so this classifies identically to
//! the engine's documented payloads without relying on partial-decode
//! success.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::document::BulkAction;
use crate::error::{FalxError, Result};

/// Bare error envelope: `{"error": "..."}` with no other members.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// One per-statement result block of a CLI/SQL response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatementBlock {
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub warning: String,
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub columns: Option<serde_json::Value>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Response to a CLI/SQL statement: one block per statement.
pub type MainResponse = Vec<StatementBlock>;

/// Nested error detail of a document or bulk sub-result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub index: String,
}

/// Outcome of a single document mutation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentResponse {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_id", default)]
    pub id: u64,
    #[serde(default)]
    pub created: bool,
    #[serde(default)]
    pub deleted: i64,
    #[serde(default)]
    pub updated: i64,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub status: i64,
    #[serde(default)]
    pub found: bool,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

/// One item of a bulk response; exactly one sub-result is present,
/// keyed by the action that produced it (inserts report under `bulk`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkItem {
    #[serde(default)]
    pub bulk: Option<DocumentResponse>,
    #[serde(default)]
    pub update: Option<DocumentResponse>,
    #[serde(default)]
    pub replace: Option<DocumentResponse>,
}

impl BulkItem {
    /// The sub-result reported for `action` (insert results arrive under the
    /// `bulk` key).
    pub fn sub_result(&self, action: BulkAction) -> Option<&DocumentResponse> {
        match action {
            BulkAction::Insert => self.bulk.as_ref(),
            BulkAction::Update => self.update.as_ref(),
            BulkAction::Replace => self.replace.as_ref(),
        }
    }
}

/// Response to a bulk request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub items: Vec<BulkItem>,
    #[serde(default)]
    pub errors: bool,
}

/// Match ID of a search hit; the engine emits numbers or strings depending
/// on version and endpoint flavor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DocId {
    Num(u64),
    Str(String),
}

impl Default for DocId {
    fn default() -> Self {
        DocId::Num(0)
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocId::Num(n) => write!(f, "{n}"),
            DocId::Str(s) => write!(f, "{s}"),
        }
    }
}

/// One search match.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit<S> {
    #[serde(rename = "_id", default)]
    pub id: DocId,
    /// Match weight calculated by the ranker.
    #[serde(rename = "_score", default)]
    pub score: i64,
    /// The projected document attributes.
    #[serde(rename = "_source")]
    pub source: S,
}

/// The `hits` member of a search response.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHits<S> {
    #[serde(default)]
    pub max_score: i64,
    /// Total number of matching documents.
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub total_relation: String,
    #[serde(default = "Vec::new")]
    pub hits: Vec<SearchHit<S>>,
}

/// One bucket of a terms aggregation result.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregationBucket {
    pub key: serde_json::Value,
    pub doc_count: i64,
}

/// Buckets of one named aggregation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AggregationResult {
    #[serde(default)]
    pub buckets: Vec<AggregationBucket>,
}

/// Response to a search request, generic over the `_source` document type.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse<S = serde_json::Value> {
    /// Execution time in milliseconds.
    #[serde(default)]
    pub took: i64,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub aggregations: Option<BTreeMap<String, AggregationResult>>,
    #[serde(default = "Option::default")]
    pub hits: Option<SearchHits<S>>,
    #[serde(default)]
    pub profile: Option<serde_json::Value>,
    #[serde(default)]
    pub warning: Option<serde_json::Value>,
}

/// Server banner returned by the root endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct InfoResponse {
    pub cluster_name: String,
    pub cluster_uuid: String,
    pub name: String,
    pub tagline: String,
    pub version: ServerVersion,
}

/// Version block of the server banner.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerVersion {
    pub build_date: DateTime<Utc>,
    #[serde(default)]
    pub build_flavor: String,
    #[serde(default)]
    pub build_hash: String,
    #[serde(default)]
    pub build_snapshot: bool,
    #[serde(default)]
    pub build_type: String,
    #[serde(default)]
    pub lucene_version: String,
    #[serde(default)]
    pub minimum_index_compatibility_version: String,
    #[serde(default)]
    pub minimum_wire_compatibility_version: String,
    pub number: String,
}

/// A successfully classified response payload.
#[derive(Debug, Clone)]
pub enum DecodedResponse {
    /// Per-statement result blocks (CLI/SQL endpoints).
    Main(MainResponse),
    /// Single document mutation outcome.
    Document(DocumentResponse),
    /// Bulk multi-item outcome.
    Bulk(BulkResponse),
}

/// The payload shapes the classifier distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Error,
    Main,
    Bulk,
    Document,
}

fn classify(value: &serde_json::Value) -> Option<Shape> {
    if let Some(object) = value.as_object() {
        // The bare error envelope carries a string `error` and none of the
        // keys the other object shapes require. Document responses may carry
        // a nested `error` object, which is not this shape.
        if object.get("error").is_some_and(|e| e.is_string())
            && !object.contains_key("_id")
            && !object.contains_key("items")
            && !object.contains_key("total")
        {
            return Some(Shape::Error);
        }
        if object.contains_key("items") {
            return Some(Shape::Bulk);
        }
        return Some(Shape::Document);
    }
    if value.is_array() {
        return Some(Shape::Main);
    }
    None
}

fn decode_failure(body: &[u8], reason: &str) -> FalxError {
    // Bounded body excerpt for diagnosis.
    let excerpt: String = String::from_utf8_lossy(body).chars().take(256).collect();
    FalxError::decode(format!("{reason}: {excerpt}"))
}

/// Decode a response body into its matching shape.
///
/// Engine-reported errors (the bare error envelope, or a `MainResponse`
/// whose first block carries an error) surface as [`FalxError::Engine`];
/// bodies matching no known shape surface as [`FalxError::Decode`] with an
/// excerpt of the raw body.
pub fn decode(body: &[u8]) -> Result<DecodedResponse> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| decode_failure(body, &format!("invalid JSON ({e})")))?;

    match classify(&value) {
        Some(Shape::Error) => {
            let envelope: ErrorResponse = serde_json::from_value(value)?;
            if envelope.error.is_empty() {
                Err(decode_failure(body, "empty error envelope"))
            } else {
                Err(FalxError::engine(envelope.error))
            }
        }
        Some(Shape::Main) => {
            let blocks: MainResponse = serde_json::from_value(value)
                .map_err(|e| decode_failure(body, &format!("malformed statement blocks ({e})")))?;
            // The engine embeds statement errors inside a structurally
            // successful container; block 0 decides.
            if let Some(first) = blocks.first() {
                if !first.error.is_empty() {
                    return Err(FalxError::engine(first.error.clone()));
                }
            }
            Ok(DecodedResponse::Main(blocks))
        }
        Some(Shape::Bulk) => {
            let bulk: BulkResponse = serde_json::from_value(value)
                .map_err(|e| decode_failure(body, &format!("malformed bulk response ({e})")))?;
            Ok(DecodedResponse::Bulk(bulk))
        }
        Some(Shape::Document) => {
            let doc: DocumentResponse = serde_json::from_value(value)
                .map_err(|e| decode_failure(body, &format!("malformed document response ({e})")))?;
            Ok(DecodedResponse::Document(doc))
        }
        None => Err(decode_failure(body, "unrecognized payload shape")),
    }
}

/// Decode a bulk response body, surfacing the first failed item.
///
/// When the aggregate `errors` flag is set, the error detail is taken from
/// the first item's sub-result for `action` (inserts report under `bulk`).
/// Remaining items are not inspected; this mirrors the engine's own
/// stop-at-first convention and is a known limitation, not a guarantee that
/// the first item is the failing one.
pub fn decode_bulk(body: &[u8], action: BulkAction) -> Result<BulkResponse> {
    let decoded = decode(body)?;
    let bulk = match decoded {
        DecodedResponse::Bulk(bulk) => bulk,
        _ => return Err(decode_failure(body, "expected bulk response")),
    };

    if bulk.errors {
        let message = bulk
            .items
            .first()
            .and_then(|item| item.sub_result(action))
            .and_then(|sub| sub.error.as_ref())
            .map(|error| error.kind.clone())
            .unwrap_or_else(|| "bulk request failed".to_string());
        return Err(FalxError::engine(message));
    }

    Ok(bulk)
}

/// Decode a search response body into `SearchResponse<S>`, surfacing the
/// bare error envelope as an engine failure.
pub fn decode_search<S: DeserializeOwned>(body: &[u8]) -> Result<SearchResponse<S>> {
    let value: serde_json::Value =
        serde_json::from_slice(body).map_err(|e| decode_failure(body, &format!("invalid JSON ({e})")))?;

    if classify(&value) == Some(Shape::Error) {
        let envelope: ErrorResponse = serde_json::from_value(value)?;
        return Err(FalxError::engine(envelope.error));
    }

    serde_json::from_value(value)
        .map_err(|e| decode_failure(body, &format!("malformed search response ({e})")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_envelope_is_terminal() {
        let body = br#"{"error":"no such table"}"#;
        match decode(body) {
            Err(FalxError::Engine(msg)) => assert_eq!(msg, "no such table"),
            other => panic!("Expected engine error, got {other:?}"),
        }
    }

    #[test]
    fn test_main_response_embedded_error() {
        let body = br#"[{"total":0,"error":"unknown local table(s) 'missing' in search request","warning":""}]"#;
        match decode(body) {
            Err(FalxError::Engine(msg)) => {
                assert_eq!(msg, "unknown local table(s) 'missing' in search request")
            }
            other => panic!("Expected engine error, got {other:?}"),
        }
    }

    #[test]
    fn test_main_response_success() {
        let body = br#"[{"total":2,"error":"","warning":"","columns":[{"Table":{"type":"string"}}],"data":[{"Table":"products"},{"Table":"users"}]}]"#;
        match decode(body).unwrap() {
            DecodedResponse::Main(blocks) => {
                assert_eq!(blocks.len(), 1);
                assert_eq!(blocks[0].total, 2);
                assert!(blocks[0].data.is_some());
            }
            other => panic!("Expected main response, got {other:?}"),
        }
    }

    #[test]
    fn test_document_response_decoding() {
        let body = br#"{"_index":"t","_id":5,"created":true,"result":"created","status":201}"#;
        match decode(body).unwrap() {
            DecodedResponse::Document(doc) => {
                assert_eq!(doc.id, 5);
                assert!(doc.created);
                assert_eq!(doc.result, "created");
                assert_eq!(doc.status, 201);
            }
            other => panic!("Expected document response, got {other:?}"),
        }
    }

    #[test]
    fn test_document_with_nested_error_object_not_misclassified() {
        // A nested error object must not match the bare error envelope.
        let body = br#"{"_index":"t","_id":5,"error":{"type":"mem limit exceeded","index":"t"},"status":409}"#;
        match decode(body).unwrap() {
            DecodedResponse::Document(doc) => {
                assert_eq!(doc.error.unwrap().kind, "mem limit exceeded");
            }
            other => panic!("Expected document response, got {other:?}"),
        }
    }

    #[test]
    fn test_bulk_first_failure_reported() {
        let body =
            br#"{"items":[{"bulk":{"error":{"type":"document already exists"}}}],"errors":true}"#;
        match decode_bulk(body, BulkAction::Insert) {
            Err(FalxError::Engine(msg)) => assert_eq!(msg, "document already exists"),
            other => panic!("Expected engine error, got {other:?}"),
        }
    }

    #[test]
    fn test_bulk_success() {
        let body = br#"{"items":[{"bulk":{"_index":"t","_id":1,"created":true,"status":201}}],"errors":false}"#;
        let bulk = decode_bulk(body, BulkAction::Insert).unwrap();
        assert_eq!(bulk.items.len(), 1);
        assert!(!bulk.errors);
        assert!(bulk.items[0].sub_result(BulkAction::Insert).unwrap().created);
    }

    #[test]
    fn test_bulk_action_selects_sub_result() {
        let body =
            br#"{"items":[{"update":{"error":{"type":"id not found"}}}],"errors":true}"#;
        match decode_bulk(body, BulkAction::Update) {
            Err(FalxError::Engine(msg)) => assert_eq!(msg, "id not found"),
            other => panic!("Expected engine error, got {other:?}"),
        }
    }

    #[test]
    fn test_unrecognized_shape_is_decode_error() {
        match decode(b"42") {
            Err(FalxError::Decode(msg)) => assert!(msg.contains("42")),
            other => panic!("Expected decode error, got {other:?}"),
        }
        match decode(b"not json at all") {
            Err(FalxError::Decode(_)) => {}
            other => panic!("Expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn test_search_response_decoding() {
        let body = serde_json::to_vec(&json!({
            "took": 3,
            "timed_out": false,
            "hits": {
                "total": 2,
                "total_relation": "eq",
                "hits": [
                    {"_id": 1, "_score": 1560, "_source": {"title": "hello"}},
                    {"_id": "2", "_score": 1500, "_source": {"title": "world"}}
                ]
            },
            "aggregations": {
                "by_maker": {"buckets": [{"key": 7, "doc_count": 4}]}
            }
        }))
        .unwrap();

        let response: SearchResponse = decode_search(&body).unwrap();
        let hits = response.hits.unwrap();
        assert_eq!(hits.total, 2);
        assert_eq!(hits.hits[0].id, DocId::Num(1));
        assert_eq!(hits.hits[1].id, DocId::Str("2".to_string()));
        let aggs = response.aggregations.unwrap();
        assert_eq!(aggs["by_maker"].buckets[0].doc_count, 4);
    }

    #[test]
    fn test_search_error_envelope() {
        let body = br#"{"error":"index products: parse error"}"#;
        match decode_search::<serde_json::Value>(body) {
            Err(FalxError::Engine(msg)) => assert_eq!(msg, "index products: parse error"),
            other => panic!("Expected engine error, got {other:?}"),
        }
    }
}
