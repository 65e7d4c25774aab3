//! Document mutation envelopes: insert/update/replace, delete, and the
//! newline-delimited bulk format.

use serde::Serialize;

use crate::error::Result;

/// A single insert/update/replace request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRequest {
    /// Index (table) name.
    pub index: String,

    /// Replication cluster name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,

    /// Document ID; when unset the engine assigns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    /// The document attribute values.
    pub doc: serde_json::Value,
}

impl DocumentRequest {
    /// Create a request for `index` carrying `doc`.
    pub fn new(index: &str, doc: serde_json::Value) -> Self {
        DocumentRequest {
            index: index.to_string(),
            cluster: None,
            id: None,
            doc,
        }
    }

    /// Address a specific document ID.
    pub fn id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Route through a replication cluster.
    pub fn cluster(mut self, cluster: &str) -> Self {
        self.cluster = Some(cluster.to_string());
        self
    }
}

/// A delete request body, addressing documents by ID or by query tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeleteRequest {
    pub index: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<serde_json::Value>,
}

impl DeleteRequest {
    /// Delete by document ID.
    pub fn by_id(index: &str, id: u64) -> Self {
        DeleteRequest {
            index: index.to_string(),
            cluster: None,
            id: Some(id),
            query: None,
        }
    }

    /// Delete every document matching a query tree object.
    pub fn by_query(index: &str, query: serde_json::Value) -> Self {
        DeleteRequest {
            index: index.to_string(),
            cluster: None,
            id: None,
            query: Some(query),
        }
    }

    /// Route through a replication cluster.
    pub fn cluster(mut self, cluster: &str) -> Self {
        self.cluster = Some(cluster.to_string());
        self
    }
}

/// The action kind of a bulk operation, used both for routing and to select
/// the sub-result carrying a failed item's error detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Insert,
    Update,
    Replace,
}

impl BulkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Insert => "insert",
            BulkAction::Update => "update",
            BulkAction::Replace => "replace",
        }
    }
}

/// One line of a bulk request: an externally tagged mutation envelope,
/// `{"insert": {...}}` / `{"update": {...}}` / `{"replace": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BulkOperation {
    Insert(DocumentRequest),
    Update(DocumentRequest),
    Replace(DocumentRequest),
}

impl BulkOperation {
    /// Wrap a document request in the envelope for `action`.
    pub fn new(action: BulkAction, request: DocumentRequest) -> Self {
        match action {
            BulkAction::Insert => BulkOperation::Insert(request),
            BulkAction::Update => BulkOperation::Update(request),
            BulkAction::Replace => BulkOperation::Replace(request),
        }
    }
}

/// Assemble bulk operations into the newline-delimited JSON body: one JSON
/// object per line, joined by `\n` with a trailing newline.
pub fn to_ndjson(operations: &[BulkOperation]) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    for operation in operations {
        serde_json::to_writer(&mut body, operation)?;
        body.push(b'\n');
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_document_request_serialization() {
        let request = DocumentRequest::new("products", json!({"title": "hello"})).id(7);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"index": "products", "id": 7, "doc": {"title": "hello"}})
        );
    }

    #[test]
    fn test_delete_request_shapes() {
        let by_id = DeleteRequest::by_id("products", 5);
        assert_eq!(
            serde_json::to_value(&by_id).unwrap(),
            json!({"index": "products", "id": 5})
        );

        let by_query = DeleteRequest::by_query("products", json!({"equals": {"status": 0}}));
        assert_eq!(
            serde_json::to_value(&by_query).unwrap(),
            json!({"index": "products", "query": {"equals": {"status": 0}}})
        );
    }

    #[test]
    fn test_bulk_operation_envelope_tag() {
        let op = BulkOperation::new(
            BulkAction::Replace,
            DocumentRequest::new("products", json!({"title": "hi"})).id(1),
        );
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"replace": {"index": "products", "id": 1, "doc": {"title": "hi"}}})
        );
    }

    #[test]
    fn test_ndjson_one_object_per_line() {
        let ops = vec![
            BulkOperation::new(BulkAction::Insert, DocumentRequest::new("t", json!({"a": 1}))),
            BulkOperation::new(BulkAction::Insert, DocumentRequest::new("t", json!({"a": 2}))),
        ];
        let body = to_ndjson(&ops).unwrap();
        let text = String::from_utf8(body).unwrap();
        let lines: Vec<&str> = text.trim_end().split('\n').collect();
        assert_eq!(lines.len(), 2);
        for line in lines {
            serde_json::from_str::<serde_json::Value>(line).unwrap();
        }
    }
}
