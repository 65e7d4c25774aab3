//! Client behavior tests over a canned in-memory transport: read-only
//! policy gating, response classification, and bulk error reporting.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::json;

use falx::client::{BackupRequest, SearchClient};
use falx::document::{DeleteRequest, DocumentRequest};
use falx::error::{FalxError, Result};
use falx::query::SearchRequest;
use falx::transport::{Method, Transport};

/// Replays one canned response and counts transport calls.
struct CannedTransport {
    calls: Arc<AtomicUsize>,
    status: u16,
    body: Vec<u8>,
}

impl CannedTransport {
    fn new(status: u16, body: &[u8]) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            CannedTransport {
                calls: calls.clone(),
                status,
                body: body.to_vec(),
            },
            calls,
        )
    }
}

impl Transport for CannedTransport {
    fn send(&self, _: Method, _: &str, _: &str, _: &[u8]) -> Result<(u16, Vec<u8>)> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok((self.status, self.body.clone()))
    }
}

fn canned_client(body: &[u8]) -> (SearchClient, Arc<AtomicUsize>) {
    let (transport, calls) = CannedTransport::new(200, body);
    let client = SearchClient::builder("http://localhost:9308")
        .transport(Box::new(transport))
        .build()
        .unwrap();
    (client, calls)
}

fn read_only_client() -> (SearchClient, Arc<AtomicUsize>) {
    let (transport, calls) = CannedTransport::new(200, b"{}");
    let client = SearchClient::builder("http://localhost:9308")
        .read_only(true)
        .transport(Box::new(transport))
        .build()
        .unwrap();
    (client, calls)
}

fn assert_read_only(result: Result<impl std::fmt::Debug>) {
    match result {
        Err(FalxError::ReadOnly(_)) => {}
        other => panic!("Expected read-only rejection, got {other:?}"),
    }
}

#[test]
fn test_read_only_rejects_mutations_without_network_calls() {
    let (client, calls) = read_only_client();
    let doc = DocumentRequest::new("products", json!({"title": "hello"}));

    assert_read_only(client.insert(&doc));
    assert_read_only(client.update(&doc));
    assert_read_only(client.replace(&doc));
    assert_read_only(client.delete(&DeleteRequest::by_id("products", 1)));
    assert_read_only(client.bulk_insert(std::slice::from_ref(&doc)));
    assert_read_only(client.bulk_update(std::slice::from_ref(&doc)));
    assert_read_only(client.bulk_replace(std::slice::from_ref(&doc)));
    assert_read_only(client.drop_table("products"));
    assert_read_only(client.truncate_table("products"));
    assert_read_only(client.optimize_table("products", false, None));
    assert_read_only(client.freeze_tables(&["products"]));
    assert_read_only(client.unfreeze_tables(&["products"]));
    assert_read_only(client.flush_attributes());
    assert_read_only(client.kill_query(9));
    assert_read_only(client.backup(&BackupRequest::to_path("/backup")));
    assert_read_only(client.restore("products", "/backup/products"));

    assert_eq!(calls.load(Ordering::SeqCst), 0, "no network calls expected");
}

#[test]
fn test_read_only_still_allows_reads() {
    let (client, calls) = canned_client(br#"[{"total":1,"error":"","warning":""}]"#);
    let mut client = client;
    client.set_read_only(true);

    client.show_tables().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_insert_decodes_document_response() {
    let (client, _) = canned_client(
        br#"{"_index":"products","_id":5,"created":true,"result":"created","status":201}"#,
    );
    let doc = DocumentRequest::new("products", json!({"title": "hello"})).id(5);
    let response = client.insert(&doc).unwrap();
    assert_eq!(response.id, 5);
    assert!(response.created);
    assert_eq!(response.status, 201);
}

#[test]
fn test_insert_surfaces_statement_block_error() {
    // Mutation endpoints sometimes answer with a statement-block array whose
    // first block carries the error.
    let (client, _) = canned_client(br#"[{"total":0,"error":"no such table","warning":""}]"#);
    let doc = DocumentRequest::new("missing", json!({"title": "hello"}));
    match client.insert(&doc) {
        Err(FalxError::Engine(msg)) => assert_eq!(msg, "no such table"),
        other => panic!("Expected engine error, got {other:?}"),
    }
}

#[test]
fn test_insert_surfaces_error_envelope() {
    let (client, _) = canned_client(br#"{"error":"no such table"}"#);
    let doc = DocumentRequest::new("missing", json!({"title": "hello"}));
    match client.insert(&doc) {
        Err(FalxError::Engine(msg)) => assert_eq!(msg, "no such table"),
        other => panic!("Expected engine error, got {other:?}"),
    }
}

#[test]
fn test_bulk_insert_reports_first_failure() {
    let (client, _) = canned_client(
        br#"{"items":[{"bulk":{"error":{"type":"document already exists"}}}],"errors":true}"#,
    );
    let doc = DocumentRequest::new("products", json!({"title": "hello"})).id(1);
    match client.bulk_insert(&[doc]) {
        Err(FalxError::Engine(msg)) => assert_eq!(msg, "document already exists"),
        other => panic!("Expected engine error, got {other:?}"),
    }
}

#[test]
fn test_search_decodes_typed_sources() {
    #[derive(Debug, serde::Deserialize)]
    struct Product {
        title: String,
        price: i64,
    }

    let body = serde_json::to_vec(&json!({
        "took": 2,
        "timed_out": false,
        "hits": {
            "total": 1,
            "hits": [{"_id": 3, "_score": 1337, "_source": {"title": "hello", "price": 500}}]
        }
    }))
    .unwrap();

    let (client, _) = canned_client(&body);
    let response = client
        .search_into::<Product>(&SearchRequest::new("products"))
        .unwrap();
    let hits = response.hits.unwrap();
    assert_eq!(hits.total, 1);
    assert_eq!(hits.hits[0].source.title, "hello");
    assert_eq!(hits.hits[0].source.price, 500);
}

#[test]
fn test_run_cli_decodes_statement_blocks() {
    let (client, _) = canned_client(
        br#"[{"total":2,"error":"","warning":"","columns":[{"Table":{"type":"string"}}],"data":[{"Table":"a"},{"Table":"b"}]}]"#,
    );
    let blocks = client.show_tables().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].total, 2);
}

#[test]
fn test_transport_failure_propagates() {
    struct FailingTransport;

    impl Transport for FailingTransport {
        fn send(&self, _: Method, _: &str, _: &str, _: &[u8]) -> Result<(u16, Vec<u8>)> {
            Err(FalxError::transport("connection refused"))
        }
    }

    let client = SearchClient::builder("http://localhost:9308")
        .transport(Box::new(FailingTransport))
        .build()
        .unwrap();
    match client.search(&SearchRequest::new("products")) {
        Err(FalxError::Transport(msg)) => assert_eq!(msg, "connection refused"),
        other => panic!("Expected transport error, got {other:?}"),
    }
}
