//! The engine client: document mutations, search dispatch, and the SQL-over-
//! HTTP administrative surface.
//!
//! [`SearchClient`] owns a URL, a read-only flag and a [`Transport`]. Every
//! mutating operation is gated on the read-only flag before any network call;
//! response bodies are classified and decoded by the [`crate::response`]
//! module.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::document::{BulkAction, BulkOperation, DeleteRequest, DocumentRequest, to_ndjson};
use crate::error::{FalxError, Result};
use crate::query::SearchRequest;
use crate::response::{
    self, BulkResponse, DecodedResponse, DocumentResponse, InfoResponse, MainResponse,
    SearchResponse,
};
use crate::transport::{
    CONTENT_TYPE_JSON, CONTENT_TYPE_NDJSON, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
    HttpTransport, Method, Transport,
};

/// API route names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Cli,
    Bulk,
    Insert,
    Update,
    Replace,
    Delete,
    Search,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Cli => "cli",
            Route::Bulk => "bulk",
            Route::Insert => "insert",
            Route::Update => "update",
            Route::Replace => "replace",
            Route::Delete => "delete",
            Route::Search => "search",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for the `BACKUP` command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackupRequest {
    /// Tables to back up; empty backs up all tables.
    pub tables: Vec<String>,
    /// Destination path on the server; defaults to `/tmp` when empty.
    pub path: String,
    /// Non-blocking backup: respond with a query ID immediately.
    pub r#async: bool,
    /// Compress backup files with zstd.
    pub compress: bool,
}

impl BackupRequest {
    /// Back up to `path` on the server.
    pub fn to_path(path: &str) -> Self {
        BackupRequest {
            path: path.to_string(),
            ..BackupRequest::default()
        }
    }

    /// Restrict the backup to the listed tables.
    pub fn tables(mut self, tables: &[&str]) -> Self {
        self.tables = tables.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Run the backup without blocking the statement.
    pub fn run_async(mut self, enabled: bool) -> Self {
        self.r#async = enabled;
        self
    }

    /// Compress backup files.
    pub fn compress(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    fn to_command(&self) -> String {
        let mut cmd = vec!["BACKUP".to_string()];
        match self.tables.len() {
            0 => {}
            1 => cmd.push(format!("TABLE {}", self.tables[0])),
            _ => cmd.push(format!("TABLES {}", self.tables.join(","))),
        }
        cmd.push(format!(
            "OPTIONS async={}, compress={}",
            self.r#async, self.compress
        ));
        let path = if self.path.is_empty() { "/tmp" } else { &self.path };
        cmd.push(format!("TO {path}"));
        cmd.join(" ")
    }
}

/// Builder for [`SearchClient`].
pub struct SearchClientBuilder {
    url: String,
    read_only: bool,
    user_agent: String,
    timeout: Duration,
    transport: Option<Box<dyn Transport>>,
}

impl SearchClientBuilder {
    fn new(url: &str) -> Self {
        SearchClientBuilder {
            url: url.to_string(),
            read_only: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            transport: None,
        }
    }

    /// Reject every mutating operation locally.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// User agent presented to the engine.
    pub fn user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Request timeout for the default transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Substitute a custom transport (connection pooling, fakes in tests).
    pub fn transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<SearchClient> {
        if self.url.is_empty() {
            return Err(FalxError::invalid_argument("client URL must not be empty"));
        }
        let transport = match self.transport {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(&self.user_agent, self.timeout)?),
        };
        Ok(SearchClient {
            url: self.url.trim_end_matches('/').to_string(),
            read_only: self.read_only,
            transport,
        })
    }
}

/// Client for a full-text search engine's HTTP/JSON API.
pub struct SearchClient {
    url: String,
    read_only: bool,
    transport: Box<dyn Transport>,
}

impl SearchClient {
    /// Start building a client for the engine at `url` (`schema://host:port`).
    pub fn builder(url: &str) -> SearchClientBuilder {
        SearchClientBuilder::new(url)
    }

    /// Whether mutating operations are rejected locally.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Toggle local rejection of mutating operations.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn endpoint(&self, route: Route) -> String {
        format!("{}/{}", self.url, route)
    }

    fn ensure_writable(&self, operation: &str) -> Result<()> {
        if self.read_only {
            Err(FalxError::read_only(operation.to_string()))
        } else {
            Ok(())
        }
    }

    fn post(&self, route: Route, content_type: &str, body: &[u8]) -> Result<Vec<u8>> {
        let (status, body) = self
            .transport
            .send(Method::Post, &self.endpoint(route), content_type, body)?;
        debug!(route = %route, status, "request dispatched");
        Ok(body)
    }

    // Server info.

    /// Fetch the server banner from the root endpoint.
    pub fn info(&self) -> Result<InfoResponse> {
        let (status, body) = self.transport.send(Method::Get, &self.url, "", &[])?;
        debug!(status, "info request dispatched");
        Ok(serde_json::from_slice(&body)?)
    }

    // SQL over HTTP.

    /// Run a statement through the `/cli` endpoint and decode the
    /// per-statement result blocks. Engine-reported statement errors
    /// surface as [`FalxError::Engine`].
    pub fn run_cli(&self, statement: &str) -> Result<MainResponse> {
        debug!(statement, "running cli statement");
        let body = self.post(Route::Cli, "text/plain", statement.as_bytes())?;
        match response::decode(&body)? {
            DecodedResponse::Main(blocks) => Ok(blocks),
            other => Err(FalxError::decode(format!(
                "expected statement blocks, got {other:?}"
            ))),
        }
    }

    /// Run a statement through `/cli` and return the raw JSON value, for
    /// statements whose response shape is not a statement-block array.
    pub fn run_cli_raw(&self, statement: &str) -> Result<serde_json::Value> {
        debug!(statement, "running raw cli statement");
        let body = self.post(Route::Cli, "text/plain", statement.as_bytes())?;
        Ok(serde_json::from_slice(&body)?)
    }

    // Table administration.

    pub fn show_threads(&self) -> Result<MainResponse> {
        self.run_cli("SHOW THREADS")
    }

    pub fn show_tables(&self) -> Result<MainResponse> {
        self.run_cli("SHOW TABLES")
    }

    pub fn show_table_status(&self, table: &str) -> Result<MainResponse> {
        self.run_cli(&format!("SHOW TABLE {table} STATUS"))
    }

    pub fn desc_table(&self, table: &str) -> Result<MainResponse> {
        self.run_cli(&format!("DESC {table}"))
    }

    /// Server status counters, optionally filtered by a LIKE prefix.
    pub fn show_status(&self, like: Option<&str>) -> Result<MainResponse> {
        match like {
            Some(prefix) => self.run_cli(&format!("SHOW STATUS LIKE '{prefix}%'")),
            None => self.run_cli("SHOW STATUS"),
        }
    }

    /// Currently running queries. The engine replies with a free-form
    /// payload here, so the raw JSON is returned.
    pub fn show_queries(&self) -> Result<serde_json::Value> {
        self.run_cli_raw("SHOW QUERIES")
    }

    /// Execution tree of a full-text query, without running a search.
    pub fn explain_query(&self, table: &str, query: &str) -> Result<serde_json::Value> {
        self.run_cli_raw(&format!("EXPLAIN QUERY {table} '{query}'"))
    }

    pub fn kill_query(&self, id: u64) -> Result<serde_json::Value> {
        self.ensure_writable("kill_query")?;
        self.run_cli_raw(&format!("KILL {id}"))
    }

    /// Flush in-memory attribute updates of all active disk tables.
    pub fn flush_attributes(&self) -> Result<MainResponse> {
        self.ensure_writable("flush_attributes")?;
        self.run_cli("FLUSH ATTRIBUTES")
    }

    /// Merge the table's disk chunks. `foreground` waits for completion
    /// (`OPTION sync=1`); `cutoff` overrides the chunk-count threshold.
    pub fn optimize_table(
        &self,
        table: &str,
        foreground: bool,
        cutoff: Option<u32>,
    ) -> Result<MainResponse> {
        self.ensure_writable("optimize_table")?;
        let sync = if foreground { 1 } else { 0 };
        let statement = match cutoff {
            Some(cutoff) => format!("OPTIMIZE TABLE {table} OPTION sync={sync},cutoff={cutoff}"),
            None => format!("OPTIMIZE TABLE {table} OPTION sync={sync}"),
        };
        self.run_cli(&statement)
    }

    /// Ready tables for a secure backup by blocking compaction.
    pub fn freeze_tables(&self, tables: &[&str]) -> Result<MainResponse> {
        self.ensure_writable("freeze_tables")?;
        self.run_cli(&format!("FREEZE {}", tables.join(",")))
    }

    /// Reactivate operations blocked by a freeze.
    pub fn unfreeze_tables(&self, tables: &[&str]) -> Result<MainResponse> {
        self.ensure_writable("unfreeze_tables")?;
        self.run_cli(&format!("UNFREEZE {}", tables.join(",")))
    }

    pub fn drop_table(&self, table: &str) -> Result<MainResponse> {
        self.ensure_writable("drop_table")?;
        self.run_cli(&format!("DROP TABLE IF EXISTS {table}"))
    }

    pub fn truncate_table(&self, table: &str) -> Result<MainResponse> {
        self.ensure_writable("truncate_table")?;
        self.run_cli(&format!("TRUNCATE TABLE {table} WITH RECONFIGURE"))
    }

    // Backup and restore.

    /// Run a `BACKUP` statement on the server.
    pub fn backup(&self, request: &BackupRequest) -> Result<serde_json::Value> {
        self.ensure_writable("backup")?;
        self.run_cli_raw(&request.to_command())
    }

    /// Import a table previously built or backed up on disk.
    pub fn restore(&self, table: &str, path: &str) -> Result<serde_json::Value> {
        self.ensure_writable("restore")?;
        self.run_cli_raw(&format!("IMPORT TABLE {table} FROM '{path}'"))
    }

    // Document mutations.

    /// Insert a document.
    pub fn insert(&self, request: &DocumentRequest) -> Result<DocumentResponse> {
        self.mutate(Route::Insert, request)
    }

    /// Update attribute values of an existing document. Full-text fields and
    /// columnar attributes cannot be updated; use [`SearchClient::replace`].
    pub fn update(&self, request: &DocumentRequest) -> Result<DocumentResponse> {
        self.mutate(Route::Update, request)
    }

    /// Replace a document, marking any previous document with the same ID as
    /// deleted.
    pub fn replace(&self, request: &DocumentRequest) -> Result<DocumentResponse> {
        self.mutate(Route::Replace, request)
    }

    fn mutate(&self, route: Route, request: &DocumentRequest) -> Result<DocumentResponse> {
        self.ensure_writable(route.as_str())?;
        let body = self.post(route, CONTENT_TYPE_JSON, &serde_json::to_vec(request)?)?;
        self.decode_document(&body)
    }

    /// Delete documents by ID or query.
    pub fn delete(&self, request: &DeleteRequest) -> Result<DocumentResponse> {
        self.ensure_writable(Route::Delete.as_str())?;
        let body = self.post(Route::Delete, CONTENT_TYPE_JSON, &serde_json::to_vec(request)?)?;
        self.decode_document(&body)
    }

    /// Mutation endpoints normally answer with a document outcome, but on
    /// some failures the engine answers with a statement-block array whose
    /// first block carries the error. `response::decode` surfaces that case.
    fn decode_document(&self, body: &[u8]) -> Result<DocumentResponse> {
        match response::decode(body)? {
            DecodedResponse::Document(doc) => Ok(doc),
            other => Err(FalxError::decode(format!(
                "expected document response, got {other:?}"
            ))),
        }
    }

    // Bulk mutations.

    /// Insert documents through one newline-delimited bulk request.
    pub fn bulk_insert(&self, items: &[DocumentRequest]) -> Result<BulkResponse> {
        self.bulk(BulkAction::Insert, items)
    }

    /// Update documents through one newline-delimited bulk request.
    pub fn bulk_update(&self, items: &[DocumentRequest]) -> Result<BulkResponse> {
        self.bulk(BulkAction::Update, items)
    }

    /// Replace documents through one newline-delimited bulk request.
    pub fn bulk_replace(&self, items: &[DocumentRequest]) -> Result<BulkResponse> {
        self.bulk(BulkAction::Replace, items)
    }

    fn bulk(&self, action: BulkAction, items: &[DocumentRequest]) -> Result<BulkResponse> {
        self.ensure_writable(&format!("bulk_{}", action.as_str()))?;
        let operations: Vec<BulkOperation> = items
            .iter()
            .map(|item| BulkOperation::new(action, item.clone()))
            .collect();
        let payload = to_ndjson(&operations)?;
        let body = self.post(Route::Bulk, CONTENT_TYPE_NDJSON, &payload)?;
        response::decode_bulk(&body, action)
    }

    // Search.

    /// Run a search, returning hit sources as raw JSON values.
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.search_into::<serde_json::Value>(request)
    }

    /// Run a search, deserializing hit sources into `S`.
    pub fn search_into<S: DeserializeOwned>(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchResponse<S>> {
        debug!(index = %request.index, "dispatching search");
        let body = self.post(Route::Search, CONTENT_TYPE_JSON, &request.to_bytes()?)?;
        response::decode_search(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_command_formatting() {
        let request = BackupRequest::to_path("/backup").tables(&["a", "b"]);
        assert_eq!(
            request.to_command(),
            "BACKUP TABLES a,b OPTIONS async=false, compress=false TO /backup"
        );

        let request = BackupRequest::to_path("/backup").tables(&["a"]);
        assert_eq!(
            request.to_command(),
            "BACKUP TABLE a OPTIONS async=false, compress=false TO /backup"
        );

        let request = BackupRequest::default().run_async(true).compress(true);
        assert_eq!(
            request.to_command(),
            "BACKUP OPTIONS async=true, compress=true TO /tmp"
        );
    }

    #[test]
    fn test_endpoint_joining_trims_trailing_slash() {
        let client = SearchClient::builder("http://localhost:9308/")
            .transport(Box::new(NoopTransport))
            .build()
            .unwrap();
        assert_eq!(client.endpoint(Route::Search), "http://localhost:9308/search");
    }

    #[test]
    fn test_empty_url_rejected() {
        match SearchClient::builder("").build() {
            Err(FalxError::InvalidArgument(_)) => {}
            Err(other) => panic!("Expected invalid argument error, got {other:?}"),
            Ok(_) => panic!("Expected invalid argument error, got a client"),
        }
    }

    struct NoopTransport;

    impl Transport for NoopTransport {
        fn send(&self, _: Method, _: &str, _: &str, _: &[u8]) -> Result<(u16, Vec<u8>)> {
            Ok((200, b"[]".to_vec()))
        }
    }
}
