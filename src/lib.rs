//! # Falx
//!
//! A fluent HTTP/JSON client for full-text search engines.
//!
//! ## Features
//!
//! - Pure Rust implementation
//! - Fluent builders for search, filter, sort and aggregation requests
//! - Bool query composition (must / should / must_not)
//! - Document insert/update/replace/delete and newline-delimited bulk batches
//! - Typed decoding of the engine's inconsistent response shapes
//! - SQL-over-HTTP table administration, backup and restore
//!
//! ## Example
//!
//! ```no_run
//! use falx::client::SearchClient;
//! use falx::query::{QueryOptions, RangeBound, SearchRequest, SortSpec, SORT_DESC};
//!
//! # fn main() -> falx::error::Result<()> {
//! let client = SearchClient::builder("http://localhost:9308").build()?;
//!
//! let mut query = QueryOptions::new();
//! query
//!     .match_fields(&["title", "content"], "hello world")
//!     .range("price", RangeBound::new().gte(500).lte(1000));
//!
//! let request = SearchRequest::new("products")
//!     .query(query)
//!     .sort(SortSpec::new().single_field("price", SORT_DESC))
//!     .add_agg("by_maker", "maker_id", 10)
//!     .limit(20);
//!
//! let response = client.search(&request)?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod document;
pub mod error;
pub mod query;
pub mod response;
pub mod transport;

pub mod prelude {
    pub use crate::client::{BackupRequest, Route, SearchClient, SearchClientBuilder};
    pub use crate::document::{BulkAction, BulkOperation, DeleteRequest, DocumentRequest};
    pub use crate::error::{FalxError, Result};
    pub use crate::query::{
        QueryOptions, RangeBound, SORT_ASC, SORT_DESC, SearchOptions, SearchRequest, SortSpec,
        SourceFilter,
    };
    pub use crate::response::{
        BulkResponse, DecodedResponse, DocumentResponse, InfoResponse, MainResponse,
        SearchResponse,
    };
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
