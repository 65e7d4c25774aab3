//! Search request assembly and wire serialization.
//!
//! [`SearchRequest`] is the top-level builder for the engine's `POST /search`
//! document. Construction is fluent; every setter is idempotent per field
//! (last call wins) and the request serializes exactly once at dispatch time.
//! Unset optional members are omitted from the wire document entirely, never
//! emitted as `null` or empty containers.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::Result;
use crate::query::aggs::TermsAggregation;
use crate::query::options::QueryOptions;
use crate::query::sort::SortSpec;
use crate::query::source::SourceSelector;

/// Per-query engine options, passed through verbatim.
///
/// These map to the engine's `OPTION` clause knobs (timeouts, retry counts,
/// connection behavior); the client performs no validation or retry handling
/// of its own based on them.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchOptions {
    /// Guaranteed aggregate accuracy for multi-threaded group-by (0 or 1).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accurate_aggregation: Option<u32>,
    /// Max time in milliseconds to wait for remote agent queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_query_timeout: Option<u32>,
    /// Connection attempts per remote agent before a fatal query error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_retry_count: Option<u32>,
    /// Takes precedence over `agent_retry_count` when both are set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror_retry_count: Option<u32>,
    /// Milliseconds to wait before retrying a failed remote agent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_retry_delay: Option<u32>,
    /// Max wait between requests on persistent connections, in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_timeout: Option<u32>,
    /// Hostname renewal strategy for remote agents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname_lookup: Option<String>,
    /// TCP_FASTOPEN listener flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_tfo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistent_connections_limit: Option<u32>,
}

impl SearchOptions {
    pub fn new() -> Self {
        SearchOptions::default()
    }

    pub fn accurate_aggregation(mut self, enabled: bool) -> Self {
        self.accurate_aggregation = Some(if enabled { 1 } else { 0 });
        self
    }

    pub fn agent_query_timeout(mut self, millis: u32) -> Self {
        self.agent_query_timeout = Some(millis);
        self
    }

    pub fn agent_retry_count(mut self, count: u32) -> Self {
        self.agent_retry_count = Some(count);
        self
    }

    pub fn mirror_retry_count(mut self, count: u32) -> Self {
        self.mirror_retry_count = Some(count);
        self
    }

    pub fn agent_retry_delay(mut self, millis: u32) -> Self {
        self.agent_retry_delay = Some(millis);
        self
    }

    pub fn client_timeout(mut self, seconds: u32) -> Self {
        self.client_timeout = Some(seconds);
        self
    }

    pub fn hostname_lookup(mut self, strategy: &str) -> Self {
        self.hostname_lookup = Some(strategy.to_string());
        self
    }

    pub fn listen_tfo(mut self, flag: &str) -> Self {
        self.listen_tfo = Some(flag.to_string());
        self
    }

    pub fn persistent_connections_limit(mut self, limit: u32) -> Self {
        self.persistent_connections_limit = Some(limit);
        self
    }
}

/// The root search request aggregate.
///
/// Pagination members (`size`/`from` and `offset`/`limit`, plus
/// `max_matches`) are independently settable with no reconciliation; the
/// engine resolves their combination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    /// Index (table) name.
    pub index: String,

    /// Request the full-text query tree structure alongside results.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub profile: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<SearchOptions>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryOptions>,

    #[serde(rename = "_source", skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceSelector>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,

    /// Enable weight calculation when sorting on attributes.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub track_scores: bool,

    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub aggs: BTreeMap<String, TermsAggregation>,

    /// Raw facet expressions, keyed by facet name:
    /// `{"price_range": "INTERVAL(price,200,400,600,800)"}`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub expressions: BTreeMap<String, String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_matches: Option<u64>,
}

impl SearchRequest {
    /// Create a request targeting `index` with every optional member unset.
    pub fn new(index: &str) -> Self {
        SearchRequest {
            index: index.to_string(),
            profile: false,
            options: None,
            query: None,
            source: None,
            sort: None,
            track_scores: false,
            aggs: BTreeMap::new(),
            expressions: BTreeMap::new(),
            size: None,
            from: None,
            offset: None,
            limit: None,
            max_matches: None,
        }
    }

    /// Retarget the request at another index.
    pub fn index(mut self, index: &str) -> Self {
        self.index = index.to_string();
        self
    }

    /// Request the full-text query tree structure.
    pub fn profile(mut self, profile: bool) -> Self {
        self.profile = profile;
        self
    }

    /// Set the per-query engine options.
    pub fn options(mut self, options: SearchOptions) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the query clause aggregate.
    pub fn query(mut self, query: QueryOptions) -> Self {
        self.query = Some(query);
        self
    }

    /// Set the `_source` projection.
    pub fn source<S: Into<SourceSelector>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Set the sort directives. An empty spec leaves `sort` unset so it is
    /// omitted from the wire document.
    pub fn sort(mut self, sort: SortSpec) -> Self {
        self.sort = if sort.is_empty() { None } else { Some(sort) };
        self
    }

    /// Enable weight calculation when sorting on attributes.
    pub fn track_scores(mut self, track: bool) -> Self {
        self.track_scores = track;
        self
    }

    /// Add a terms aggregation under the caller-chosen facet `name`.
    /// Re-adding a name overwrites the earlier entry; a `size` of zero
    /// leaves the bucket cap unset.
    pub fn add_agg(mut self, name: &str, field: &str, size: u32) -> Self {
        self.aggs
            .insert(name.to_string(), TermsAggregation::new(field, size));
        self
    }

    /// Add a raw facet expression under `name`. Expressions serialize as a
    /// sibling of `aggs`; no collision check is made between the two maps.
    pub fn add_expression(mut self, name: &str, expression: &str) -> Self {
        self.expressions
            .insert(name.to_string(), expression.to_string());
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn from(mut self, from: u64) -> Self {
        self.from = Some(from);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Upper bound on matches the engine keeps per query (engine default 1000).
    pub fn max_matches(mut self, max_matches: u64) -> Self {
        self.max_matches = Some(max_matches);
        self
    }

    /// Serialize to the canonical wire JSON value.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Serialize to the canonical wire JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
