//! Query construction for the engine's search DSL.
//!
//! Builders in this module assemble the `POST /search` wire document: filter
//! values and key mangling ([`filter`]), the top-level clause aggregate and
//! bool composition ([`options`]), sort directives ([`sort`]), terms
//! aggregations and expression facets ([`aggs`]), source projection
//! ([`source`]) and the root request builder ([`request`]).

pub mod aggs;
pub mod filter;
pub mod options;
pub mod request;
pub mod sort;
pub mod source;

pub use self::aggs::{AggregationTerms, TermsAggregation};
pub use self::filter::{
    BoolFilter, FilterKind, FilterValue, KeyWrap, MatchOperator, OperatorQuery, RangeBound,
};
pub use self::options::{ALL_FIELDS, BoolSection, BoolSections, QueryOptions};
pub use self::request::{SearchOptions, SearchRequest};
pub use self::sort::{SORT_ASC, SORT_DESC, SortDirective, SortSpec};
pub use self::source::{SourceFilter, SourceSelector};
