//! Filter value model for the engine's JSON filter DSL.
//!
//! A filter is a single mapping from an attribute key to a value. Keys may be
//! wrapped with the engine's `any()` / `all()` functions for multi-valued
//! attributes, or negated with a `!` prefix; values are scalars, scalar
//! lists, range bounds, or a nested `{query, operator}` object.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Keyword combination operator for full-text match clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOperator {
    /// Match documents containing any of the keywords.
    Or,
    /// Match documents containing all of the keywords.
    And,
}

impl MatchOperator {
    /// The literal operator string the engine expects.
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOperator::Or => "or",
            MatchOperator::And => "and",
        }
    }
}

impl Serialize for MatchOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A keyword match with an explicit operator: `{"query": ..., "operator": ...}`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct OperatorQuery {
    pub query: String,
    pub operator: MatchOperator,
}

impl OperatorQuery {
    pub fn new<S: Into<String>>(query: S, operator: MatchOperator) -> Self {
        OperatorQuery {
            query: query.into(),
            operator,
        }
    }
}

/// The value side of a filter or match entry.
///
/// Modeled as a closed set of variants rather than an open JSON value so the
/// type system rejects shapes the engine does not accept; serialization is
/// untagged and produces exactly the scalar/list/object JSON of each variant.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// String scalar (keywords, string attributes).
    String(String),
    /// Integer scalar.
    Int(i64),
    /// Float scalar.
    Float(f64),
    /// Boolean scalar.
    Bool(bool),
    /// Integer set for `in` filters.
    IntList(Vec<i64>),
    /// String set for `in` filters.
    StringList(Vec<String>),
    /// Nested `{query, operator}` object for operator matches.
    Operator(OperatorQuery),
}

impl From<&str> for FilterValue {
    fn from(v: &str) -> Self {
        FilterValue::String(v.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(v: String) -> Self {
        FilterValue::String(v)
    }
}

impl From<i64> for FilterValue {
    fn from(v: i64) -> Self {
        FilterValue::Int(v)
    }
}

impl From<i32> for FilterValue {
    fn from(v: i32) -> Self {
        FilterValue::Int(v as i64)
    }
}

impl From<u64> for FilterValue {
    fn from(v: u64) -> Self {
        FilterValue::Int(v as i64)
    }
}

impl From<f64> for FilterValue {
    fn from(v: f64) -> Self {
        FilterValue::Float(v)
    }
}

impl From<bool> for FilterValue {
    fn from(v: bool) -> Self {
        FilterValue::Bool(v)
    }
}

impl From<Vec<i64>> for FilterValue {
    fn from(v: Vec<i64>) -> Self {
        FilterValue::IntList(v)
    }
}

impl From<&[i64]> for FilterValue {
    fn from(v: &[i64]) -> Self {
        FilterValue::IntList(v.to_vec())
    }
}

impl From<Vec<String>> for FilterValue {
    fn from(v: Vec<String>) -> Self {
        FilterValue::StringList(v)
    }
}

impl From<Vec<&str>> for FilterValue {
    fn from(v: Vec<&str>) -> Self {
        FilterValue::StringList(v.into_iter().map(|s| s.to_string()).collect())
    }
}

impl From<OperatorQuery> for FilterValue {
    fn from(v: OperatorQuery) -> Self {
        FilterValue::Operator(v)
    }
}

/// Numeric range bounds for `range` filters.
///
/// All four bounds are optional and omitted from JSON when unset. No check is
/// made that the bounds are satisfiable; contradictory bounds are passed
/// through for the engine to evaluate.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct RangeBound {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<i64>,
}

impl RangeBound {
    /// Create an empty range with no bounds set.
    pub fn new() -> Self {
        RangeBound::default()
    }

    /// Greater than or equal to `value`.
    pub fn gte(mut self, value: i64) -> Self {
        self.gte = Some(value);
        self
    }

    /// Greater than `value`.
    pub fn gt(mut self, value: i64) -> Self {
        self.gt = Some(value);
        self
    }

    /// Less than or equal to `value`.
    pub fn lte(mut self, value: i64) -> Self {
        self.lte = Some(value);
        self
    }

    /// Less than `value`.
    pub fn lt(mut self, value: i64) -> Self {
        self.lt = Some(value);
        self
    }
}

/// Functional wrapper applied to a filter key for multi-valued attributes.
///
/// `any(attr)` matches when at least one of the attribute's values matches;
/// `all(attr)` matches when every value does. At most one wrapper applies per
/// key; the unwrapped form leaves the key untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyWrap {
    /// No wrapping; the key is used verbatim.
    None,
    /// Wrap as `any(key)`.
    Any,
    /// Wrap as `all(key)`.
    All,
}

impl KeyWrap {
    /// Apply the wrapper to a key, producing the effective filter key.
    pub fn apply(&self, key: &str) -> String {
        match self {
            KeyWrap::None => key.to_string(),
            KeyWrap::Any => format!("any({key})"),
            KeyWrap::All => format!("all({key})"),
        }
    }
}

/// Filter kinds accepted inside bool query sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Match,
    Equals,
    In,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Match => "match",
            FilterKind::Equals => "equals",
            FilterKind::In => "in",
        }
    }
}

/// One entry of a bool query section, serialized as `{kind: {key: value}}`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolFilter {
    pub kind: FilterKind,
    pub key: String,
    pub value: FilterValue,
}

impl BoolFilter {
    /// Create a bool filter entry, applying `wrap` key mangling.
    pub fn new<V: Into<FilterValue>>(kind: FilterKind, wrap: KeyWrap, key: &str, value: V) -> Self {
        BoolFilter {
            kind,
            key: wrap.apply(key),
            value: value.into(),
        }
    }
}

impl Serialize for BoolFilter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct Inner<'a> {
            key: &'a str,
            value: &'a FilterValue,
        }

        impl Serialize for Inner<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(self.key, self.value)?;
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(
            self.kind.as_str(),
            &Inner {
                key: &self.key,
                value: &self.value,
            },
        )?;
        map.end()
    }
}
