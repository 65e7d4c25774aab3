//! Top-level query clause aggregate and bool composition.
//!
//! [`QueryOptions`] collects the engine's query clause kinds (`match`,
//! `match_phrase`, `query_string`, `match_all`, `equals`, `in`, `range`,
//! `bool`) into the request's `query` object. Every clause is optional and
//! omitted from JSON when unset; clause kinds are mutually independent and
//! the engine, not this layer, interprets their combination.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;

use crate::query::filter::{
    BoolFilter, FilterKind, FilterValue, KeyWrap, MatchOperator, OperatorQuery, RangeBound,
};

/// Pseudo-field matching every full-text field.
pub const ALL_FIELDS: &str = "_all";

/// Occurrence sections of a bool query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolSection {
    /// The clause must match (AND).
    Must,
    /// The clause should match (OR).
    Should,
    /// The clause must not match (NOT).
    MustNot,
}

/// The must/should/must_not sections of a bool query.
///
/// Sections are append-only and preserve insertion order; duplicate keys
/// within a section both appear, leaving their combination to the engine.
/// Empty sections are omitted from serialization, never emitted as `[]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoolSections {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<BoolFilter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<BoolFilter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<BoolFilter>,
}

impl BoolSections {
    fn section_mut(&mut self, section: BoolSection) -> &mut Vec<BoolFilter> {
        match section {
            BoolSection::Must => &mut self.must,
            BoolSection::Should => &mut self.should,
            BoolSection::MustNot => &mut self.must_not,
        }
    }
}

/// The union of top-level query clause kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryOptions {
    #[serde(rename = "match", skip_serializing_if = "Option::is_none")]
    match_: Option<BTreeMap<String, FilterValue>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    match_phrase: Option<BTreeMap<String, FilterValue>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    query_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    match_all: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    equals: Option<BTreeMap<String, FilterValue>>,

    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    in_: Option<BTreeMap<String, FilterValue>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<BTreeMap<String, RangeBound>>,

    #[serde(rename = "bool", skip_serializing_if = "Option::is_none")]
    bool_: Option<BoolSections>,
}

impl QueryOptions {
    /// Create an empty query; all clause kinds unset.
    pub fn new() -> Self {
        QueryOptions::default()
    }

    // Full-text match clauses.

    /// Match `keyword` in the listed fields (comma-joined field key).
    pub fn match_fields(&mut self, fields: &[&str], keyword: &str) -> &mut Self {
        self.insert_match(fields.join(","), keyword.into())
    }

    /// Match `keyword` in every field except `field` (`!field` key).
    pub fn not_match(&mut self, field: &str, keyword: &str) -> &mut Self {
        self.insert_match(format!("!{field}"), keyword.into())
    }

    /// Match `keyword` in all full-text fields (`_all` key).
    pub fn match_all_fields(&mut self, keyword: &str) -> &mut Self {
        self.insert_match(ALL_FIELDS.to_string(), keyword.into())
    }

    /// Match with keywords combined by OR instead of the engine default.
    pub fn or_match(&mut self, fields: &[&str], keyword: &str) -> &mut Self {
        self.insert_match(
            fields.join(","),
            OperatorQuery::new(keyword, MatchOperator::Or).into(),
        )
    }

    /// Match with keywords combined by AND.
    pub fn and_match(&mut self, fields: &[&str], keyword: &str) -> &mut Self {
        self.insert_match(
            fields.join(","),
            OperatorQuery::new(keyword, MatchOperator::And).into(),
        )
    }

    fn insert_match(&mut self, key: String, value: FilterValue) -> &mut Self {
        self.match_.get_or_insert_with(BTreeMap::new).insert(key, value);
        self
    }

    /// Match the entire phrase in the listed fields.
    pub fn match_phrase(&mut self, fields: &[&str], phrase: &str) -> &mut Self {
        self.insert_match_phrase(fields.join(","), phrase.into())
    }

    /// Match the entire phrase in every field except `field`.
    pub fn not_match_phrase(&mut self, field: &str, phrase: &str) -> &mut Self {
        self.insert_match_phrase(format!("!{field}"), phrase.into())
    }

    /// Match the entire phrase in all full-text fields.
    pub fn match_phrase_all_fields(&mut self, phrase: &str) -> &mut Self {
        self.insert_match_phrase(ALL_FIELDS.to_string(), phrase.into())
    }

    fn insert_match_phrase(&mut self, key: String, value: FilterValue) -> &mut Self {
        self.match_phrase
            .get_or_insert_with(BTreeMap::new)
            .insert(key, value);
        self
    }

    /// Raw query in the engine's own full-text grammar, passed through
    /// verbatim (proximity, quorum, wildcard and field operators included).
    pub fn query_string(&mut self, query: &str) -> &mut Self {
        self.query_string = Some(query.to_string());
        self
    }

    /// Match every document.
    pub fn match_all(&mut self) -> &mut Self {
        self.match_all = Some(json!({}));
        self
    }

    // Attribute filters.

    /// Equality filter on `key`.
    pub fn equals<V: Into<FilterValue>>(&mut self, key: &str, value: V) -> &mut Self {
        self.insert_equals(KeyWrap::None, key, value.into())
    }

    /// Equality filter matching when at least one attribute value equals `value`.
    pub fn equals_any<V: Into<FilterValue>>(&mut self, key: &str, value: V) -> &mut Self {
        self.insert_equals(KeyWrap::Any, key, value.into())
    }

    /// Equality filter matching when the attribute has a single value equal to `value`.
    pub fn equals_all<V: Into<FilterValue>>(&mut self, key: &str, value: V) -> &mut Self {
        self.insert_equals(KeyWrap::All, key, value.into())
    }

    fn insert_equals(&mut self, wrap: KeyWrap, key: &str, value: FilterValue) -> &mut Self {
        self.equals
            .get_or_insert_with(BTreeMap::new)
            .insert(wrap.apply(key), value);
        self
    }

    /// Set-membership filter on `key`.
    pub fn in_values<V: Into<FilterValue>>(&mut self, key: &str, values: V) -> &mut Self {
        self.insert_in(KeyWrap::None, key, values.into())
    }

    /// Set-membership matching when any attribute value is in the set.
    pub fn in_any<V: Into<FilterValue>>(&mut self, key: &str, values: V) -> &mut Self {
        self.insert_in(KeyWrap::Any, key, values.into())
    }

    /// Set-membership matching when all attribute values are in the set.
    pub fn in_all<V: Into<FilterValue>>(&mut self, key: &str, values: V) -> &mut Self {
        self.insert_in(KeyWrap::All, key, values.into())
    }

    fn insert_in(&mut self, wrap: KeyWrap, key: &str, values: FilterValue) -> &mut Self {
        self.in_
            .get_or_insert_with(BTreeMap::new)
            .insert(wrap.apply(key), values);
        self
    }

    /// Range filter on `key`.
    pub fn range(&mut self, key: &str, bound: RangeBound) -> &mut Self {
        self.range
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), bound);
        self
    }

    // Bool composition. Every method funnels into `add_bool_filter`, which
    // appends to the named section preserving call order.

    /// MUST match `keyword` in the listed fields.
    pub fn bool_must_match(&mut self, fields: &[&str], keyword: &str) -> &mut Self {
        self.add_bool_filter(
            BoolSection::Must,
            FilterKind::Match,
            KeyWrap::None,
            &fields.join(","),
            keyword,
        )
    }

    /// MUST match `keyword` in all full-text fields (`_all` key).
    pub fn bool_must_match_all_fields(&mut self, keyword: &str) -> &mut Self {
        self.add_bool_filter(
            BoolSection::Must,
            FilterKind::Match,
            KeyWrap::None,
            ALL_FIELDS,
            keyword,
        )
    }

    /// MUST match with keywords combined by OR.
    pub fn bool_must_or_match(&mut self, fields: &[&str], keyword: &str) -> &mut Self {
        self.add_bool_filter(
            BoolSection::Must,
            FilterKind::Match,
            KeyWrap::None,
            &fields.join(","),
            OperatorQuery::new(keyword, MatchOperator::Or),
        )
    }

    /// MUST match with keywords combined by AND.
    pub fn bool_must_and_match(&mut self, fields: &[&str], keyword: &str) -> &mut Self {
        self.add_bool_filter(
            BoolSection::Must,
            FilterKind::Match,
            KeyWrap::None,
            &fields.join(","),
            OperatorQuery::new(keyword, MatchOperator::And),
        )
    }

    /// MUST equal.
    pub fn bool_must_equals<V: Into<FilterValue>>(&mut self, key: &str, value: V) -> &mut Self {
        self.add_bool_filter(BoolSection::Must, FilterKind::Equals, KeyWrap::None, key, value)
    }

    /// MUST equal at least one attribute value.
    pub fn bool_must_equals_any<V: Into<FilterValue>>(&mut self, key: &str, value: V) -> &mut Self {
        self.add_bool_filter(BoolSection::Must, FilterKind::Equals, KeyWrap::Any, key, value)
    }

    /// MUST equal the attribute's single value.
    pub fn bool_must_equals_all<V: Into<FilterValue>>(&mut self, key: &str, value: V) -> &mut Self {
        self.add_bool_filter(BoolSection::Must, FilterKind::Equals, KeyWrap::All, key, value)
    }

    /// MUST be in the set.
    pub fn bool_must_in<V: Into<FilterValue>>(&mut self, key: &str, values: V) -> &mut Self {
        self.add_bool_filter(BoolSection::Must, FilterKind::In, KeyWrap::None, key, values)
    }

    /// MUST have at least one attribute value in the set.
    pub fn bool_must_in_any<V: Into<FilterValue>>(&mut self, key: &str, values: V) -> &mut Self {
        self.add_bool_filter(BoolSection::Must, FilterKind::In, KeyWrap::Any, key, values)
    }

    /// MUST have all attribute values in the set.
    pub fn bool_must_in_all<V: Into<FilterValue>>(&mut self, key: &str, values: V) -> &mut Self {
        self.add_bool_filter(BoolSection::Must, FilterKind::In, KeyWrap::All, key, values)
    }

    /// MUST NOT match `keyword` in the listed fields.
    pub fn bool_must_not_match(&mut self, fields: &[&str], keyword: &str) -> &mut Self {
        self.add_bool_filter(
            BoolSection::MustNot,
            FilterKind::Match,
            KeyWrap::None,
            &fields.join(","),
            keyword,
        )
    }

    /// MUST NOT equal.
    pub fn bool_must_not_equals<V: Into<FilterValue>>(&mut self, key: &str, value: V) -> &mut Self {
        self.add_bool_filter(BoolSection::MustNot, FilterKind::Equals, KeyWrap::None, key, value)
    }

    /// MUST NOT equal any attribute value.
    pub fn bool_must_not_equals_any<V: Into<FilterValue>>(
        &mut self,
        key: &str,
        value: V,
    ) -> &mut Self {
        self.add_bool_filter(BoolSection::MustNot, FilterKind::Equals, KeyWrap::Any, key, value)
    }

    /// MUST NOT equal the attribute's single value.
    pub fn bool_must_not_equals_all<V: Into<FilterValue>>(
        &mut self,
        key: &str,
        value: V,
    ) -> &mut Self {
        self.add_bool_filter(BoolSection::MustNot, FilterKind::Equals, KeyWrap::All, key, value)
    }

    /// MUST NOT be in the set.
    pub fn bool_must_not_in<V: Into<FilterValue>>(&mut self, key: &str, values: V) -> &mut Self {
        self.add_bool_filter(BoolSection::MustNot, FilterKind::In, KeyWrap::None, key, values)
    }

    /// MUST NOT have any attribute value in the set.
    pub fn bool_must_not_in_any<V: Into<FilterValue>>(&mut self, key: &str, values: V) -> &mut Self {
        self.add_bool_filter(BoolSection::MustNot, FilterKind::In, KeyWrap::Any, key, values)
    }

    /// MUST NOT have all attribute values in the set.
    pub fn bool_must_not_in_all<V: Into<FilterValue>>(&mut self, key: &str, values: V) -> &mut Self {
        self.add_bool_filter(BoolSection::MustNot, FilterKind::In, KeyWrap::All, key, values)
    }

    /// SHOULD match `keyword` in the listed fields.
    pub fn bool_should_match(&mut self, fields: &[&str], keyword: &str) -> &mut Self {
        self.add_bool_filter(
            BoolSection::Should,
            FilterKind::Match,
            KeyWrap::None,
            &fields.join(","),
            keyword,
        )
    }

    /// SHOULD equal.
    pub fn bool_should_equals<V: Into<FilterValue>>(&mut self, key: &str, value: V) -> &mut Self {
        self.add_bool_filter(BoolSection::Should, FilterKind::Equals, KeyWrap::None, key, value)
    }

    /// SHOULD equal at least one attribute value.
    pub fn bool_should_equals_any<V: Into<FilterValue>>(
        &mut self,
        key: &str,
        value: V,
    ) -> &mut Self {
        self.add_bool_filter(BoolSection::Should, FilterKind::Equals, KeyWrap::Any, key, value)
    }

    /// SHOULD equal the attribute's single value.
    pub fn bool_should_equals_all<V: Into<FilterValue>>(
        &mut self,
        key: &str,
        value: V,
    ) -> &mut Self {
        self.add_bool_filter(BoolSection::Should, FilterKind::Equals, KeyWrap::All, key, value)
    }

    /// SHOULD be in the set.
    pub fn bool_should_in<V: Into<FilterValue>>(&mut self, key: &str, values: V) -> &mut Self {
        self.add_bool_filter(BoolSection::Should, FilterKind::In, KeyWrap::None, key, values)
    }

    /// SHOULD have at least one attribute value in the set.
    pub fn bool_should_in_any<V: Into<FilterValue>>(&mut self, key: &str, values: V) -> &mut Self {
        self.add_bool_filter(BoolSection::Should, FilterKind::In, KeyWrap::Any, key, values)
    }

    /// SHOULD have all attribute values in the set.
    pub fn bool_should_in_all<V: Into<FilterValue>>(&mut self, key: &str, values: V) -> &mut Self {
        self.add_bool_filter(BoolSection::Should, FilterKind::In, KeyWrap::All, key, values)
    }

    /// Shared bool-section primitive: lazily creates the bool clause, applies
    /// key mangling, wraps the filter as `{kind: {key: value}}` and appends
    /// it to the section. Appending is the only mutation; duplicate keys are
    /// kept as distinct entries.
    fn add_bool_filter<V: Into<FilterValue>>(
        &mut self,
        section: BoolSection,
        kind: FilterKind,
        wrap: KeyWrap,
        key: &str,
        value: V,
    ) -> &mut Self {
        self.bool_
            .get_or_insert_with(BoolSections::default)
            .section_mut(section)
            .push(BoolFilter::new(kind, wrap, key, value));
        self
    }

    /// The bool sections, if any have been added.
    pub fn bool_sections(&self) -> Option<&BoolSections> {
        self.bool_.as_ref()
    }
}
