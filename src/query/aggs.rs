//! Terms aggregations and expression facets.

use serde::Serialize;

/// Terms definition of an aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationTerms {
    /// Name of the attribute or expression being faceted.
    pub field: String,
    /// Maximum number of buckets in the result. When omitted the engine
    /// default applies (20 values per facet result set).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

/// One named aggregation: `{"terms": {"field": ..., "size": ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermsAggregation {
    pub terms: AggregationTerms,
}

impl TermsAggregation {
    /// Create a terms aggregation over `field`. A `size` of zero leaves the
    /// bucket cap unset so the engine default applies.
    pub fn new(field: &str, size: u32) -> Self {
        TermsAggregation {
            terms: AggregationTerms {
                field: field.to_string(),
                size: if size > 0 { Some(size) } else { None },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_terms_aggregation_with_size() {
        let agg = TermsAggregation::new("maker_id", 10);
        assert_eq!(
            serde_json::to_value(&agg).unwrap(),
            json!({"terms": {"field": "maker_id", "size": 10}})
        );
    }

    #[test]
    fn test_zero_size_omits_bucket_cap() {
        let agg = TermsAggregation::new("maker_id", 0);
        assert_eq!(
            serde_json::to_value(&agg).unwrap(),
            json!({"terms": {"field": "maker_id"}})
        );
    }
}
