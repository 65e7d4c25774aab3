//! Source-field projection (`_source`).
//!
//! The engine accepts three shapes: a single attribute pattern, a list of
//! patterns, or an include/exclude object. Patterns may use the `*`, `%` and
//! `?` wildcards.

use serde::Serialize;

/// The `_source` projection of a search request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SourceSelector {
    /// `"_source": "attr*"`
    Field(String),
    /// `"_source": ["attr1", "attri*"]`
    Fields(Vec<String>),
    /// `"_source": {"includes": [...], "excludes": [...]}`
    Filter(SourceFilter),
}

/// Include/exclude form of the `_source` projection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceFilter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<String>,
}

impl SourceFilter {
    /// Create an empty include/exclude filter.
    pub fn new() -> Self {
        SourceFilter::default()
    }

    /// Append attribute patterns to the include list.
    pub fn include(mut self, attrs: &[&str]) -> Self {
        self.includes.extend(attrs.iter().map(|a| a.to_string()));
        self
    }

    /// Append attribute patterns to the exclude list.
    pub fn exclude(mut self, attrs: &[&str]) -> Self {
        self.excludes.extend(attrs.iter().map(|a| a.to_string()));
        self
    }
}

impl From<&str> for SourceSelector {
    fn from(v: &str) -> Self {
        SourceSelector::Field(v.to_string())
    }
}

impl From<Vec<&str>> for SourceSelector {
    fn from(v: Vec<&str>) -> Self {
        SourceSelector::Fields(v.into_iter().map(|s| s.to_string()).collect())
    }
}

impl From<SourceFilter> for SourceSelector {
    fn from(v: SourceFilter) -> Self {
        SourceSelector::Filter(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_shapes() {
        assert_eq!(
            serde_json::to_value(SourceSelector::from("attr*")).unwrap(),
            json!("attr*")
        );
        assert_eq!(
            serde_json::to_value(SourceSelector::from(vec!["attr1", "attri*"])).unwrap(),
            json!(["attr1", "attri*"])
        );
        let filter = SourceFilter::new().include(&["attr1"]).exclude(&["*desc*"]);
        assert_eq!(
            serde_json::to_value(SourceSelector::from(filter)).unwrap(),
            json!({"includes": ["attr1"], "excludes": ["*desc*"]})
        );
    }
}
