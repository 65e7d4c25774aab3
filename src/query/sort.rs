//! Sort directives for search requests.
//!
//! The engine accepts three sort entry shapes, in one ordered list that
//! defines tie-break priority from primary to last:
//!
//! ```json
//! "sort": [ "_score", "id" ]
//! "sort": [ { "price": "asc" }, "id" ]
//! "sort": [ { "gid": { "order": "desc" } } ]
//! "sort": [ { "attr_mva": { "order": "desc", "mode": "max" } } ]
//! ```

use serde::ser::{Serialize, SerializeMap, Serializer};

/// Ascending sort order literal.
pub const SORT_ASC: &str = "asc";
/// Descending sort order literal.
pub const SORT_DESC: &str = "desc";

/// One entry of the sort list.
///
/// Order and mode strings are passed through verbatim with no case
/// normalization; field names are not validated.
#[derive(Debug, Clone, PartialEq)]
pub enum SortDirective {
    /// Bare field-name list; the engine sorts by score first, then by these
    /// fields in declared order as tie-break.
    Fields(Vec<String>),
    /// `{field: order}` entry.
    FieldOrder { field: String, order: String },
    /// `{field: {"order": order[, "mode": mode]}}` entry; mode applies to
    /// multi-valued attributes only.
    FieldOrderMode {
        field: String,
        order: String,
        mode: Option<String>,
    },
}

impl Serialize for SortDirective {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SortDirective::Fields(fields) => fields.serialize(serializer),
            SortDirective::FieldOrder { field, order } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(field, order)?;
                map.end()
            }
            SortDirective::FieldOrderMode { field, order, mode } => {
                #[derive(serde::Serialize)]
                struct OrderMode<'a> {
                    order: &'a str,
                    #[serde(skip_serializing_if = "Option::is_none")]
                    mode: Option<&'a str>,
                }

                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(
                    field,
                    &OrderMode {
                        order,
                        mode: mode.as_deref(),
                    },
                )?;
                map.end()
            }
        }
    }
}

/// Ordered builder for the request's `sort` member.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct SortSpec {
    sorts: Vec<SortDirective>,
}

impl SortSpec {
    /// Create an empty sort spec.
    pub fn new() -> Self {
        SortSpec::default()
    }

    /// Append one entry holding the literal field-name list.
    pub fn multi_field(mut self, fields: &[&str]) -> Self {
        self.sorts.push(SortDirective::Fields(
            fields.iter().map(|f| f.to_string()).collect(),
        ));
        self
    }

    /// Append a `{field: order}` entry.
    pub fn single_field(mut self, field: &str, order: &str) -> Self {
        self.sorts.push(SortDirective::FieldOrder {
            field: field.to_string(),
            order: order.to_string(),
        });
        self
    }

    /// Append a `{field: {"order": order}}` entry.
    pub fn single_field_order(mut self, field: &str, order: &str) -> Self {
        self.sorts.push(SortDirective::FieldOrderMode {
            field: field.to_string(),
            order: order.to_string(),
            mode: None,
        });
        self
    }

    /// Append a `{field: {"order": order, "mode": mode}}` entry for
    /// multi-valued attributes.
    pub fn single_field_order_mode(mut self, field: &str, order: &str, mode: &str) -> Self {
        self.sorts.push(SortDirective::FieldOrderMode {
            field: field.to_string(),
            order: order.to_string(),
            mode: Some(mode.to_string()),
        });
        self
    }

    /// Whether no directives have been appended.
    pub fn is_empty(&self) -> bool {
        self.sorts.is_empty()
    }

    /// The appended directives in declaration order.
    pub fn directives(&self) -> &[SortDirective] {
        &self.sorts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_field_order_preserved() {
        let sort = SortSpec::new()
            .single_field("score", SORT_DESC)
            .single_field("updated_at", SORT_ASC);
        assert_eq!(
            serde_json::to_string(&sort).unwrap(),
            r#"[{"score":"desc"},{"updated_at":"asc"}]"#
        );
    }

    #[test]
    fn test_multi_field_literal_list() {
        let sort = SortSpec::new().multi_field(&["_score", "id"]);
        assert_eq!(serde_json::to_string(&sort).unwrap(), r#"[["_score","id"]]"#);
    }

    #[test]
    fn test_field_order_mode() {
        let sort = SortSpec::new().single_field_order_mode("attr_mva", SORT_DESC, "max");
        assert_eq!(
            serde_json::to_string(&sort).unwrap(),
            r#"[{"attr_mva":{"order":"desc","mode":"max"}}]"#
        );
    }

    #[test]
    fn test_field_order_without_mode_omits_mode() {
        let sort = SortSpec::new().single_field_order("gid", SORT_DESC);
        assert_eq!(
            serde_json::to_string(&sort).unwrap(),
            r#"[{"gid":{"order":"desc"}}]"#
        );
    }

    #[test]
    fn test_order_strings_not_normalized() {
        let sort = SortSpec::new().single_field("price", "DESC");
        assert_eq!(serde_json::to_string(&sort).unwrap(), r#"[{"price":"DESC"}]"#);
    }
}
