//! List-query builder.
//!
//! Translates a raw query string into a structured filter, a sort order and
//! a pagination window. Filters are keyed per field with a tagged operator
//! (`field[gt]=5`, `field[in]=a,b`); a bare key is an equality filter, so a
//! field that happens to be named `gte` is never mistaken for an operator.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use thiserror::Error;
use utoipa::ToSchema;

/// Keys that never become filters
const RESERVED_KEYS: [&str; 4] = ["select", "sort", "page", "limit"];

/// Default page size when `limit` is absent or zero
pub const DEFAULT_LIMIT: usize = 10;

/// Error type for malformed query parameters. Always a client-input error,
/// never a server fault.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A bracketed key that does not parse as `field[op]`
    #[error("Malformed filter key: {0}")]
    MalformedKey(String),

    /// A bracketed key with an operator outside gt/gte/lt/lte/in
    #[error("Unknown filter operator: {0}")]
    UnknownOperator(String),

    /// An `in` filter with no values
    #[error("Empty value list for `in` filter on field: {0}")]
    EmptyInList(String),
}

/// Comparison operator applied to a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    Eq(Value),
    Gt(Value),
    Gte(Value),
    Lt(Value),
    Lte(Value),
    In(Vec<Value>),
}

/// Conjunction of per-field comparisons
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, FilterOp)>,
}

impl Filter {
    /// True when the filter has no clauses
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Number of clauses, used by tests
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Test a serialized document against every clause
    pub fn matches(&self, doc: &Value) -> bool {
        self.clauses
            .iter()
            .all(|(field, op)| op_matches(lookup_field(doc, field), op))
    }
}

/// One sort key; `desc` for a leading `-` in the sort parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub desc: bool,
}

/// Fully built list query: structured filter, projection, sort order and
/// the pagination window.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub filter: Filter,
    pub select: Option<Vec<String>>,
    pub sort: Vec<SortKey>,
    pub page: usize,
    pub limit: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filter: Filter::default(),
            select: None,
            sort: vec![SortKey {
                field: "createdAt".to_string(),
                desc: true,
            }],
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl ListQuery {
    /// Build a query from raw key/value pairs as they arrived on the query
    /// string. Reserved keys (`select`, `sort`, `page`, `limit`) shape the
    /// query; everything else becomes a filter clause.
    pub fn from_pairs(pairs: &[(String, String)]) -> Result<Self, QueryError> {
        let mut query = ListQuery::default();

        for (key, value) in pairs {
            match key.as_str() {
                "select" => {
                    let fields: Vec<String> = value
                        .split(',')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(str::to_string)
                        .collect();
                    if !fields.is_empty() {
                        query.select = Some(fields);
                    }
                }
                "sort" => {
                    let keys: Vec<SortKey> = value
                        .split(',')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(|f| match f.strip_prefix('-') {
                            Some(rest) => SortKey {
                                field: rest.to_string(),
                                desc: true,
                            },
                            None => SortKey {
                                field: f.to_string(),
                                desc: false,
                            },
                        })
                        .collect();
                    if !keys.is_empty() {
                        query.sort = keys;
                    }
                }
                "page" => {
                    let page = value.parse::<usize>().unwrap_or(1);
                    query.page = page.max(1);
                }
                "limit" => {
                    let limit = value.parse::<usize>().unwrap_or(DEFAULT_LIMIT);
                    query.limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
                }
                _ => {
                    let (field, op) = parse_filter_pair(key, value)?;
                    query.filter.clauses.push((field, op));
                }
            }
        }

        Ok(query)
    }

    /// Number of documents to skip for the requested page
    pub fn skip(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Link to an adjacent page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct PageLink {
    pub page: usize,
    pub limit: usize,
}

/// Pagination metadata for a list response. `next` is present iff the
/// current window ends before the total; `prev` iff the page is past the
/// first.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

impl Pagination {
    /// Compute pagination links from the window and a total count taken
    /// against the same filter.
    pub fn compute(page: usize, limit: usize, total: usize) -> Self {
        let next = if page.saturating_mul(limit) < total {
            Some(PageLink {
                page: page + 1,
                limit,
            })
        } else {
            None
        };

        let prev = if page > 1 {
            Some(PageLink {
                page: page - 1,
                limit,
            })
        } else {
            None
        };

        Pagination { next, prev }
    }
}

/// Restrict serialized documents to the selected fields. The `id` field is
/// always kept.
pub fn apply_select(docs: Vec<Value>, fields: &[String]) -> Vec<Value> {
    docs.into_iter()
        .map(|doc| match doc {
            Value::Object(map) => {
                let kept = map
                    .into_iter()
                    .filter(|(k, _)| k == "id" || fields.iter().any(|f| f == k))
                    .collect();
                Value::Object(kept)
            }
            other => other,
        })
        .collect()
}

/// Order two JSON values for sorting: nulls first, then booleans, numbers
/// and strings; mixed types compare by that rank.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            _ => 4,
        }
    }

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Parse one non-reserved query pair into a filter clause
fn parse_filter_pair(key: &str, value: &str) -> Result<(String, FilterOp), QueryError> {
    match key.find('[') {
        None => Ok((key.to_string(), FilterOp::Eq(parse_scalar(value)))),
        Some(open) => {
            if !key.ends_with(']') || open == 0 {
                return Err(QueryError::MalformedKey(key.to_string()));
            }
            let field = &key[..open];
            let op = &key[open + 1..key.len() - 1];
            if field.contains(']') || op.contains('[') {
                return Err(QueryError::MalformedKey(key.to_string()));
            }

            let op = match op {
                "gt" => FilterOp::Gt(parse_scalar(value)),
                "gte" => FilterOp::Gte(parse_scalar(value)),
                "lt" => FilterOp::Lt(parse_scalar(value)),
                "lte" => FilterOp::Lte(parse_scalar(value)),
                "in" => {
                    let values: Vec<Value> = value
                        .split(',')
                        .map(str::trim)
                        .filter(|v| !v.is_empty())
                        .map(parse_scalar)
                        .collect();
                    if values.is_empty() {
                        return Err(QueryError::EmptyInList(field.to_string()));
                    }
                    FilterOp::In(values)
                }
                other => return Err(QueryError::UnknownOperator(other.to_string())),
            };

            Ok((field.to_string(), op))
        }
    }
}

/// Interpret a query-string scalar: number, boolean or plain string
fn parse_scalar(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::from(n);
    }
    if let Ok(n) = raw.parse::<f64>() {
        return Value::from(n);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

/// Resolve a possibly dotted field path against a serialized document
fn lookup_field<'a>(doc: &'a Value, field: &str) -> Option<&'a Value> {
    let mut current = doc;
    for part in field.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn scalar_eq(doc_value: &Value, filter_value: &Value) -> bool {
    match (doc_value, filter_value) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => doc_value == filter_value,
    }
}

fn op_matches(doc_value: Option<&Value>, op: &FilterOp) -> bool {
    let doc_value = match doc_value {
        Some(v) => v,
        None => return false,
    };

    // An equality filter against an array field matches if any element does
    if let Value::Array(items) = doc_value {
        return match op {
            FilterOp::Eq(want) => items.iter().any(|item| scalar_eq(item, want)),
            FilterOp::In(wants) => items
                .iter()
                .any(|item| wants.iter().any(|w| scalar_eq(item, w))),
            _ => false,
        };
    }

    match op {
        FilterOp::Eq(want) => scalar_eq(doc_value, want),
        FilterOp::In(wants) => wants.iter().any(|w| scalar_eq(doc_value, w)),
        FilterOp::Gt(want) => ordered(doc_value, want) == Some(Ordering::Greater),
        FilterOp::Gte(want) => {
            matches!(ordered(doc_value, want), Some(Ordering::Greater | Ordering::Equal))
        }
        FilterOp::Lt(want) => ordered(doc_value, want) == Some(Ordering::Less),
        FilterOp::Lte(want) => {
            matches!(ordered(doc_value, want), Some(Ordering::Less | Ordering::Equal))
        }
    }
}

/// Compare a document value with a filter value; `None` on type mismatch,
/// which makes the comparison filter reject the document.
fn ordered(doc_value: &Value, filter_value: &Value) -> Option<Ordering> {
    match (doc_value, filter_value) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let query = ListQuery::from_pairs(&[]).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, DEFAULT_LIMIT);
        assert_eq!(query.skip(), 0);
        assert!(query.filter.is_empty());
        assert_eq!(
            query.sort,
            vec![SortKey {
                field: "createdAt".to_string(),
                desc: true
            }]
        );
    }

    #[test]
    fn test_skip_computation() {
        let query = ListQuery::from_pairs(&pairs(&[("page", "2"), ("limit", "10")])).unwrap();
        assert_eq!(query.skip(), 10);
        assert_eq!(query.limit, 10);
    }

    #[test]
    fn test_zero_page_and_limit_fall_back_to_defaults() {
        let query = ListQuery::from_pairs(&pairs(&[("page", "0"), ("limit", "0")])).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_plain_key_is_equality_filter() {
        let query = ListQuery::from_pairs(&pairs(&[("gender", "male")])).unwrap();
        assert!(query.filter.matches(&json!({"gender": "male"})));
        assert!(!query.filter.matches(&json!({"gender": "female"})));
    }

    #[test]
    fn test_field_named_like_operator_is_not_rewritten() {
        // A field literally called "gte" must filter by equality
        let query = ListQuery::from_pairs(&pairs(&[("gte", "5")])).unwrap();
        assert!(query.filter.matches(&json!({"gte": 5})));
        assert!(!query.filter.matches(&json!({"gte": 6})));
    }

    #[test]
    fn test_comparison_operators() {
        let query = ListQuery::from_pairs(&pairs(&[("age[gt]", "18")])).unwrap();
        assert!(query.filter.matches(&json!({"age": 19})));
        assert!(!query.filter.matches(&json!({"age": 18})));

        let query = ListQuery::from_pairs(&pairs(&[("age[gte]", "18")])).unwrap();
        assert!(query.filter.matches(&json!({"age": 18})));
        assert!(!query.filter.matches(&json!({"age": 17})));

        let query = ListQuery::from_pairs(&pairs(&[("age[lt]", "18"), ("age[gte]", "10")])).unwrap();
        assert!(query.filter.matches(&json!({"age": 12})));
        assert!(!query.filter.matches(&json!({"age": 18})));
        assert!(!query.filter.matches(&json!({"age": 9})));
    }

    #[test]
    fn test_string_comparison_for_dates() {
        let query =
            ListQuery::from_pairs(&pairs(&[("createdAt[gte]", "2023-06-01")])).unwrap();
        assert!(query.filter.matches(&json!({"createdAt": "2023-07-15"})));
        assert!(!query.filter.matches(&json!({"createdAt": "2023-05-15"})));
    }

    #[test]
    fn test_in_operator() {
        let query = ListQuery::from_pairs(&pairs(&[("status[in]", "active,completed")])).unwrap();
        assert!(query.filter.matches(&json!({"status": "active"})));
        assert!(query.filter.matches(&json!({"status": "completed"})));
        assert!(!query.filter.matches(&json!({"status": "cancelled"})));
    }

    #[test]
    fn test_array_field_equality_matches_membership() {
        let query = ListQuery::from_pairs(&pairs(&[("allergies", "peanuts")])).unwrap();
        assert!(query.filter.matches(&json!({"allergies": ["latex", "peanuts"]})));
        assert!(!query.filter.matches(&json!({"allergies": ["latex"]})));
    }

    #[test]
    fn test_dotted_field_path() {
        let query = ListQuery::from_pairs(&pairs(&[("value.reading[gt]", "100")])).unwrap();
        assert!(query.filter.matches(&json!({"value": {"reading": 110}})));
        assert!(!query.filter.matches(&json!({"value": {"reading": 90}})));
    }

    #[test]
    fn test_missing_field_never_matches() {
        let query = ListQuery::from_pairs(&pairs(&[("age[gt]", "18")])).unwrap();
        assert!(!query.filter.matches(&json!({"name": "x"})));
    }

    #[test]
    fn test_malformed_operator_is_client_error() {
        assert!(matches!(
            ListQuery::from_pairs(&pairs(&[("age[near]", "18")])),
            Err(QueryError::UnknownOperator(_))
        ));
        assert!(matches!(
            ListQuery::from_pairs(&pairs(&[("age[gt", "18")])),
            Err(QueryError::MalformedKey(_))
        ));
        assert!(matches!(
            ListQuery::from_pairs(&pairs(&[("status[in]", "")])),
            Err(QueryError::EmptyInList(_))
        ));
    }

    #[test]
    fn test_sort_parsing() {
        let query = ListQuery::from_pairs(&pairs(&[("sort", "-createdAt,name")])).unwrap();
        assert_eq!(
            query.sort,
            vec![
                SortKey {
                    field: "createdAt".to_string(),
                    desc: true
                },
                SortKey {
                    field: "name".to_string(),
                    desc: false
                },
            ]
        );
    }

    #[test]
    fn test_select_parsing_and_projection() {
        let query = ListQuery::from_pairs(&pairs(&[("select", "name,gender")])).unwrap();
        let fields = query.select.unwrap();

        let docs = vec![json!({"id": "a", "name": "x", "gender": "male", "secret": 1})];
        let projected = apply_select(docs, &fields);
        assert_eq!(
            projected,
            vec![json!({"id": "a", "name": "x", "gender": "male"})]
        );
    }

    #[test]
    fn test_pagination_middle_page_has_both_links() {
        // total=25, page=2, limit=10: window [10, 20) with more beyond
        let pagination = Pagination::compute(2, 10, 25);
        assert_eq!(pagination.next, Some(PageLink { page: 3, limit: 10 }));
        assert_eq!(pagination.prev, Some(PageLink { page: 1, limit: 10 }));
    }

    #[test]
    fn test_pagination_single_page_has_no_links() {
        let pagination = Pagination::compute(1, 10, 5);
        assert!(pagination.next.is_none());
        assert!(pagination.prev.is_none());
    }

    #[test]
    fn test_pagination_last_page_has_only_prev() {
        let pagination = Pagination::compute(3, 10, 25);
        assert!(pagination.next.is_none());
        assert_eq!(pagination.prev, Some(PageLink { page: 2, limit: 10 }));
    }

    #[test]
    fn test_compare_values_ordering() {
        assert_eq!(
            compare_values(&json!(1), &json!(2)),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&json!("a"), &json!("b")),
            Ordering::Less
        );
        assert_eq!(
            compare_values(&Value::Null, &json!(1)),
            Ordering::Less
        );
    }
}
