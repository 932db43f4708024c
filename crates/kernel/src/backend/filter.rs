//! Filter expressions for collection queries.
//!
//! Filters are built as a typed tree and rendered to the backend's filter
//! syntax (`follower = "abc" && accepted = true`). Values are always quoted
//! and escaped at render time, so ids and usernames taken from requests never
//! end up spliced into an expression verbatim.
//!
//! The same tree can be evaluated against JSON records, which is what the
//! in-memory backend does.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Rendered form of a disjunction with no members. Record ids are never
/// empty, so this matches nothing.
const MATCH_NOTHING: &str = "id = \"\"";

/// Comparison operators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    /// `=`
    Equals,
    /// `!=`
    NotEquals,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterOrEqual,
    /// `<`
    LessThan,
    /// `<=`
    LessOrEqual,
    /// `~`, case-insensitive substring match.
    Like,
}

impl FilterOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            FilterOperator::Equals => "=",
            FilterOperator::NotEquals => "!=",
            FilterOperator::GreaterThan => ">",
            FilterOperator::GreaterOrEqual => ">=",
            FilterOperator::LessThan => "<",
            FilterOperator::LessOrEqual => "<=",
            FilterOperator::Like => "~",
        }
    }
}

/// Literal on the right-hand side of a comparison.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FilterValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl FilterValue {
    /// Render as a backend literal. Strings are double-quoted with `\` and
    /// `"` escaped.
    pub fn render(&self) -> String {
        match self {
            FilterValue::Boolean(b) => b.to_string(),
            FilterValue::Integer(i) => i.to_string(),
            FilterValue::String(s) => {
                let mut out = String::with_capacity(s.len() + 2);
                out.push('"');
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        out.push('\\');
                    }
                    out.push(c);
                }
                out.push('"');
                out
            }
        }
    }

    fn to_json(&self) -> Value {
        match self {
            FilterValue::Boolean(b) => Value::Bool(*b),
            FilterValue::Integer(i) => Value::from(*i),
            FilterValue::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::String(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::String(value)
    }
}

impl From<&String> for FilterValue {
    fn from(value: &String) -> Self {
        FilterValue::String(value.clone())
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Boolean(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Integer(value)
    }
}

/// A filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Compare {
        /// Field path; dots walk relations (`post.user`).
        field: String,
        operator: FilterOperator,
        value: FilterValue,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn compare(
        field: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Filter::Compare {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// `field = value`
    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::compare(field, FilterOperator::Equals, value)
    }

    /// `field = v1 || field = v2 || ...`
    pub fn any_of<I, V>(field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FilterValue>,
    {
        Filter::Or(values.into_iter().map(|v| Self::eq(field, v)).collect())
    }

    /// Conjunction with another filter, flattening nested `And`s.
    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut filters) => {
                filters.push(other);
                Filter::And(filters)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    /// Render to backend filter syntax.
    pub fn render(&self) -> String {
        match self {
            Filter::Compare {
                field,
                operator,
                value,
            } => format!("{field} {} {}", operator.symbol(), value.render()),
            Filter::And(filters) => filters
                .iter()
                .map(|f| f.render_nested())
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" && "),
            Filter::Or(filters) if filters.is_empty() => MATCH_NOTHING.to_string(),
            Filter::Or(filters) => filters
                .iter()
                .map(|f| f.render_nested())
                .collect::<Vec<_>>()
                .join(" || "),
        }
    }

    fn render_nested(&self) -> String {
        let inner = self.collapsed();
        let needs_parens = match inner {
            Filter::Compare { .. } => false,
            Filter::And(filters) | Filter::Or(filters) => filters.len() > 1,
        };
        if needs_parens {
            format!("({})", inner.render())
        } else {
            inner.render()
        }
    }

    /// Strip single-member groups, which render the same as their member.
    fn collapsed(&self) -> &Filter {
        match self {
            Filter::And(filters) | Filter::Or(filters) => match filters.as_slice() {
                [only] => only.collapsed(),
                _ => self,
            },
            Filter::Compare { .. } => self,
        }
    }

    /// Evaluate against a record. `lookup` resolves a field path to its
    /// value, returning `None` for missing fields.
    pub fn matches<F>(&self, lookup: &F) -> bool
    where
        F: Fn(&str) -> Option<Value>,
    {
        match self {
            Filter::Compare {
                field,
                operator,
                value,
            } => {
                let actual = lookup(field).unwrap_or(Value::Null);
                compare(&actual, *operator, &value.to_json())
            }
            Filter::And(filters) => filters.iter().all(|f| f.matches(lookup)),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(lookup)),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Missing values compare like the field type's zero value.
fn normalize(actual: &Value, expected: &Value) -> Value {
    match (actual, expected) {
        (Value::Null, Value::Bool(_)) => Value::Bool(false),
        (Value::Null, Value::String(_)) => Value::String(String::new()),
        (Value::Null, Value::Number(_)) => Value::from(0),
        _ => actual.clone(),
    }
}

fn ordering(actual: &Value, expected: &Value) -> Option<Ordering> {
    match (actual, expected) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

fn compare(actual: &Value, operator: FilterOperator, expected: &Value) -> bool {
    let actual = normalize(actual, expected);
    match operator {
        FilterOperator::Equals => ordering(&actual, expected) == Some(Ordering::Equal),
        FilterOperator::NotEquals => ordering(&actual, expected) != Some(Ordering::Equal),
        FilterOperator::GreaterThan => ordering(&actual, expected) == Some(Ordering::Greater),
        FilterOperator::GreaterOrEqual => matches!(
            ordering(&actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::LessThan => ordering(&actual, expected) == Some(Ordering::Less),
        FilterOperator::LessOrEqual => matches!(
            ordering(&actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOperator::Like => match (&actual, expected) {
            (Value::String(a), Value::String(b)) => a.to_lowercase().contains(&b.to_lowercase()),
            _ => false,
        },
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Render as `field` or `-field`.
    pub fn render(&self) -> String {
        match self.direction {
            SortDirection::Asc => self.field.clone(),
            SortDirection::Desc => format!("-{}", self.field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> impl Fn(&str) -> Option<Value> {
        move |field: &str| value.get(field).cloned()
    }

    #[test]
    fn renders_simple_conjunction() {
        let filter = Filter::eq("follower", "abc").and(Filter::eq("accepted", true));
        assert_eq!(filter.render(), r#"follower = "abc" && accepted = true"#);
    }

    #[test]
    fn parenthesizes_nested_disjunction() {
        let filter = Filter::eq("user", "me").and(Filter::any_of("post", ["p1", "p2"]));
        assert_eq!(
            filter.render(),
            r#"user = "me" && (post = "p1" || post = "p2")"#
        );
    }

    #[test]
    fn single_member_disjunction_has_no_parens() {
        let filter = Filter::eq("user", "me").and(Filter::any_of("post", ["p1"]));
        assert_eq!(filter.render(), r#"user = "me" && post = "p1""#);
    }

    #[test]
    fn parenthesizes_disjunction_wrapped_in_single_member_group() {
        let filter = Filter::eq("x", 1_i64).and(Filter::Or(vec![Filter::any_of("p", ["a", "b"])]));
        assert_eq!(filter.render(), r#"x = 1 && (p = "a" || p = "b")"#);

        let filter = Filter::eq("x", 1_i64).and(Filter::And(vec![Filter::Or(vec![
            Filter::eq("p", "a"),
        ])]));
        assert_eq!(filter.render(), r#"x = 1 && p = "a""#);
    }

    #[test]
    fn empty_disjunction_matches_nothing() {
        let filter = Filter::any_of::<_, &str>("user", []);
        assert_eq!(filter.render(), r#"id = """#);
        assert!(!filter.matches(&record(json!({"id": "x"}))));
    }

    #[test]
    fn empty_conjunction_renders_empty() {
        assert_eq!(Filter::And(vec![]).render(), "");
        assert!(Filter::And(vec![]).matches(&record(json!({}))));
    }

    #[test]
    fn escapes_string_literals() {
        let filter = Filter::eq("username", r#"x" || id != "#);
        assert_eq!(filter.render(), r#"username = "x\" || id != ""#);

        let filter = Filter::eq("username", r"back\slash");
        assert_eq!(filter.render(), r#"username = "back\\slash""#);
    }

    #[test]
    fn operator_symbols() {
        let filter = Filter::compare("created", FilterOperator::GreaterOrEqual, "2025-01-01");
        assert_eq!(filter.render(), r#"created >= "2025-01-01""#);
        let filter = Filter::compare("read", FilterOperator::NotEquals, true);
        assert_eq!(filter.render(), "read != true");
    }

    #[test]
    fn evaluates_equality_and_missing_bools() {
        let follow = record(json!({"follower": "a", "following": "b"}));
        assert!(Filter::eq("follower", "a").matches(&follow));
        assert!(Filter::eq("accepted", false).matches(&follow));
        assert!(!Filter::eq("accepted", true).matches(&follow));
        assert!(Filter::compare("following", FilterOperator::NotEquals, "a").matches(&follow));
    }

    #[test]
    fn evaluates_like_case_insensitively() {
        let user = record(json!({"username": "Ada_Lovelace"}));
        assert!(Filter::compare("username", FilterOperator::Like, "love").matches(&user));
        assert!(!Filter::compare("username", FilterOperator::Like, "babbage").matches(&user));
    }

    #[test]
    fn renders_sorts() {
        assert_eq!(Sort::desc("created").render(), "-created");
        assert_eq!(Sort::asc("username").render(), "username");
    }
}
