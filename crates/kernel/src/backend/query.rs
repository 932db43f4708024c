//! List query options and paged results.

use serde::{Deserialize, Serialize};

use super::filter::{Filter, Sort};

/// Options for a list request against a collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: Option<Filter>,
    pub sort: Vec<Sort>,
    /// Relation fields to expand.
    pub expand: Vec<String>,
    /// Requests sharing a key cancel each other; the newest one wins.
    pub request_key: Option<String>,
    /// Skip the total count; `total_items` comes back as -1.
    pub skip_total: bool,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn expand(mut self, field: impl Into<String>) -> Self {
        self.expand.push(field.into());
        self
    }

    pub fn request_key(mut self, key: impl Into<String>) -> Self {
        self.request_key = Some(key.into());
        self
    }

    /// Set the request key only when one is given.
    pub fn maybe_request_key(mut self, key: Option<&str>) -> Self {
        self.request_key = key.map(str::to_string);
        self
    }

    pub fn skip_total(mut self) -> Self {
        self.skip_total = true;
        self
    }

    /// Rendered filter, `None` when empty.
    pub fn filter_param(&self) -> Option<String> {
        self.filter
            .as_ref()
            .map(Filter::render)
            .filter(|s| !s.is_empty())
    }

    /// Comma-separated sort keys, `None` when unsorted.
    pub fn sort_param(&self) -> Option<String> {
        if self.sort.is_empty() {
            return None;
        }
        Some(
            self.sort
                .iter()
                .map(Sort::render)
                .collect::<Vec<_>>()
                .join(","),
        )
    }

    /// Comma-separated expand list, `None` when nothing is expanded.
    pub fn expand_param(&self) -> Option<String> {
        if self.expand.is_empty() {
            None
        } else {
            Some(self.expand.join(","))
        }
    }
}

/// One page of a list response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPage<T> {
    pub page: u32,
    pub per_page: u32,
    /// -1 when the total was skipped.
    pub total_items: i64,
    pub total_pages: i64,
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_params() {
        let query = ListQuery::new()
            .filter(Filter::eq("user", "me"))
            .sort(Sort::desc("created"))
            .expand("user")
            .expand("post");

        assert_eq!(query.filter_param().as_deref(), Some(r#"user = "me""#));
        assert_eq!(query.sort_param().as_deref(), Some("-created"));
        assert_eq!(query.expand_param().as_deref(), Some("user,post"));
    }

    #[test]
    fn empty_params_are_omitted() {
        let query = ListQuery::new().filter(Filter::And(vec![]));
        assert!(query.filter_param().is_none());
        assert!(query.sort_param().is_none());
        assert!(query.expand_param().is_none());
    }

    #[test]
    fn maybe_request_key() {
        assert!(ListQuery::new().maybe_request_key(None).request_key.is_none());
        assert_eq!(
            ListQuery::new()
                .maybe_request_key(Some("feedPosts"))
                .request_key
                .as_deref(),
            Some("feedPosts")
        );
    }
}
