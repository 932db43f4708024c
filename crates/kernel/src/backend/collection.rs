//! Typed access to one collection of a [`RecordStore`].

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::{BackendError, BackendResult};
use super::filter::Filter;
use super::query::ListQuery;
use super::RecordStore;

/// Page size used when fetching a complete list.
pub const FULL_LIST_BATCH: u32 = 500;

/// Handle to a named collection.
pub struct Collection<'a> {
    store: &'a dyn RecordStore,
    name: &'a str,
}

impl<'a> Collection<'a> {
    pub fn new(store: &'a dyn RecordStore, name: &'a str) -> Self {
        Self { store, name }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Fetch every matching record, paging in batches of
    /// [`FULL_LIST_BATCH`] until a short page comes back.
    pub async fn full_list<T: DeserializeOwned>(&self, query: &ListQuery) -> BackendResult<Vec<T>> {
        let mut batch_query = query.clone();
        batch_query.skip_total = true;

        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let batch = self
                .store
                .list(self.name, page, FULL_LIST_BATCH, &batch_query)
                .await?;
            let fetched = batch.items.len();
            for value in batch.items {
                items.push(serde_json::from_value(value)?);
            }
            if fetched < FULL_LIST_BATCH as usize {
                break;
            }
            page += 1;
        }

        Ok(items)
    }

    /// Number of records matching `filter`, read from a one-item page.
    pub async fn count(&self, filter: Filter, request_key: Option<&str>) -> BackendResult<i64> {
        let query = ListQuery::new()
            .filter(filter)
            .maybe_request_key(request_key);
        let page = self.store.list(self.name, 1, 1, &query).await?;
        Ok(page.total_items.max(0))
    }

    /// First record matching `filter`, or [`BackendError::NotFound`].
    pub async fn first_list_item<T: DeserializeOwned>(&self, filter: Filter) -> BackendResult<T> {
        let query = ListQuery::new().filter(filter).skip_total();
        let page = self.store.list(self.name, 1, 1, &query).await?;
        let first = page.items.into_iter().next().ok_or(BackendError::NotFound)?;
        Ok(serde_json::from_value(first)?)
    }

    pub async fn get_one<T: DeserializeOwned>(&self, id: &str, expand: &[&str]) -> BackendResult<T> {
        let expand: Vec<String> = expand.iter().map(|s| s.to_string()).collect();
        let record = self.store.get_one(self.name, id, &expand).await?;
        Ok(serde_json::from_value(record)?)
    }

    pub async fn update<T: DeserializeOwned>(&self, id: &str, body: Value) -> BackendResult<T> {
        let record = self.store.update(self.name, id, body).await?;
        Ok(serde_json::from_value(record)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::backend::{MemoryBackend, Sort};
    use crate::models::POSTS;
    use serde_json::json;

    fn backend_with_posts(count: usize) -> MemoryBackend {
        let backend = MemoryBackend::new();
        for n in 0..count {
            backend
                .insert(POSTS, json!({ "id": format!("p{n:05}"), "user": "me" }))
                .unwrap();
        }
        backend
    }

    fn list_calls(backend: &MemoryBackend) -> usize {
        backend
            .requests()
            .iter()
            .filter(|r| r.operation == "list")
            .count()
    }

    #[tokio::test]
    async fn full_list_pages_past_one_batch() {
        let backend = backend_with_posts(1001);
        let posts = Collection::new(&backend, POSTS);

        let items: Vec<Value> = posts
            .full_list(&ListQuery::new().sort(Sort::asc("id")))
            .await
            .unwrap();

        assert_eq!(items.len(), 1001);
        assert_eq!(items[0]["id"], "p00000");
        assert_eq!(items[500]["id"], "p00500");
        assert_eq!(items[1000]["id"], "p01000");
        assert_eq!(list_calls(&backend), 3);
    }

    #[tokio::test]
    async fn full_list_of_exact_batch_stops_on_empty_page() {
        let backend = backend_with_posts(FULL_LIST_BATCH as usize);
        let posts = Collection::new(&backend, POSTS);

        let items: Vec<Value> = posts.full_list(&ListQuery::new()).await.unwrap();

        assert_eq!(items.len(), FULL_LIST_BATCH as usize);
        assert_eq!(list_calls(&backend), 2);
    }

    #[tokio::test]
    async fn count_reads_total_from_one_item_page() {
        let backend = backend_with_posts(7);
        let posts = Collection::new(&backend, POSTS);

        let total = posts
            .count(Filter::eq("user", "me"), Some("postCount"))
            .await
            .unwrap();

        assert_eq!(total, 7);
        let request = backend.requests().pop().unwrap();
        assert_eq!(request.request_key.as_deref(), Some("postCount"));
    }
}
