//! In-memory backend.
//!
//! Holds the four collections as JSON records and answers list, view and
//! update requests the way the real backend does: filters (including dotted
//! relation paths such as `post.user`), multi-key sorts, pagination, totals
//! and relation expansion. Access rules are not evaluated; every session sees
//! every record.
//!
//! Session tokens are user ids. Used by the test suite and by `--demo`.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use rand::Rng;
use serde_json::{Map, Value};
use tracing::debug;

use super::error::{BackendError, BackendResult};
use super::filter::{Sort, SortDirection};
use super::query::{ListPage, ListQuery};
use super::{Backend, RecordStore, Session};
use crate::models::{FOLLOWS, LIKES, POSTS, USERS, User, timestamp};

const ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_LENGTH: usize = 15;

/// Collection ids as assigned by the schema migrations.
pub fn collection_id(collection: &str) -> &'static str {
    match collection {
        USERS => "_pb_users_auth_",
        POSTS => "pbc_1125843985",
        FOLLOWS => "pbc_3660641689",
        LIKES => "pbc_2190274710",
        _ => "pbc_unknown",
    }
}

/// Target collection of a relation field.
pub fn relation_target(collection: &str, field: &str) -> Option<&'static str> {
    match (collection, field) {
        (POSTS, "user") | (FOLLOWS, "follower") | (FOLLOWS, "following") | (LIKES, "user") => {
            Some(USERS)
        }
        (LIKES, "post") => Some(POSTS),
        _ => None,
    }
}

/// A request seen by the memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    /// `list`, `view` or `update`.
    pub operation: &'static str,
    pub collection: String,
    pub filter: Option<String>,
    pub request_key: Option<String>,
}

#[derive(Default)]
struct MemoryInner {
    collections: DashMap<String, Vec<Value>>,
    failing: DashMap<String, u16>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Shared in-memory collections. Cloning shares the data.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<MemoryInner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, filling in `id`, `collectionId`, `collectionName`,
    /// `created` and `updated` when absent. Likes are unique per
    /// (user, post).
    pub fn insert(&self, collection: &str, record: Value) -> BackendResult<Value> {
        let Value::Object(mut fields) = record else {
            return Err(BackendError::Status {
                status: 400,
                message: "record must be a JSON object".to_string(),
            });
        };

        let now = timestamp::format(&chrono::Utc::now());
        fields
            .entry("id")
            .or_insert_with(|| Value::String(generate_id()));
        fields
            .entry("collectionId")
            .or_insert_with(|| Value::String(collection_id(collection).to_string()));
        fields
            .entry("collectionName")
            .or_insert_with(|| Value::String(collection.to_string()));
        fields
            .entry("created")
            .or_insert_with(|| Value::String(now.clone()));
        fields
            .entry("updated")
            .or_insert_with(|| Value::String(now));

        let record = Value::Object(fields);
        let mut records = self
            .inner
            .collections
            .entry(collection.to_string())
            .or_default();

        if collection == LIKES {
            let duplicate = records
                .iter()
                .any(|r| r.get("user") == record.get("user") && r.get("post") == record.get("post"));
            if duplicate {
                return Err(BackendError::Status {
                    status: 400,
                    message: "like already exists for this user and post".to_string(),
                });
            }
        }
        if records.iter().any(|r| r.get("id") == record.get("id")) {
            return Err(BackendError::Status {
                status: 400,
                message: "duplicate record id".to_string(),
            });
        }

        records.push(record.clone());
        Ok(record)
    }

    /// Make every request against `collection` fail with `status`.
    pub fn fail_collection(&self, collection: &str, status: u16) {
        self.inner.failing.insert(collection.to_string(), status);
    }

    pub fn restore_collection(&self, collection: &str) {
        self.inner.failing.remove(collection);
    }

    /// Requests served so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.requests.lock().clone()
    }

    pub fn clear_requests(&self) {
        self.inner.requests.lock().clear();
    }

    /// Raw copy of a stored record.
    pub fn record(&self, collection: &str, id: &str) -> Option<Value> {
        self.find(collection, id)
    }

    pub fn len(&self, collection: &str) -> usize {
        self.inner
            .collections
            .get(collection)
            .map(|r| r.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.inner.collections.iter().all(|c| c.value().is_empty())
    }

    fn record_request(&self, request: RecordedRequest) {
        debug!(
            operation = request.operation,
            collection = %request.collection,
            "memory backend request"
        );
        self.inner.requests.lock().push(request);
    }

    fn check_failing(&self, collection: &str) -> BackendResult<()> {
        match self.inner.failing.get(collection) {
            Some(status) => Err(BackendError::from_status(
                *status,
                format!("{collection} unavailable"),
            )),
            None => Ok(()),
        }
    }

    fn find(&self, collection: &str, id: &str) -> Option<Value> {
        self.inner
            .collections
            .get(collection)?
            .iter()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
            .cloned()
    }

    /// Resolve a field path on a record, following relations for dotted
    /// paths.
    fn lookup(&self, collection: &str, record: &Value, path: &str) -> Option<Value> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let value = record.get(head)?;
        let Some(rest) = rest else {
            return Some(value.clone());
        };
        let target = relation_target(collection, head)?;
        let related = self.find(target, value.as_str()?)?;
        self.lookup(target, &related, rest)
    }

    /// Attach expanded relations under `expand`.
    fn expand(&self, collection: &str, record: Value, paths: &[String]) -> Value {
        if paths.is_empty() {
            return record;
        }

        // Group nested paths by their first segment: "post.user" expands
        // `post`, then `user` inside the post.
        let mut groups: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for path in paths {
            match path.split_once('.') {
                Some((head, rest)) => groups.entry(head).or_default().push(rest.to_string()),
                None => {
                    groups.entry(path.as_str()).or_default();
                }
            }
        }

        let mut expanded = Map::new();
        for (field, nested) in groups {
            let Some(target) = relation_target(collection, field) else {
                continue;
            };
            let Some(id) = record.get(field).and_then(Value::as_str) else {
                continue;
            };
            if let Some(related) = self.find(target, id) {
                expanded.insert(field.to_string(), self.expand(target, related, &nested));
            }
        }

        let mut record = record;
        if expanded.is_empty() {
            return record;
        }
        if let Value::Object(fields) = &mut record {
            fields.insert("expand".to_string(), Value::Object(expanded));
        }
        record
    }
}

fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn sort_records(records: &mut [Value], sorts: &[Sort]) {
    records.sort_by(|a, b| {
        sorts
            .iter()
            .map(|sort| {
                let ordering = compare_values(a.get(&sort.field), b.get(&sort.field));
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            })
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

#[async_trait]
impl RecordStore for MemoryBackend {
    async fn list(
        &self,
        collection: &str,
        page: u32,
        per_page: u32,
        query: &ListQuery,
    ) -> BackendResult<ListPage<Value>> {
        self.record_request(RecordedRequest {
            operation: "list",
            collection: collection.to_string(),
            filter: query.filter_param(),
            request_key: query.request_key.clone(),
        });
        self.check_failing(collection)?;

        let all: Vec<Value> = self
            .inner
            .collections
            .get(collection)
            .map(|r| r.value().clone())
            .unwrap_or_default();

        let mut matched: Vec<Value> = match &query.filter {
            Some(filter) => all
                .into_iter()
                .filter(|record| filter.matches(&|path: &str| self.lookup(collection, record, path)))
                .collect(),
            None => all,
        };
        sort_records(&mut matched, &query.sort);

        let page = page.max(1);
        let per_page = per_page.max(1);
        let total = matched.len() as i64;
        let items: Vec<Value> = matched
            .into_iter()
            .skip(((page - 1) * per_page) as usize)
            .take(per_page as usize)
            .map(|record| self.expand(collection, record, &query.expand))
            .collect();

        let (total_items, total_pages) = if query.skip_total {
            (-1, -1)
        } else {
            (total, (total + per_page as i64 - 1) / per_page as i64)
        };

        Ok(ListPage {
            page,
            per_page,
            total_items,
            total_pages,
            items,
        })
    }

    async fn get_one(&self, collection: &str, id: &str, expand: &[String]) -> BackendResult<Value> {
        self.record_request(RecordedRequest {
            operation: "view",
            collection: collection.to_string(),
            filter: None,
            request_key: None,
        });
        self.check_failing(collection)?;

        let record = self.find(collection, id).ok_or(BackendError::NotFound)?;
        Ok(self.expand(collection, record, expand))
    }

    async fn update(&self, collection: &str, id: &str, body: Value) -> BackendResult<Value> {
        self.record_request(RecordedRequest {
            operation: "update",
            collection: collection.to_string(),
            filter: None,
            request_key: None,
        });
        self.check_failing(collection)?;

        let Value::Object(changes) = body else {
            return Err(BackendError::Status {
                status: 400,
                message: "update body must be a JSON object".to_string(),
            });
        };

        let mut records = self
            .inner
            .collections
            .get_mut(collection)
            .ok_or(BackendError::NotFound)?;
        let record = records
            .iter_mut()
            .find(|r| r.get("id").and_then(Value::as_str) == Some(id))
            .ok_or(BackendError::NotFound)?;

        if let Value::Object(fields) = record {
            for (key, value) in changes {
                if key != "id" {
                    fields.insert(key, value);
                }
            }
            fields.insert(
                "updated".to_string(),
                Value::String(timestamp::format(&chrono::Utc::now())),
            );
        }
        Ok(record.clone())
    }

    fn file_url(
        &self,
        collection_id: &str,
        record_id: &str,
        filename: &str,
        thumb: Option<&str>,
    ) -> String {
        let url = format!("memory://files/{collection_id}/{record_id}/{filename}");
        match thumb {
            Some(thumb) => format!("{url}?thumb={thumb}"),
            None => url,
        }
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn session(&self, token: Option<&str>) -> BackendResult<Session> {
        let store: Arc<dyn RecordStore> = Arc::new(self.clone());
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(Session::anonymous(store));
        };

        match self.find(USERS, token) {
            Some(record) => {
                let user: User = serde_json::from_value(record)?;
                Ok(Session::new(Some(user), store))
            }
            None => Ok(Session::anonymous(store)),
        }
    }

    async fn healthy(&self) -> bool {
        true
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::backend::Filter;
    use serde_json::json;

    fn seeded() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend
            .insert(USERS, json!({"id": "alice", "username": "alice"}))
            .unwrap();
        backend
            .insert(USERS, json!({"id": "bob", "username": "bob"}))
            .unwrap();
        backend
            .insert(
                POSTS,
                json!({"id": "p1", "user": "alice", "created": "2025-01-01 10:00:00.000Z"}),
            )
            .unwrap();
        backend
            .insert(
                POSTS,
                json!({"id": "p2", "user": "alice", "created": "2025-01-02 10:00:00.000Z"}),
            )
            .unwrap();
        backend
            .insert(LIKES, json!({"id": "l1", "user": "bob", "post": "p1"}))
            .unwrap();
        backend
    }

    #[test]
    fn insert_fills_system_fields() {
        let backend = MemoryBackend::new();
        let record = backend.insert(USERS, json!({"username": "carol"})).unwrap();
        let id = record["id"].as_str().unwrap();
        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_eq!(record["collectionId"], "_pb_users_auth_");
        assert_eq!(record["collectionName"], "users");
        assert!(record["created"].is_string());
    }

    #[test]
    fn likes_are_unique_per_user_and_post() {
        let backend = seeded();
        let err = backend
            .insert(LIKES, json!({"user": "bob", "post": "p1"}))
            .unwrap_err();
        assert!(matches!(err, BackendError::Status { status: 400, .. }));
        backend
            .insert(LIKES, json!({"user": "bob", "post": "p2"}))
            .unwrap();
    }

    #[tokio::test]
    async fn list_filters_sorts_and_counts() {
        let backend = seeded();
        let query = ListQuery::new()
            .filter(Filter::eq("user", "alice"))
            .sort(Sort::desc("created"));
        let page = backend.list(POSTS, 1, 1, &query).await.unwrap();
        assert_eq!(page.total_items, 2);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items[0]["id"], "p2");
    }

    #[tokio::test]
    async fn skip_total_reports_minus_one() {
        let backend = seeded();
        let page = backend
            .list(POSTS, 1, 10, &ListQuery::new().skip_total())
            .await
            .unwrap();
        assert_eq!(page.total_items, -1);
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn filters_through_relations() {
        let backend = seeded();
        let query = ListQuery::new().filter(Filter::eq("post.user", "alice"));
        let page = backend.list(LIKES, 1, 10, &query).await.unwrap();
        assert_eq!(page.items.len(), 1);

        let query = ListQuery::new().filter(Filter::eq("post.user", "bob"));
        let page = backend.list(LIKES, 1, 10, &query).await.unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn expands_nested_relations() {
        let backend = seeded();
        let record = backend
            .get_one(LIKES, "l1", &["user".to_string(), "post.user".to_string()])
            .await
            .unwrap();
        assert_eq!(record["expand"]["user"]["username"], "bob");
        assert_eq!(record["expand"]["post"]["id"], "p1");
        assert_eq!(record["expand"]["post"]["expand"]["user"]["username"], "alice");
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let backend = seeded();
        let updated = backend
            .update(LIKES, "l1", json!({"read": true, "id": "other"}))
            .await
            .unwrap();
        assert_eq!(updated["read"], true);
        assert_eq!(updated["id"], "l1");
        assert_eq!(backend.record(LIKES, "l1").unwrap()["read"], true);
    }

    #[tokio::test]
    async fn failing_collection_errors() {
        let backend = seeded();
        backend.fail_collection(POSTS, 500);
        assert!(backend.list(POSTS, 1, 10, &ListQuery::new()).await.is_err());
        backend.restore_collection(POSTS);
        assert!(backend.list(POSTS, 1, 10, &ListQuery::new()).await.is_ok());
    }

    #[tokio::test]
    async fn session_resolves_user_id_tokens() {
        let backend = seeded();
        let session = backend.session(Some("alice")).await.unwrap();
        assert_eq!(session.viewer_id(), Some("alice"));
        let session = backend.session(Some("nobody")).await.unwrap();
        assert!(!session.is_authenticated());
        let session = backend.session(None).await.unwrap();
        assert!(!session.is_authenticated());
    }
}
