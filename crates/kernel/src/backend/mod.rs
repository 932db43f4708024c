//! Backend query client.
//!
//! All collection access goes through the [`RecordStore`] trait. Two
//! implementations exist:
//! - [`PocketBaseClient`]: REST client for a PocketBase server
//! - [`MemoryBackend`]: in-process collections for tests and demos
//!
//! A [`Backend`] turns a bearer token into a [`Session`]: the signed-in user
//! (if any) plus a store that sends requests on that user's behalf.

mod collection;
mod error;
pub mod filter;
pub mod memory;
pub mod pocketbase;
mod query;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

pub use collection::{Collection, FULL_LIST_BATCH};
pub use error::{BackendError, BackendResult};
pub use filter::{Filter, FilterOperator, FilterValue, Sort, SortDirection};
pub use memory::MemoryBackend;
pub use pocketbase::PocketBaseClient;
pub use query::{ListPage, ListQuery};

use crate::models::User;

/// Record access for one authenticated (or anonymous) client.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List one page of records from a collection.
    async fn list(
        &self,
        collection: &str,
        page: u32,
        per_page: u32,
        query: &ListQuery,
    ) -> BackendResult<ListPage<Value>>;

    /// Fetch a single record by id.
    async fn get_one(&self, collection: &str, id: &str, expand: &[String]) -> BackendResult<Value>;

    /// Patch fields of a record and return the updated record.
    async fn update(&self, collection: &str, id: &str, body: Value) -> BackendResult<Value>;

    /// Public URL of a file attached to a record.
    fn file_url(
        &self,
        collection_id: &str,
        record_id: &str,
        filename: &str,
        thumb: Option<&str>,
    ) -> String;
}

/// Source of sessions.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Resolve a bearer token. A missing or rejected token yields an
    /// anonymous session rather than an error.
    async fn session(&self, token: Option<&str>) -> BackendResult<Session>;

    /// Whether the backend answers its health check.
    async fn healthy(&self) -> bool;

    /// Backend kind, for logs.
    fn kind(&self) -> &'static str;
}

/// The viewer and the store that acts for them.
#[derive(Clone)]
pub struct Session {
    viewer: Option<User>,
    store: Arc<dyn RecordStore>,
}

impl Session {
    pub fn new(viewer: Option<User>, store: Arc<dyn RecordStore>) -> Self {
        Self { viewer, store }
    }

    pub fn anonymous(store: Arc<dyn RecordStore>) -> Self {
        Self::new(None, store)
    }

    /// The signed-in user, if any.
    pub fn viewer(&self) -> Option<&User> {
        self.viewer.as_ref()
    }

    pub fn viewer_id(&self) -> Option<&str> {
        self.viewer.as_ref().map(|u| u.id.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.viewer.is_some()
    }

    pub fn store(&self) -> &dyn RecordStore {
        self.store.as_ref()
    }

    /// Typed handle to a collection.
    pub fn collection<'a>(&'a self, name: &'a str) -> Collection<'a> {
        Collection::new(self.store.as_ref(), name)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("viewer", &self.viewer_id())
            .finish_non_exhaustive()
    }
}
