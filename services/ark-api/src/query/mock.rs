//! Mock query store for unit testing
//!
//! Replays scripted status snapshots for any subscribed query and records
//! created queries, so handlers and the watcher can be exercised without a
//! cluster.

use crds::{Query, QueryStatus};
use futures::stream::{self, BoxStream, StreamExt};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::source::{QueryEvents, QueryEventSource, QueryStore};
use crate::error::ApiError;

/// One scripted item on the mock change stream.
#[derive(Debug, Clone)]
pub enum MockEvent {
    /// Snapshot with the given status (`None` = no status yet)
    Status(Option<QueryStatus>),
    /// Stream-level failure
    WatchError(String),
    /// No further items; the stream stays open until dropped
    Stall,
}

/// In-memory [`QueryStore`] for tests.
#[derive(Debug, Clone, Default)]
pub struct MockQueryStore {
    events: Arc<Mutex<Vec<MockEvent>>>,
    created: Arc<Mutex<Vec<Query>>>,
    subscriptions: Arc<Mutex<Vec<(String, String, u64)>>>,
    open: Arc<AtomicUsize>,
}

/// Tracks how many subscriptions are still alive.
struct OpenGuard(Arc<AtomicUsize>);

impl OpenGuard {
    fn new(open: &Arc<AtomicUsize>) -> Self {
        open.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(open))
    }
}

impl Drop for OpenGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MockQueryStore {
    /// Creates a store whose subscriptions end immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that replays `statuses` on every subscription.
    pub fn with_statuses(statuses: impl IntoIterator<Item = QueryStatus>) -> Self {
        Self::with_events(statuses.into_iter().map(|status| MockEvent::Status(Some(status))))
    }

    /// Creates a store that replays `events` on every subscription.
    pub fn with_events(events: impl IntoIterator<Item = MockEvent>) -> Self {
        let store = Self::default();
        *lock(&store.events) = events.into_iter().collect();
        store
    }

    /// Queries created so far.
    pub fn created(&self) -> Vec<Query> {
        lock(&self.created).clone()
    }

    /// `(namespace, name, timeout_seconds)` for every subscription opened.
    pub fn subscriptions(&self) -> Vec<(String, String, u64)> {
        lock(&self.subscriptions).clone()
    }

    /// Number of subscriptions that have not been released.
    pub fn open_subscriptions(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn snapshot(namespace: &str, name: &str, status: Option<QueryStatus>) -> Query {
    Query {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: crds::QuerySpec {
            input_type: crds::QueryInputType::User,
            input: serde_json::Value::Null,
            targets: Vec::new(),
            timeout: None,
        },
        status,
    }
}

#[async_trait::async_trait]
impl QueryEventSource for MockQueryStore {
    async fn subscribe(
        &self,
        namespace: &str,
        name: &str,
        timeout_seconds: u64,
    ) -> Result<QueryEvents, ApiError> {
        lock(&self.subscriptions).push((namespace.to_string(), name.to_string(), timeout_seconds));

        let events = lock(&self.events).clone();
        let stalls = events.iter().any(|event| matches!(event, MockEvent::Stall));
        let items: Vec<Result<Query, ApiError>> = events
            .into_iter()
            .take_while(|event| !matches!(event, MockEvent::Stall))
            .filter_map(|event| match event {
                MockEvent::Status(status) => Some(Ok(snapshot(namespace, name, status))),
                MockEvent::WatchError(message) => Some(Err(ApiError::Watch(message))),
                MockEvent::Stall => None,
            })
            .collect();
        let tail: BoxStream<'static, Result<Query, ApiError>> = if stalls {
            stream::pending().boxed()
        } else {
            stream::empty().boxed()
        };

        let guard = OpenGuard::new(&self.open);
        let stream = stream::iter(items)
            .chain(tail)
            .inspect(move |_| {
                let _ = &guard;
            })
            .boxed();
        Ok(QueryEvents::new(name, stream))
    }
}

#[async_trait::async_trait]
impl QueryStore for MockQueryStore {
    async fn create(&self, namespace: &str, query: &Query) -> Result<Query, ApiError> {
        let mut stored = query.clone();
        stored.metadata.namespace = Some(namespace.to_string());
        lock(&self.created).push(stored.clone());
        Ok(stored)
    }
}
