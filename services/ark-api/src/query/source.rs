//! Query storage and change-subscription traits.
//!
//! The watcher only depends on [`QueryEventSource`]; handlers also need to
//! create queries and use [`QueryStore`]. Both are object-safe so the router
//! can hold an `Arc<dyn QueryStore>` and tests can swap in a mock.

use crds::Query;
use futures::stream::BoxStream;
use futures::StreamExt;
use std::fmt;
use tracing::debug;

use crate::error::ApiError;

/// Snapshots of a single query, in arrival order.
///
/// Owning this value keeps the subscription open; dropping it closes the
/// underlying stream, whichever way the consumer exits.
pub struct QueryEvents {
    query_name: String,
    stream: BoxStream<'static, Result<Query, ApiError>>,
}

impl QueryEvents {
    /// Wraps a stream of snapshots for `query_name`.
    pub fn new(
        query_name: impl Into<String>,
        stream: BoxStream<'static, Result<Query, ApiError>>,
    ) -> Self {
        Self {
            query_name: query_name.into(),
            stream,
        }
    }

    /// Waits for the next snapshot. `None` means the subscription ended.
    pub async fn next(&mut self) -> Option<Result<Query, ApiError>> {
        self.stream.next().await
    }
}

impl fmt::Debug for QueryEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryEvents")
            .field("query_name", &self.query_name)
            .finish_non_exhaustive()
    }
}

impl Drop for QueryEvents {
    fn drop(&mut self) {
        debug!("Closing watch for query {}", self.query_name);
    }
}

/// Subscribes to changes of a named query.
#[async_trait::async_trait]
pub trait QueryEventSource: Send + Sync {
    /// Opens a subscription for `name` in `namespace`.
    ///
    /// The returned stream must end once `timeout_seconds` have elapsed.
    async fn subscribe(
        &self,
        namespace: &str,
        name: &str,
        timeout_seconds: u64,
    ) -> Result<QueryEvents, ApiError>;
}

/// Creates queries and watches them.
#[async_trait::async_trait]
pub trait QueryStore: QueryEventSource {
    /// Creates `query` in `namespace` and returns the stored object.
    async fn create(&self, namespace: &str, query: &Query) -> Result<Query, ApiError>;
}
