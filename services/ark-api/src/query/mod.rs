//! Query execution: creating queries and waiting for their outcome.

pub mod kube_store;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod source;
pub mod watch;
#[cfg(test)]
mod watch_test;

pub use kube_store::KubeQueryStore;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockEvent, MockQueryStore};
pub use source::{QueryEvents, QueryEventSource, QueryStore};
pub use watch::{error_detail, watch_query_completion, NO_ERROR_DETAILS};
