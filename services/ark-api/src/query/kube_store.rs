//! Kubernetes-backed query store.

use crds::Query;
use futures::{StreamExt, TryStreamExt};
use kube::api::PostParams;
use kube::{Api, Client};
use kube_runtime::watcher;
use std::time::Duration;
use tracing::{debug, info};

use super::source::{QueryEvents, QueryEventSource, QueryStore};
use crate::error::ApiError;

/// Creates and watches `Query` resources through the Kubernetes API.
#[derive(Clone)]
pub struct KubeQueryStore {
    client: Client,
}

impl std::fmt::Debug for KubeQueryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeQueryStore").finish_non_exhaustive()
    }
}

impl KubeQueryStore {
    /// Creates a store using `client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a store from the in-cluster or kubeconfig environment.
    pub async fn try_default() -> Result<Self, ApiError> {
        let client = Client::try_default().await?;
        Ok(Self::new(client))
    }

    fn api(&self, namespace: &str) -> Api<Query> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait::async_trait]
impl QueryEventSource for KubeQueryStore {
    async fn subscribe(
        &self,
        namespace: &str,
        name: &str,
        timeout_seconds: u64,
    ) -> Result<QueryEvents, ApiError> {
        debug!("Watching query {}/{} for {}s", namespace, name, timeout_seconds);

        let config = watcher::Config::default().fields(&format!("metadata.name={name}"));
        // The watcher relists on start, so a query that already finished is
        // still reported. The deadline ends the stream, which the caller
        // reads as a timeout.
        let deadline = tokio::time::sleep(Duration::from_secs(timeout_seconds));
        let stream = watcher(self.api(namespace), config)
            .map_err(|e| ApiError::Watch(format!("Watcher stream error: {e}")))
            .try_filter_map(|event| async move {
                Ok::<_, ApiError>(match event {
                    watcher::Event::Apply(query)
                    | watcher::Event::InitApply(query)
                    | watcher::Event::Delete(query) => Some(query),
                    watcher::Event::Init | watcher::Event::InitDone => None,
                })
            })
            .take_until(deadline)
            .boxed();

        Ok(QueryEvents::new(name, stream))
    }
}

#[async_trait::async_trait]
impl QueryStore for KubeQueryStore {
    async fn create(&self, namespace: &str, query: &Query) -> Result<Query, ApiError> {
        let created = self.api(namespace).create(&PostParams::default(), query).await?;
        info!(
            "Created query {}/{}",
            namespace,
            created.metadata.name.as_deref().unwrap_or("<unknown>")
        );
        Ok(created)
    }
}
