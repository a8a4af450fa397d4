//! HTTP routes for the ARK API.

pub mod health;
pub mod openai;

use axum::routing::{get, post};
use axum::Router;
use std::fmt;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::openapi;
use crate::query::QueryStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration
    pub config: Arc<Config>,
    /// Where queries are created and watched
    pub store: Arc<dyn QueryStore>,
}

impl AppState {
    /// Creates state from a configuration and a query store.
    pub fn new(config: Config, store: Arc<dyn QueryStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Build the HTTP router for the ARK API.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/openapi.json", get(openapi::openapi_json))
        .route("/openai/v1/chat/completions", post(openai::chat_completions))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
