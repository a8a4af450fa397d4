//! OpenAPI document for the ARK API.
//!
//! The base document is generated from the route annotations; security
//! declarations are added per auth mode when the document is served or
//! written to disk.

pub mod security;

use axum::extract::State;
use axum::Json;
use serde_json::Value;
use std::collections::BTreeSet;
use utoipa::OpenApi;

pub use security::add_security_to_openapi;

use crate::auth::AuthMode;
use crate::completion::{
    AssistantMessage, ChatCompletion, ChatCompletionRequest, ChatMessage, Choice, Usage,
};
use crate::error::{ApiError, ErrorDetail, TargetError};
use crate::routes::AppState;

/// Route and schema listing for the generated document.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "ARK API",
        description = "OpenAI-compatible access to agents, teams, models and tools running on ARK."
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::health::readiness_check,
        crate::routes::openai::chat_completions
    ),
    components(schemas(
        ChatCompletionRequest,
        ChatMessage,
        ChatCompletion,
        Choice,
        AssistantMessage,
        Usage,
        ErrorDetail,
        TargetError
    )),
    tags(
        (name = "health", description = "Service probes"),
        (name = "openai", description = "OpenAI-compatible endpoints")
    )
)]
pub struct ApiDoc;

/// Renders the OpenAPI document with security for `auth_mode`.
pub fn render(auth_mode: AuthMode, public_routes: &BTreeSet<String>) -> Result<Value, ApiError> {
    let schema = serde_json::to_value(ApiDoc::openapi())?;
    Ok(add_security_to_openapi(schema, auth_mode, public_routes))
}

/// Serves the OpenAPI document for the running configuration.
pub async fn openapi_json(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    render(state.config.auth_mode, &state.config.public_routes).map(Json)
}
