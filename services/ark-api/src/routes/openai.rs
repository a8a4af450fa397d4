//! OpenAI-compatible chat completions backed by ARK queries.
//!
//! Each request becomes a `Query` resource targeting the agent, team, model
//! or tool named in `model`. The handler then waits for the query to finish
//! and answers with a regular chat completion.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use crds::{Query, QueryInputType, QuerySpec, QueryTarget, TargetType};
use tracing::info;
use uuid::Uuid;

use super::AppState;
use crate::completion::{ChatCompletion, ChatCompletionRequest};
use crate::duration::parse_duration_to_seconds;
use crate::error::ApiError;
use crate::query::watch_query_completion;

/// Create a chat completion.
#[utoipa::path(
    post,
    path = "/openai/v1/chat/completions",
    tag = "openai",
    request_body = ChatCompletionRequest,
    responses(
        (status = 200, description = "Query completed", body = ChatCompletion),
        (status = 400, description = "Invalid model, messages or timeout"),
        (status = 500, description = "Query failed or returned no response"),
        (status = 504, description = "Query did not finish in time")
    )
)]
pub async fn chat_completions(
    State(state): State<AppState>,
    request: Result<Json<ChatCompletionRequest>, JsonRejection>,
) -> Result<Json<ChatCompletion>, ApiError> {
    let Json(request) = request?;
    if request.stream {
        return Err(ApiError::InvalidRequest(
            "streaming responses are not supported".to_string(),
        ));
    }
    if request.messages.is_empty() {
        return Err(ApiError::InvalidRequest("messages must not be empty".to_string()));
    }

    let target = parse_target(&request.model)?;
    let timeout_seconds = parse_duration_to_seconds(request.timeout.as_deref())?
        .unwrap_or(state.config.query_timeout_seconds);
    if timeout_seconds == 0 {
        return Err(ApiError::InvalidRequest("timeout must be positive".to_string()));
    }

    let query_name = query_name();
    let query = Query::new(
        &query_name,
        QuerySpec {
            input_type: QueryInputType::Messages,
            input: serde_json::to_value(&request.messages)?,
            targets: vec![target],
            timeout: Some(format!("{timeout_seconds}s")),
        },
    );

    let namespace = state.config.namespace.as_str();
    info!(
        "Submitting query {}/{} for {} ({}s budget)",
        namespace, query_name, request.model, timeout_seconds
    );
    state.store.create(namespace, &query).await?;

    let completion = watch_query_completion(
        &*state.store,
        namespace,
        &query_name,
        &request.model,
        &request.messages,
        timeout_seconds,
    )
    .await?;

    Ok(Json(completion))
}

/// Parses a `<type>/<name>` model identifier into a query target.
pub fn parse_target(model: &str) -> Result<QueryTarget, ApiError> {
    let invalid = || {
        ApiError::InvalidRequest(format!(
            "model must be '<type>/<name>' with type agent, team, model or tool, got '{model}'"
        ))
    };
    let (kind, name) = model.split_once('/').ok_or_else(invalid)?;
    let target_type = TargetType::parse(kind).ok_or_else(invalid)?;
    if name.is_empty() || name.contains('/') {
        return Err(invalid());
    }
    Ok(QueryTarget {
        target_type,
        name: name.to_string(),
    })
}

fn query_name() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("openai-query-{}", &id[..8])
}
