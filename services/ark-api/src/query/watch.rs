//! Waiting for a query to reach a terminal phase.

use crds::{QueryPhase, QueryStatus};
use tracing::{debug, info, warn};

use super::source::QueryEventSource;
use crate::completion::{ChatCompletion, ChatMessage};
use crate::error::{ApiError, ErrorDetail, TargetError};

/// Primary message when a failed query carries no error text at all.
pub const NO_ERROR_DETAILS: &str = "Query execution failed: No error details available";

/// Watches `query_name` until it is `done` or `error`, or the source's
/// deadline passes.
///
/// On `done` the first response becomes the completion text. On `error`
/// the status is condensed into an [`ErrorDetail`]. Any other phase keeps
/// waiting. The subscription is dropped before this function returns.
pub async fn watch_query_completion<S>(
    source: &S,
    namespace: &str,
    query_name: &str,
    model: &str,
    messages: &[ChatMessage],
    timeout_seconds: u64,
) -> Result<ChatCompletion, ApiError>
where
    S: QueryEventSource + ?Sized,
{
    let mut events = source.subscribe(namespace, query_name, timeout_seconds).await?;

    while let Some(event) = events.next().await {
        let status = event?.status.unwrap_or_default();

        match status.phase {
            QueryPhase::Done => {
                let Some(first) = status.responses.first() else {
                    warn!("Query {} finished without responses", query_name);
                    return Err(ApiError::NoResponse);
                };
                let content = first.content.clone();
                info!("Query {} completed", query_name);
                return Ok(ChatCompletion::from_query(
                    query_name, model, content, messages, status,
                ));
            }
            QueryPhase::Error => {
                let detail = error_detail(&status);
                warn!("Query {} failed: {}", query_name, detail.message);
                return Err(ApiError::QueryFailed(detail));
            }
            phase @ (QueryPhase::Pending | QueryPhase::Unknown) => {
                debug!("Query {} still waiting (phase {:?})", query_name, phase);
            }
        }
    }

    warn!("Query {} timed out after {}s", query_name, timeout_seconds);
    Err(ApiError::Timeout {
        query: query_name.to_string(),
        seconds: timeout_seconds,
    })
}

/// Condenses an `error`-phase status into an [`ErrorDetail`].
///
/// The first target error becomes the headline; the full list is only
/// reported when several targets failed.
pub fn error_detail(status: &QueryStatus) -> ErrorDetail {
    let target_errors: Vec<TargetError> = status
        .responses
        .iter()
        .enumerate()
        .filter(|(_, response)| !response.content.is_empty())
        .map(|(index, response)| TargetError {
            target: response
                .target
                .clone()
                .unwrap_or_else(|| format!("target-{index}")),
            message: response.content.clone(),
        })
        .collect();

    let message = match (target_errors.first(), status.message.as_deref()) {
        (Some(first), _) => first.message.clone(),
        (None, Some(message)) if !message.is_empty() => message.to_string(),
        (None, _) => NO_ERROR_DETAILS.to_string(),
    };

    ErrorDetail {
        message,
        errors: if target_errors.len() > 1 { target_errors } else { Vec::new() },
    }
}
