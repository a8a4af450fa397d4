//! Unit tests for the query completion watcher

#[cfg(test)]
mod tests {
    use crate::completion::ChatMessage;
    use crate::error::{ApiError, TargetError};
    use crate::query::{
        error_detail, watch_query_completion, MockEvent, MockQueryStore, NO_ERROR_DETAILS,
    };
    use crds::{QueryPhase, QueryResponse, QueryStatus};
    use serde_json::json;

    fn status(phase: QueryPhase, responses: &[(Option<&str>, &str)], message: Option<&str>) -> QueryStatus {
        QueryStatus {
            phase,
            responses: responses
                .iter()
                .map(|(target, content)| QueryResponse {
                    target: target.map(str::to_string),
                    content: (*content).to_string(),
                })
                .collect(),
            message: message.map(str::to_string),
            ..Default::default()
        }
    }

    fn pending() -> QueryStatus {
        status(QueryPhase::Pending, &[], None)
    }

    fn messages() -> Vec<ChatMessage> {
        vec![ChatMessage {
            role: "user".to_string(),
            content: Some(json!("what is the weather")),
        }]
    }

    async fn run(store: &MockQueryStore) -> Result<crate::completion::ChatCompletion, ApiError> {
        watch_query_completion(store, "default", "q-1", "agent/weather", &messages(), 30).await
    }

    #[tokio::test]
    async fn test_done_returns_first_response() {
        let store = MockQueryStore::with_statuses([
            pending(),
            status(
                QueryPhase::Done,
                &[(Some("agent-a"), "sunny today"), (Some("agent-b"), "rain")],
                None,
            ),
        ]);

        let completion = run(&store).await.unwrap();

        assert_eq!(completion.id, "q-1");
        assert_eq!(completion.model, "agent/weather");
        assert_eq!(completion.content(), Some("sunny today"));
        assert_eq!(completion.usage.prompt_tokens, 4);
        assert_eq!(completion.usage.completion_tokens, 2);
        assert_eq!(completion.usage.total_tokens, 6);
        let ark = completion.ark.unwrap();
        assert_eq!(ark.query_status.phase, QueryPhase::Done);
        assert_eq!(ark.query_status.responses.len(), 2);
        assert_eq!(store.open_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_subscription_uses_name_and_budget() {
        let store = MockQueryStore::with_statuses([status(QueryPhase::Done, &[(None, "ok")], None)]);
        run(&store).await.unwrap();
        assert_eq!(
            store.subscriptions(),
            vec![("default".to_string(), "q-1".to_string(), 30)]
        );
    }

    #[tokio::test]
    async fn test_done_without_responses_fails() {
        let store = MockQueryStore::with_statuses([status(QueryPhase::Done, &[], None)]);
        let err = run(&store).await.unwrap_err();
        assert!(matches!(err, ApiError::NoResponse));
        assert_eq!(err.to_string(), "No response received");
        assert_eq!(store.open_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_error_phase_single_target() {
        let store = MockQueryStore::with_statuses([
            pending(),
            status(QueryPhase::Error, &[(Some("agent-a"), "model unavailable")], Some("failed")),
        ]);

        let err = run(&store).await.unwrap_err();
        let ApiError::QueryFailed(detail) = err else {
            panic!("expected QueryFailed");
        };
        assert_eq!(detail.message, "model unavailable");
        assert!(detail.errors.is_empty());
        assert_eq!(store.open_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_error_phase_multiple_targets() {
        let store = MockQueryStore::with_statuses([status(
            QueryPhase::Error,
            &[(Some("agent-a"), "first failure"), (None, ""), (None, "second failure")],
            None,
        )]);

        let ApiError::QueryFailed(detail) = run(&store).await.unwrap_err() else {
            panic!("expected QueryFailed");
        };
        assert_eq!(detail.message, "first failure");
        assert_eq!(
            detail.errors,
            vec![
                TargetError {
                    target: "agent-a".to_string(),
                    message: "first failure".to_string()
                },
                TargetError {
                    target: "target-2".to_string(),
                    message: "second failure".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_pending_until_stream_ends_times_out() {
        let store = MockQueryStore::with_events([
            MockEvent::Status(None),
            MockEvent::Status(Some(pending())),
            MockEvent::Status(Some(status(QueryPhase::Unknown, &[], None))),
        ]);

        let err = run(&store).await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout { ref query, seconds: 30 } if query == "q-1"));
        assert_eq!(err.to_string(), "Query q-1 timed out after 30 seconds");
        assert_eq!(store.open_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_empty_stream_times_out() {
        let store = MockQueryStore::new();
        let err = run(&store).await.unwrap_err();
        assert!(matches!(err, ApiError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_watch_error_propagates() {
        let store = MockQueryStore::with_events([
            MockEvent::Status(Some(pending())),
            MockEvent::WatchError("connection reset".to_string()),
            MockEvent::Status(Some(status(QueryPhase::Done, &[(None, "late")], None))),
        ]);

        let err = run(&store).await.unwrap_err();
        assert!(matches!(err, ApiError::Watch(ref message) if message == "connection reset"));
        assert_eq!(store.open_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_events_after_terminal_phase_are_ignored() {
        let store = MockQueryStore::with_statuses([
            status(QueryPhase::Done, &[(None, "first")], None),
            status(QueryPhase::Error, &[(None, "later")], None),
        ]);
        let completion = run(&store).await.unwrap();
        assert_eq!(completion.content(), Some("first"));
    }

    #[tokio::test]
    async fn test_subscription_open_while_waiting_and_released_on_cancel() {
        let store = MockQueryStore::with_events([MockEvent::Status(Some(pending())), MockEvent::Stall]);

        let mut watch = Box::pin(run(&store));
        assert!(futures::poll!(&mut watch).is_pending());
        assert_eq!(store.subscriptions().len(), 1);
        assert_eq!(store.open_subscriptions(), 1);

        drop(watch);
        assert_eq!(store.open_subscriptions(), 0);
    }

    #[tokio::test]
    async fn test_completion_carries_raw_status() {
        let mut done = status(QueryPhase::Done, &[(Some("agent-a"), "ok")], None);
        done.extra.insert("tokenUsage".to_string(), json!({ "totalTokens": 7 }));
        let store = MockQueryStore::with_statuses([done]);

        let completion = run(&store).await.unwrap();

        let value = serde_json::to_value(&completion).unwrap();
        assert_eq!(value["ark"]["queryStatus"]["tokenUsage"], json!({ "totalTokens": 7 }));
        assert_eq!(value["ark"]["queryStatus"]["responses"][0]["target"], "agent-a");
    }

    #[test]
    fn test_error_detail_falls_back_to_status_message() {
        let detail = error_detail(&status(QueryPhase::Error, &[(Some("a"), "")], Some("agent crashed")));
        assert_eq!(detail.message, "agent crashed");
        assert!(detail.errors.is_empty());
    }

    #[test]
    fn test_error_detail_generic_fallback() {
        let detail = error_detail(&status(QueryPhase::Error, &[], None));
        assert_eq!(detail.message, NO_ERROR_DETAILS);
        assert!(detail.errors.is_empty());

        let detail = error_detail(&status(QueryPhase::Error, &[], Some("")));
        assert_eq!(detail.message, NO_ERROR_DETAILS);
    }
}
