//! Integration tests for events

#[cfg(test)]
mod tests {
    use liftoff_errors::NetworkError;
    use liftoff_events::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_event_emitter() {
        let (tx, mut rx) = channel();

        tx.emit_error("test error");
        tx.emit_debug("test debug");

        let event1 = rx.recv().await.unwrap();
        assert!(matches!(
            event1,
            AppEvent::General(GeneralEvent::Error { .. })
        ));

        let event2 = rx.recv().await.unwrap();
        assert!(matches!(
            event2,
            AppEvent::General(GeneralEvent::DebugLog { .. })
        ));
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    #[test]
    fn test_optional_sender_is_silent() {
        let none: Option<EventSender> = None;
        none.emit_warning("nobody listens");
    }

    #[test]
    fn test_failure_context_from_error() {
        let err = NetworkError::HttpError {
            status: 404,
            message: "404 Not Found".into(),
        };
        let ctx = FailureContext::from_error(&err);
        assert_eq!(ctx.code.as_deref(), Some("network.bad_status"));
        assert!(ctx.retryable);
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::Download(DownloadEvent::Completed {
            url: "https://example.test/file.bin".into(),
            path: "/tmp/out/file.bin".into(),
            size: 4,
            attempts: 1,
            total_time: Duration::from_millis(5),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""domain":"download""#));
        assert!(json.contains(r#""type":"Completed""#));
        assert!(!event.is_warning_or_error());
    }
}
