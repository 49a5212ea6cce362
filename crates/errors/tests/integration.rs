//! Integration tests for error types

#[cfg(test)]
mod tests {
    use liftoff_errors::*;

    #[test]
    fn test_error_conversion() {
        let net_err = NetworkError::Timeout {
            url: "https://example.com".into(),
            seconds: 30,
        };
        let err: Error = net_err.into();
        assert!(matches!(err, Error::Network(_)));
        assert!(err.as_network().is_some());
    }

    #[test]
    fn test_error_display() {
        let err = StorageError::DirectoryCreateFailed {
            path: "/tmp/out".into(),
            message: "permission denied".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to create directory /tmp/out: permission denied"
        );
    }

    #[test]
    fn test_all_attempts_failed_keeps_last_cause() {
        let err = NetworkError::AllAttemptsFailed {
            url: "https://example.test/file.bin".into(),
            attempts: 3,
            last: Box::new(NetworkError::HttpError {
                status: 404,
                message: "404 Not Found".into(),
            }),
        };
        assert!(err.to_string().contains("HTTP error 404"));
        assert!(matches!(
            err.root_cause(),
            NetworkError::HttpError { status: 404, .. }
        ));
    }

    #[test]
    fn test_retry_classification() {
        assert!(NetworkError::ConnectionFailed("dns".into()).is_retryable());
        assert!(NetworkError::ReadFailed("eof".into()).is_retryable());
        assert!(!NetworkError::invalid_url("ftp://x", "only HTTPS URLs are allowed").is_retryable());
        assert!(!NetworkError::UntrustedHost {
            host: "evil.example".into()
        }
        .is_retryable());
        assert!(!NetworkError::ChecksumMismatch {
            expected: "deadbeef".into(),
            actual: "abcd".into()
        }
        .is_retryable());

        let storage: Error = StorageError::TempWriteFailed {
            path: "/tmp".into(),
            message: "disk full".into(),
        }
        .into();
        assert!(!storage.is_retryable());
        assert_eq!(storage.user_code(), Some("storage.temp_write_failed"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let storage_err =
            StorageError::from_io_with_path(&io_err, std::path::Path::new("/tmp/out"));
        assert!(matches!(storage_err, StorageError::PermissionDenied { .. }));

        let plain: StorageError = io_err.into();
        assert!(matches!(plain, StorageError::IoError { .. }));
    }

    #[test]
    fn test_git_multiple_lists_every_failure() {
        let err = GitError::Multiple {
            failures: vec!["a failed".into(), "b failed".into()],
        };
        let text = err.to_string();
        assert!(text.contains("a failed"));
        assert!(text.contains("b failed"));
    }
}
