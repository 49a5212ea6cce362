//! Integration tests for ops crate

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use bytes::Bytes;
    use liftoff_config::{Config, DownloadFile, DownloadsConfig, Repository};
    use liftoff_errors::{Error, GitError, NetworkError};
    use liftoff_events::{channel, AppEvent, EventReceiver, GitEvent};
    use liftoff_net::{CancellationToken, Downloader, HostPolicy, RetryPolicy, Transport};
    use liftoff_ops::*;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;
    use url::Url;

    /// Records every invocation; `git clone` creates the target directory
    #[derive(Default)]
    struct RecordingGit {
        calls: Mutex<Vec<Vec<String>>>,
        fail_urls: Vec<String>,
    }

    impl RecordingGit {
        fn failing(urls: &[&str]) -> Self {
            Self {
                calls: Mutex::default(),
                fail_urls: urls.iter().map(|u| (*u).to_string()).collect(),
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GitRunner for RecordingGit {
        async fn run(&self, args: &[String]) -> Result<GitOutput, Error> {
            self.calls.lock().unwrap().push(args.to_vec());

            if args[0] == "clone" {
                let url = &args[args.len() - 2];
                if self.fail_urls.contains(url) {
                    return Ok(GitOutput {
                        success: false,
                        output: "fatal: repository not found".into(),
                    });
                }
                let target = Path::new(&args[args.len() - 1]);
                std::fs::create_dir_all(target.join(".git")).unwrap();
            }
            Ok(GitOutput {
                success: true,
                output: String::new(),
            })
        }
    }

    /// Serves `ABCD` for every URL and counts calls
    #[derive(Default)]
    struct StaticTransport {
        calls: AtomicU32,
    }

    #[async_trait]
    impl Transport for StaticTransport {
        async fn fetch(&self, _: &Url, _: &CancellationToken) -> Result<Bytes, NetworkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Bytes::from_static(b"ABCD"))
        }
    }

    struct Fixture {
        ctx: OpsCtx,
        git: Arc<RecordingGit>,
        transport: Arc<StaticTransport>,
        rx: EventReceiver,
        failed_dir: PathBuf,
    }

    fn fixture(root: &Path, git: RecordingGit) -> Fixture {
        let (tx, rx) = channel();
        let git = Arc::new(git);
        let transport = Arc::new(StaticTransport::default());
        let failed_dir = root.join("failed");

        let ctx = OpsContextBuilder::new()
            .with_downloader(Downloader::new(transport.clone(), RetryPolicy::default()))
            .with_git_runner(git.clone())
            .with_failed_dir(&failed_dir)
            .with_event_sender(tx)
            .build()
            .unwrap();

        Fixture {
            ctx,
            git,
            transport,
            rx,
            failed_dir,
        }
    }

    fn repo(url: &str, path: PathBuf) -> Repository {
        Repository {
            url: url.to_string(),
            path,
            branch: None,
            depth: None,
            submodule_init: false,
        }
    }

    fn git_events(rx: &mut EventReceiver) -> Vec<GitEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let AppEvent::Git(event) = event {
                events.push(event);
            }
        }
        events
    }

    #[tokio::test]
    async fn test_untrusted_host_spawns_nothing() {
        let temp = tempdir().unwrap();
        let f = fixture(temp.path(), RecordingGit::default());

        let err = clone(&f.ctx, &repo("https://evil.example/org/repo", temp.path().join("r")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Network(NetworkError::UntrustedHost { .. })
        ));

        let err = clone(&f.ctx, &repo("http://github.com/org/repo", temp.path().join("r")))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Network(NetworkError::InvalidUrl { .. })
        ));

        assert!(f.git.calls().is_empty());
    }

    #[tokio::test]
    async fn test_clone_with_submodules() {
        let temp = tempdir().unwrap();
        let mut f = fixture(temp.path(), RecordingGit::default());
        let target = temp.path().join("src/repo");
        let repo = Repository {
            branch: Some("main".into()),
            depth: Some(1),
            submodule_init: true,
            ..repo("https://github.com/org/repo", target.clone())
        };

        let report = clone(&f.ctx, &repo).await.unwrap();

        assert_eq!(report.path, target);
        assert!(report.redirected_from.is_none());

        let calls = f.git.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], clone_args(&repo, &target));
        assert_eq!(calls[1], submodule_args(&target));

        let events = git_events(&mut f.rx);
        assert!(matches!(events[0], GitEvent::CloneStarted { .. }));
        assert!(matches!(events[1], GitEvent::SubmodulesInitializing { .. }));
        assert!(matches!(events[2], GitEvent::CloneCompleted { .. }));
    }

    #[tokio::test]
    async fn test_occupied_target_is_redirected() {
        let temp = tempdir().unwrap();
        let mut f = fixture(temp.path(), RecordingGit::default());
        let target = temp.path().join("repo");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("notes.md"), b"mine").unwrap();

        let report = clone(&f.ctx, &repo("https://gitlab.com/org/repo", target.clone()))
            .await
            .unwrap();

        assert_eq!(report.redirected_from.as_deref(), Some(target.as_path()));
        assert!(report.path.starts_with(&f.failed_dir));
        let name = report.path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("repo_"));

        // Original content untouched
        assert_eq!(std::fs::read(target.join("notes.md")).unwrap(), b"mine");

        let note = std::fs::read_to_string(f.failed_dir.join(format!("{name}.txt"))).unwrap();
        assert!(note.contains(&format!("Original Path: {}", target.display())));
        assert!(note.contains("URL: https://gitlab.com/org/repo"));
        assert!(note.contains("Reason: Original directory not empty"));

        assert!(git_events(&mut f.rx)
            .iter()
            .any(|e| matches!(e, GitEvent::CloneRedirected { .. })));
    }

    #[tokio::test]
    async fn test_clone_all_aggregates_failures() {
        let temp = tempdir().unwrap();
        let f = fixture(
            temp.path(),
            RecordingGit::failing(&["https://github.com/org/missing"]),
        );
        let repos = vec![
            repo("https://github.com/org/ok", temp.path().join("ok")),
            repo("https://github.com/org/missing", temp.path().join("missing")),
            repo("https://evil.example/org/x", temp.path().join("x")),
        ];

        let err = clone_all(&f.ctx, &repos).await.unwrap_err();

        match err {
            Error::Git(GitError::Multiple { failures }) => {
                assert_eq!(failures.len(), 2);
                assert!(failures[0].contains("org/missing"));
                assert!(failures[0].contains("repository not found"));
                assert!(failures[1].contains("evil.example"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(f.git.calls().len(), 2);
        assert!(temp.path().join("ok/.git").exists());
    }

    #[tokio::test]
    async fn test_download_all_reports_totals() {
        let temp = tempdir().unwrap();
        let f = fixture(temp.path(), RecordingGit::default());
        let downloads = DownloadsConfig {
            files: vec![
                DownloadFile {
                    url: "https://example.com/a.bin".into(),
                    dest: temp.path().join("a.bin"),
                    sha256: Some(
                        "e12e115acf4552b2568b55e93cbd39394c4ef81c82447fafc997882a02d23677".into(),
                    ),
                    rename: None,
                },
                DownloadFile {
                    url: "https://example.com/b.bin".into(),
                    dest: temp.path().join("b.bin"),
                    sha256: None,
                    rename: Some("b-1.0.bin".into()),
                },
            ],
        };

        let report = download_all(&f.ctx, &downloads).await.unwrap();

        assert_eq!(report.files.len(), 2);
        assert_eq!(report.total_bytes, 8);
        assert!(report.files[0].verified);
        assert!(!report.files[1].verified);
        assert_eq!(report.files[1].path, temp.path().join("b-1.0.bin"));
        assert_eq!(f.transport.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_download_all_stops_at_first_failure() {
        let temp = tempdir().unwrap();
        let f = fixture(temp.path(), RecordingGit::default());
        let file = |name: &str, sha256: Option<&str>| DownloadFile {
            url: format!("https://example.com/{name}"),
            dest: temp.path().join(name),
            sha256: sha256.map(str::to_string),
            rename: None,
        };
        let downloads = DownloadsConfig {
            files: vec![
                file("a.bin", None),
                file("b.bin", Some("deadbeef")),
                file("c.bin", None),
            ],
        };

        let err = download_all(&f.ctx, &downloads).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Network(NetworkError::ChecksumMismatch { .. })
        ));
        assert_eq!(f.transport.calls.load(Ordering::SeqCst), 2);
        assert!(temp.path().join("a.bin").exists());
        assert!(!temp.path().join("b.bin").exists());
        assert!(!temp.path().join("c.bin").exists());
    }

    #[test]
    fn test_request_for_ignores_blank_options() {
        let request = request_for(&DownloadFile {
            url: "https://example.com/a".into(),
            dest: PathBuf::from("/tmp/a"),
            sha256: Some("  ".into()),
            rename: Some(String::new()),
        });
        assert!(request.sha256.is_none());
        assert!(request.rename.is_none());
    }

    #[test]
    fn test_builder_applies_manifest_hosts() {
        let mut config = Config::default();
        config.git.trusted_hosts = vec!["git.example.org".into()];

        let ctx = OpsContextBuilder::new()
            .with_downloader(Downloader::new(
                Arc::new(StaticTransport::default()),
                RetryPolicy::default(),
            ))
            .with_config(&config)
            .build()
            .unwrap();
        assert!(ctx.hosts.contains("git.example.org"));
        assert!(ctx.hosts.contains("github.com"));

        config.git.replace_default_hosts = true;
        let ctx = OpsContextBuilder::new()
            .with_downloader(Downloader::new(
                Arc::new(StaticTransport::default()),
                RetryPolicy::default(),
            ))
            .with_config(&config)
            .build()
            .unwrap();
        assert_eq!(ctx.hosts, HostPolicy::new(["git.example.org"]));
    }

    #[test]
    fn test_operation_result_json() {
        let result = OperationResult::Clones(vec![CloneReport {
            url: "https://github.com/org/repo".into(),
            path: PathBuf::from("/src/repo"),
            redirected_from: None,
        }]);
        let json: serde_json::Value = serde_json::from_str(&result.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "clones");
        assert_eq!(json["data"][0]["path"], "/src/repo");
        assert!(json["data"][0].get("redirected_from").is_none());
    }
}
