use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use mockito::{Matcher, Server};
use scanner::analysis::{BatchStatus, ScanResult, Submission};
use scanner::history::SCAN_HISTORY_KEY;
use scanner::inference::{EngineStatus, InferenceClient};
use scanner::notify::{MAX_NOTIFICATIONS, NotificationKind};
use scanner::storage::{FileStore, KeyValueStore, MemoryStore, StoreError};
use scanner::{Config, Scanner};
use url::Url;

fn config_for(server: &Server, data_dir: PathBuf) -> Config {
    Config {
        api_url: Url::parse(&server.url()).unwrap(),
        request_timeout: Duration::from_secs(5),
        data_dir,
        notification_ttl: Duration::from_millis(5000),
    }
}

fn scanner_with(config: Config, store: Arc<dyn KeyValueStore>) -> Scanner {
    let client = InferenceClient::new(config.api_url.clone(), config.request_timeout).unwrap();
    Scanner::new(config, Arc::new(client), store).unwrap()
}

fn write_media(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, format!("pixels of {}", name)).unwrap();
    path
}

async fn mock_verdict(server: &mut Server, file_name: &str, body: &str) -> mockito::Mock {
    server
        .mock("POST", "/predict")
        .match_body(Matcher::Regex(format!(r#"filename="{}""#, regex_escape(file_name))))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

fn regex_escape(value: &str) -> String {
    value.replace('.', r"\.")
}

#[tokio::test]
async fn batch_over_http_tracks_every_item() {
    let mut server = Server::new_async().await;
    mock_verdict(&mut server, "real.jpg", r#"{"result":"REAL","confidence":"91.2%"}"#).await;
    mock_verdict(
        &mut server,
        "fake.jpg",
        r#"{"result":"FAKE","confidence":"88.0%","detection_method":"hybrid_ai_stats","ai_model_confidence":"93.5%","stats_score":"0.702"}"#,
    )
    .await;
    server
        .mock("POST", "/predict")
        .match_body(Matcher::Regex(r#"filename="broken\.jpg""#.into()))
        .with_status(500)
        .with_body(r#"{"error":"cannot identify image file"}"#)
        .create_async()
        .await;

    let media = tempfile::tempdir().unwrap();
    let paths = vec![
        write_media(&media, "real.jpg"),
        write_media(&media, "fake.jpg"),
        write_media(&media, "broken.jpg"),
    ];

    let scanner = scanner_with(
        config_for(&server, media.path().join("data")),
        Arc::new(MemoryStore::new()),
    );
    let submission = scanner.scan_paths(&paths).await.unwrap();
    assert!(matches!(submission, Submission::Batch { count: 3 }));

    let items = scanner.batch().items();
    let statuses: Vec<_> = items.iter().map(|i| i.status).collect();
    assert_eq!(
        statuses,
        vec![BatchStatus::Completed, BatchStatus::Completed, BatchStatus::Failed]
    );
    assert_eq!(items[1].result, Some(ScanResult::Fake));
    assert_eq!(items[1].stats_score.as_deref(), Some("0.702"));
    assert_eq!(items[2].error.as_deref(), Some("cannot identify image file"));
    assert_eq!(scanner.batch().progress(), 100.0);

    let latest = &scanner.notifications().snapshot()[0];
    assert_eq!(latest.kind, NotificationKind::Success);
    assert_eq!(latest.message, "✅ Batch complete! 1 FAKE, 1 REAL out of 3 images");

    // batch results never enter the single-analysis history
    assert!(scanner.history().is_empty());
}

#[tokio::test]
async fn single_scan_is_persisted_and_clearable() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/predict")
        .with_status(200)
        .with_body(r#"{"result":"FAKE","confidence":"100.0%","detection_method":"hash_based"}"#)
        .create_async()
        .await;

    let media = tempfile::tempdir().unwrap();
    let data_dir = media.path().join("data");
    let path = write_media(&media, "known-fake.png");

    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&data_dir).unwrap());
    let scanner = scanner_with(config_for(&server, data_dir.clone()), store.clone());

    let submission = scanner.scan_paths(&[path]).await.unwrap();
    let Submission::Single(report) = submission else {
        panic!("single file should bypass the batch");
    };
    assert_eq!(report.narrative.title, "🔐 Exact Match Detection");
    assert!(report.record.media_ref.starts_with("data:image/png;base64,"));
    assert!(scanner.batch().items().is_empty());

    // a fresh process sees the persisted record
    let reopened: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&data_dir).unwrap());
    let restarted = scanner_with(config_for(&server, data_dir.clone()), reopened);
    assert_eq!(restarted.history().records(), scanner.history().records());

    restarted.clear_history().unwrap();
    assert!(restarted.history().is_empty());
    assert_eq!(restarted.notifications().snapshot()[0].message, "History cleared");
    assert_eq!(store.get(SCAN_HISTORY_KEY).unwrap(), None);

    let reloaded: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&data_dir).unwrap());
    assert!(scanner_with(config_for(&server, data_dir), reloaded)
        .history()
        .is_empty());
}

#[tokio::test]
async fn engine_health_and_notification_cap() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/health")
        .with_status(200)
        .with_body(r#"{"status":"online","model_loaded":true}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/predict")
        .with_status(200)
        .with_body(r#"{"result":"REAL","confidence":"97.0%"}"#)
        .expect_at_least(1)
        .create_async()
        .await;

    let media = tempfile::tempdir().unwrap();
    let scanner = scanner_with(
        config_for(&server, media.path().join("data")),
        Arc::new(MemoryStore::new()),
    );
    assert_eq!(scanner.check_engine().await, EngineStatus::Online);

    for i in 0..4 {
        let path = write_media(&media, &format!("photo-{}.jpg", i));
        scanner.scan_paths(&[path]).await.unwrap();
        assert!(scanner.notifications().len() <= MAX_NOTIFICATIONS);
    }

    assert_eq!(scanner.notifications().len(), MAX_NOTIFICATIONS);
    assert_eq!(scanner.history().len(), 4);
    assert_eq!(scanner.history().latest().unwrap().name, "Neural_Scan_4");
}

#[tokio::test]
async fn unreadable_path_is_reported_before_any_request() {
    let server = Server::new_async().await;
    let media = tempfile::tempdir().unwrap();
    let scanner = scanner_with(
        config_for(&server, media.path().join("data")),
        Arc::new(MemoryStore::new()),
    );

    let missing = media.path().join("missing.jpg");
    assert!(scanner.scan_paths(&[missing]).await.is_err());
    assert_eq!(
        scanner.notifications().snapshot()[0].kind,
        NotificationKind::Error
    );
}

/// Accepts writes but fails every delete.
struct UndeletableStore(MemoryStore);

impl KeyValueStore for UndeletableStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.0.set(key, value)
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::other("permission denied")))
    }
}

#[tokio::test]
async fn failed_history_clear_is_notified_and_keeps_records() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/predict")
        .with_status(200)
        .with_body(r#"{"result":"REAL","confidence":"97.0%"}"#)
        .create_async()
        .await;

    let media = tempfile::tempdir().unwrap();
    let store: Arc<dyn KeyValueStore> = Arc::new(UndeletableStore(MemoryStore::new()));
    let scanner = scanner_with(config_for(&server, media.path().join("data")), store.clone());
    scanner
        .scan_paths(&[write_media(&media, "photo.jpg")])
        .await
        .unwrap();

    assert!(scanner.clear_history().is_err());
    let latest = &scanner.notifications().snapshot()[0];
    assert_eq!(latest.kind, NotificationKind::Error);
    assert!(latest.message.starts_with("Failed to clear scan history"));

    assert_eq!(scanner.history().len(), 1);
    let restarted = scanner_with(config_for(&server, media.path().join("data")), store);
    assert_eq!(restarted.history().records(), scanner.history().records());
}

#[tokio::test]
async fn admin_stats_count_users_and_scans() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/predict")
        .with_status(200)
        .with_body(r#"{"result":"FAKE","confidence":"82.0%"}"#)
        .expect(3)
        .create_async()
        .await;

    let media = tempfile::tempdir().unwrap();
    let scanner = scanner_with(
        config_for(&server, media.path().join("data")),
        Arc::new(MemoryStore::new()),
    );
    scanner.users().signup("Ada", "ada@example.com", "hunter22").unwrap();
    scanner.users().signup("Grace", "grace@navy.mil", "cobol-59").unwrap();

    scanner
        .scan_paths(&[write_media(&media, "single.jpg")])
        .await
        .unwrap();
    scanner
        .scan_paths(&[write_media(&media, "a.jpg"), write_media(&media, "b.jpg")])
        .await
        .unwrap();

    // batch results stay out of history, so only the single scan is counted
    let stats = scanner.admin_stats().unwrap();
    assert_eq!((stats.users, stats.scans, stats.fake), (2, 1, 1));
}
