//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full mirror cycle end-to-end against a temporary mirror root.

use site_mirror::config::Config;
use site_mirror::output::{BatchProgress, CrawlReport, ProgressObserver};
use site_mirror::storage::{MirrorStorage, StorageError, StorageResult};
use site_mirror::{Coordinator, MirrorError, RunState};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration mirroring `seed` into `root`
fn create_test_config(seed: &str, root: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.seed = Some(seed.to_string());
    config.crawler.request_timeout_ms = 5_000;
    config.user_agent.crawler_name = "TestBot".to_string();
    config.output.mirror_root = root.to_string_lossy().into_owned();
    config
}

fn seed_of(server: &MockServer) -> String {
    format!("{}/", server.uri())
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html(body))
        .expect(1)
        .mount(server)
        .await;
}

/// Counts regular files below `dir`
fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let path = entry.unwrap().path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}

#[derive(Clone, Default)]
struct RecordingObserver {
    batches: Arc<Mutex<Vec<BatchProgress>>>,
    finished: Arc<Mutex<Option<RunState>>>,
}

impl ProgressObserver for RecordingObserver {
    fn on_batch(&self, progress: &BatchProgress) {
        self.batches.lock().unwrap().push(*progress);
    }

    fn on_finish(&self, report: &CrawlReport) {
        *self.finished.lock().unwrap() = Some(report.state);
    }
}

/// Storage that accepts directories but refuses every file write
struct FailingStorage;

impl MirrorStorage for FailingStorage {
    fn remove_tree(&self, _path: &Path) -> StorageResult<()> {
        Ok(())
    }

    fn ensure_dir(&self, _path: &Path) -> StorageResult<()> {
        Ok(())
    }

    fn write_file(&self, path: &Path, _bytes: &[u8]) -> StorageResult<()> {
        Err(StorageError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        ))
    }
}

#[tokio::test]
async fn test_full_mirror_of_linked_pages() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="a.html">A</a> <a href="/b.html#top">B</a>"#,
    )
    .await;
    mount_page(
        &server,
        "/a.html",
        r#"<a href="/">Home</a> <a href="b.html">B</a>"#,
    )
    .await;
    mount_page(&server, "/b.html", r#"<a href="./a.html">A</a>"#).await;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let mut coordinator =
        Coordinator::new(create_test_config(&seed_of(&server), &root)).unwrap();

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.state, RunState::Done);
    assert_eq!(coordinator.state(), RunState::Done);
    assert_eq!(report.visited, 3);
    assert_eq!(report.pages_saved, 3);
    assert_eq!(report.fetch_failed, 0);
    assert_eq!(count_files(&root), 3);
    assert!(root.join("index.html").is_file());
    assert!(root.join("a.html").is_file());
    assert_eq!(
        std::fs::read_to_string(root.join("b.html")).unwrap(),
        r#"<a href="./a.html">A</a>"#
    );
    assert!(report.finished_at >= report.started_at);
}

#[tokio::test]
async fn test_assets_written_beside_pages() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><head>
             <link rel="stylesheet" href="css/site.css">
             <script src="/js/app.js"></script>
           </head><body><img src="/media/logo.png"></body></html>"#,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/css/site.css"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("body { color: red; }", "text/css"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/js/app.js"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("console.log('hi');", "application/javascript"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let logo: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0xff, 0x00, 0xfe];
    Mock::given(method("GET"))
        .and(path("/media/logo.png"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(logo.clone(), "image/png"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let mut coordinator =
        Coordinator::new(create_test_config(&seed_of(&server), &root)).unwrap();

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.pages_saved, 1);
    assert_eq!(report.resources_saved, 3);
    assert_eq!(
        std::fs::read_to_string(root.join("css/site.css")).unwrap(),
        "body { color: red; }"
    );
    assert!(root.join("js/app.js").is_file());
    assert_eq!(std::fs::read(root.join("media/logo.png")).unwrap(), logo);
}

#[tokio::test]
async fn test_not_found_does_not_abort() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/missing.html">Gone</a> <a href="/ok.html">Ok</a>"#,
    )
    .await;
    mount_page(&server, "/ok.html", "<p>ok</p>").await;
    Mock::given(method("GET"))
        .and(path("/missing.html"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let mut coordinator =
        Coordinator::new(create_test_config(&seed_of(&server), &root)).unwrap();

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.visited, 3);
    assert_eq!(report.fetch_failed, 1);
    assert_eq!(report.not_found, 1);
    assert!(!root.join("missing.html").exists());
    assert!(root.join("ok.html").is_file());
}

#[tokio::test]
async fn test_external_links_not_followed() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<p>elsewhere</p>"))
        .expect(0)
        .mount(&other)
        .await;

    mount_page(
        &server,
        "/",
        &format!(
            r#"<a href="{}/page.html">Other</a>
               <a href="mailto:someone@example.com">Mail</a>
               <a href="javascript:void(0)">Nothing</a>"#,
            other.uri()
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let mut coordinator =
        Coordinator::new(create_test_config(&seed_of(&server), &root)).unwrap();

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.visited, 1);
    assert_eq!(count_files(&root), 1);
}

#[tokio::test]
async fn test_fragment_variants_fetched_once() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r##"<a href="/page.html#one">1</a>
            <a href="/page.html#two">2</a>
            <a href="page.html">3</a>
            <a href="#self">Self</a>"##,
    )
    .await;
    mount_page(&server, "/page.html", r#"<a href="/#bottom">Home</a>"#).await;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let mut coordinator =
        Coordinator::new(create_test_config(&seed_of(&server), &root)).unwrap();

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.visited, 2);
}

#[tokio::test]
async fn test_rerun_wipes_previous_mirror() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>home</p>"))
        .expect(2)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    std::fs::create_dir_all(root.join("old")).unwrap();
    std::fs::write(root.join("old/stale.html"), "stale").unwrap();

    let mut coordinator =
        Coordinator::new(create_test_config(&seed_of(&server), &root)).unwrap();

    let first = coordinator.run().await.unwrap();
    assert_eq!(first.state, RunState::Done);
    assert!(!root.join("old").exists());

    std::fs::write(root.join("leftover.txt"), "x").unwrap();
    let second = coordinator.run().await.unwrap();

    assert_eq!(second.state, RunState::Done);
    assert_eq!(second.visited, 1);
    assert!(!root.join("leftover.txt").exists());
    assert_eq!(count_files(&root), 1);
}

#[tokio::test]
async fn test_batches_reported_to_observer() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/a.html">A</a> <a href="/b.html">B</a>"#,
    )
    .await;
    mount_page(&server, "/a.html", r#"<a href="/b.html">B</a>"#).await;
    mount_page(&server, "/b.html", r#"<a href="/">Home</a>"#).await;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let mut config = create_test_config(&seed_of(&server), &root);
    config.crawler.batch_size = 1;

    let observer = RecordingObserver::default();
    let mut coordinator = Coordinator::new(config)
        .unwrap()
        .with_observer(observer.clone());

    let report = coordinator.run().await.unwrap();

    let batches = observer.batches.lock().unwrap().clone();
    assert_eq!(report.batches, 3);
    assert_eq!(batches.len(), 3);
    assert_eq!(
        batches[0],
        BatchProgress {
            batch: 1,
            batch_len: 1,
            visited: 1,
            remaining: 2,
        }
    );
    assert_eq!(batches[2].visited, 3);
    assert_eq!(batches[2].remaining, 0);
    assert_eq!(*observer.finished.lock().unwrap(), Some(RunState::Done));
}

#[tokio::test]
async fn test_write_failure_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/next.html">Next</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/next.html"))
        .respond_with(html("<p>never</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let observer = RecordingObserver::default();
    let mut coordinator = Coordinator::with_storage(
        create_test_config(&seed_of(&server), &root),
        Arc::new(FailingStorage),
    )
    .unwrap()
    .with_observer(observer.clone());

    let result = coordinator.run().await;

    assert!(matches!(result, Err(MirrorError::PersistFailed { .. })));
    assert_eq!(coordinator.state(), RunState::Aborted);
    assert_eq!(*observer.finished.lock().unwrap(), Some(RunState::Aborted));
    assert!(observer.batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_file_directory_conflict_aborts_run() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<a href="/index.html/deeper">Deeper</a>"#).await;
    mount_page(&server, "/index.html/deeper", "<p>deeper</p>").await;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let mut coordinator =
        Coordinator::new(create_test_config(&seed_of(&server), &root)).unwrap();

    let result = coordinator.run().await;

    match result {
        Err(MirrorError::PersistFailed { path, .. }) => {
            assert_eq!(path, root.join("index.html").join("deeper"));
        }
        other => panic!("expected persist failure, got {:?}", other),
    }
    assert_eq!(coordinator.state(), RunState::Aborted);
    assert!(!coordinator.state().is_success());
}

#[tokio::test]
async fn test_unusable_mirror_root_fails_reset() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<p>home</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file").unwrap();
    let root = blocker.join("mirror");

    let mut coordinator =
        Coordinator::new(create_test_config(&seed_of(&server), &root)).unwrap();

    let result = coordinator.run().await;

    assert!(matches!(result, Err(MirrorError::ResetFailed { .. })));
    assert_eq!(coordinator.state(), RunState::Aborted);
    assert_eq!(coordinator.visited_count(), 0);
}

#[tokio::test]
async fn test_cancel_before_first_batch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html("<p>home</p>"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let mut coordinator =
        Coordinator::new(create_test_config(&seed_of(&server), &root)).unwrap();

    coordinator.cancel_handle().cancel();
    let report = coordinator.run().await.unwrap();

    assert_eq!(report.state, RunState::Cancelled);
    assert_eq!(report.batches, 0);
    assert_eq!(report.visited, 0);
    assert!(root.is_dir());
}

#[tokio::test]
async fn test_cancelled_run_does_not_cancel_next_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>home</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let mut coordinator =
        Coordinator::new(create_test_config(&seed_of(&server), &root)).unwrap();

    coordinator.cancel_handle().cancel();
    let first = coordinator.run().await.unwrap();
    let second = coordinator.run().await.unwrap();

    assert_eq!(first.state, RunState::Cancelled);
    assert_eq!(second.state, RunState::Done);
    assert_eq!(second.visited, 1);
    assert!(root.join("index.html").is_file());
}

#[tokio::test]
async fn test_opaque_bodies_saved_verbatim() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<a href="/downloads/data.bin">Data</a> <a href="/latin1.html">Café</a>"#,
    )
    .await;

    let data: Vec<u8> = vec![0x00, 0xff, 0xfe, 0x80, 0x81, 0x41];
    Mock::given(method("GET"))
        .and(path("/downloads/data.bin"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(data.clone(), "application/octet-stream"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let latin1: Vec<u8> = b"<meta charset=\"iso-8859-1\"><p>caf\xe9</p>".to_vec();
    Mock::given(method("GET"))
        .and(path("/latin1.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(latin1.clone(), "text/html; charset=iso-8859-1"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let root = dir.path().join("mirror");
    let mut coordinator =
        Coordinator::new(create_test_config(&seed_of(&server), &root)).unwrap();

    let report = coordinator.run().await.unwrap();

    assert_eq!(report.state, RunState::Done);
    assert_eq!(report.pages_saved, 2);
    assert_eq!(report.resources_saved, 1);
    assert_eq!(std::fs::read(root.join("downloads/data.bin")).unwrap(), data);
    assert_eq!(std::fs::read(root.join("latin1.html")).unwrap(), latin1);
}
