//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full mirror cycle end-to-end: real HTTP transport, real file
//! writes, and the JSON state store.

use site_mirror::config::{load_config, Config, RequestProtocol, RunOptions};
use site_mirror::crawler::mirror;
use site_mirror::storage::{JsonStateStore, StateStore};
use site_mirror::Disposition;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration mirroring the mock server into `dir`
fn create_test_config(mock_server: &MockServer, dir: &Path) -> Config {
    let run = RunOptions {
        target_folder: dir.join("downloaded"),
        hostnames: vec![mock_server.address().to_string()],
        request_protocol: RequestProtocol::Http,
        quiet: true,
        ..RunOptions::default()
    };
    let mut config = load_config(run, None).expect("Failed to build config");
    config.state.cache_dir = dir.join("cache");
    config.state.report_dir = dir.join("reports");
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/html")
}

async fn mount_page(mock_server: &MockServer, page: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

async fn request_count(mock_server: &MockServer) -> usize {
    mock_server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_full_mirror_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        html(&format!(
            r##"<html><head><link href="/style.css" rel="stylesheet"></head><body>
            <a href="{}/page1">Page 1</a>
            <a href='/page2'>Page 2</a>
            <a href="https://external.example/x">Elsewhere</a>
            <a href="#top">Top</a>
            </body></html>"##,
            base_url
        )),
    )
    .await;
    mount_page(&mock_server, "/page1", html("<p>one</p>")).await;
    mount_page(&mock_server, "/page2", html(r#"<a href="/page1">again</a>"#)).await;
    mount_page(
        &mock_server,
        "/style.css",
        ResponseTemplate::new(200).set_body_raw(b"body { color: red; }".to_vec(), "text/css"),
    )
    .await;

    let config = create_test_config(&mock_server, dir.path());
    let target = config.run.target_folder.clone();

    let report = mirror(config)
        .await
        .expect("Mirror failed")
        .expect("Mirror was cancelled");

    assert_eq!(report.rounds, 2);
    assert_eq!(report.count(Disposition::WrittenHtml), 3);
    assert_eq!(report.count(Disposition::WrittenBinary), 1);
    assert_eq!(
        fs::read_to_string(target.join("page1")).unwrap(),
        "<p>one</p>"
    );
    assert_eq!(
        fs::read_to_string(target.join("style.css")).unwrap(),
        "body { color: red; }"
    );
    assert!(target.join("index.html").is_file());
    assert!(target.join("page2").is_file());
    assert_eq!(request_count(&mock_server).await, 4);

    let state = JsonStateStore::new(dir.path().join("cache")).read().unwrap();
    assert!(state.found_urls().contains("https://external.example/x"));
    assert!(!state
        .local_url_paths()
        .iter()
        .any(|subpath| subpath.contains("external")));
    assert_eq!(state.written_files().len(), 4);
}

#[tokio::test]
async fn test_redirect_recorded_and_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", html(r#"<a href="/old">old</a>"#)).await;
    mount_page(
        &mock_server,
        "/old",
        ResponseTemplate::new(302)
            .insert_header("Location", "/new")
            .set_body_raw(b"moved".to_vec(), "text/html"),
    )
    .await;
    mount_page(&mock_server, "/new", html("<p>new</p>")).await;

    let config = create_test_config(&mock_server, dir.path());
    let target = config.run.target_folder.clone();

    let report = mirror(config).await.unwrap().unwrap();

    assert_eq!(report.count(Disposition::Redirected), 1);
    assert!(!target.join("old").exists());
    assert_eq!(fs::read_to_string(target.join("new")).unwrap(), "<p>new</p>");

    let state = JsonStateStore::new(dir.path().join("cache")).read().unwrap();
    assert_eq!(
        state.redirects().get("/old"),
        Some(&format!("{}/new", base_url))
    );
}

#[tokio::test]
async fn test_query_mapped_page() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        html(r#"<a href="/forum/?page_id=5">forum</a>"#),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/forum/"))
        .and(query_param("page_id", "5"))
        .respond_with(html("<p>forum page 5</p>"))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server, dir.path());
    config.rules.query_mapped_keys = vec!["page_id".to_string()];
    let target = config.run.target_folder.clone();

    mirror(config).await.unwrap().unwrap();

    assert_eq!(
        fs::read_to_string(target.join("forum").join("page_id").join("5.html")).unwrap(),
        "<p>forum page 5</p>"
    );
}

#[tokio::test]
async fn test_unmappable_query_is_skipped() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/",
        html(r#"<a href="/?lang=en">english</a><a href="/a">a</a>"#),
    )
    .await;
    mount_page(&mock_server, "/a", html("<p>a</p>")).await;

    let config = create_test_config(&mock_server, dir.path());
    let target = config.run.target_folder.clone();

    let report = mirror(config.clone()).await.unwrap().unwrap();

    assert_eq!(report.count(Disposition::Unmappable), 1);
    assert!(report.unmappable.contains("/?lang=en"));
    assert_eq!(fs::read_to_string(target.join("a")).unwrap(), "<p>a</p>");
    assert_eq!(request_count(&mock_server).await, 2);

    // The skipped subpath stays handled, so a resumed run has nothing left to do
    let mut resumed = config;
    resumed.run.reuse_target_folder = true;
    let report = mirror(resumed).await.unwrap().unwrap();

    assert_eq!(report.rounds, 0);
    assert!(report.unmappable.is_empty());
    assert_eq!(request_count(&mock_server).await, 2);
}

#[tokio::test]
async fn test_large_binary_is_streamed_to_disk() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let video: Vec<u8> = (0..4 * 1024 * 1024).map(|i| (i % 251) as u8).collect();

    mount_page(&mock_server, "/", html(r#"<video src="/media/clip.mp4"></video>"#)).await;
    mount_page(
        &mock_server,
        "/media/clip.mp4",
        ResponseTemplate::new(200).set_body_raw(video.clone(), "video/mp4"),
    )
    .await;

    let config = create_test_config(&mock_server, dir.path());
    let target = config.run.target_folder.clone();

    let report = mirror(config).await.unwrap().unwrap();

    assert_eq!(report.count(Disposition::WrittenBinary), 1);
    assert_eq!(fs::read(target.join("media").join("clip.mp4")).unwrap(), video);
}

#[tokio::test]
async fn test_resume_makes_no_requests() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", html(r#"<a href="/page1">one</a>"#)).await;
    mount_page(&mock_server, "/page1", html("<p>one</p>")).await;

    let config = create_test_config(&mock_server, dir.path());
    mirror(config.clone()).await.unwrap().unwrap();
    let requests_after_first_run = request_count(&mock_server).await;

    let mut resumed = config;
    resumed.run.reuse_target_folder = true;
    let report = mirror(resumed).await.unwrap().unwrap();

    assert_eq!(report.rounds, 0);
    assert_eq!(report.written(), 0);
    assert_eq!(request_count(&mock_server).await, requests_after_first_run);
}

#[tokio::test]
async fn test_verify_reports_missing_and_mismatched() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", html(r#"<a href="/page1">one</a>"#)).await;
    mount_page(&mock_server, "/page1", html("<p>one</p>")).await;

    let config = create_test_config(&mock_server, dir.path());
    let target = config.run.target_folder.clone();
    mirror(config.clone()).await.unwrap().unwrap();

    fs::write(target.join("index.html"), "tampered").unwrap();
    fs::remove_file(target.join("page1")).unwrap();

    let mut verify = config;
    verify.run.verify_downloaded = true;
    let report = mirror(verify).await.unwrap().unwrap();

    assert!(report.mismatch.contains(&target.join("index.html")));
    assert!(report.missing.contains(&target.join("page1")));
    assert!(!target.join("page1").exists(), "verify mode never writes");

    let missing = fs::read_to_string(dir.path().join("reports").join("missing.txt")).unwrap();
    assert!(missing.contains("page1"));
    let mismatch = fs::read_to_string(dir.path().join("reports").join("mismatch.txt")).unwrap();
    assert!(mismatch.contains("index.html"));
}

#[tokio::test]
async fn test_delete_target_folder_starts_clean() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&mock_server, "/", html("<p>home</p>")).await;

    let target = dir.path().join("downloaded");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("stale.html"), "old").unwrap();

    let run = RunOptions {
        target_folder: target.clone(),
        hostnames: vec![mock_server.address().to_string()],
        request_protocol: RequestProtocol::Http,
        delete_target_folder: true,
        quiet: true,
        ..RunOptions::default()
    };
    let mut config = load_config(run, None).unwrap();
    config.state.cache_dir = dir.path().join("cache");

    mirror(config).await.unwrap().unwrap();

    assert!(!target.join("stale.html").exists());
    assert!(target.join("index.html").is_file());
}

#[tokio::test]
async fn test_existing_target_folder_requires_a_choice() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("downloaded");
    fs::create_dir_all(&target).unwrap();

    let run = RunOptions {
        target_folder: target,
        hostnames: vec!["example.org".to_string()],
        ..RunOptions::default()
    };

    assert!(load_config(run, None).is_err());
}
