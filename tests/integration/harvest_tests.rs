//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for the catalog site and exercise the
//! full scan, download and run log cycle end-to-end.

use jar_harvest::catalog::{run_harvest, HarvestReport};
use jar_harvest::config::Config;
use jar_harvest::output::{read_retry_ids, read_run_log};
use jar_harvest::OutcomeStatus;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock catalog
fn create_test_config(base_url: &str, work_dir: &Path) -> Config {
    let mut config = Config::default();
    config.catalog.base_url = base_url.to_string();
    config.http.page_timeout_secs = 5;
    config.http.download_timeout_secs = 5;
    config.scheduler.max_workers = 4;
    config.output.content_dir = work_dir.join("jar").display().to_string();
    config.output.log_dir = work_dir.join("logs").display().to_string();
    config
}

fn page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, id: u64, body: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/games/{}/screen/8", id)))
        .respond_with(page(body))
        .mount(server)
        .await;
}

async fn mount_archive(server: &MockServer, archive: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(format!("/download-jar/{}", archive)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .mount(server)
        .await;
}

fn completed(report: HarvestReport) -> (PathBuf, usize, usize) {
    match report {
        HarvestReport::Completed {
            log_path,
            tried,
            successful,
        } => (log_path, tried, successful),
        HarvestReport::NothingToDo => panic!("expected a completed run"),
    }
}

/// Staging files left behind in the content directory
fn part_files(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .map(|e| e.unwrap().path())
            .filter(|p| p.extension().map_or(false, |ext| ext == "part"))
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn log_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .expect("Failed to read run log")
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_no_tag_no_fallback_records_no_match() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();

    mount_page(&mock_server, 100, "<p>Nokia 6230i edition</p>").await;

    let config = create_test_config(&mock_server.uri(), work_dir.path());
    let report = run_harvest(config, vec![100]).await.expect("Harvest failed");
    let (log_path, tried, successful) = completed(report);

    assert_eq!((tried, successful), (1, 0));
    assert_eq!(
        log_lines(&log_path),
        vec![
            "Total tried: 1",
            "Total successful: 0",
            "100: nay (no working .jar)",
        ]
    );

    let name = log_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.ends_with("_100-100.log"), "unexpected name {}", name);
    assert_eq!(name.len(), "YYYYMMDD_HHMMSS_100-100.log".len());
}

#[tokio::test]
async fn test_exact_match_downloads_archive() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        200,
        r#"<p>Tested on K800i</p><a href="/download-jar/555">Download</a>"#,
    )
    .await;
    mount_archive(&mock_server, "555", b"PK\x03\x04exact").await;

    let config = create_test_config(&mock_server.uri(), work_dir.path());
    let report = run_harvest(config, vec![200]).await.expect("Harvest failed");
    let (log_path, tried, successful) = completed(report);

    assert_eq!((tried, successful), (1, 1));
    assert_eq!(
        log_lines(&log_path),
        vec!["Total tried: 1", "Total successful: 1", "200: yay"]
    );

    let stored = work_dir.path().join("jar").join("555.jar");
    assert_eq!(std::fs::read(stored).unwrap(), b"PK\x03\x04exact");
}

#[tokio::test]
async fn test_requests_carry_identifying_user_agent() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/games/1/screen/8"))
        .and(header(
            "user-agent",
            jar_harvest::config::DEFAULT_USER_AGENT,
        ))
        .respond_with(page("<p>nothing</p>"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), work_dir.path());
    let (log_path, _, _) = completed(run_harvest(config, vec![1]).await.unwrap());

    // Without the header the page would 404 and be logged as an error
    assert!(log_lines(&log_path).contains(&"1: nay (no working .jar)".to_string()));
}

#[tokio::test]
async fn test_fallback_downloads_largest_archive() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        300,
        r#"<p>Sony Ericsson CZ/K800i</p>
        <div class="LOAD"><a href="/download-jar/small">Download</a> 512 kB</div>
        <div class="LOAD"><a href="/download-jar/large">Download</a> 2 MB</div>
        <div class="LOAD"><a href="/download-jar/medium">Download</a> 1500 kB</div>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/download-jar/large"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"largest".to_vec()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), work_dir.path());
    let (log_path, tried, successful) =
        completed(run_harvest(config, vec![300]).await.unwrap());

    assert_eq!((tried, successful), (1, 1));
    assert_eq!(log_lines(&log_path)[2], "300: yay (largest available)");

    let jar_dir = work_dir.path().join("jar");
    assert_eq!(std::fs::read(jar_dir.join("large.jar")).unwrap(), b"largest");
    assert!(!jar_dir.join("small.jar").exists());
    assert!(!jar_dir.join("medium.jar").exists());
}

#[tokio::test]
async fn test_tag_present_without_link_is_dead_end() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        400,
        r#"<p>K800i</p><div class="LOAD"><a href="/mirror/1">Mirror</a> 2 MB</div>"#,
    )
    .await;

    let config = create_test_config(&mock_server.uri(), work_dir.path());
    let (log_path, _, successful) = completed(run_harvest(config, vec![400]).await.unwrap());

    assert_eq!(successful, 0);
    assert_eq!(log_lines(&log_path)[2], "400: nay (no downloads found)");
}

#[tokio::test]
async fn test_page_http_error() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/games/500/screen/8"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), work_dir.path());
    let (log_path, _, _) = completed(run_harvest(config, vec![500]).await.unwrap());

    assert_eq!(log_lines(&log_path)[2], "500: nay (error)");
}

#[tokio::test]
async fn test_download_failure_leaves_no_file() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        600,
        r#"<p>K800i</p><a href="/download-jar/broken">Download</a>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/download-jar/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), work_dir.path());
    let (log_path, _, successful) = completed(run_harvest(config, vec![600]).await.unwrap());

    assert_eq!(successful, 0);
    assert_eq!(log_lines(&log_path)[2], "600: nay (download failed)");

    let jar_dir = work_dir.path().join("jar");
    assert!(!jar_dir.join("broken.jar").exists());
    assert!(part_files(&jar_dir).is_empty());
}

#[tokio::test]
async fn test_download_timeout_is_download_failure() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        610,
        r#"<p>K800i</p><a href="/download-jar/slow">Download</a>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/download-jar/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"PK\x03\x04slow".to_vec())
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    // The page timeout alone would let the archive through
    let mut config = create_test_config(&mock_server.uri(), work_dir.path());
    config.http.page_timeout_secs = 10;
    config.http.download_timeout_secs = 1;

    let (log_path, _, successful) = completed(run_harvest(config, vec![610]).await.unwrap());

    assert_eq!(successful, 0);
    assert_eq!(log_lines(&log_path)[2], "610: nay (download failed)");

    let jar_dir = work_dir.path().join("jar");
    assert!(!jar_dir.join("slow.jar").exists());
    assert!(part_files(&jar_dir).is_empty());
    assert_eq!(read_retry_ids(&log_path).unwrap(), vec![610]);
}

#[tokio::test]
async fn test_fallback_download_failure() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        620,
        r#"<p>W810i only</p>
        <div class="LOAD"><a href="/download-jar/gone">Download</a> 900 kB</div>"#,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/download-jar/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), work_dir.path());
    let (log_path, _, successful) = completed(run_harvest(config, vec![620]).await.unwrap());

    assert_eq!(successful, 0);
    assert_eq!(log_lines(&log_path)[2], "620: nay (download failed)");

    let jar_dir = work_dir.path().join("jar");
    assert!(!jar_dir.join("gone.jar").exists());
    assert!(part_files(&jar_dir).is_empty());
}

#[tokio::test]
async fn test_ids_sharing_one_archive_all_succeed() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();
    let body = vec![0x5Au8; 4 * 1024 * 1024];

    let ids: Vec<u64> = (800..820).collect();
    for id in &ids {
        mount_page(
            &mock_server,
            *id,
            r#"<p>K800i</p><a href="/download-jar/same">Download</a>"#,
        )
        .await;
    }
    mount_archive(&mock_server, "same", &body).await;

    let mut config = create_test_config(&mock_server.uri(), work_dir.path());
    config.scheduler.max_workers = 20;

    let (log_path, tried, successful) =
        completed(run_harvest(config, ids.clone()).await.unwrap());

    assert_eq!((tried, successful), (20, 20));
    let lines = log_lines(&log_path);
    for (line, id) in lines[2..].iter().zip(&ids) {
        assert_eq!(line, &format!("{}: yay", id));
    }

    let jar_dir = work_dir.path().join("jar");
    assert_eq!(std::fs::read(jar_dir.join("same.jar")).unwrap(), body);
    assert!(part_files(&jar_dir).is_empty());
}

#[tokio::test]
async fn test_repeated_run_keeps_every_log() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();

    mount_page(&mock_server, 5, "<p>nothing for this phone</p>").await;

    let config = create_test_config(&mock_server.uri(), work_dir.path());
    let (first, _, _) = completed(run_harvest(config.clone(), vec![5]).await.unwrap());
    let (second, _, _) = completed(run_harvest(config, vec![5]).await.unwrap());

    assert_ne!(first, second);
    for log_path in [&first, &second] {
        assert_eq!(log_lines(log_path)[2], "5: nay (no working .jar)");
    }
}

#[tokio::test]
async fn test_page_timeout_is_transport_failure() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/games/700/screen/8"))
        .respond_with(page("<p>K800i</p>").set_delay(std::time::Duration::from_secs(3)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), work_dir.path());
    config.http.page_timeout_secs = 1;

    let (log_path, _, _) = completed(run_harvest(config, vec![700]).await.unwrap());
    let lines = log_lines(&log_path);

    assert!(
        lines[2].starts_with("700: nay (error), "),
        "unexpected line {}",
        lines[2]
    );
}

#[tokio::test]
async fn test_range_keeps_order_and_counts() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        10,
        r#"<p>K800i</p><a href="/download-jar/ten">Download</a>"#,
    )
    .await;
    mount_archive(&mock_server, "ten", b"10").await;
    mount_page(&mock_server, 11, "<p>nothing</p>").await;
    // 12 is not mounted and answers 404
    mount_page(
        &mock_server,
        13,
        r#"<div class="LOAD"><a href="/download-jar/thirteen">Download</a> 90 kB</div>"#,
    )
    .await;
    mount_archive(&mock_server, "thirteen", b"13").await;
    mount_page(&mock_server, 14, "<p>K800i</p>").await;

    let config = create_test_config(&mock_server.uri(), work_dir.path());
    let ids: Vec<u64> = (10..=14).collect();
    let (log_path, tried, successful) = completed(run_harvest(config, ids).await.unwrap());

    assert_eq!((tried, successful), (5, 2));
    assert_eq!(
        log_lines(&log_path),
        vec![
            "Total tried: 5",
            "Total successful: 2",
            "10: yay",
            "11: nay (no working .jar)",
            "12: nay (error)",
            "13: yay (largest available)",
            "14: nay (no downloads found)",
        ]
    );
    assert!(log_path.to_string_lossy().ends_with("_10-14.log"));

    // Only the HTTP error is worth retrying
    assert_eq!(read_retry_ids(&log_path).unwrap(), vec![12]);

    let parsed = read_run_log(&log_path).unwrap();
    assert_eq!(parsed.total_tried, Some(5));
    assert_eq!(parsed.records[2].status, OutcomeStatus::FailureHttpError);
}

#[tokio::test]
async fn test_retry_run_processes_recovered_ids() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();

    let prior = work_dir.path().join("prior.log");
    std::fs::write(
        &prior,
        "Total tried: 3\nTotal successful: 1\n\
         42: nay (no working .jar)\n\
         43: nay (error)\n\
         44: yay\n",
    )
    .unwrap();

    mount_page(
        &mock_server,
        43,
        r#"<p>K800i</p><a href="/download-jar/fortythree">Download</a>"#,
    )
    .await;
    mount_archive(&mock_server, "fortythree", b"43").await;

    let ids = read_retry_ids(&prior).unwrap();
    assert_eq!(ids, vec![43]);

    let config = create_test_config(&mock_server.uri(), work_dir.path());
    let (log_path, tried, successful) = completed(run_harvest(config, ids).await.unwrap());

    assert_eq!((tried, successful), (1, 1));
    assert_eq!(log_lines(&log_path)[2], "43: yay");
    assert!(log_path.to_string_lossy().ends_with("_43-43.log"));
}

#[tokio::test]
async fn test_empty_retry_set_is_noop() {
    let mock_server = MockServer::start().await;
    let work_dir = TempDir::new().unwrap();

    let prior = work_dir.path().join("prior.log");
    std::fs::write(
        &prior,
        "Total tried: 2\nTotal successful: 2\n1: yay\n2: yay (largest available)\n",
    )
    .unwrap();

    let ids = read_retry_ids(&prior).unwrap();
    assert!(ids.is_empty());

    let config = create_test_config(&mock_server.uri(), work_dir.path());
    let report = run_harvest(config, ids).await.unwrap();

    assert_eq!(report, HarvestReport::NothingToDo);
    assert!(!work_dir.path().join("logs").exists());

    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}
