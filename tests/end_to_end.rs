//! Wired services against a mock GitHub API: sync, snapshot reload, upload.

use mockito::{Matcher, Server, ServerGuard};
use tempfile::TempDir;

use coursework_sync_lib::bootstrap::wire_services;
use cs_app::SyncOutcome;
use cs_app::usecases::{LocalFile, UploadRequest};
use cs_core::config::{AppConfig, StorageConfig};
use cs_core::convention::encode_project_path;
use cs_core::ports::ProjectStorePort;
use cs_core::{DayKey, ProjectSlot, SecretString, WorkType};

fn config_for(server: &ServerGuard, dir: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.github.owner = "octo".to_string();
    config.github.repo = "cad".to_string();
    config.github.api_base_url = server.url();
    config.github.request_timeout_secs = 5;
    config.sync.courtesy_delay_ms = 0;
    config.upload.retry_base_delay_ms = 0;
    config.upload.rate_limit_delay_ms = 0;
    config.storage = StorageConfig::rooted_at(dir.path());
    config
}

fn dir_entry(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    format!(
        r#"{{"name":"{name}","path":"{path}","type":"dir","sha":"d","url":"u",
            "html_url":"https://github.com/octo/cad/tree/main/{path}","download_url":null,"size":0}}"#
    )
}

fn file_entry(path: &str) -> String {
    let name = path.rsplit('/').next().unwrap_or(path);
    format!(
        r#"{{"name":"{name}","path":"{path}","type":"file","sha":"f","url":"u",
            "html_url":"https://github.com/octo/cad/blob/main/{path}",
            "download_url":"https://raw.example/{path}","size":10}}"#
    )
}

async fn mock_listing(server: &mut ServerGuard, url_path: &str, entries: &[String]) {
    server
        .mock("GET", url_path)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!("[{}]", entries.join(",")))
        .create_async()
        .await;
}

async fn mock_day_one_tree(server: &mut ServerGuard) {
    mock_listing(
        server,
        "/repos/octo/cad/contents",
        &[dir_entry("Day 01"), file_entry("README.md")],
    )
    .await;
    mock_listing(server, "/repos/octo/cad/contents/Day%2001", &[dir_entry("Day 01/CW")]).await;
    mock_listing(
        server,
        "/repos/octo/cad/contents/Day%2001/CW",
        &[dir_entry("Day 01/CW/Gear")],
    )
    .await;
    mock_listing(
        server,
        "/repos/octo/cad/contents/Day%2001/CW/Gear",
        &[
            file_entry("Day 01/CW/Gear/gear.SLDPRT"),
            file_entry("Day 01/CW/Gear/gear.png"),
        ],
    )
    .await;
}

#[tokio::test]
async fn sync_walks_once_then_stays_up_to_date() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    let metadata = server
        .mock("GET", "/repos/octo/cad")
        .with_status(200)
        .with_body(r#"{"full_name":"octo/cad","pushed_at":"2024-05-01T10:00:00Z"}"#)
        .expect(2)
        .create_async()
        .await;
    mock_day_one_tree(&mut server).await;

    let services = wire_services(config_for(&server, &dir)).await.unwrap();

    let first = services.scheduler.sync_now(false).await.unwrap();
    let SyncOutcome::Updated { counts, skipped, .. } = first else {
        panic!("expected an update, got {first:?}");
    };
    assert_eq!(counts.class_work, 1);
    assert_eq!(skipped, 0);

    let second = services.scheduler.sync_now(false).await.unwrap();
    assert_eq!(
        second,
        SyncOutcome::UpToDate {
            marker: "2024-05-01T10:00:00Z".to_string()
        }
    );
    metadata.assert_async().await;

    let projects = services.store.snapshot().await;
    let day = projects.get(&DayKey::from_number(1)).unwrap();
    assert_eq!(day.class_work[0].name, "CW 1 - Day 01");
    assert!(day.class_work[0].preview_url.is_some());
}

#[tokio::test]
async fn default_config_sees_folders_written_by_the_uploader() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    server
        .mock("GET", "/repos/octo/cad")
        .with_status(200)
        .with_body(r#"{"full_name":"octo/cad","pushed_at":"2024-05-03T09:00:00Z"}"#)
        .create_async()
        .await;

    let folder = encode_project_path(&ProjectSlot::new(6, WorkType::ClassWork, 1));
    mock_listing(&mut server, "/repos/octo/cad/contents", &[dir_entry("CW")]).await;
    mock_listing(&mut server, "/repos/octo/cad/contents/CW", &[dir_entry("CW/Day 06")]).await;
    mock_listing(&mut server, "/repos/octo/cad/contents/CW/Day%2006", &[dir_entry(&folder)]).await;
    mock_listing(
        &mut server,
        "/repos/octo/cad/contents/CW/Day%2006/cw%2001%20day%206",
        &[file_entry(&format!("{folder}/part.SLDPRT"))],
    )
    .await;

    let services = wire_services(config_for(&server, &dir)).await.unwrap();
    let outcome = services.scheduler.sync_now(false).await.unwrap();

    let SyncOutcome::Updated { counts, skipped, .. } = outcome else {
        panic!("expected an update, got {outcome:?}");
    };
    assert_eq!(skipped, 0);
    assert_eq!(counts.class_work, 1);
    let projects = services.store.snapshot().await;
    let day = projects.get(&DayKey::from_number(6)).unwrap();
    assert_eq!(day.class_work[0].name, "CW 1 - Day 06");
}

#[tokio::test]
async fn snapshot_seeds_the_next_process() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();
    server
        .mock("GET", "/repos/octo/cad")
        .with_status(200)
        .with_body(r#"{"full_name":"octo/cad","pushed_at":"2024-05-01T10:00:00Z"}"#)
        .create_async()
        .await;
    mock_day_one_tree(&mut server).await;

    let config = config_for(&server, &dir);
    let services = wire_services(config.clone()).await.unwrap();
    services.scheduler.sync_now(false).await.unwrap();
    drop(services);

    let restarted = wire_services(config).await.unwrap();
    let projects = restarted.store.snapshot().await;
    assert_eq!(projects.counts().class_work, 1);
}

#[tokio::test]
async fn upload_writes_files_then_readme() {
    let mut server = Server::new_async().await;
    let dir = TempDir::new().unwrap();

    server
        .mock("GET", "/user")
        .match_header("authorization", "token ghp_test")
        .with_status(200)
        .with_body(r#"{"login":"student"}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/repos/octo/cad")
        .match_header("authorization", "token ghp_test")
        .with_status(200)
        .with_body(
            r#"{"full_name":"octo/cad","private":true,
                "permissions":{"admin":false,"push":true,"pull":true}}"#,
        )
        .create_async()
        .await;
    server
        .mock(
            "GET",
            Matcher::Regex(r"^/repos/octo/cad/contents/CW/Day%2002/".to_string()),
        )
        .match_query(Matcher::UrlEncoded("ref".to_string(), "main".to_string()))
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .expect(2)
        .create_async()
        .await;
    let part = server
        .mock(
            "PUT",
            "/repos/octo/cad/contents/CW/Day%2002/cw%2003%20day%202/bracket.SLDPRT",
        )
        .match_body(Matcher::PartialJson(serde_json::json!({
            "content": "c29saWQ=",
            "branch": "main"
        })))
        .with_status(201)
        .with_body(
            r#"{"content":{"path":"CW/Day 02/cw 03 day 2/bracket.SLDPRT","sha":"p1",
                "download_url":"https://raw.example/bracket.SLDPRT"}}"#,
        )
        .create_async()
        .await;
    let readme = server
        .mock(
            "PUT",
            "/repos/octo/cad/contents/CW/Day%2002/cw%2003%20day%202/README.md",
        )
        .with_status(201)
        .with_body(r#"{"content":{"path":"CW/Day 02/cw 03 day 2/README.md","sha":"r1"}}"#)
        .create_async()
        .await;

    let services = wire_services(config_for(&server, &dir)).await.unwrap();
    services
        .vault
        .save(&SecretString::from("ghp_test"))
        .await
        .unwrap();

    let report = services
        .upload
        .execute(
            UploadRequest {
                slot: ProjectSlot::new(2, WorkType::ClassWork, 3),
                files: vec![LocalFile::new("bracket.SLDPRT", b"solid".to_vec())],
            },
            None,
        )
        .await
        .unwrap();

    part.assert_async().await;
    readme.assert_async().await;
    assert_eq!(report.folder_path, "CW/Day 02/cw 03 day 2");
    assert_eq!(report.files[0].sha, "p1");
    assert_eq!(report.readme.unwrap().sha, "r1");
}
