//! Daemon integration tests
//!
//! Run the reel-send binary in --once mode against a scratch
//! configuration and database.

use assert_cmd::Command;
use libreelcast::types::{ContentRecord, ContentRequest, ContentStatus, ContentStyle};
use libreelcast::Database;
use std::fs;
use tempfile::TempDir;

/// Write a minimal config pointing at a database inside the temp dir
fn write_config(temp_dir: &TempDir) -> String {
    let config_path = temp_dir.path().join("config.toml");
    let db_path = temp_dir.path().join("queue.db");

    let config_content = format!(
        r#"
[database]
path = "{}"

[instagram]
enabled = true

[tiktok]
enabled = true
"#,
        db_path.display().to_string().replace('\\', "/")
    );

    fs::write(&config_path, config_content).unwrap();
    config_path.to_string_lossy().to_string()
}

#[test]
fn test_once_mode_with_empty_queue_exits_cleanly() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir);

    let mut cmd = Command::cargo_bin("reel-send").unwrap();
    cmd.env("REELCAST_CONFIG", &config_path)
        .arg("--once")
        .assert()
        .success();
}

#[test]
fn test_once_mode_creates_database() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir);

    let mut cmd = Command::cargo_bin("reel-send").unwrap();
    cmd.env("REELCAST_CONFIG", &config_path)
        .arg("--once")
        .assert()
        .success();

    assert!(temp_dir.path().join("queue.db").exists());
}

fn ready_record(scheduled_for: Option<i64>) -> ContentRecord {
    let request = ContentRequest {
        topic: "Desk stretches".to_string(),
        style: ContentStyle::Educational,
        duration: 30,
        platforms: vec!["instagram".to_string(), "tiktok".to_string()],
        video_url: Some("https://cdn.example/video.mp4".to_string()),
    };
    let mut record = ContentRecord::new(&request);
    record.caption = "Caption".to_string();
    record.status = ContentStatus::Ready;
    record.scheduled_for = scheduled_for;
    record
}

#[test]
fn test_once_mode_fires_due_records_and_skips_future_ones() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir);
    let db_path = temp_dir.path().join("queue.db");
    let now = chrono::Utc::now().timestamp();

    let rt = tokio::runtime::Runtime::new().unwrap();
    let (due_id, future_id) = rt.block_on(async {
        let db = Database::new(db_path.to_str().unwrap()).await.unwrap();

        let due = ready_record(Some(now - 60));
        db.create_content(&due).await.unwrap();

        let future = ready_record(Some(now + 3600));
        db.create_content(&future).await.unwrap();

        (due.id, future.id)
    });

    // No platform credentials in the environment: the due record is
    // dispatched and every platform reports a configuration failure.
    let mut cmd = Command::cargo_bin("reel-send").unwrap();
    cmd.env("REELCAST_CONFIG", &config_path)
        .env_remove("INSTAGRAM_ACCESS_TOKEN")
        .env_remove("INSTAGRAM_USER_ID")
        .env_remove("TIKTOK_ACCESS_TOKEN")
        .current_dir(temp_dir.path())
        .arg("--once")
        .assert()
        .success();

    rt.block_on(async {
        let db = Database::new(db_path.to_str().unwrap()).await.unwrap();

        let due = db.get_content(&due_id).await.unwrap().unwrap();
        assert_eq!(due.status, ContentStatus::Error);
        assert!(due
            .error_message
            .as_deref()
            .unwrap()
            .contains("not configured"));

        let history = db.get_posting_records(&due_id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history.iter().all(|r| !r.success));

        // The future record was not touched
        let future = db.get_content(&future_id).await.unwrap().unwrap();
        assert_eq!(future.status, ContentStatus::Ready);
        assert_eq!(future.scheduled_for, Some(now + 3600));
        assert!(db.get_posting_records(&future_id).await.unwrap().is_empty());
    });
}

#[test]
fn test_poll_interval_flag_accepted() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = write_config(&temp_dir);

    // --once overrides the loop, so the interval is only parsed
    let mut cmd = Command::cargo_bin("reel-send").unwrap();
    cmd.env("REELCAST_CONFIG", &config_path)
        .args(["--once", "--poll-interval", "5"])
        .assert()
        .success();
}
