//! Database operations for Reelcast
//!
//! The SQLite database is the system of record for the content queue.
//! The handle is cheap to clone and is shared between services via `Arc`.

use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::path::Path;
use std::str::FromStr;

use crate::error::{DbError, Result};
use crate::types::{ContentRecord, ContentStatus, PostingRecord};

/// A content record together with its platform posting history
#[derive(Debug, Clone)]
pub struct ContentWithRecords {
    pub content: ContentRecord,
    pub records: Vec<PostingRecord>,
}

/// Per-status row counts for queue statistics
#[derive(Debug, Clone)]
pub struct QueueStats {
    pub total: i64,
    pub by_status: Vec<(String, i64)>,
    pub scheduled: i64,
    pub next_due: Option<i64>,
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection and run migrations
    pub async fn new(db_path: &str) -> Result<Self> {
        // Expand path and create parent directories
        let expanded_path = shellexpand::tilde(db_path).to_string();

        if expanded_path != ":memory:" {
            let path = Path::new(&expanded_path);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(DbError::IoError)?;
                }
            }
        }

        // mode=rwc allows creating the database file if it doesn't exist
        let db_url = format!("sqlite://{}?mode=rwc", expanded_path.replace('\\', "/"));

        let pool = SqlitePool::connect(&db_url)
            .await
            .map_err(DbError::SqlxError)?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(DbError::MigrationError)?;

        Ok(Self { pool })
    }

    /// Insert a new content record
    pub async fn create_content(&self, content: &ContentRecord) -> Result<()> {
        let hashtags = serde_json::to_string(&content.hashtags).map_err(DbError::Encoding)?;
        let platforms = serde_json::to_string(&content.platforms).map_err(DbError::Encoding)?;

        sqlx::query(
            r#"
            INSERT INTO contents
                (id, topic, script, caption, hashtags, status, platforms,
                 video_url, scheduled_for, created_at, posted_at, error_message)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&content.id)
        .bind(&content.topic)
        .bind(&content.script)
        .bind(&content.caption)
        .bind(hashtags)
        .bind(content.status.as_str())
        .bind(platforms)
        .bind(&content.video_url)
        .bind(content.scheduled_for)
        .bind(content.created_at)
        .bind(content.posted_at)
        .bind(&content.error_message)
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Get a content record by ID
    pub async fn get_content(&self, content_id: &str) -> Result<Option<ContentRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, topic, script, caption, hashtags, status, platforms,
                   video_url, scheduled_for, created_at, posted_at, error_message
            FROM contents WHERE id = ?
            "#,
        )
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        row.map(row_to_content).transpose()
    }

    /// List content records, newest first, optionally filtered by status
    pub async fn list_contents(
        &self,
        status: Option<ContentStatus>,
        limit: usize,
    ) -> Result<Vec<ContentRecord>> {
        let rows = match status {
            Some(status) => {
                sqlx::query(
                    r#"
                    SELECT id, topic, script, caption, hashtags, status, platforms,
                           video_url, scheduled_for, created_at, posted_at, error_message
                    FROM contents WHERE status = ?
                    ORDER BY created_at DESC
                    LIMIT ?
                    "#,
                )
                .bind(status.as_str())
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, topic, script, caption, hashtags, status, platforms,
                           video_url, scheduled_for, created_at, posted_at, error_message
                    FROM contents
                    ORDER BY created_at DESC
                    LIMIT ?
                    "#,
                )
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(DbError::SqlxError)?;

        rows.into_iter().map(row_to_content).collect()
    }

    /// Update content status
    pub async fn update_status(&self, content_id: &str, status: ContentStatus) -> Result<()> {
        sqlx::query("UPDATE contents SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(content_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Mark a record as errored, recording the message
    pub async fn set_error(&self, content_id: &str, message: &str) -> Result<()> {
        sqlx::query("UPDATE contents SET status = 'error', error_message = ? WHERE id = ?")
            .bind(message)
            .bind(content_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Reset an errored record back to ready, clearing the error field
    pub async fn reset_error(&self, content_id: &str) -> Result<()> {
        sqlx::query(
            "UPDATE contents SET status = 'ready', error_message = NULL WHERE id = ?",
        )
        .bind(content_id)
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Mark a record as posted at the given time
    pub async fn mark_posted(&self, content_id: &str, posted_at: i64) -> Result<()> {
        sqlx::query(
            "UPDATE contents SET status = 'posted', posted_at = ?, error_message = NULL WHERE id = ?",
        )
        .bind(posted_at)
        .bind(content_id)
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Store the caption/hashtag annotation and move the record to the given status
    pub async fn update_annotation(
        &self,
        content_id: &str,
        caption: &str,
        hashtags: &[String],
        status: ContentStatus,
    ) -> Result<()> {
        let hashtags = serde_json::to_string(hashtags).map_err(DbError::Encoding)?;

        sqlx::query(
            r#"
            UPDATE contents
            SET caption = ?, hashtags = ?, status = ?, error_message = NULL
            WHERE id = ?
            "#,
        )
        .bind(caption)
        .bind(hashtags)
        .bind(status.as_str())
        .bind(content_id)
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Set the scheduled posting time for a record
    pub async fn set_schedule(&self, content_id: &str, scheduled_for: i64) -> Result<()> {
        sqlx::query("UPDATE contents SET scheduled_for = ? WHERE id = ?")
            .bind(scheduled_for)
            .bind(content_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Clear the scheduled posting time for a record
    pub async fn clear_schedule(&self, content_id: &str) -> Result<()> {
        sqlx::query("UPDATE contents SET scheduled_for = NULL WHERE id = ?")
            .bind(content_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Delete a content record and its posting history
    pub async fn delete_content(&self, content_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM posting_records WHERE content_id = ?")
            .bind(content_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        sqlx::query("DELETE FROM contents WHERE id = ?")
            .bind(content_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Ready records whose scheduled time has arrived, oldest schedule first
    pub async fn due_scheduled(&self, now: i64) -> Result<Vec<ContentRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, topic, script, caption, hashtags, status, platforms,
                   video_url, scheduled_for, created_at, posted_at, error_message
            FROM contents
            WHERE status = 'ready' AND scheduled_for IS NOT NULL AND scheduled_for <= ?
            ORDER BY scheduled_for ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        rows.into_iter().map(row_to_content).collect()
    }

    /// Ready records with no schedule yet, oldest first
    pub async fn unscheduled_ready(&self) -> Result<Vec<ContentRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, topic, script, caption, hashtags, status, platforms,
                   video_url, scheduled_for, created_at, posted_at, error_message
            FROM contents
            WHERE status = 'ready' AND scheduled_for IS NULL
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        rows.into_iter().map(row_to_content).collect()
    }

    /// Append a posting record
    pub async fn create_posting_record(&self, record: &PostingRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO posting_records
                (content_id, platform, platform_post_id, posted_at, success, error_message)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.content_id)
        .bind(&record.platform)
        .bind(&record.platform_post_id)
        .bind(record.posted_at)
        .bind(if record.success { 1 } else { 0 })
        .bind(&record.error_message)
        .execute(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(())
    }

    /// Get all posting records for a content record, newest first
    pub async fn get_posting_records(&self, content_id: &str) -> Result<Vec<PostingRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, content_id, platform, platform_post_id, posted_at, success, error_message
            FROM posting_records
            WHERE content_id = ?
            ORDER BY id DESC
            "#,
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(rows
            .into_iter()
            .map(|r| PostingRecord {
                id: r.get("id"),
                content_id: r.get("content_id"),
                platform: r.get("platform"),
                platform_post_id: r.get("platform_post_id"),
                posted_at: r.get("posted_at"),
                success: r.get::<i64, _>("success") != 0,
                error_message: r.get("error_message"),
            })
            .collect())
    }

    /// Get a content record with its posting history
    pub async fn get_content_with_records(
        &self,
        content_id: &str,
    ) -> Result<Option<ContentWithRecords>> {
        let content = match self.get_content(content_id).await? {
            Some(content) => content,
            None => return Ok(None),
        };
        let records = self.get_posting_records(content_id).await?;
        Ok(Some(ContentWithRecords { content, records }))
    }

    /// Queue statistics
    pub async fn stats(&self) -> Result<QueueStats> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contents")
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::SqlxError)?;

        let status_rows = sqlx::query(
            "SELECT status, COUNT(*) AS count FROM contents GROUP BY status ORDER BY status",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        let by_status = status_rows
            .into_iter()
            .map(|r| (r.get::<String, _>("status"), r.get::<i64, _>("count")))
            .collect();

        let scheduled: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM contents WHERE scheduled_for IS NOT NULL")
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::SqlxError)?;

        let next_due: Option<i64> = sqlx::query_scalar(
            "SELECT MIN(scheduled_for) FROM contents WHERE status = 'ready' AND scheduled_for IS NOT NULL",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::SqlxError)?;

        Ok(QueueStats {
            total,
            by_status,
            scheduled,
            next_due,
        })
    }
}

fn row_to_content(row: sqlx::sqlite::SqliteRow) -> Result<ContentRecord> {
    let hashtags: Vec<String> =
        serde_json::from_str(&row.get::<String, _>("hashtags")).map_err(DbError::Encoding)?;
    let platforms: Vec<String> =
        serde_json::from_str(&row.get::<String, _>("platforms")).map_err(DbError::Encoding)?;
    let status = ContentStatus::from_str(&row.get::<String, _>("status"))
        .unwrap_or(ContentStatus::Error);

    Ok(ContentRecord {
        id: row.get("id"),
        topic: row.get("topic"),
        script: row.get("script"),
        caption: row.get("caption"),
        hashtags,
        status,
        platforms,
        video_url: row.get("video_url"),
        scheduled_for: row.get("scheduled_for"),
        created_at: row.get("created_at"),
        posted_at: row.get("posted_at"),
        error_message: row.get("error_message"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentRequest, ContentStyle, PostingOutcome};

    fn sample_record() -> ContentRecord {
        let request = ContentRequest {
            topic: "Desk stretches for remote workers".to_string(),
            style: ContentStyle::Educational,
            duration: 30,
            platforms: vec!["instagram".to_string(), "tiktok".to_string()],
            video_url: None,
        };
        let mut record = ContentRecord::new(&request);
        record.script = "Stand up. Stretch. Repeat.".to_string();
        record.caption = "Three stretches that save your back".to_string();
        record.hashtags = vec!["stretching".to_string(), "remotework".to_string()];
        record.status = ContentStatus::Ready;
        record
    }

    #[tokio::test]
    async fn test_create_and_get_content() {
        let db = Database::new(":memory:").await.unwrap();
        let record = sample_record();

        db.create_content(&record).await.unwrap();

        let fetched = db.get_content(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, record.id);
        assert_eq!(fetched.topic, record.topic);
        assert_eq!(fetched.hashtags, record.hashtags);
        assert_eq!(fetched.platforms, record.platforms);
        assert_eq!(fetched.status, ContentStatus::Ready);
    }

    #[tokio::test]
    async fn test_get_content_missing() {
        let db = Database::new(":memory:").await.unwrap();
        assert!(db.get_content("no-such-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let db = Database::new(":memory:").await.unwrap();
        let record = sample_record();
        db.create_content(&record).await.unwrap();

        db.update_status(&record.id, ContentStatus::Posting)
            .await
            .unwrap();
        let fetched = db.get_content(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ContentStatus::Posting);

        db.set_error(&record.id, "tiktok rejected the upload")
            .await
            .unwrap();
        let fetched = db.get_content(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ContentStatus::Error);
        assert_eq!(
            fetched.error_message.as_deref(),
            Some("tiktok rejected the upload")
        );

        // Retry reset clears the error field
        db.reset_error(&record.id).await.unwrap();
        let fetched = db.get_content(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ContentStatus::Ready);
        assert_eq!(fetched.error_message, None);
    }

    #[tokio::test]
    async fn test_mark_posted() {
        let db = Database::new(":memory:").await.unwrap();
        let record = sample_record();
        db.create_content(&record).await.unwrap();

        db.mark_posted(&record.id, 1_800_000_000).await.unwrap();
        let fetched = db.get_content(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.status, ContentStatus::Posted);
        assert_eq!(fetched.posted_at, Some(1_800_000_000));
    }

    #[tokio::test]
    async fn test_update_annotation() {
        let db = Database::new(":memory:").await.unwrap();
        let mut record = sample_record();
        record.status = ContentStatus::Generating;
        record.caption = String::new();
        record.hashtags = Vec::new();
        db.create_content(&record).await.unwrap();

        db.update_annotation(
            &record.id,
            "Fresh caption",
            &["a".to_string(), "b".to_string()],
            ContentStatus::Ready,
        )
        .await
        .unwrap();

        let fetched = db.get_content(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.caption, "Fresh caption");
        assert_eq!(fetched.hashtags, vec!["a", "b"]);
        assert_eq!(fetched.status, ContentStatus::Ready);
    }

    #[tokio::test]
    async fn test_schedule_round_trip() {
        let db = Database::new(":memory:").await.unwrap();
        let record = sample_record();
        db.create_content(&record).await.unwrap();

        db.set_schedule(&record.id, 1_900_000_000).await.unwrap();
        let fetched = db.get_content(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.scheduled_for, Some(1_900_000_000));

        db.clear_schedule(&record.id).await.unwrap();
        let fetched = db.get_content(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.scheduled_for, None);
    }

    #[tokio::test]
    async fn test_due_scheduled_selects_only_due_ready_records() {
        let db = Database::new(":memory:").await.unwrap();

        let mut due = sample_record();
        due.scheduled_for = Some(1_000);
        db.create_content(&due).await.unwrap();

        let mut future = sample_record();
        future.scheduled_for = Some(5_000);
        db.create_content(&future).await.unwrap();

        let mut posted = sample_record();
        posted.scheduled_for = Some(500);
        posted.status = ContentStatus::Posted;
        db.create_content(&posted).await.unwrap();

        let mut unscheduled = sample_record();
        unscheduled.scheduled_for = None;
        db.create_content(&unscheduled).await.unwrap();

        let results = db.due_scheduled(2_000).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, due.id);
    }

    #[tokio::test]
    async fn test_unscheduled_ready() {
        let db = Database::new(":memory:").await.unwrap();

        let first = sample_record();
        db.create_content(&first).await.unwrap();

        let mut scheduled = sample_record();
        scheduled.scheduled_for = Some(1_900_000_000);
        db.create_content(&scheduled).await.unwrap();

        let results = db.unscheduled_ready().await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, first.id);
    }

    #[tokio::test]
    async fn test_posting_records_round_trip() {
        let db = Database::new(":memory:").await.unwrap();
        let record = sample_record();
        db.create_content(&record).await.unwrap();

        let ok = PostingOutcome::ok("instagram", "ig_1");
        let failed = PostingOutcome::failed("tiktok", "token expired");
        db.create_posting_record(&crate::types::PostingRecord::from_outcome(
            &record.id, &ok, 100,
        ))
        .await
        .unwrap();
        db.create_posting_record(&crate::types::PostingRecord::from_outcome(
            &record.id, &failed, 100,
        ))
        .await
        .unwrap();

        let records = db.get_posting_records(&record.id).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().any(|r| r.platform == "instagram" && r.success));
        assert!(records.iter().any(|r| r.platform == "tiktok"
            && !r.success
            && r.error_message.as_deref() == Some("token expired")));
    }

    #[tokio::test]
    async fn test_delete_content_removes_history() {
        let db = Database::new(":memory:").await.unwrap();
        let record = sample_record();
        db.create_content(&record).await.unwrap();
        db.create_posting_record(&crate::types::PostingRecord::from_outcome(
            &record.id,
            &PostingOutcome::ok("instagram", "ig_1"),
            100,
        ))
        .await
        .unwrap();

        db.delete_content(&record.id).await.unwrap();

        assert!(db.get_content(&record.id).await.unwrap().is_none());
        assert!(db.get_posting_records(&record.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_contents_filter_and_limit() {
        let db = Database::new(":memory:").await.unwrap();

        for _ in 0..3 {
            db.create_content(&sample_record()).await.unwrap();
        }
        let mut errored = sample_record();
        errored.status = ContentStatus::Error;
        db.create_content(&errored).await.unwrap();

        let all = db.list_contents(None, 100).await.unwrap();
        assert_eq!(all.len(), 4);

        let ready = db
            .list_contents(Some(ContentStatus::Ready), 100)
            .await
            .unwrap();
        assert_eq!(ready.len(), 3);

        let limited = db.list_contents(None, 2).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn test_stats() {
        let db = Database::new(":memory:").await.unwrap();

        db.create_content(&sample_record()).await.unwrap();
        let mut scheduled = sample_record();
        scheduled.scheduled_for = Some(1_900_000_000);
        db.create_content(&scheduled).await.unwrap();

        let stats = db.stats().await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.scheduled, 1);
        assert_eq!(stats.next_due, Some(1_900_000_000));
        assert!(stats
            .by_status
            .iter()
            .any(|(status, count)| status == "ready" && *count == 2));
    }
}
