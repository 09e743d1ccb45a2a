//! Queue management service
//!
//! List, inspect, delete, and schedule queued content records. Records
//! are removed only by explicit user deletion.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::db::{ContentWithRecords, Database, QueueStats};
use crate::error::{ReelcastError, Result};
use crate::scheduling::{auto_schedule_times, ensure_future, PostingFrequency};
use crate::types::{ContentRecord, ContentStatus};

/// Queue service
#[derive(Clone)]
pub struct QueueService {
    db: Arc<Database>,
    config: Arc<Config>,
}

impl QueueService {
    pub fn new(db: Arc<Database>, config: Arc<Config>) -> Self {
        Self { db, config }
    }

    /// List records, newest first
    pub async fn list(
        &self,
        status: Option<ContentStatus>,
        limit: usize,
    ) -> Result<Vec<ContentRecord>> {
        self.db.list_contents(status, limit).await
    }

    /// Get a record with its posting history
    pub async fn get(&self, content_id: &str) -> Result<ContentWithRecords> {
        self.db
            .get_content_with_records(content_id)
            .await?
            .ok_or_else(|| {
                ReelcastError::InvalidInput(format!("Content not found: {}", content_id))
            })
    }

    /// Delete a record and its posting history
    pub async fn delete(&self, content_id: &str) -> Result<()> {
        if self.db.get_content(content_id).await?.is_none() {
            return Err(ReelcastError::InvalidInput(format!(
                "Content not found: {}",
                content_id
            )));
        }
        self.db.delete_content(content_id).await?;
        info!("Deleted content {}", content_id);
        Ok(())
    }

    /// Schedule a ready record for a future posting time
    ///
    /// Rejects past or present timestamps; on rejection the record's
    /// schedule is left untouched.
    pub async fn schedule(&self, content_id: &str, when: DateTime<Utc>) -> Result<()> {
        let record = self.db.get_content(content_id).await?.ok_or_else(|| {
            ReelcastError::InvalidInput(format!("Content not found: {}", content_id))
        })?;

        if record.status != ContentStatus::Ready {
            return Err(ReelcastError::InvalidInput(format!(
                "Only ready records can be scheduled; {} is {}",
                record.id, record.status
            )));
        }

        let when = ensure_future(when, Utc::now())?;
        self.db.set_schedule(content_id, when.timestamp()).await?;
        info!("Scheduled {} for {}", content_id, when.to_rfc3339());
        Ok(())
    }

    /// Clear a record's scheduled time
    pub async fn unschedule(&self, content_id: &str) -> Result<()> {
        if self.db.get_content(content_id).await?.is_none() {
            return Err(ReelcastError::InvalidInput(format!(
                "Content not found: {}",
                content_id
            )));
        }
        self.db.clear_schedule(content_id).await?;
        Ok(())
    }

    /// Spread all unscheduled ready records over evenly spaced future slots
    ///
    /// Returns the (content id, scheduled time) pairs that were assigned,
    /// oldest record first.
    pub async fn auto_schedule(
        &self,
        frequency: PostingFrequency,
    ) -> Result<Vec<(String, DateTime<Utc>)>> {
        let records = self.db.unscheduled_ready().await?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let times = auto_schedule_times(
            records.len(),
            frequency,
            self.config.scheduling.anchor_hour,
            Utc::now(),
        )?;

        let mut assigned = Vec::with_capacity(records.len());
        for (record, when) in records.iter().zip(times) {
            self.db.set_schedule(&record.id, when.timestamp()).await?;
            assigned.push((record.id.clone(), when));
        }

        info!(
            "Auto-scheduled {} record(s) at {} frequency",
            assigned.len(),
            frequency
        );

        Ok(assigned)
    }

    /// Ready records whose scheduled time has arrived
    pub async fn due(&self, now: DateTime<Utc>) -> Result<Vec<ContentRecord>> {
        self.db.due_scheduled(now.timestamp()).await
    }

    /// Queue statistics
    pub async fn stats(&self) -> Result<QueueStats> {
        self.db.stats().await
    }
}
