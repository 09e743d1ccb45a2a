//! Posting service
//!
//! Coordinates the dispatcher with the queue: loads records, applies
//! optional platform filters, drives the retry reset, and emits progress
//! events. Ad-hoc submissions (from the HTTP API) are supported for
//! content that is not in the queue.

use std::sync::Arc;
use tracing::{info, warn};

use crate::db::Database;
use crate::dispatcher::{AggregateOutcome, Dispatcher};
use crate::error::{ReelcastError, Result};
use crate::platforms::Submission;
use crate::service::events::{Event, EventBus};
use crate::types::{ContentRecord, ContentStatus};

/// Posting service
#[derive(Clone)]
pub struct PostingService {
    db: Arc<Database>,
    dispatcher: Arc<Dispatcher>,
    event_bus: EventBus,
}

impl PostingService {
    pub fn new(db: Arc<Database>, dispatcher: Arc<Dispatcher>, event_bus: EventBus) -> Self {
        Self {
            db,
            dispatcher,
            event_bus,
        }
    }

    /// Post a queued record to its target platforms
    ///
    /// An optional filter narrows the target set to a subset of the
    /// record's platforms.
    pub async fn post_record(
        &self,
        content_id: &str,
        platform_filter: Option<&[String]>,
    ) -> Result<AggregateOutcome> {
        let mut record = self.db.get_content(content_id).await?.ok_or_else(|| {
            ReelcastError::InvalidInput(format!("Content not found: {}", content_id))
        })?;

        if let Some(filter) = platform_filter {
            record.platforms.retain(|p| filter.contains(p));
            if record.platforms.is_empty() {
                return Err(ReelcastError::InvalidInput(
                    "Platform filter matches none of the record's platforms".to_string(),
                ));
            }
        }

        self.event_bus.emit(Event::PostingStarted {
            content_id: record.id.clone(),
            platforms: record.platforms.clone(),
        });

        let aggregate = self.dispatcher.dispatch(&record).await?;

        self.emit_result(&record.id, &aggregate);

        Ok(aggregate)
    }

    /// Post an ad-hoc submission that may not correspond to a queued record
    ///
    /// When a record with the submission's content id exists its status
    /// and outcome history are updated; otherwise only the outcomes are
    /// returned.
    pub async fn post_submission(
        &self,
        submission: Submission,
        platforms: &[String],
    ) -> Result<AggregateOutcome> {
        if platforms.is_empty() {
            return Err(ReelcastError::InvalidInput(
                "At least one platform must be selected".to_string(),
            ));
        }

        let tracked = self.db.get_content(&submission.content_id).await?;
        if let Some(record) = &tracked {
            if record.status != ContentStatus::Ready {
                return Err(ReelcastError::InvalidInput(format!(
                    "Only ready records can be posted; {} is {}",
                    record.id, record.status
                )));
            }
            self.db
                .update_status(&record.id, ContentStatus::Posting)
                .await?;
        }

        self.event_bus.emit(Event::PostingStarted {
            content_id: submission.content_id.clone(),
            platforms: platforms.to_vec(),
        });

        let outcomes = self
            .dispatcher
            .dispatch_submission(&submission, platforms)
            .await;
        let aggregate = AggregateOutcome::from_outcomes(outcomes);

        if tracked.is_some() {
            self.dispatcher
                .finalize(&submission.content_id, &aggregate)
                .await;
        } else {
            info!(
                "Posted untracked content {} ({} platform(s))",
                submission.content_id,
                platforms.len()
            );
        }

        self.emit_result(&submission.content_id, &aggregate);

        Ok(aggregate)
    }

    /// Reset an errored record back to ready, clearing its error
    ///
    /// The explicit user retry action in the status machine; the record
    /// can then be posted again.
    pub async fn retry(&self, content_id: &str) -> Result<ContentRecord> {
        let record = self.db.get_content(content_id).await?.ok_or_else(|| {
            ReelcastError::InvalidInput(format!("Content not found: {}", content_id))
        })?;

        if record.status != ContentStatus::Error {
            return Err(ReelcastError::InvalidInput(format!(
                "Only errored records can be retried; {} is {}",
                record.id, record.status
            )));
        }

        self.db.reset_error(content_id).await?;

        let record = self.db.get_content(content_id).await?.ok_or_else(|| {
            ReelcastError::InvalidInput(format!("Content not found: {}", content_id))
        })?;

        info!("Reset {} for retry", content_id);

        Ok(record)
    }

    fn emit_result(&self, content_id: &str, aggregate: &AggregateOutcome) {
        if aggregate.all_succeeded {
            self.event_bus.emit(Event::PostingCompleted {
                content_id: content_id.to_string(),
                outcomes: aggregate.outcomes.clone(),
            });
        } else {
            let error = aggregate
                .first_error()
                .unwrap_or("Posting failed")
                .to_string();
            warn!("Posting {} did not fully succeed: {}", content_id, error);
            self.event_bus.emit(Event::PostingFailed {
                content_id: content_id.to_string(),
                error,
            });
        }
    }
}
