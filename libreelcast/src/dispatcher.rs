//! Posting dispatch across platform adapters
//!
//! Fans a submission out to one adapter per target platform, collects
//! per-platform outcomes, and aggregates them into one partial-success
//! result. One adapter's failure never prevents the others from being
//! invoked or recorded.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::db::Database;
use crate::error::{ReelcastError, Result};
use crate::platforms::{Platform, Submission};
use crate::types::{ContentRecord, ContentStatus, PostingOutcome, PostingRecord};

/// Aggregated result of one posting attempt
///
/// `all_succeeded` is true only when every invoked adapter reported
/// success; a mix of results is a partial success, distinct from total
/// failure, with the full per-platform breakdown preserved.
#[derive(Debug, Clone)]
pub struct AggregateOutcome {
    pub all_succeeded: bool,
    pub outcomes: Vec<PostingOutcome>,
}

impl AggregateOutcome {
    pub fn from_outcomes(outcomes: Vec<PostingOutcome>) -> Self {
        let all_succeeded = !outcomes.is_empty() && outcomes.iter().all(|o| o.success);
        Self {
            all_succeeded,
            outcomes,
        }
    }

    /// Message of the first failing outcome, if any
    pub fn first_error(&self) -> Option<&str> {
        self.outcomes
            .iter()
            .find(|o| !o.success)
            .and_then(|o| o.error.as_deref())
    }

    /// Human-readable summary line
    pub fn message(&self) -> &'static str {
        if self.all_succeeded {
            "Posted successfully to all platforms"
        } else {
            "Some posts failed"
        }
    }
}

/// Multi-platform posting dispatcher
pub struct Dispatcher {
    platforms: Vec<Box<dyn Platform>>,
    db: Arc<Database>,
}

impl Dispatcher {
    pub fn new(platforms: Vec<Box<dyn Platform>>, db: Arc<Database>) -> Self {
        Self { platforms, db }
    }

    /// Post a queued record to its target platforms
    ///
    /// Drives the record's status machine: ready -> posting on dispatch
    /// start, then posting -> posted when every platform succeeds or
    /// posting -> error (carrying the first failure message) otherwise.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the record is not in the `ready` state;
    /// individual platform failures are captured in the outcomes instead.
    pub async fn dispatch(&self, record: &ContentRecord) -> Result<AggregateOutcome> {
        if record.status != ContentStatus::Ready {
            return Err(ReelcastError::InvalidInput(format!(
                "Only ready records can be posted; {} is {}",
                record.id, record.status
            )));
        }
        if record.platforms.is_empty() {
            return Err(ReelcastError::InvalidInput(format!(
                "Record {} has no target platforms",
                record.id
            )));
        }

        self.db
            .update_status(&record.id, ContentStatus::Posting)
            .await?;

        let submission = Submission::from_record(record);
        let outcomes = self
            .dispatch_submission(&submission, &record.platforms)
            .await;
        let aggregate = AggregateOutcome::from_outcomes(outcomes);

        self.finalize(&record.id, &aggregate).await;

        Ok(aggregate)
    }

    /// Fan a submission out to the named platforms and collect outcomes
    ///
    /// Does not touch the database; callers that track a record use
    /// `dispatch` or `finalize` for persistence.
    pub async fn dispatch_submission(
        &self,
        submission: &Submission,
        platform_names: &[String],
    ) -> Vec<PostingOutcome> {
        let futures: Vec<_> = platform_names
            .iter()
            .map(|name| async move {
                let platform = match self.platform_by_name(name) {
                    Some(platform) => platform,
                    None => {
                        warn!("No adapter for platform: {}", name);
                        return PostingOutcome::failed(
                            name.clone(),
                            format!("Unknown platform: {}", name),
                        );
                    }
                };

                // Configuration errors are detected before any network call
                if !platform.is_configured() {
                    warn!("Platform {} is not configured, skipping call", name);
                    return PostingOutcome::failed(name.clone(), platform.configuration_hint());
                }

                info!("Posting {} to {}", submission.content_id, name);
                match platform.publish(submission).await {
                    Ok(post_id) => {
                        info!("Posted {} to {}: {}", submission.content_id, name, post_id);
                        PostingOutcome::ok(name.clone(), post_id)
                    }
                    Err(e) => {
                        warn!("Failed to post {} to {}: {}", submission.content_id, name, e);
                        PostingOutcome::failed(name.clone(), e.to_string())
                    }
                }
            })
            .collect();

        join_all(futures).await
    }

    /// Record outcomes and advance the record's status accordingly
    pub async fn finalize(&self, content_id: &str, aggregate: &AggregateOutcome) {
        let now = chrono::Utc::now().timestamp();

        for outcome in &aggregate.outcomes {
            let record = PostingRecord::from_outcome(content_id, outcome, now);
            if let Err(e) = self.db.create_posting_record(&record).await {
                warn!(
                    "Failed to record outcome for platform {}: {}",
                    outcome.platform, e
                );
            }
        }

        let result = if aggregate.all_succeeded {
            self.db.mark_posted(content_id, now).await
        } else {
            let message = aggregate
                .first_error()
                .unwrap_or("Posting failed")
                .to_string();
            self.db.set_error(content_id, &message).await
        };

        if let Err(e) = result {
            warn!("Failed to update status for {}: {}", content_id, e);
        }
    }

    /// Names of the adapters this dispatcher holds
    pub fn platform_names(&self) -> Vec<&str> {
        self.platforms.iter().map(|p| p.name()).collect()
    }

    fn platform_by_name(&self, name: &str) -> Option<&dyn Platform> {
        self.platforms
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }
}
