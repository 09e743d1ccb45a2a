//! Content generation service
//!
//! Turns a topic into a stored content record through two typed steps:
//! a script draft and a caption/hashtag annotation. The record is
//! persisted between the steps, so a failure of the second call keeps the
//! script and can be retried on its own with `regenerate_caption`.

use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::db::Database;
use crate::error::{ReelcastError, Result};
use crate::llm::ChatBackend;
use crate::parser::parse_annotation;
use crate::prompt::{annotation_prompt, script_prompt, ANNOTATION_PERSONA, SCRIPT_PERSONA};
use crate::service::events::{Event, EventBus};
use crate::types::{ContentRecord, ContentRequest, ContentStatus};

/// Output of the script step
#[derive(Debug, Clone)]
pub struct ScriptDraft {
    pub script: String,
}

/// Output of the annotation step
#[derive(Debug, Clone)]
pub struct Annotation {
    pub caption: String,
    pub hashtags: Vec<String>,
}

/// Generation service
#[derive(Clone)]
pub struct GenerationService {
    db: Arc<Database>,
    backend: Arc<dyn ChatBackend>,
    config: Arc<Config>,
    event_bus: EventBus,
}

impl GenerationService {
    pub fn new(
        db: Arc<Database>,
        backend: Arc<dyn ChatBackend>,
        config: Arc<Config>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            db,
            backend,
            config,
            event_bus,
        }
    }

    /// Step 1: draft the video script
    ///
    /// An empty completion degrades to an empty script rather than an
    /// error; only transport and provider failures are fatal.
    pub async fn draft_script(&self, request: &ContentRequest) -> Result<ScriptDraft> {
        let prompt = script_prompt(request);
        let script = self
            .backend
            .complete(
                SCRIPT_PERSONA,
                &prompt,
                self.config.generation.script_temperature,
            )
            .await?;

        if script.is_empty() {
            warn!("Script step returned no text for topic: {}", request.topic);
        }

        Ok(ScriptDraft { script })
    }

    /// Step 2: derive a caption and hashtags from a finished script
    ///
    /// Parsing never fails; a malformed response falls back to the topic
    /// as caption and an empty tag list.
    pub async fn annotate(&self, script: &str, fallback_caption: &str) -> Result<Annotation> {
        let prompt = annotation_prompt(script);
        let raw = self
            .backend
            .complete(
                ANNOTATION_PERSONA,
                &prompt,
                self.config.generation.annotation_temperature,
            )
            .await?;

        let (caption, hashtags) = parse_annotation(&raw, fallback_caption);
        Ok(Annotation { caption, hashtags })
    }

    /// Run the full two-step pipeline and persist the result
    ///
    /// The record is stored after the script step; if the annotation step
    /// fails the record stays in the queue with status `error`, keeping
    /// the script, and the failure is surfaced to the caller.
    pub async fn generate(&self, request: ContentRequest) -> Result<ContentRecord> {
        if request.topic.trim().is_empty() {
            return Err(ReelcastError::InvalidInput("Topic cannot be empty".to_string()));
        }
        if request.platforms.is_empty() {
            return Err(ReelcastError::InvalidInput(
                "At least one platform must be selected".to_string(),
            ));
        }

        let draft = self.draft_script(&request).await?;

        let mut record = ContentRecord::new(&request);
        record.script = draft.script.clone();
        self.db.create_content(&record).await?;

        self.event_bus.emit(Event::GenerationStarted {
            content_id: record.id.clone(),
            topic: record.topic.clone(),
        });

        match self.annotate(&draft.script, &request.topic).await {
            Ok(annotation) => {
                self.db
                    .update_annotation(
                        &record.id,
                        &annotation.caption,
                        &annotation.hashtags,
                        ContentStatus::Ready,
                    )
                    .await?;

                record.caption = annotation.caption;
                record.hashtags = annotation.hashtags;
                record.status = ContentStatus::Ready;

                info!("Generated content {} for topic: {}", record.id, record.topic);
                self.event_bus.emit(Event::GenerationCompleted {
                    content_id: record.id.clone(),
                });

                Ok(record)
            }
            Err(e) => {
                warn!("Annotation step failed for {}: {}", record.id, e);
                self.db.set_error(&record.id, &e.to_string()).await?;
                self.event_bus.emit(Event::GenerationFailed {
                    content_id: record.id.clone(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Re-run only the annotation step on a stored record
    ///
    /// Used to recover a record whose script step succeeded but whose
    /// caption step failed; flips error -> ready on success.
    pub async fn regenerate_caption(&self, content_id: &str) -> Result<ContentRecord> {
        let mut record = self.db.get_content(content_id).await?.ok_or_else(|| {
            ReelcastError::InvalidInput(format!("Content not found: {}", content_id))
        })?;

        let annotation = match self.annotate(&record.script, &record.topic).await {
            Ok(annotation) => annotation,
            Err(e) => {
                self.db.set_error(&record.id, &e.to_string()).await?;
                return Err(e);
            }
        };

        self.db
            .update_annotation(
                &record.id,
                &annotation.caption,
                &annotation.hashtags,
                ContentStatus::Ready,
            )
            .await?;

        record.caption = annotation.caption;
        record.hashtags = annotation.hashtags;
        record.status = ContentStatus::Ready;
        record.error_message = None;

        info!("Regenerated caption for {}", record.id);

        Ok(record)
    }
}
