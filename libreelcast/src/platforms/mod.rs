//! Platform abstraction and implementations
//!
//! Each adapter translates a generic posting submission into one social
//! platform's API shape and reports back a normalized result. Credentials
//! come from the environment; an adapter built without them stays inert
//! (`is_configured()` returns false) and never attempts a network call.

use async_trait::async_trait;
use tracing::info;

use crate::config::Config;
use crate::error::{PlatformError, Result};
use crate::types::ContentRecord;

pub mod instagram;
pub mod tiktok;

// Mock platform is available for all builds (not just tests) to support
// integration tests
pub mod mock;

/// A single posting request handed to a platform adapter
#[derive(Debug, Clone)]
pub struct Submission {
    pub content_id: String,
    pub caption: String,
    pub hashtags: Vec<String>,
    /// URL of the rendered video asset
    pub video_url: Option<String>,
}

impl Submission {
    pub fn from_record(record: &ContentRecord) -> Self {
        Self {
            content_id: record.id.clone(),
            caption: record.caption.clone(),
            hashtags: record.hashtags.clone(),
            video_url: record.video_url.clone(),
        }
    }

    /// Caption text as posted: the caption followed by `#`-prefixed tags
    pub fn full_caption(&self) -> String {
        if self.hashtags.is_empty() {
            return self.caption.clone();
        }
        let tags = self
            .hashtags
            .iter()
            .map(|tag| format!("#{}", tag))
            .collect::<Vec<_>>()
            .join(" ");
        format!("{}\n\n{}", self.caption, tags)
    }

    /// The rendered video URL, or a validation error when the record was
    /// never rendered
    pub fn video_url(&self) -> Result<&str> {
        self.video_url.as_deref().ok_or_else(|| {
            PlatformError::Validation(format!(
                "Content {} has no rendered video URL to publish",
                self.content_id
            ))
            .into()
        })
    }
}

/// Platform trait for unified posting across social platforms
#[async_trait]
pub trait Platform: Send + Sync {
    /// Lowercase platform identifier (e.g. "instagram", "tiktok")
    fn name(&self) -> &str;

    /// Whether the required credentials are present
    ///
    /// When this returns false the dispatcher reports a configuration
    /// failure without invoking `publish`.
    fn is_configured(&self) -> bool;

    /// Human-readable description of what configuration is missing
    fn configuration_hint(&self) -> String {
        format!("{} credentials not configured", self.name())
    }

    /// Maximum caption length accepted by the platform, if any
    fn caption_limit(&self) -> Option<usize>;

    /// Validate a caption against platform requirements
    fn validate_caption(&self, caption: &str) -> Result<()> {
        if caption.trim().is_empty() {
            return Err(
                PlatformError::Validation("Caption cannot be empty".to_string()).into(),
            );
        }
        if let Some(limit) = self.caption_limit() {
            let count = caption.chars().count();
            if count > limit {
                return Err(PlatformError::Validation(format!(
                    "Caption exceeds {} character limit (got {} characters)",
                    limit, count
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Publish a submission and return the provider-assigned post ID
    async fn publish(&self, submission: &Submission) -> Result<String>;
}

/// Create platform adapters from configuration
///
/// Builds one adapter per enabled platform. Adapters missing credentials
/// are still created; they surface as configuration failures at posting
/// time rather than blocking the rest of the dispatch.
pub fn build_platforms(config: &Config) -> Vec<Box<dyn Platform>> {
    let mut platforms: Vec<Box<dyn Platform>> = Vec::new();

    let instagram_config = config.instagram.clone().unwrap_or_default();
    if instagram_config.enabled {
        platforms.push(Box::new(instagram::InstagramPlatform::from_env(
            &instagram_config,
        )));
    }

    let tiktok_config = config.tiktok.clone().unwrap_or_default();
    if tiktok_config.enabled {
        platforms.push(Box::new(tiktok::TiktokPlatform::from_env(&tiktok_config)));
    }

    info!("Created {} platform adapter(s)", platforms.len());

    platforms
}
