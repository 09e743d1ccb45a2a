//! Core types for Reelcast

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Platform identifier for Instagram
pub const PLATFORM_INSTAGRAM: &str = "instagram";
/// Platform identifier for TikTok
pub const PLATFORM_TIKTOK: &str = "tiktok";
/// All platform identifiers with an adapter
pub const KNOWN_PLATFORMS: &[&str] = &[PLATFORM_INSTAGRAM, PLATFORM_TIKTOK];

/// Editorial style requested for a generated script
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentStyle {
    Educational,
    Entertainment,
    Motivational,
    Trending,
}

impl ContentStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Educational => "educational",
            Self::Entertainment => "entertainment",
            Self::Motivational => "motivational",
            Self::Trending => "trending",
        }
    }
}

impl FromStr for ContentStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "educational" => Ok(Self::Educational),
            "entertainment" => Ok(Self::Entertainment),
            "motivational" => Ok(Self::Motivational),
            "trending" => Ok(Self::Trending),
            _ => Err(format!(
                "Invalid style: '{}'. Valid options: educational, entertainment, motivational, trending",
                s
            )),
        }
    }
}

impl std::fmt::Display for ContentStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a content record
///
/// Transitions are monotonic (generating -> ready -> posting -> posted | error)
/// except for the explicit error -> ready retry reset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentStatus {
    Generating,
    Ready,
    Posting,
    Posted,
    Error,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generating => "generating",
            Self::Ready => "ready",
            Self::Posting => "posting",
            Self::Posted => "posted",
            Self::Error => "error",
        }
    }
}

impl FromStr for ContentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generating" => Ok(Self::Generating),
            "ready" => Ok(Self::Ready),
            "posting" => Ok(Self::Posting),
            "posted" => Ok(Self::Posted),
            "error" => Ok(Self::Error),
            _ => Err(format!("Invalid content status: '{}'", s)),
        }
    }
}

impl std::fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A request to generate content for one topic
///
/// Immutable once submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRequest {
    pub topic: String,
    pub style: ContentStyle,
    /// Target length of the video in seconds (expected range 15-60)
    pub duration: u32,
    pub platforms: Vec<String>,
    /// URL of the rendered video asset, if one already exists
    #[serde(default)]
    pub video_url: Option<String>,
}

/// The structured result of one generation cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: String,
    pub topic: String,
    pub script: String,
    pub caption: String,
    /// Bare tags, no leading `#`, no empty entries
    pub hashtags: Vec<String>,
    pub status: ContentStatus,
    pub platforms: Vec<String>,
    pub video_url: Option<String>,
    /// Unix timestamp; strictly in the future at the time it is set
    pub scheduled_for: Option<i64>,
    pub created_at: i64,
    pub posted_at: Option<i64>,
    #[serde(rename = "error")]
    pub error_message: Option<String>,
}

impl ContentRecord {
    /// Create a new record in the `generating` state
    pub fn new(request: &ContentRequest) -> Self {
        Self {
            id: generate_content_id(),
            topic: request.topic.clone(),
            script: String::new(),
            caption: String::new(),
            hashtags: Vec::new(),
            status: ContentStatus::Generating,
            platforms: request.platforms.clone(),
            video_url: request.video_url.clone(),
            scheduled_for: None,
            created_at: chrono::Utc::now().timestamp(),
            posted_at: None,
            error_message: None,
        }
    }
}

/// Generate a collision-resistant record identifier from wall-clock
/// time and random entropy.
pub fn generate_content_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let entropy: u32 = rand::thread_rng().gen();
    format!("content-{}-{:08x}", millis, entropy)
}

/// Outcome of one posting attempt on one platform
///
/// Never retried automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostingOutcome {
    pub platform: String,
    pub success: bool,
    /// Provider-assigned post ID (if successful)
    pub post_id: Option<String>,
    /// Error message (if failed)
    pub error: Option<String>,
}

impl PostingOutcome {
    pub fn ok(platform: impl Into<String>, post_id: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            success: true,
            post_id: Some(post_id.into()),
            error: None,
        }
    }

    pub fn failed(platform: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            success: false,
            post_id: None,
            error: Some(error.into()),
        }
    }
}

/// Database row recording one platform posting attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostingRecord {
    pub id: Option<i64>,
    pub content_id: String,
    pub platform: String,
    pub platform_post_id: Option<String>,
    pub posted_at: Option<i64>,
    pub success: bool,
    pub error_message: Option<String>,
}

impl PostingRecord {
    /// Build a row from an in-memory outcome
    pub fn from_outcome(content_id: &str, outcome: &PostingOutcome, now: i64) -> Self {
        Self {
            id: None,
            content_id: content_id.to_string(),
            platform: outcome.platform.clone(),
            platform_post_id: outcome.post_id.clone(),
            posted_at: if outcome.success { Some(now) } else { None },
            success: outcome.success,
            error_message: outcome.error.clone(),
        }
    }
}
