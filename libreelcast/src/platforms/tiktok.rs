//! TikTok platform implementation
//!
//! Publishes through the TikTok share API's single-phase upload+publish
//! call. The provider reports errors in-band; a response is only a
//! success when its error code is "ok".

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::{TiktokConfig, ENV_TIKTOK_ACCESS_TOKEN};
use crate::error::{PlatformError, Result};
use crate::platforms::{Platform, Submission};
use crate::types::PLATFORM_TIKTOK;

/// TikTok title limit
const CAPTION_LIMIT: usize = 150;

/// TikTok share API client
pub struct TiktokPlatform {
    client: reqwest::Client,
    api_base: String,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShareResponse {
    data: Option<ShareData>,
    error: Option<ShareError>,
}

#[derive(Debug, Deserialize)]
struct ShareData {
    share_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ShareError {
    code: Option<String>,
    message: Option<String>,
}

impl TiktokPlatform {
    pub fn new(api_base: String, access_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    /// Build the adapter with credentials from the environment
    pub fn from_env(config: &TiktokConfig) -> Self {
        Self::new(
            config.api_base.clone(),
            std::env::var(ENV_TIKTOK_ACCESS_TOKEN).ok(),
        )
    }

    fn token(&self) -> Result<&str> {
        self.access_token
            .as_deref()
            .ok_or_else(|| PlatformError::NotConfigured(self.configuration_hint()).into())
    }
}

#[async_trait]
impl Platform for TiktokPlatform {
    fn name(&self) -> &str {
        PLATFORM_TIKTOK
    }

    fn is_configured(&self) -> bool {
        self.access_token.is_some()
    }

    fn configuration_hint(&self) -> String {
        format!(
            "TikTok credentials not configured. Set {} in your environment.",
            ENV_TIKTOK_ACCESS_TOKEN
        )
    }

    fn caption_limit(&self) -> Option<usize> {
        Some(CAPTION_LIMIT)
    }

    async fn publish(&self, submission: &Submission) -> Result<String> {
        let token = self.token()?;
        let video_url = submission.video_url()?;
        let title = submission.full_caption();

        let body = serde_json::json!({
            "video": {
                "video_url": video_url,
            },
            "post_info": {
                "title": title,
                "privacy_level": "PUBLIC_TO_EVERYONE",
                "disable_comment": false,
                "disable_duet": false,
                "disable_stitch": false,
            },
        });

        let response = self
            .client
            .post(format!("{}/share/video/upload/", self.api_base))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PlatformError::Network(format!("TikTok upload failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PlatformError::Posting(format!(
                "TikTok upload failed ({}): {}",
                status, error_text
            ))
            .into());
        }

        let share: ShareResponse = response.json().await.map_err(|e| {
            PlatformError::Posting(format!("TikTok returned an unreadable response: {}", e))
        })?;

        let code = share
            .error
            .as_ref()
            .and_then(|e| e.code.as_deref())
            .unwrap_or("ok");
        if code != "ok" {
            let message = share
                .error
                .as_ref()
                .and_then(|e| e.message.clone())
                .unwrap_or_else(|| format!("provider error code: {}", code));
            return Err(PlatformError::Posting(format!("TikTok upload rejected: {}", message)).into());
        }

        let share_id = share
            .data
            .and_then(|d| d.share_id)
            .ok_or_else(|| {
                PlatformError::Posting("TikTok response carried no share_id".to_string())
            })?;

        debug!(content_id = %submission.content_id, share_id = %share_id, "published to tiktok");

        Ok(share_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission() -> Submission {
        Submission {
            content_id: "content-1".to_string(),
            caption: "Caption".to_string(),
            hashtags: vec![],
            video_url: Some("https://cdn.example/video.mp4".to_string()),
        }
    }

    #[test]
    fn test_is_configured() {
        let unconfigured = TiktokPlatform::new("https://open-api.tiktok.example".to_string(), None);
        assert!(!unconfigured.is_configured());

        let configured = TiktokPlatform::new(
            "https://open-api.tiktok.example".to_string(),
            Some("token".to_string()),
        );
        assert!(configured.is_configured());
    }

    #[test]
    fn test_configuration_hint_names_env_var() {
        let platform = TiktokPlatform::new("https://open-api.tiktok.example".to_string(), None);
        let hint = platform.configuration_hint();
        assert!(hint.contains("TIKTOK_ACCESS_TOKEN"));
        assert!(hint.contains("not configured"));
    }

    #[tokio::test]
    async fn test_publish_without_credentials() {
        let platform = TiktokPlatform::new("https://open-api.tiktok.example".to_string(), None);
        let result = platform.publish(&submission()).await;

        match result {
            Err(e) => assert!(e.to_string().contains("not configured")),
            Ok(_) => panic!("expected configuration error"),
        }
    }

    #[tokio::test]
    async fn test_publish_without_video_url() {
        let platform = TiktokPlatform::new(
            "https://open-api.tiktok.example".to_string(),
            Some("token".to_string()),
        );
        let mut s = submission();
        s.video_url = None;

        let result = platform.publish(&s).await;
        match result {
            Err(e) => assert!(e.to_string().contains("no rendered video URL")),
            Ok(_) => panic!("expected validation error"),
        }
    }

    #[test]
    fn test_share_response_parsing() {
        let json = r#"{
            "data": { "share_id": "tt_abc123" },
            "error": { "code": "ok", "message": "" }
        }"#;
        let response: ShareResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.data.unwrap().share_id.as_deref(), Some("tt_abc123"));
        assert_eq!(response.error.unwrap().code.as_deref(), Some("ok"));
    }

    #[test]
    fn test_share_response_error_shape() {
        let json = r#"{
            "error": { "code": "access_token_invalid", "message": "The access token is invalid." }
        }"#;
        let response: ShareResponse = serde_json::from_str(json).unwrap();
        let error = response.error.unwrap();
        assert_eq!(error.code.as_deref(), Some("access_token_invalid"));
        assert!(error.message.unwrap().contains("invalid"));
    }
}
