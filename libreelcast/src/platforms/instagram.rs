//! Instagram platform implementation
//!
//! Publishes through the Instagram Graph API's two-phase flow: first a
//! media container is created referencing the uploaded video asset, then
//! a separate publish call makes the container live.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::{InstagramConfig, ENV_INSTAGRAM_ACCESS_TOKEN, ENV_INSTAGRAM_USER_ID};
use crate::error::{PlatformError, Result};
use crate::platforms::{Platform, Submission};
use crate::types::PLATFORM_INSTAGRAM;

/// Instagram caption limit
const CAPTION_LIMIT: usize = 2200;

/// Instagram Graph API client
pub struct InstagramPlatform {
    client: reqwest::Client,
    api_base: String,
    user_id: Option<String>,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaResponse {
    id: String,
}

impl InstagramPlatform {
    pub fn new(api_base: String, user_id: Option<String>, access_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            user_id,
            access_token,
        }
    }

    /// Build the adapter with credentials from the environment
    pub fn from_env(config: &InstagramConfig) -> Self {
        Self::new(
            config.api_base.clone(),
            std::env::var(ENV_INSTAGRAM_USER_ID).ok(),
            std::env::var(ENV_INSTAGRAM_ACCESS_TOKEN).ok(),
        )
    }

    fn credentials(&self) -> Result<(&str, &str)> {
        match (self.user_id.as_deref(), self.access_token.as_deref()) {
            (Some(user_id), Some(token)) => Ok((user_id, token)),
            _ => Err(PlatformError::NotConfigured(self.configuration_hint()).into()),
        }
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
        operation: &str,
    ) -> Result<T> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                PlatformError::Network(format!("Instagram {} failed: {}", operation, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PlatformError::Posting(format!(
                "Instagram {} failed ({}): {}",
                operation, status, error_text
            ))
            .into());
        }

        response.json::<T>().await.map_err(|e| {
            PlatformError::Posting(format!(
                "Instagram {} returned an unreadable response: {}",
                operation, e
            ))
            .into()
        })
    }
}

#[async_trait]
impl Platform for InstagramPlatform {
    fn name(&self) -> &str {
        PLATFORM_INSTAGRAM
    }

    fn is_configured(&self) -> bool {
        self.user_id.is_some() && self.access_token.is_some()
    }

    fn configuration_hint(&self) -> String {
        format!(
            "Instagram credentials not configured. Set {} and {} in your environment.",
            ENV_INSTAGRAM_ACCESS_TOKEN, ENV_INSTAGRAM_USER_ID
        )
    }

    fn caption_limit(&self) -> Option<usize> {
        Some(CAPTION_LIMIT)
    }

    async fn publish(&self, submission: &Submission) -> Result<String> {
        let (user_id, access_token) = self.credentials()?;
        let video_url = submission.video_url()?;
        let caption = submission.full_caption();
        self.validate_caption(&caption)?;

        // Phase 1: create a media container referencing the uploaded asset
        let container: MediaResponse = self
            .post_json(
                &format!("{}/{}/media", self.api_base, user_id),
                &serde_json::json!({
                    "video_url": video_url,
                    "caption": caption,
                    "access_token": access_token,
                }),
                "container creation",
            )
            .await?;

        debug!(content_id = %submission.content_id, container = %container.id, "created media container");

        // Phase 2: publish the container
        let published: MediaResponse = self
            .post_json(
                &format!("{}/{}/media_publish", self.api_base, user_id),
                &serde_json::json!({
                    "creation_id": container.id,
                    "access_token": access_token,
                }),
                "publish",
            )
            .await?;

        Ok(published.id)
    }
}
