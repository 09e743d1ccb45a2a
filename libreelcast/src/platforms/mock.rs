//! Mock platform implementation for testing
//!
//! A configurable fake that can simulate successes, failures, missing
//! configuration, and network latency. Used by dispatcher and daemon
//! tests to verify multi-platform posting logic without credentials or
//! network access.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{PlatformError, Result};
use crate::platforms::{Platform, Submission};

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name (e.g., "mock-instagram")
    pub name: String,

    /// Whether publishing should succeed
    pub publish_succeeds: bool,

    /// Error to return on publish failure
    pub publish_error: Option<String>,

    /// Delay before completing operations (simulates network latency)
    pub delay: Duration,

    /// Caption limit for validation
    pub caption_limit: Option<usize>,

    /// Whether the platform reports itself as configured
    pub is_configured: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            publish_succeeds: true,
            publish_error: None,
            delay: Duration::from_millis(0),
            caption_limit: None,
            is_configured: true,
        }
    }
}

/// Mock platform for testing
pub struct MockPlatform {
    config: MockConfig,
    publish_calls: Arc<AtomicUsize>,
    submissions: Arc<Mutex<Vec<Submission>>>,
}

impl MockPlatform {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            publish_calls: Arc::new(AtomicUsize::new(0)),
            submissions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A mock platform that always succeeds
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// A mock platform whose publish call fails
    pub fn publish_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            publish_succeeds: false,
            publish_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// A mock platform with simulated latency
    pub fn with_delay(name: &str, delay: Duration) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            delay,
            ..Default::default()
        })
    }

    /// A mock platform missing its credentials
    pub fn not_configured(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            is_configured: false,
            ..Default::default()
        })
    }

    /// Number of times publish was invoked
    pub fn publish_call_count(&self) -> usize {
        self.publish_calls.load(Ordering::SeqCst)
    }

    /// Handle to the call counter, usable after the platform is boxed
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.publish_calls)
    }

    /// Submissions received so far
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Platform for MockPlatform {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured
    }

    fn caption_limit(&self) -> Option<usize> {
        self.config.caption_limit
    }

    async fn publish(&self, submission: &Submission) -> Result<String> {
        self.publish_calls.fetch_add(1, Ordering::SeqCst);

        if !self.config.delay.is_zero() {
            sleep(self.config.delay).await;
        }

        if !self.config.is_configured {
            return Err(PlatformError::NotConfigured(self.configuration_hint()).into());
        }

        if self.config.publish_succeeds {
            self.submissions.lock().unwrap().push(submission.clone());
            let post_id = format!(
                "{}-{}-{}",
                self.config.name,
                submission.content_id,
                self.publish_call_count()
            );
            Ok(post_id)
        } else {
            let error_msg = self
                .config
                .publish_error
                .clone()
                .unwrap_or_else(|| "Mock publish failed".to_string());
            Err(PlatformError::Posting(error_msg).into())
        }
    }
}
