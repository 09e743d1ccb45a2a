//! Request validation
//!
//! Validates user input before any network call. Errors block the action;
//! warnings are advisory (the caption-length and duration guidance are
//! intended ranges, not hard limits).

use crate::types::{ContentRequest, KNOWN_PLATFORMS};

/// Intended caption length ceiling (not enforced at posting time)
const CAPTION_INTENDED_LIMIT: usize = 150;
/// Expected script duration range in seconds
const DURATION_RANGE: std::ops::RangeInclusive<u32> = 15..=60;

/// Result of validating a request
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn from_parts(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Service for validating requests before they reach the network
#[derive(Clone, Default)]
pub struct ValidationService;

impl ValidationService {
    pub fn new() -> Self {
        Self
    }

    /// Validate a content generation request
    pub fn validate_request(&self, request: &ContentRequest) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if request.topic.trim().is_empty() {
            errors.push("Topic cannot be empty".to_string());
        }

        if request.platforms.is_empty() {
            errors.push("At least one platform must be selected".to_string());
        }

        for platform in &request.platforms {
            if !KNOWN_PLATFORMS.contains(&platform.as_str()) {
                errors.push(format!(
                    "Unknown platform '{}'. Valid options: {}",
                    platform,
                    KNOWN_PLATFORMS.join(", ")
                ));
            }
        }

        if !DURATION_RANGE.contains(&request.duration) {
            warnings.push(format!(
                "Duration {}s is outside the expected {}-{}s range for short-form video",
                request.duration,
                DURATION_RANGE.start(),
                DURATION_RANGE.end()
            ));
        }

        ValidationReport::from_parts(errors, warnings)
    }

    /// Advisory check of a caption against the intended length
    pub fn caption_warnings(&self, caption: &str) -> Vec<String> {
        let count = caption.chars().count();
        if count > CAPTION_INTENDED_LIMIT {
            vec![format!(
                "Caption is {} characters; {} or fewer is recommended",
                count, CAPTION_INTENDED_LIMIT
            )]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContentStyle;

    fn request() -> ContentRequest {
        ContentRequest {
            topic: "Healthy meal prep".to_string(),
            style: ContentStyle::Educational,
            duration: 30,
            platforms: vec!["instagram".to_string()],
            video_url: None,
        }
    }

    #[test]
    fn test_valid_request() {
        let report = ValidationService::new().validate_request(&request());
        assert!(report.valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_topic_rejected() {
        let mut req = request();
        req.topic = "   ".to_string();

        let report = ValidationService::new().validate_request(&req);
        assert!(!report.valid);
        assert!(report.errors[0].contains("Topic"));
    }

    #[test]
    fn test_no_platforms_rejected() {
        let mut req = request();
        req.platforms.clear();

        let report = ValidationService::new().validate_request(&req);
        assert!(!report.valid);
        assert!(report.errors[0].contains("platform"));
    }

    #[test]
    fn test_unknown_platform_rejected() {
        let mut req = request();
        req.platforms.push("friendster".to_string());

        let report = ValidationService::new().validate_request(&req);
        assert!(!report.valid);
        assert!(report.errors[0].contains("friendster"));
    }

    #[test]
    fn test_duration_out_of_range_warns_only() {
        let mut req = request();
        req.duration = 120;

        let report = ValidationService::new().validate_request(&req);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("120"));
    }

    #[test]
    fn test_caption_length_advisory() {
        let service = ValidationService::new();

        assert!(service.caption_warnings("short and sweet").is_empty());

        let long = "a".repeat(151);
        let warnings = service.caption_warnings(&long);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("151"));
    }
}
