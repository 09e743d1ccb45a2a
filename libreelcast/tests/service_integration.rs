//! Service-level integration tests
//!
//! Exercise the full pipeline (generate, schedule, dispatch) through the
//! `ReelcastService` facade with a scripted chat backend and mock
//! platform adapters, the same wiring the binaries use minus the network.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use libreelcast::config::Config;
use libreelcast::llm::ChatBackend;
use libreelcast::platforms::mock::MockPlatform;
use libreelcast::platforms::Platform;
use libreelcast::scheduling::PostingFrequency;
use libreelcast::types::{ContentRequest, ContentStyle};
use libreelcast::{ContentStatus, ReelcastService, Result};
use std::sync::Arc;
use std::sync::Mutex;

/// Scripted backend: pops canned responses in order
struct ScriptedBackend {
    responses: Mutex<Vec<Result<String>>>,
}

impl ScriptedBackend {
    fn new(responses: Vec<Result<String>>) -> Arc<Self> {
        let mut responses = responses;
        responses.reverse();
        Arc::new(Self {
            responses: Mutex::new(responses),
        })
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn complete(&self, _system: &str, _user: &str, _temperature: f32) -> Result<String> {
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Ok(String::new()))
    }
}

fn memory_config() -> Config {
    let mut config = Config::default_config();
    config.database.path = ":memory:".to_string();
    config
}

fn request(platforms: &[&str]) -> ContentRequest {
    ContentRequest {
        topic: "Morning productivity habits".to_string(),
        style: ContentStyle::Educational,
        duration: 30,
        platforms: platforms.iter().map(|s| s.to_string()).collect(),
        video_url: Some("https://cdn.example/video.mp4".to_string()),
    }
}

async fn service_with(
    backend: Arc<dyn ChatBackend>,
    platforms: Vec<Box<dyn Platform>>,
) -> ReelcastService {
    ReelcastService::from_parts(memory_config(), backend, platforms)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_generate_then_post_full_pipeline() {
    let backend = ScriptedBackend::new(vec![
        Ok("Hook in three seconds. Value. Call to action.".to_string()),
        Ok("CAPTION: Own your morning\nHASHTAGS: productivity, #morning, habits".to_string()),
    ]);
    let platforms: Vec<Box<dyn Platform>> = vec![
        Box::new(MockPlatform::success("instagram")),
        Box::new(MockPlatform::success("tiktok")),
    ];
    let service = service_with(backend, platforms).await;

    // Generate
    let record = service
        .generation()
        .generate(request(&["instagram", "tiktok"]))
        .await
        .unwrap();
    assert_eq!(record.status, ContentStatus::Ready);
    assert_eq!(record.caption, "Own your morning");
    assert_eq!(record.hashtags, vec!["productivity", "morning", "habits"]);

    // Post
    let aggregate = service.posting().post_record(&record.id, None).await.unwrap();
    assert!(aggregate.all_succeeded);
    assert_eq!(aggregate.outcomes.len(), 2);

    // Final state
    let stored = service.database().get_content(&record.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ContentStatus::Posted);
    assert!(stored.posted_at.is_some());

    let history = service
        .database()
        .get_posting_records(&record.id)
        .await
        .unwrap();
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|r| r.success));
}

#[tokio::test]
async fn test_partial_failure_then_retry_roundtrip() {
    let backend = ScriptedBackend::new(vec![
        Ok("Script".to_string()),
        Ok("CAPTION: x\nHASHTAGS: y".to_string()),
    ]);
    let platforms: Vec<Box<dyn Platform>> = vec![
        Box::new(MockPlatform::success("instagram")),
        Box::new(MockPlatform::publish_failure("tiktok", "token expired")),
    ];
    let service = service_with(backend, platforms).await;

    let record = service
        .generation()
        .generate(request(&["instagram", "tiktok"]))
        .await
        .unwrap();

    // Partial failure: one success, one failure, record moves to error
    let aggregate = service.posting().post_record(&record.id, None).await.unwrap();
    assert!(!aggregate.all_succeeded);
    let successes = aggregate.outcomes.iter().filter(|o| o.success).count();
    assert_eq!(successes, 1);

    let stored = service.database().get_content(&record.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ContentStatus::Error);
    assert!(stored
        .error_message
        .as_deref()
        .unwrap()
        .contains("token expired"));

    // Explicit retry resets error -> ready and clears the message
    let reset = service.posting().retry(&record.id).await.unwrap();
    assert_eq!(reset.status, ContentStatus::Ready);
    assert_eq!(reset.error_message, None);
}

#[tokio::test]
async fn test_unconfigured_platform_reports_without_network_call() {
    let backend = ScriptedBackend::new(vec![
        Ok("Script".to_string()),
        Ok("CAPTION: x\nHASHTAGS: y".to_string()),
    ]);
    let mock = MockPlatform::not_configured("instagram");
    let calls = mock.call_counter();
    let service = service_with(backend, vec![Box::new(mock)]).await;

    let record = service
        .generation()
        .generate(request(&["instagram"]))
        .await
        .unwrap();

    let aggregate = service.posting().post_record(&record.id, None).await.unwrap();

    assert!(!aggregate.all_succeeded);
    assert!(aggregate.outcomes[0]
        .error
        .as_deref()
        .unwrap()
        .contains("not configured"));
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_schedule_and_due_selection() {
    let backend = ScriptedBackend::new(vec![
        Ok("Script".to_string()),
        Ok("CAPTION: x\nHASHTAGS: y".to_string()),
    ]);
    let service = service_with(backend, vec![]).await;

    let record = service
        .generation()
        .generate(request(&["instagram"]))
        .await
        .unwrap();

    // Past schedule is rejected, record untouched
    let past = Utc::now() - Duration::hours(1);
    assert!(service.queue().schedule(&record.id, past).await.is_err());
    let stored = service.database().get_content(&record.id).await.unwrap().unwrap();
    assert_eq!(stored.scheduled_for, None);

    // Future schedule sticks, but the record is not due yet
    let future = Utc::now() + Duration::hours(3);
    service.queue().schedule(&record.id, future).await.unwrap();
    assert!(service.queue().due(Utc::now()).await.unwrap().is_empty());

    // Once the clock passes the slot, the record is due
    let due = service
        .queue()
        .due(future + Duration::seconds(1))
        .await
        .unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, record.id);
}

#[tokio::test]
async fn test_auto_schedule_spreads_generated_records() {
    let backend = ScriptedBackend::new(vec![
        Ok("Script 1".to_string()),
        Ok("CAPTION: one\nHASHTAGS: a".to_string()),
        Ok("Script 2".to_string()),
        Ok("CAPTION: two\nHASHTAGS: b".to_string()),
        Ok("Script 3".to_string()),
        Ok("CAPTION: three\nHASHTAGS: c".to_string()),
    ]);
    let service = service_with(backend, vec![]).await;

    for _ in 0..3 {
        service
            .generation()
            .generate(request(&["instagram"]))
            .await
            .unwrap();
    }

    let assigned = service
        .queue()
        .auto_schedule(PostingFrequency::ThriceDaily)
        .await
        .unwrap();

    assert_eq!(assigned.len(), 3);
    let now = Utc::now();
    assert!(assigned.iter().all(|(_, when)| *when > now));
    assert_eq!(assigned[1].1 - assigned[0].1, Duration::hours(8));
    assert_eq!(assigned[2].1 - assigned[1].1, Duration::hours(8));

    // A second pass finds nothing left to schedule
    let second = service
        .queue()
        .auto_schedule(PostingFrequency::ThriceDaily)
        .await
        .unwrap();
    assert!(second.is_empty());
}

#[tokio::test]
async fn test_delete_removes_record_and_history() {
    let backend = ScriptedBackend::new(vec![
        Ok("Script".to_string()),
        Ok("CAPTION: x\nHASHTAGS: y".to_string()),
    ]);
    let platforms: Vec<Box<dyn Platform>> = vec![Box::new(MockPlatform::success("instagram"))];
    let service = service_with(backend, platforms).await;

    let record = service
        .generation()
        .generate(request(&["instagram"]))
        .await
        .unwrap();
    service.posting().post_record(&record.id, None).await.unwrap();

    service.queue().delete(&record.id).await.unwrap();

    assert!(service
        .database()
        .get_content(&record.id)
        .await
        .unwrap()
        .is_none());
    assert!(service.queue().get(&record.id).await.is_err());
}
