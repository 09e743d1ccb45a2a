//! reel-api - JSON HTTP API for the content pipeline
//!
//! Exposes the generation and posting operations over HTTP:
//!
//! - `POST /generate-video` - generate a content record from a topic
//! - `POST /post-video` - post content to its target platforms

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use clap::Parser;
use libreelcast::platforms::Submission;
use libreelcast::{ContentRequest, ReelcastService};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "reel-api")]
#[command(version)]
#[command(about = "JSON HTTP API for the content pipeline", long_about = "\
reel-api - JSON HTTP API for the content pipeline

ENDPOINTS:
    POST /generate-video
        Body:   { \"topic\", \"style\", \"duration\", \"platforms\", \"videoUrl\"? }
        200:    the generated content record
        500:    { \"error\": string }

    POST /post-video
        Body:   { \"videoId\", \"platforms\", \"caption\", \"hashtags\", \"videoUrl\"? }
        200:    { \"success\": true, \"results\": [...], \"message\": string }
        207:    { \"success\": false, \"results\": [...], \"message\": string }
        500:    { \"error\": string }

CONFIGURATION:
    Configuration file: ~/.config/reelcast/config.toml
    Credentials:        OPENAI_API_KEY, INSTAGRAM_ACCESS_TOKEN,
                        INSTAGRAM_USER_ID, TIKTOK_ACCESS_TOKEN
")]
struct Cli {
    /// Address to bind
    #[arg(short, long, default_value = "127.0.0.1:3000")]
    bind: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone)]
struct AppState {
    service: Arc<ReelcastService>,
}

/// Body of POST /post-video
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostVideoRequest {
    video_id: String,
    platforms: Vec<String>,
    #[serde(default)]
    caption: String,
    #[serde(default)]
    hashtags: Vec<String>,
    #[serde(default)]
    video_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        libreelcast::logging::init_default();
    }

    let service = Arc::new(ReelcastService::new().await?);
    let state = AppState { service };

    let app = Router::new()
        .route("/generate-video", post(generate_video))
        .route("/post-video", post(post_video))
        .with_state(state);

    info!("reel-api listening on {}", cli.bind);
    let listener = tokio::net::TcpListener::bind(&cli.bind).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn generate_video(
    State(state): State<AppState>,
    Json(request): Json<ContentRequest>,
) -> (StatusCode, Json<Value>) {
    let report = state.service.validation().validate_request(&request);
    if !report.valid {
        return error_response(report.errors.join("; "));
    }

    match state.service.generation().generate(request).await {
        Ok(record) => match serde_json::to_value(&record) {
            Ok(value) => (StatusCode::OK, Json(value)),
            Err(e) => error_response(e.to_string()),
        },
        Err(e) => {
            error!("Generation failed: {}", e);
            error_response(e.to_string())
        }
    }
}

async fn post_video(
    State(state): State<AppState>,
    Json(request): Json<PostVideoRequest>,
) -> (StatusCode, Json<Value>) {
    let tracked = match state.service.database().get_content(&request.video_id).await {
        Ok(tracked) => tracked,
        Err(e) => return error_response(e.to_string()),
    };

    let result = match tracked {
        // Queued records post from their stored fields; the body's
        // platform list narrows the target set
        Some(_) => {
            state
                .service
                .posting()
                .post_record(&request.video_id, Some(&request.platforms))
                .await
        }
        // Unknown ids are posted ad-hoc from the body
        None => {
            let submission = Submission {
                content_id: request.video_id.clone(),
                caption: request.caption.clone(),
                hashtags: request.hashtags.clone(),
                video_url: request.video_url.clone(),
            };
            state
                .service
                .posting()
                .post_submission(submission, &request.platforms)
                .await
        }
    };

    match result {
        Ok(aggregate) => {
            let status = if aggregate.all_succeeded {
                StatusCode::OK
            } else {
                StatusCode::MULTI_STATUS
            };
            let body = json!({
                "success": aggregate.all_succeeded,
                "results": aggregate.outcomes,
                "message": aggregate.message(),
            });
            (status, Json(body))
        }
        Err(e) => {
            error!("Posting failed: {}", e);
            error_response(e.to_string())
        }
    }
}

fn error_response(message: String) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_video_request_parses_camel_case() {
        let json = r#"{
            "videoId": "content-1",
            "platforms": ["instagram", "tiktok"],
            "caption": "A caption",
            "hashtags": ["a", "b"],
            "videoUrl": "https://cdn.example/v.mp4"
        }"#;

        let request: PostVideoRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.video_id, "content-1");
        assert_eq!(request.platforms.len(), 2);
        assert_eq!(request.hashtags, vec!["a", "b"]);
        assert_eq!(
            request.video_url.as_deref(),
            Some("https://cdn.example/v.mp4")
        );
    }

    #[test]
    fn test_post_video_request_defaults() {
        let json = r#"{ "videoId": "content-1", "platforms": ["instagram"] }"#;

        let request: PostVideoRequest = serde_json::from_str(json).unwrap();
        assert!(request.caption.is_empty());
        assert!(request.hashtags.is_empty());
        assert_eq!(request.video_url, None);
    }
}
