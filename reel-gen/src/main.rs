//! reel-gen - Generate short-video content from a topic
//!
//! Runs the two-step generation pipeline (script, then caption and
//! hashtags) and stores the resulting record in the queue.

use clap::Parser;
use libreelcast::types::ContentStyle;
use libreelcast::{ContentRequest, ReelcastError, ReelcastService, Result};

#[derive(Parser, Debug)]
#[command(name = "reel-gen")]
#[command(version)]
#[command(about = "Generate short-video content from a topic", long_about = "\
reel-gen - Generate short-video content from a topic

DESCRIPTION:
    reel-gen asks the configured text-generation model for a short-form
    video script, then a caption and hashtags, and stores the result as
    a ready-to-post record in the local queue.

USAGE EXAMPLES:
    # Generate a 30-second educational video for both platforms
    reel-gen \"Morning productivity habits\"

    # Entertainment style, TikTok only, JSON output
    reel-gen \"Cold brew at home\" --style entertainment --platform tiktok --format json

    # Re-run only the caption step for a record whose second step failed
    reel-gen --regenerate content-1731510000000-1a2b3c4d

CONFIGURATION:
    Configuration file: ~/.config/reelcast/config.toml
    Database location:  ~/.local/share/reelcast/queue.db
    Credentials:        OPENAI_API_KEY environment variable

EXIT CODES:
    0 - Success
    1 - Generation failed
    2 - Missing credentials or configuration error
    3 - Invalid input
")]
struct Cli {
    /// Topic to generate content about
    topic: Option<String>,

    /// Content style: educational, entertainment, motivational, trending
    #[arg(short, long, default_value = "educational")]
    style: String,

    /// Target video length in seconds
    #[arg(short, long, default_value_t = 30)]
    duration: u32,

    /// Target platform(s), comma-separated (defaults to configured platforms)
    #[arg(short, long)]
    platform: Option<String>,

    /// URL of an already rendered video asset
    #[arg(long)]
    video_url: Option<String>,

    /// Re-run only the caption step for an existing record
    #[arg(long, value_name = "CONTENT_ID", conflicts_with = "topic")]
    regenerate: Option<String>,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text")]
    format: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("error")
            .with_writer(std::io::stderr)
            .init();
    }

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let service = ReelcastService::new().await?;

    let record = if let Some(content_id) = &cli.regenerate {
        service.generation().regenerate_caption(content_id).await?
    } else {
        let topic = match &cli.topic {
            Some(topic) => topic.clone(),
            None => {
                return Err(ReelcastError::InvalidInput(
                    "A topic is required (or --regenerate with a content ID)".to_string(),
                ))
            }
        };

        let style: ContentStyle = cli
            .style
            .parse()
            .map_err(ReelcastError::InvalidInput)?;

        let platforms = match &cli.platform {
            Some(list) => list
                .split(',')
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            None => libreelcast::Config::load()?.defaults.platforms,
        };

        let request = ContentRequest {
            topic,
            style,
            duration: cli.duration,
            platforms,
            video_url: cli.video_url.clone(),
        };

        let report = service.validation().validate_request(&request);
        if !report.valid {
            return Err(ReelcastError::InvalidInput(report.errors.join("; ")));
        }
        for warning in &report.warnings {
            eprintln!("Warning: {}", warning);
        }

        service.generation().generate(request).await?
    };

    match cli.format.as_str() {
        "json" => {
            println!(
                "{}",
                serde_json::to_string_pretty(&record)
                    .map_err(|e| ReelcastError::InvalidInput(e.to_string()))?
            );
        }
        _ => {
            println!("Generated content: {}", record.id);
            println!("  Topic:     {}", record.topic);
            println!("  Status:    {}", record.status);
            println!("  Caption:   {}", record.caption);
            println!("  Hashtags:  {}", record.hashtags.join(", "));
            println!("  Platforms: {}", record.platforms.join(", "));
            println!("  Script:    {} chars", record.script.chars().count());
        }
    }

    Ok(())
}
