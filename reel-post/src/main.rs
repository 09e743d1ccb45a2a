//! reel-post - Post queued content to social platforms
//!
//! Dispatches a ready record to its target platforms and reports the
//! per-platform outcomes. A partial failure leaves the record in the
//! error state; --retry resets it to ready first.

use clap::Parser;
use libreelcast::{ReelcastError, ReelcastService, Result};

#[derive(Parser, Debug)]
#[command(name = "reel-post")]
#[command(version)]
#[command(about = "Post queued content to social platforms", long_about = "\
reel-post - Post queued content to social platforms

DESCRIPTION:
    reel-post dispatches a ready record from the queue to its target
    platforms (Instagram, TikTok). Each platform is invoked
    independently; one platform's failure never blocks the others.

USAGE EXAMPLES:
    # Post a record to all of its target platforms
    reel-post content-1731510000000-1a2b3c4d

    # Post to a subset of the record's platforms
    reel-post content-1731510000000-1a2b3c4d --platform instagram

    # Reset an errored record and post it again
    reel-post content-1731510000000-1a2b3c4d --retry

CONFIGURATION:
    Configuration file: ~/.config/reelcast/config.toml
    Credentials:        INSTAGRAM_ACCESS_TOKEN, INSTAGRAM_USER_ID,
                        TIKTOK_ACCESS_TOKEN environment variables

EXIT CODES:
    0 - Posted successfully to all platforms
    1 - One or more platforms failed
    2 - Missing credentials or configuration error
    3 - Invalid input
")]
struct Cli {
    /// Content ID to post
    content_id: String,

    /// Target specific platform(s) (comma-separated subset of the record's platforms)
    #[arg(short, long)]
    platform: Option<String>,

    /// Reset an errored record back to ready before posting
    #[arg(short, long)]
    retry: bool,

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

    if cli.retry {
        service.posting().retry(&cli.content_id).await?;
    }

    let filter: Option<Vec<String>> = cli.platform.as_ref().map(|list| {
        list.split(',')
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect()
    });

    let aggregate = service
        .posting()
        .post_record(&cli.content_id, filter.as_deref())
        .await?;

    match cli.format.as_str() {
        "json" => {
            let value = serde_json::json!({
                "success": aggregate.all_succeeded,
                "results": aggregate.outcomes,
                "message": aggregate.message(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&value)
                    .map_err(|e| ReelcastError::InvalidInput(e.to_string()))?
            );
        }
        _ => {
            for outcome in &aggregate.outcomes {
                if outcome.success {
                    println!(
                        "{}: posted ({})",
                        outcome.platform,
                        outcome.post_id.as_deref().unwrap_or("-")
                    );
                } else {
                    println!(
                        "{}: failed - {}",
                        outcome.platform,
                        outcome.error.as_deref().unwrap_or("unknown error")
                    );
                }
            }
            println!("{}", aggregate.message());
        }
    }

    if !aggregate.all_succeeded {
        std::process::exit(1);
    }

    Ok(())
}
