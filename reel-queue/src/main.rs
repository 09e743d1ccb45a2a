//! reel-queue - Manage the content queue
//!
//! Unix-style tool for listing, inspecting, deleting, and scheduling
//! queued content records.

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use libreelcast::scheduling::{parse_schedule, PostingFrequency};
use libreelcast::types::ContentStatus;
use libreelcast::{ReelcastError, ReelcastService, Result};
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "reel-queue")]
#[command(version)]
#[command(about = "Manage the content queue")]
#[command(long_about = "\
reel-queue - Manage the content queue

DESCRIPTION:
    reel-queue lists, inspects, deletes, and schedules queued content
    records. Scheduled records are posted by the reel-send daemon when
    their time arrives.

COMMANDS:
    list        List queue contents
    show        Show one record with its posting history
    delete      Delete a record
    schedule    Schedule a record for a future time
    unschedule  Clear a record's schedule
    auto        Spread all unscheduled ready records over future slots
    stats       Show queue statistics

USAGE EXAMPLES:
    # List everything in the queue
    reel-queue list

    # Only errored records, as JSON
    reel-queue list --status error --format json

    # Schedule a record for tomorrow morning
    reel-queue schedule content-1731510000000-1a2b3c4d \"tomorrow 10am\"

    # Auto-schedule two posts per day
    reel-queue auto --frequency twice-daily

CONFIGURATION:
    Configuration file: ~/.config/reelcast/config.toml
    Database location:  ~/.local/share/reelcast/queue.db

EXIT CODES:
    0 - Success
    1 - Operation failed
    3 - Invalid input (bad content ID, time format, etc.)
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List queue contents
    List {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Filter by status (generating, ready, posting, posted, error)
        #[arg(short, long)]
        status: Option<String>,

        /// Maximum number of records to show
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },

    /// Show one record with its posting history
    Show {
        /// Content ID to show
        content_id: String,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Delete a record
    Delete {
        /// Content ID to delete
        content_id: String,
    },

    /// Schedule a record for a future time
    Schedule {
        /// Content ID to schedule
        content_id: String,

        /// Schedule time (e.g., "tomorrow 10am", "2h", "2026-11-20 15:00")
        time: String,
    },

    /// Clear a record's schedule
    Unschedule {
        /// Content ID to unschedule
        content_id: String,
    },

    /// Spread all unscheduled ready records over future slots
    Auto {
        /// Posting frequency: daily, twice-daily, thrice-daily
        #[arg(short, long, default_value = "daily")]
        frequency: String,
    },

    /// Show queue statistics
    Stats {
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
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

fn format_time(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}

async fn run(cli: Cli) -> Result<()> {
    let service = ReelcastService::new().await?;

    match cli.command {
        Commands::List {
            format,
            status,
            limit,
        } => {
            let status = status
                .map(|s| ContentStatus::from_str(&s).map_err(ReelcastError::InvalidInput))
                .transpose()?;
            let records = service.queue().list(status, limit).await?;

            if format == "json" {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&records)
                        .map_err(|e| ReelcastError::InvalidInput(e.to_string()))?
                );
            } else if records.is_empty() {
                println!("Queue is empty");
            } else {
                for record in records {
                    let schedule = record
                        .scheduled_for
                        .map(|t| format!(" (scheduled {})", format_time(t)))
                        .unwrap_or_default();
                    println!(
                        "{}  [{}]{}  {}",
                        record.id, record.status, schedule, record.topic
                    );
                }
            }
        }

        Commands::Show { content_id, format } => {
            let fetched = service.queue().get(&content_id).await?;

            if format == "json" {
                let value = serde_json::json!({
                    "content": fetched.content,
                    "postingRecords": fetched.records,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&value)
                        .map_err(|e| ReelcastError::InvalidInput(e.to_string()))?
                );
            } else {
                let record = &fetched.content;
                println!("Content: {}", record.id);
                println!("  Topic:     {}", record.topic);
                println!("  Status:    {}", record.status);
                println!("  Caption:   {}", record.caption);
                println!("  Hashtags:  {}", record.hashtags.join(", "));
                println!("  Platforms: {}", record.platforms.join(", "));
                println!("  Created:   {}", format_time(record.created_at));
                if let Some(t) = record.scheduled_for {
                    println!("  Scheduled: {}", format_time(t));
                }
                if let Some(t) = record.posted_at {
                    println!("  Posted:    {}", format_time(t));
                }
                if let Some(e) = &record.error_message {
                    println!("  Error:     {}", e);
                }
                if !fetched.records.is_empty() {
                    println!("  History:");
                    for attempt in &fetched.records {
                        let result = if attempt.success {
                            attempt.platform_post_id.clone().unwrap_or_default()
                        } else {
                            attempt
                                .error_message
                                .clone()
                                .unwrap_or_else(|| "failed".to_string())
                        };
                        println!(
                            "    {} {}: {}",
                            if attempt.success { "ok " } else { "ERR" },
                            attempt.platform,
                            result
                        );
                    }
                }
                println!();
                println!("{}", record.script);
            }
        }

        Commands::Delete { content_id } => {
            service.queue().delete(&content_id).await?;
            println!("Deleted {}", content_id);
        }

        Commands::Schedule { content_id, time } => {
            let when = parse_schedule(&time)?;
            service.queue().schedule(&content_id, when).await?;
            println!("Scheduled {} for {}", content_id, when.to_rfc3339());
        }

        Commands::Unschedule { content_id } => {
            service.queue().unschedule(&content_id).await?;
            println!("Unscheduled {}", content_id);
        }

        Commands::Auto { frequency } => {
            let frequency =
                PostingFrequency::from_str(&frequency).map_err(ReelcastError::InvalidInput)?;
            let assigned = service.queue().auto_schedule(frequency).await?;

            if assigned.is_empty() {
                println!("No unscheduled ready records");
            } else {
                for (content_id, when) in &assigned {
                    println!("{} -> {}", content_id, when.to_rfc3339());
                }
                println!("Scheduled {} record(s)", assigned.len());
            }
        }

        Commands::Stats { format } => {
            let stats = service.queue().stats().await?;

            if format == "json" {
                let value = serde_json::json!({
                    "total": stats.total,
                    "byStatus": stats.by_status.iter().cloned().collect::<std::collections::BTreeMap<String, i64>>(),
                    "scheduled": stats.scheduled,
                    "nextDue": stats.next_due,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&value)
                        .map_err(|e| ReelcastError::InvalidInput(e.to_string()))?
                );
            } else {
                println!("Total records: {}", stats.total);
                for (status, count) in &stats.by_status {
                    println!("  {}: {}", status, count);
                }
                println!("Scheduled: {}", stats.scheduled);
                if let Some(next) = stats.next_due {
                    println!("Next due: {}", format_time(next));
                }
            }
        }
    }

    Ok(())
}
