//! reel-send - Background daemon for scheduled posting
//!
//! Monitors the content queue and posts records whose scheduled time has
//! arrived. The dispatcher's ready -> posting transition doubles as the
//! claim that prevents a record from being fired twice.

use clap::Parser;
use libreelcast::{ReelcastService, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "reel-send")]
#[command(version)]
#[command(about = "Background daemon for scheduled posting")]
#[command(long_about = "\
reel-send - Background daemon for scheduled posting

DESCRIPTION:
    reel-send is a long-running daemon that polls the content queue and
    posts records whose scheduled time has arrived. Posting outcomes are
    recorded per platform; a record with any failed platform moves to
    the error state for manual retry.

USAGE:
    # Run in foreground (logs to stderr)
    reel-send

    # Run with custom poll interval
    reel-send --poll-interval 30

SIGNALS:
    SIGTERM, SIGINT - Graceful shutdown (finishes the current pass)

CONFIGURATION:
    Configuration file: ~/.config/reelcast/config.toml

    [scheduling]
    poll_interval = 60  # seconds between polls
    anchor_hour = 10    # hour of day for auto-scheduled slots

EXIT CODES:
    0 - Clean shutdown
    1 - Runtime error
    2 - Configuration error
")]
struct Cli {
    /// Poll interval in seconds (overrides config)
    #[arg(long, value_name = "SECONDS")]
    poll_interval: Option<u64>,

    /// Enable verbose logging to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Process due posts once and exit (for testing)
    #[arg(long, hide = true)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    init_logging(cli.verbose);

    let config = libreelcast::Config::load()?;
    let poll_interval = cli
        .poll_interval
        .unwrap_or(config.scheduling.poll_interval);
    let service = ReelcastService::from_config(config).await?;

    info!("reel-send daemon starting");
    info!("Poll interval: {}s", poll_interval);

    let shutdown = Arc::new(AtomicBool::new(false));
    setup_signal_handlers(shutdown.clone())?;

    if cli.once {
        process_due_posts(&service).await?;
        info!("reel-send: processed posts once, exiting");
    } else {
        run_daemon_loop(&service, poll_interval, shutdown).await?;
    }

    info!("reel-send daemon stopped");
    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Set up signal handlers for graceful shutdown
fn setup_signal_handlers(shutdown: Arc<AtomicBool>) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(|e| {
        libreelcast::ReelcastError::InvalidInput(format!("Signal setup failed: {}", e))
    })?;

    let shutdown_clone = shutdown.clone();
    std::thread::spawn(move || {
        for sig in signals.forever() {
            match sig {
                SIGTERM | SIGINT => {
                    info!("Received shutdown signal, stopping gracefully...");
                    shutdown_clone.store(true, Ordering::Relaxed);
                    break;
                }
                _ => {}
            }
        }
    });

    Ok(())
}

/// Main daemon loop
async fn run_daemon_loop(
    service: &ReelcastService,
    poll_interval: u64,
    shutdown: Arc<AtomicBool>,
) -> Result<()> {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            info!("Shutdown requested, stopping daemon loop");
            break;
        }

        if let Err(e) = process_due_posts(service).await {
            error!("Error processing posts: {}", e);
        }

        // Sleep until next poll (check shutdown every second)
        for _ in 0..poll_interval {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }
            sleep(Duration::from_secs(1)).await;
        }
    }

    Ok(())
}

/// Post all records that are due
async fn process_due_posts(service: &ReelcastService) -> Result<()> {
    let due = service.queue().due(chrono::Utc::now()).await?;

    if due.is_empty() {
        return Ok(());
    }

    info!("Found {} record(s) due for posting", due.len());

    for record in due {
        info!("Posting scheduled record: {}", record.id);

        match service.posting().post_record(&record.id, None).await {
            Ok(aggregate) if aggregate.all_succeeded => {
                info!("Posted {} to all platforms", record.id);
            }
            Ok(aggregate) => {
                warn!(
                    "Record {} had failures: {}",
                    record.id,
                    aggregate.first_error().unwrap_or("unknown error")
                );
            }
            Err(e) => {
                // Keep processing the rest of the due queue
                error!("Failed to post {}: {}", record.id, e);
            }
        }
    }

    Ok(())
}
