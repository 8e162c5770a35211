//! # kkutu-replay
//!
//! Feeds a recorded capture of push messages (one `{"type", "payload"}`
//! JSON object per line) through the event channel and prints every
//! lifecycle event it produces as a JSON line on stdout.

#![deny(unsafe_code)]

mod replay;

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kkutu_core::LifecycleEvent;
use kkutu_sync::{EventChannel, JsonPushParser, MessageTypes, SyncContext, Synchronizer};
use tracing::{info, warn};

/// Replay a push-message capture.
#[derive(Parser, Debug)]
#[command(
    name = "kkutu-replay",
    about = "Replay a push-message capture through the sync core"
)]
struct Cli {
    /// JSONL capture to replay (`-` for stdin).
    #[arg(long)]
    input: PathBuf,

    /// Settings file (defaults to `~/.kkutu/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log level (overrides settings).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings = match &args.settings {
        Some(path) => kkutu_settings::load_settings_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => kkutu_settings::load_settings().context("Failed to load settings")?,
    };
    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| settings.logging.level.clone());
    kkutu_core::logging::init_subscriber(&level);

    let ctx = SyncContext::new(settings);
    let sync = Arc::new(Synchronizer::new(&ctx));
    let channel = EventChannel::new(
        Arc::clone(&sync),
        Arc::new(JsonPushParser),
        &MessageTypes::default(),
    );

    let printer = ctx.bus.subscribe(|event: &LifecycleEvent| {
        match serde_json::to_string(event) {
            Ok(line) => {
                let mut out = io::stdout().lock();
                if let Err(err) = writeln!(out, "{line}") {
                    warn!(error = %err, "failed to write event");
                }
            }
            Err(err) => warn!(error = %err, "failed to serialize event"),
        }
    });

    let stats = if args.input.as_os_str() == "-" {
        replay::replay(io::stdin().lock(), &channel).await?
    } else {
        let file = File::open(&args.input)
            .with_context(|| format!("Failed to open {}", args.input.display()))?;
        replay::replay(BufReader::new(file), &channel).await?
    };

    printer.unsubscribe();
    info!(
        routed = stats.routed,
        dropped = stats.dropped,
        failed = stats.failed,
        malformed = stats.malformed,
        session_id = %sync.session_id(),
        "replay finished"
    );
    Ok(())
}
