//! # Lyrics Search
//!
//! Publishes one lyrics search over Redis and prints the worker's reply.
//!
//! ```text
//! lyrics-search "Song X" "Artist Y" --timeout-secs 5
//! ```
//!
//! Exit codes: 0 with the result as JSON on stdout, 2 when no reply arrived
//! in time, 130 when interrupted. A matched song without lyrics still exits 0
//! but says so on stderr.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use lyrics_bridge::{LyricsSearchResult, SearchRequest};
use lyrics_runtime::{connect_redis, load_config, BridgeRuntime, ConfigOverrides};
use lyrics_telemetry::{init_telemetry, TelemetryConfig};

/// Search for song lyrics through the lyrics search worker
#[derive(Parser, Debug)]
#[command(name = "lyrics-search")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Song title
    title: String,

    /// Artist name
    artist: String,

    /// Seconds to wait for a reply (overrides LYRICS_SEARCH_TIMEOUT_SECS)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Channel requests are published on (overrides REDIS_REQUEST_CHANNEL)
    #[arg(long)]
    request_channel: Option<String>,

    /// Channel results arrive on (overrides REDIS_RESULT_CHANNEL)
    #[arg(long)]
    result_channel: Option<String>,

    /// Redis host (overrides REDIS_HOST)
    #[arg(long)]
    redis_host: Option<String>,

    /// Redis port (overrides REDIS_PORT)
    #[arg(long)]
    redis_port: Option<u16>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            timeout_secs: self.timeout_secs,
            request_channel: self.request_channel.clone(),
            result_channel: self.result_channel.clone(),
            redis_host: self.redis_host.clone(),
            redis_port: self.redis_port,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    init_telemetry(&TelemetryConfig::from_env()).context("failed to initialize telemetry")?;

    let config = load_config(&args.overrides());
    config.validate().context("invalid bridge configuration")?;
    info!(redis = ?config.redis, "Configuration loaded");

    let request = SearchRequest::new(args.title, args.artist)?;

    let (publisher, source) = connect_redis(&config)
        .await
        .context("failed to connect to Redis")?;
    let runtime = BridgeRuntime::start(&config, publisher, source)?;
    let bridge = runtime.bridge();

    let outcome = tokio::select! {
        result = bridge.search(&request) => Some(result),
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, abandoning search");
            None
        }
    };

    runtime.shutdown().await;

    match outcome {
        Some(Ok(Some(result))) => {
            if let Some(note) = missing_lyrics_note(&result) {
                warn!(title = %result.title, artist = %result.artist, "Matched song has no lyrics");
                eprintln!("{note}");
            }
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(ExitCode::SUCCESS)
        }
        Some(Ok(None)) => {
            eprintln!(
                "No lyrics found for \"{}\" by \"{}\" within {}s",
                request.title(),
                request.artist(),
                config.timeouts.default_secs
            );
            Ok(ExitCode::from(2))
        }
        Some(Err(e)) => Err(e).context("search request failed"),
        None => Ok(ExitCode::from(130)),
    }
}

/// Stderr note for a reply that matched a song but carried no lyrics text.
fn missing_lyrics_note(result: &LyricsSearchResult) -> Option<String> {
    if result.has_lyrics() {
        return None;
    }
    Some(format!(
        "Matched \"{}\" by \"{}\", but the provider returned no lyrics",
        result.title, result.artist
    ))
}
