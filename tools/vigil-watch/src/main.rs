//! vigil-watch: CLI monitor for a tracked lifecycle.
//!
//! External client tool: reads state through the same snapshot sources any
//! consumer would use (chain JSON-RPC or REST status endpoint), subscribes
//! to the three lifecycle edges, and optionally attaches the streaming
//! transport for pushed events.
//!
//! ## Usage
//!
//! ```bash
//! # Poll a chain endpoint
//! vigil-watch --rpc-url http://localhost:8899 \
//!     --state-address <STATE> --vault-address <VAULT>
//!
//! # Poll a REST status endpoint instead
//! vigil-watch --status-url https://api.example.com
//!
//! # Additionally attach the push stream
//! vigil-watch --status-url https://api.example.com --ws-url wss://api.example.com/ws
//! ```

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vigil_client::{
    ChainSnapshotSource, LifecycleWatcher, RestStatusSource, SnapshotSource, WatcherConfig,
};
use vigil_core::{lifetime_progress, time_to_death, LifecycleSnapshot};
use vigil_stream::{StreamConfig, StreamingTransport, WsChannel, WILDCARD};

/// Last-event age beyond which the feed is considered stale (poll cadence
/// plus buffer).
const STALENESS_THRESHOLD_SECS: i64 = 90;

/// Vigil lifecycle watcher
#[derive(Parser, Debug)]
#[command(name = "vigil-watch")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Chain JSON-RPC endpoint URL
    #[arg(long, conflicts_with = "status_url")]
    rpc_url: Option<String>,

    /// REST status endpoint base URL
    #[arg(long)]
    status_url: Option<String>,

    /// State account address (chain mode)
    #[arg(long, requires = "rpc_url")]
    state_address: Option<String>,

    /// Vault account address (chain mode)
    #[arg(long, requires = "rpc_url")]
    vault_address: Option<String>,

    /// WebSocket endpoint URL for pushed events
    #[arg(long)]
    ws_url: Option<String>,

    /// Total heartbeat capacity of the tracked lifecycle
    #[arg(long, default_value = "86400")]
    capacity: u64,

    /// Poll interval in seconds
    #[arg(long, default_value = "60")]
    poll_interval_secs: u64,
}

fn build_source(args: &Args) -> Result<Arc<dyn SnapshotSource>> {
    if let Some(rpc_url) = &args.rpc_url {
        let state = args
            .state_address
            .as_deref()
            .context("--state-address is required with --rpc-url")?;
        let vault = args
            .vault_address
            .as_deref()
            .context("--vault-address is required with --rpc-url")?;
        let source = ChainSnapshotSource::new(rpc_url, state, vault, args.capacity)?;
        return Ok(Arc::new(source));
    }
    if let Some(status_url) = &args.status_url {
        let source = RestStatusSource::new(status_url, args.capacity)?;
        return Ok(Arc::new(source));
    }
    bail!("one of --rpc-url or --status-url is required");
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn report_snapshot(snapshot: &LifecycleSnapshot) {
    info!(
        "[vigil-watch] phase {} | {}/{} heartbeats remaining | {:.1}% elapsed | ~{}s to death",
        snapshot.phase(),
        snapshot.remaining,
        snapshot.total_capacity,
        lifetime_progress(snapshot) * 100.0,
        time_to_death(snapshot).as_secs(),
    );

    let age = unix_now() - snapshot.last_event_timestamp;
    if age > STALENESS_THRESHOLD_SECS {
        warn!(
            "[vigil-watch] feed may be stale: last event {}s ago (threshold {}s)",
            age, STALENESS_THRESHOLD_SECS
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let source = build_source(&args)?;
    info!("[vigil-watch] watching via {}", source.source_id());

    // Initial snapshot before the edge subscriptions take over.
    match source.fetch_snapshot().await {
        Ok(snapshot) => report_snapshot(&snapshot),
        Err(e) => warn!("[vigil-watch] initial snapshot failed: {e}"),
    }

    let config = WatcherConfig {
        poll_interval_secs: args.poll_interval_secs,
        ..WatcherConfig::default()
    };
    let watcher = LifecycleWatcher::new(Arc::clone(&source), config);

    let heartbeat = watcher.on_heartbeat(None, |snapshot| {
        report_snapshot(&snapshot);
    })?;
    let death = watcher.on_death(None, |snapshot| {
        warn!(
            "[vigil-watch] DEATH observed: {} heartbeats consumed, phase {}",
            snapshot.total_consumed,
            snapshot.phase()
        );
    })?;
    let resurrection = watcher.on_resurrection(None, |vault| {
        info!(
            "[vigil-watch] vault sealed: {} journal entries, coherence {}, last words: {:?}",
            vault.journal_count, vault.coherence_score, vault.last_words
        );
    })?;

    let transport = match &args.ws_url {
        Some(ws_url) => {
            let channel = Arc::new(WsChannel::new(ws_url));
            let transport = StreamingTransport::new(channel, StreamConfig::default());
            transport.on(WILDCARD, |event| {
                info!("[vigil-watch] stream event: {}", event.event_type);
            });
            transport.connect();
            Some(transport)
        }
        None => None,
    };

    info!("[vigil-watch] watching (ctrl-c to exit)");
    tokio::signal::ctrl_c().await?;

    heartbeat.cancel();
    death.cancel();
    resurrection.cancel();
    if let Some(transport) = &transport {
        transport.disconnect();
    }

    // Give in-flight dispatch a moment to drain before exit.
    tokio::time::sleep(Duration::from_millis(100)).await;
    info!("[vigil-watch] stopped");
    Ok(())
}
