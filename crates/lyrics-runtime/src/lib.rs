//! # Lyrics Runtime
//!
//! Wiring for the `lyrics-search` binary, kept in a library so the startup
//! and shutdown sequence can be tested without a broker.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry
//! 2. Load configuration (env, then command-line overrides) and validate it
//! 3. Connect the transport (Redis in production, the in-memory bus in tests)
//! 4. Spawn the reply listener
//! 5. Serve searches until shutdown

use std::sync::Arc;

use lyrics_bridge::{
    BridgeConfig, BridgeResult, LyricsSearchBridge, ReplyListener, ReplySource, RequestPublisher,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[cfg(feature = "redis")]
use lyrics_bridge::{RedisPublisher, RedisReplySource, TransportError};

/// Command-line values that take precedence over the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub timeout_secs: Option<u64>,
    pub request_channel: Option<String>,
    pub result_channel: Option<String>,
    pub redis_host: Option<String>,
    pub redis_port: Option<u16>,
}

impl ConfigOverrides {
    /// Write every set override into `config`.
    pub fn apply(&self, config: &mut BridgeConfig) {
        if let Some(secs) = self.timeout_secs {
            config.timeouts.default_secs = secs;
        }
        if let Some(channel) = &self.request_channel {
            config.channels.request = channel.clone();
        }
        if let Some(channel) = &self.result_channel {
            config.channels.result = channel.clone();
        }
        if let Some(host) = &self.redis_host {
            config.redis.host = host.clone();
        }
        if let Some(port) = self.redis_port {
            config.redis.port = port;
        }
    }
}

/// Load configuration from the environment, then apply `overrides`.
pub fn load_config(overrides: &ConfigOverrides) -> BridgeConfig {
    let mut config = BridgeConfig::from_env();
    overrides.apply(&mut config);
    config
}

/// Open both Redis connections for `config`.
#[cfg(feature = "redis")]
pub async fn connect_redis(
    config: &BridgeConfig,
) -> Result<(Arc<RedisPublisher>, Arc<RedisReplySource>), TransportError> {
    // Subscribe first so a fast worker cannot answer before we listen
    let source = RedisReplySource::subscribe(&config.redis, &config.channels.result).await?;
    let publisher = RedisPublisher::connect(&config.redis).await?;
    Ok((Arc::new(publisher), Arc::new(source)))
}

/// A running bridge plus its reply listener task.
pub struct BridgeRuntime {
    bridge: Arc<LyricsSearchBridge>,
    listener: JoinHandle<u64>,
    shutdown_tx: watch::Sender<bool>,
}

impl BridgeRuntime {
    /// Build the bridge and spawn its listener on the current runtime.
    pub fn start(
        config: &BridgeConfig,
        publisher: Arc<dyn RequestPublisher>,
        source: Arc<dyn ReplySource>,
    ) -> BridgeResult<Self> {
        let bridge = Arc::new(LyricsSearchBridge::new(config, publisher)?);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let listener = ReplyListener::new(Arc::clone(&bridge), source);
        let listener = tokio::spawn(listener.run_until_shutdown(shutdown_rx));

        info!(
            request_channel = %config.channels.request,
            result_channel = %config.channels.result,
            timeout_secs = config.timeouts.default_secs,
            "Lyrics bridge started"
        );

        Ok(Self {
            bridge,
            listener,
            shutdown_tx,
        })
    }

    pub fn bridge(&self) -> Arc<LyricsSearchBridge> {
        Arc::clone(&self.bridge)
    }

    /// Stop the listener and wait for it to exit.
    ///
    /// Returns the number of replies the listener handled.
    pub async fn shutdown(self) -> u64 {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            // Listener already gone (source closed)
            info!("Listener exited before shutdown: {}", e);
        }

        let handled = match self.listener.await {
            Ok(handled) => handled,
            Err(e) => {
                error!("Reply listener task failed: {}", e);
                0
            }
        };

        let stats = self.bridge.stats();
        info!(
            handled = handled,
            resolved = stats.resolved(),
            timeouts = stats.timeouts(),
            orphaned = stats.orphaned(),
            malformed = stats.malformed(),
            "Shutdown complete"
        );
        handled
    }
}
