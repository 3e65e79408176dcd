//! Redis pub/sub transport.
//!
//! Requests go out through a multiplexed connection (cheap to clone per
//! publish); replies arrive on a dedicated pub/sub connection subscribed to
//! the result channel.

use crate::domain::config::RedisConfig;
use crate::domain::error::TransportError;
use crate::ports::outbound::{ReplySource, RequestPublisher};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use std::pin::Pin;
use tokio::sync::Mutex;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

fn connection_error(e: redis::RedisError) -> TransportError {
    TransportError::Connection(e.to_string())
}

/// Connection parameters passed field by field, so credentials never need
/// URL escaping.
fn connection_info(config: &RedisConfig) -> ConnectionInfo {
    ConnectionInfo {
        addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
        redis: RedisConnectionInfo {
            db: config.db,
            password: config.password.clone(),
            ..Default::default()
        },
    }
}

fn open_client(config: &RedisConfig) -> Result<redis::Client, TransportError> {
    redis::Client::open(connection_info(config)).map_err(connection_error)
}

/// Publishes search requests with `PUBLISH`.
pub struct RedisPublisher {
    connection: MultiplexedConnection,
}

impl RedisPublisher {
    /// Connect to the broker described by `config`.
    pub async fn connect(config: &RedisConfig) -> Result<Self, TransportError> {
        let client = open_client(config)?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(connection_error)?;

        info!(host = %config.host, port = config.port, db = config.db, "Connected to Redis");
        Ok(Self { connection })
    }
}

#[async_trait]
impl RequestPublisher for RedisPublisher {
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> Result<(), TransportError> {
        let mut connection = self.connection.clone();
        let receivers: i64 = connection
            .publish(channel, payload)
            .await
            .map_err(|e| TransportError::PublishFailed(e.to_string()))?;

        debug!(channel = channel, receivers = receivers, "Request published to Redis");
        Ok(())
    }
}

type MessageStream = Pin<Box<dyn Stream<Item = redis::Msg> + Send>>;

/// Receives search replies from a Redis channel subscription.
pub struct RedisReplySource {
    messages: Mutex<MessageStream>,
}

impl RedisReplySource {
    /// Open a pub/sub connection and subscribe to `channel`.
    pub async fn subscribe(config: &RedisConfig, channel: &str) -> Result<Self, TransportError> {
        let client = open_client(config)?;
        let mut pubsub = client.get_async_pubsub().await.map_err(connection_error)?;
        pubsub.subscribe(channel).await.map_err(connection_error)?;

        info!(channel = channel, "Subscribed to Redis channel");
        Ok(Self {
            messages: Mutex::new(Box::pin(pubsub.into_on_message())),
        })
    }
}

#[async_trait]
impl ReplySource for RedisReplySource {
    async fn receive(&self) -> Result<Vec<u8>, TransportError> {
        let mut messages = self.messages.lock().await;
        match messages.next().await {
            Some(message) => Ok(message.get_payload_bytes().to_vec()),
            None => Err(TransportError::ChannelClosed),
        }
    }
}
