//! Transport adapters implementing the outbound ports.

pub mod bus;
#[cfg(feature = "redis")]
pub mod redis;

pub use bus::{bus_transport, BusPublisher, BusReplySource};
#[cfg(feature = "redis")]
pub use self::redis::{RedisPublisher, RedisReplySource};
