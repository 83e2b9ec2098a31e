//! Event bus adapters.
//!
//! - `InMemoryEventBus` - Synchronous, in-process bus for tests
//! - `EventConsumer` - Decode-and-dispatch loop shared by every transport
//! - `RedisEventPublisher` / `RedisEventConsumer` - Redis pub/sub transport

mod consumer;
mod in_memory;
mod redis;

pub use self::redis::{RedisEventConsumer, RedisEventPublisher};
pub use consumer::{ConsumeReport, EventConsumer, InboundMessage};
pub use in_memory::InMemoryEventBus;
