//! KV primitives: connection pooling, key formatting, the distributed lock,
//! rendezvous lists and the durable expiry stream. Everything in this crate
//! is a thin, directly-testable wrapper over Redis commands; the FSM and
//! domain decisions built on top live in `collab_service`.

pub mod keys;
pub mod lock;
pub mod pool;
pub mod pubsub;
pub mod rendezvous;
pub mod stream;

pub use deadpool_redis::Connection;
pub use pool::Databases;
