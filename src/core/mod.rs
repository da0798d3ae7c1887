//! Ambient stack shared by the matchmaker, expiry observer and room manager
//! binaries: configuration, the error taxonomy, structured logging, the
//! shutdown signal, and small time helpers.

pub mod config;
pub mod error;
pub mod log;
pub mod shutdown;
pub mod time;

use std::sync::Arc;

use uuid::Uuid;

pub use crate::{
	config::Config,
	error::{Error, Result},
};

/// Process-wide identity of one running binary: its logical service name
/// (as registered with the gateway) and a per-process instance id minted at
/// startup, reused both as the registry's `instance_id` and as the consumer
/// name in the expiry stream's consumer group.
#[derive(Debug, Clone)]
pub struct Server {
	pub name: &'static str,
	pub instance_id: Uuid,
	pub config: Arc<Config>,
}

impl Server {
	#[must_use]
	pub fn new(name: &'static str, config: Config) -> Arc<Self> {
		Arc::new(Self { name, instance_id: Uuid::new_v4(), config: Arc::new(config) })
	}
}
