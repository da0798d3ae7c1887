use collab_core::{Config, Error, Result};
use deadpool_redis::{Config as PoolConfig, Runtime};

/// The four logical databases, each its own connection pool so a
/// saturated matchmaking queue never starves a room-manager heartbeat
/// refresh.
#[derive(Clone)]
pub struct Databases {
	/// Namespace M — `inqueue:*`, `queue:*`, bucket locks.
	pub matchmaking: deadpool_redis::Pool,
	/// Namespace E — rendezvous lists, `create_room`, the `expired_ttl` stream.
	pub events: deadpool_redis::Pool,
	/// Namespace X — `match:*` confirmation records.
	pub confirm: deadpool_redis::Pool,
	/// Namespace R — `userroom:*`, `heartbeat:*`, `cleanup:*`.
	pub rooms: deadpool_redis::Pool,
}

pub const DB_MATCHMAKING: u8 = 0;
pub const DB_EVENTS: u8 = 1;
pub const DB_CONFIRM: u8 = 2;
pub const DB_ROOMS: u8 = 3;

impl Databases {
	pub fn open(config: &Config) -> Result<Self> {
		Ok(Self {
			matchmaking: open_pool(config, DB_MATCHMAKING)?,
			events: open_pool(config, DB_EVENTS)?,
			confirm: open_pool(config, DB_CONFIRM)?,
			rooms: open_pool(config, DB_ROOMS)?,
		})
	}

	/// Liveness check used by the `/health` route: a round-trip `PING`
	/// against each of the four pools.
	pub async fn ping(&self) -> Result {
		for pool in [&self.matchmaking, &self.events, &self.confirm, &self.rooms] {
			let mut conn = pool.get().await?;
			let _: String = redis::cmd("PING").query_async(&mut conn).await?;
		}
		Ok(())
	}
}

fn open_pool(config: &Config, db: u8) -> Result<deadpool_redis::Pool> {
	let cfg = PoolConfig::from_url(config.redis_url(db));
	cfg.create_pool(Some(Runtime::Tokio1))
		.map_err(|e| Error::Internal(format!("failed to build redis pool for db {db}: {e}")))
}

/// Opens a single dedicated (non-pooled) connection, for callers that need
/// to issue a blocking command (`BRPOP`, `XREADGROUP BLOCK`) that would
/// otherwise monopolize a pooled connection for the duration of the block.
pub async fn dedicated_connection(
	config: &Config,
	db: u8,
) -> Result<redis::aio::MultiplexedConnection> {
	let client = redis::Client::open(config.redis_url(db))
		.map_err(|e| Error::Internal(format!("invalid redis url: {e}")))?;
	Ok(client.get_multiplexed_async_connection().await?)
}
