//! Pub/sub-to-stream bridge. The rooms database's `heartbeat:*` and
//! `cleanup:*` keys expire on their own TTL; Redis announces each expiry as
//! a one-shot keyspace event with no replay and no fan-out, so this binary's
//! only job is to turn that into a durable `expired_ttl` entry the room
//! manager can consume at-least-once, even across restarts.

use std::{sync::Arc, time::Duration};

use collab_core::{Config, Error, Result, shutdown::StopWatch};
use collab_kv::{pool, pubsub, stream};
use deadpool_redis::Pool;

/// Backoff between resubscribe attempts after the pub/sub connection drops.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Runs until `stop` fires. Reconnects on any pub/sub failure rather than
/// exiting, since a dropped subscription is routine (Redis restart, network
/// blip) and not a reason to take the whole binary down.
pub async fn run(config: Arc<Config>, events_pool: Pool, mut stop: StopWatch) {
	loop {
		if stop.is_stopped() {
			return;
		}

		match run_once(&config, &events_pool, &mut stop).await {
			| Ok(()) => return,
			| Err(e) => {
				tracing::warn!(error = %e, "expiry observer subscription failed, reconnecting");
				tokio::select! {
					() = tokio::time::sleep(RECONNECT_DELAY) => {},
					() = stop.signaled() => return,
				}
			},
		}
	}
}

/// Subscribes once and forwards events until the connection fails or `stop`
/// fires. Returns `Ok(())` only on a clean shutdown.
async fn run_once(config: &Config, events_pool: &Pool, stop: &mut StopWatch) -> Result {
	let client = redis::Client::open(config.redis_url(pool::DB_ROOMS))
		.map_err(|e| Error::Internal(format!("invalid redis url: {e}")))?;

	{
		let mut conn = client.get_multiplexed_async_connection().await?;
		pubsub::enable_expired_notifications(&mut conn).await?;
	}

	let mut sub = pubsub::subscribe(&client, pool::DB_ROOMS).await?;
	tracing::info!(db = pool::DB_ROOMS, "expiry observer subscribed to keyspace notifications");

	loop {
		let key = tokio::select! {
			key = pubsub::next_expired_key(&mut sub) => key?,
			() = stop.signaled() => return Ok(()),
		};

		if let Err(e) = forward(events_pool, config, &key).await {
			tracing::warn!(error = %e, %key, "failed to append expired key to durable stream");
		}
	}
}

async fn forward(events_pool: &Pool, config: &Config, key: &str) -> Result {
	let mut conn = events_pool.get().await?;
	let timestamp = collab_core::time::now_rfc3339();
	let id = stream::append_expired(&mut conn, &config.redis_stream_key, key, &timestamp).await?;
	tracing::debug!(%key, stream_id = %id, "forwarded expired key to durable stream");
	Ok(())
}
