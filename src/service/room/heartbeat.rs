//! Expiry-stream consumer. Reads
//! `expired_ttl` as a consumer-group member named after this process's
//! `instance_id`, translates each `heartbeat:{user_id}` expiry into either a
//! `partner_left` WebSocket notification or a grace-hold, and acknowledges
//! only after the side effect has been dispatched.

use std::sync::Arc;

use collab_core::{Config, shutdown::StopWatch};
use deadpool_redis::Pool;
use uuid::Uuid;

use super::{kv, notify_partner_or_grace_hold};
use crate::ws_gateway::WsGateway;

/// Bounded so the stop signal is checked at least this often even with no
/// traffic.
const BLOCK_MS: usize = 2_000;

pub async fn run(config: Arc<Config>, rooms_pool: Pool, instance_id: Uuid, gateway: WsGateway, mut stop: StopWatch) {
	let stream_key = config.redis_stream_key.clone();
	let group = config.redis_group.clone();
	let consumer = instance_id.to_string();

	let mut conn = match collab_kv::pool::dedicated_connection(&config, collab_kv::pool::DB_EVENTS).await {
		| Ok(conn) => conn,
		| Err(e) => {
			tracing::error!(error = %e, "expiry consumer could not open its dedicated connection");
			return;
		},
	};

	if let Err(e) = collab_kv::stream::ensure_group(&mut conn, &stream_key, &group).await {
		tracing::error!(error = %e, "expiry consumer could not ensure its consumer group");
		return;
	}

	loop {
		if stop.is_stopped() {
			return;
		}

		let entry = tokio::select! {
			result = collab_kv::stream::read_one(&mut conn, &stream_key, &group, &consumer, BLOCK_MS) => result,
			() = stop.signaled() => return,
		};

		let entry = match entry {
			| Ok(Some(entry)) => entry,
			| Ok(None) => continue,
			| Err(e) => {
				tracing::warn!(error = %e, "expiry consumer read failed, retrying");
				continue;
			},
		};

		if let Err(e) = handle_entry(&rooms_pool, &gateway, &entry.key).await {
			tracing::warn!(error = %e, key = %entry.key, "expiry consumer failed to handle entry");
		}

		if let Err(e) = collab_kv::stream::ack(&mut conn, &stream_key, &group, &entry.id).await {
			tracing::warn!(error = %e, id = %entry.id, "expiry consumer failed to ack entry");
		}
	}
}

async fn handle_entry(rooms_pool: &Pool, gateway: &WsGateway, expired_key: &str) -> collab_core::Result {
	let Some(user_id) = collab_kv::keys::user_id_from_heartbeat_key(expired_key) else {
		return Ok(());
	};

	let Some(room) = kv::get_room(rooms_pool, user_id).await? else {
		return Ok(());
	};

	notify_partner_or_grace_hold(rooms_pool, gateway, &room, user_id).await
}
