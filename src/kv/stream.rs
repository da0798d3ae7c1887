use std::collections::HashMap;

use collab_core::Result;
use redis::{
	AsyncCommands,
	streams::{StreamReadOptions, StreamReadReply},
};

/// Appends `{key, event: "expired", timestamp}` to the durable stream — the
/// Expiry Observer's sole write.
pub async fn append_expired(
	conn: &mut redis::aio::MultiplexedConnection,
	stream: &str,
	key: &str,
	timestamp: &str,
) -> Result<String> {
	let id: String = conn
		.xadd(stream, "*", &[("key", key), ("event", "expired"), ("timestamp", timestamp)])
		.await?;
	Ok(id)
}

/// Idempotently creates the consumer group at the end of the stream
/// (`$`, i.e. only new entries), creating the stream itself if absent
/// (`MKSTREAM`). Safe to call on every startup.
pub async fn ensure_group(
	conn: &mut redis::aio::MultiplexedConnection,
	stream: &str,
	group: &str,
) -> Result {
	let result: redis::RedisResult<()> = conn.xgroup_create_mkstream(stream, group, "$").await;
	if let Err(e) = result {
		// BUSYGROUP: the group already exists — expected on every restart
		// after the first.
		if !e.to_string().contains("BUSYGROUP") {
			return Err(e.into());
		}
	}
	Ok(())
}

/// One durable stream entry, decoded into the fields the Room Manager
/// cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredEntry {
	pub id: String,
	pub key: String,
}

/// Reads up to one new entry assigned to `consumer` in `group`, blocking for
/// `block_ms` if none is immediately available. A bounded block lets the
/// caller's loop observe a shutdown signal between polls instead of
/// blocking forever.
pub async fn read_one(
	conn: &mut redis::aio::MultiplexedConnection,
	stream: &str,
	group: &str,
	consumer: &str,
	block_ms: usize,
) -> Result<Option<ExpiredEntry>> {
	let opts = StreamReadOptions::default()
		.group(group, consumer)
		.count(1)
		.block(block_ms);

	let reply: StreamReadReply = conn.xread_options(&[stream], &[">"], &opts).await?;
	Ok(decode_first(&reply))
}

fn decode_first(reply: &StreamReadReply) -> Option<ExpiredEntry> {
	let stream_key = reply.keys.first()?;
	let entry = stream_key.ids.first()?;
	let fields: HashMap<String, String> = entry
		.map
		.iter()
		.filter_map(|(k, v)| redis::FromRedisValue::from_redis_value(v).ok().map(|s: String| (k.clone(), s)))
		.collect();
	Some(ExpiredEntry { id: entry.id.clone(), key: fields.get("key")?.clone() })
}

pub async fn ack(
	conn: &mut redis::aio::MultiplexedConnection,
	stream: &str,
	group: &str,
	id: &str,
) -> Result {
	let _: i64 = conn.xack(stream, group, &[id]).await?;
	Ok(())
}
