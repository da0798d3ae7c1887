//! Namespace R (rooms, DB 3) KV operations: `userroom:*`, `heartbeat:*`,
//! `cleanup:*`.

use std::collections::HashMap;
use std::time::Duration;

use collab_core::Result;
use collab_kv::keys;
use deadpool_redis::Pool;
use redis::AsyncCommands;

use super::types::RoomRecord;

/// 120 s, per the upstream's `TTL = 120` in `redis_room_service.py`.
pub const HEARTBEAT_TTL: Duration = Duration::from_secs(120);

pub async fn get_room(pool: &Pool, user_id: &str) -> Result<Option<RoomRecord>> {
	let mut conn = pool.get().await?;
	let fields: HashMap<String, String> = conn.hgetall(keys::userroom(user_id)).await?;
	Ok(RoomRecord::from_fields(&fields))
}

pub async fn set_room(pool: &Pool, user_id: &str, record: &RoomRecord) -> Result {
	let mut conn = pool.get().await?;
	let _: () = conn.hset_multiple(keys::userroom(user_id), &record.as_fields()).await?;
	Ok(())
}

pub async fn set_heartbeat(pool: &Pool, user_id: &str) -> Result {
	let mut conn = pool.get().await?;
	let _: () = conn
		.set_ex(keys::heartbeat(user_id), collab_core::time::now_rfc3339(), HEARTBEAT_TTL.as_secs())
		.await?;
	Ok(())
}

pub async fn heartbeat_alive(pool: &Pool, user_id: &str) -> Result<bool> {
	let mut conn = pool.get().await?;
	let exists: bool = conn.exists(keys::heartbeat(user_id)).await?;
	Ok(exists)
}

pub async fn delete_heartbeat(pool: &Pool, user_id: &str) -> Result {
	let mut conn = pool.get().await?;
	let _: () = conn.del(keys::heartbeat(user_id)).await?;
	Ok(())
}

pub async fn set_cleanup_marker(pool: &Pool, room_id: &str, departing_user_id: &str) -> Result {
	let mut conn = pool.get().await?;
	let _: () = conn.set(keys::cleanup(room_id), departing_user_id).await?;
	Ok(())
}

pub async fn cleanup_marker_present(pool: &Pool, room_id: &str) -> Result<bool> {
	let mut conn = pool.get().await?;
	let exists: bool = conn.exists(keys::cleanup(room_id)).await?;
	Ok(exists)
}

pub async fn delete_cleanup_marker(pool: &Pool, room_id: &str) -> Result {
	let mut conn = pool.get().await?;
	let _: () = conn.del(keys::cleanup(room_id)).await?;
	Ok(())
}

/// Deletes both participants' `userroom:*` plus the cleanup marker in one
/// pipeline, matching the upstream's `pipe.delete(...)` triple in
/// `redis_room_service.cleanup`.
pub async fn teardown_room(pool: &Pool, room_id: &str, user_one: &str, user_two: &str) -> Result {
	let mut conn = pool.get().await?;
	let _: () = redis::pipe()
		.del(keys::userroom(user_one))
		.del(keys::userroom(user_two))
		.del(keys::cleanup(room_id))
		.query_async(&mut conn)
		.await?;
	Ok(())
}
