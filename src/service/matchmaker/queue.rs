//! Namespace M (matchmaking, DB 0) KV operations: `inqueue:*` and
//! `queue:{difficulty}:{category}`.

use std::collections::HashMap;

use collab_core::Result;
use collab_kv::keys;
use deadpool_redis::Pool;
use redis::AsyncCommands;

use super::types::InQueue;

pub async fn get_inqueue(pool: &Pool, user_id: &str) -> Result<Option<InQueue>> {
	let mut conn = pool.get().await?;
	let fields: HashMap<String, String> = conn.hgetall(keys::inqueue(user_id)).await?;
	if fields.is_empty() {
		return Ok(None);
	}
	Ok(InQueue::from_fields(&fields))
}

pub async fn set_inqueue(pool: &Pool, user_id: &str, entry: &InQueue) -> Result {
	let mut conn = pool.get().await?;
	let _: () = conn.hset_multiple(keys::inqueue(user_id), &entry.as_fields()).await?;
	Ok(())
}

pub async fn mark_match_found(pool: &Pool, user_id: &str) -> Result {
	let mut conn = pool.get().await?;
	let _: () = conn.hset(keys::inqueue(user_id), "match_found", "1").await?;
	Ok(())
}

pub async fn clear_inqueue(pool: &Pool, user_id: &str) -> Result {
	let mut conn = pool.get().await?;
	let _: () = conn.del(keys::inqueue(user_id)).await?;
	Ok(())
}

/// Left-pops the next waiting user from the bucket, if any. Caller must
/// already hold `lock:queue:{difficulty}:{category}`.
pub async fn pop_next(pool: &Pool, difficulty: &str, category: &str) -> Result<Option<String>> {
	let mut conn = pool.get().await?;
	let popped: Option<String> = conn.lpop(keys::queue(difficulty, category), None).await?;
	Ok(popped)
}

/// Right-pushes `user_id` onto the bucket. Caller must already hold the
/// bucket lock.
pub async fn push_self(pool: &Pool, difficulty: &str, category: &str, user_id: &str) -> Result {
	let mut conn = pool.get().await?;
	let _: i64 = conn.rpush(keys::queue(difficulty, category), user_id).await?;
	Ok(())
}

/// Removes `user_id` from the bucket list if present (`LREM` with count 1),
/// used by the find-timeout path and by `terminate_match`.
pub async fn remove_from_queue(pool: &Pool, difficulty: &str, category: &str, user_id: &str) -> Result {
	let mut conn = pool.get().await?;
	let _: i64 = conn.lrem(keys::queue(difficulty, category), 1, user_id).await?;
	Ok(())
}
