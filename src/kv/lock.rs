use std::time::Duration;

use collab_core::{Error, Result};
use deadpool_redis::Connection;
use rand::Rng;
use redis::{AsyncCommands, Script};
use tokio::time::sleep;

/// Safety TTL fallback applied to every lock: even a crashed holder
/// releases the resource within this window.
const DEFAULT_TTL: Duration = Duration::from_secs(90);
const RETRY_BASE: Duration = Duration::from_millis(20);
const RETRY_MAX: Duration = Duration::from_millis(250);
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Release a lock only if it is still held by the token that acquired it
/// (compare-and-delete). Implemented as a Lua script so the check and the
/// delete are atomic from Redis's point of view — a plain `DEL` could
/// otherwise remove a lock that expired and was re-acquired by someone else
/// in the meantime.
static RELEASE_SCRIPT: &str = r"
if redis.call('get', KEYS[1]) == ARGV[1] then
    return redis.call('del', KEYS[1])
else
    return 0
end
";

/// An RAII guard for a held distributed lock. Dropping it without calling
/// [`LockGuard::release`] leaves the lock to expire on its own TTL rather
/// than panicking inside `Drop` over a fallible network call — callers that
/// need deterministic release must call `release` explicitly, which every
/// call site in this codebase does before any blocking pop or outbound HTTP
/// call.
pub struct LockGuard {
	key: String,
	token: String,
}

/// Acquires `lock:{resource}` with a random token and [`DEFAULT_TTL`],
/// retrying with jittered backoff until `ACQUIRE_TIMEOUT` elapses.
pub async fn acquire(conn: &mut Connection, key: &str) -> Result<LockGuard> {
	acquire_for(conn, key, DEFAULT_TTL).await
}

pub async fn acquire_for(conn: &mut Connection, key: &str, ttl: Duration) -> Result<LockGuard> {
	let token = new_token();
	let deadline = tokio::time::Instant::now() + ACQUIRE_TIMEOUT;

	loop {
		let acquired: bool = redis::cmd("SET")
			.arg(key)
			.arg(&token)
			.arg("NX")
			.arg("PX")
			.arg(ttl.as_millis() as u64)
			.query_async::<Option<String>>(conn)
			.await
			.map(|v| v.is_some())?;

		if acquired {
			return Ok(LockGuard { key: key.to_owned(), token });
		}

		if tokio::time::Instant::now() >= deadline {
			return Err(Error::Store(format!("timed out acquiring lock {key}")));
		}

		let jitter = rand::thread_rng().gen_range(0..RETRY_MAX.as_millis() as u64);
		sleep(RETRY_BASE + Duration::from_millis(jitter)).await;
	}
}

pub async fn release(conn: &mut Connection, guard: LockGuard) -> Result {
	let script = Script::new(RELEASE_SCRIPT);
	let _: i64 = script
		.key(&guard.key)
		.arg(&guard.token)
		.invoke_async(conn)
		.await?;
	Ok(())
}

fn new_token() -> String {
	let mut bytes = [0u8; 16];
	rand::thread_rng().fill(&mut bytes);
	bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tokens_are_unique_and_well_formed() {
		let a = new_token();
		let b = new_token();
		assert_ne!(a, b);
		assert_eq!(a.len(), 32);
		assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
	}
}
