use std::time::Duration;

use collab_core::Result;
use deadpool_redis::Connection;
use redis::AsyncCommands;

/// A one-shot mailbox: the notifier right-pushes exactly one token, the
/// waiter left-pops (optionally blocking). Used for `match_found:*` and
/// `match_confirm:*` in namespace E.
pub async fn notify(conn: &mut Connection, key: &str, token: &str) -> Result {
	let _: i64 = conn.rpush(key, token).await?;
	Ok(())
}

/// Blocking left-pop with a timeout. A dedicated (non-pooled) connection
/// must be used for this call so it cannot hold a shared pool connection
/// hostage for the duration of the block.
///
/// Returns `None` on timeout.
pub async fn wait(
	conn: &mut redis::aio::MultiplexedConnection,
	key: &str,
	timeout: Duration,
) -> Result<Option<String>> {
	let reply: Option<(String, String)> = conn.blpop(key, timeout.as_secs_f64()).await?;
	Ok(reply.map(|(_key, value)| value))
}

