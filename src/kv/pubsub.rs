//! Keyspace-notification bridge used only by the Expiry Observer: turns
//! ephemeral `__keyevent@{db}__:expired` pub/sub messages into durable
//! stream entries, since pub/sub delivery has no replay and no
//! consumer-group fan-out the way the `expired_ttl` stream does.

use collab_core::{Error, Result};
use futures::StreamExt;

/// Enables expired-key keyspace notifications on the server this connection
/// is talking to. Idempotent — Redis just overwrites the config value, so
/// it's safe to call on every startup rather than only once globally.
pub async fn enable_expired_notifications(conn: &mut redis::aio::MultiplexedConnection) -> Result {
	let _: () = redis::cmd("CONFIG")
		.arg("SET")
		.arg("notify-keyspace-events")
		.arg("Ex")
		.query_async(conn)
		.await?;
	Ok(())
}

/// Opens a dedicated pub/sub connection subscribed to `db`'s expired-key
/// keyevent channel. A connection can't issue ordinary commands once
/// subscribed, so this is always separate from the connection used to
/// append to the durable stream.
pub async fn subscribe(client: &redis::Client, db: u8) -> Result<redis::aio::PubSub> {
	let mut pubsub = client.get_async_pubsub().await?;
	pubsub.subscribe(format!("__keyevent@{db}__:expired")).await?;
	Ok(pubsub)
}

/// Blocks until the next expired-key event arrives, returning the key name
/// that expired. Resolves to an error if the server drops the connection;
/// the caller is expected to resubscribe and carry on.
pub async fn next_expired_key(pubsub: &mut redis::aio::PubSub) -> Result<String> {
	let msg = pubsub
		.on_message()
		.next()
		.await
		.ok_or_else(|| Error::Internal("expiry keyevent pub/sub connection closed".into()))?;
	Ok(msg.get_payload()?)
}
