//! Namespace X (confirmation, DB 2) KV operations on `match:{match_id}`, plus
//! the 12 s confirmation supervisor.

use collab_core::Result;
use collab_kv::{keys, lock, rendezvous};
use deadpool_redis::Pool;
use redis::AsyncCommands;

use super::types::MatchRecord;

pub async fn create(pool: &Pool, match_id: &str, record: &MatchRecord) -> Result {
	let mut conn = pool.get().await?;
	let _: () = conn.hset_multiple(keys::matchrec(match_id), &record.as_fields()).await?;
	Ok(())
}

pub async fn get(pool: &Pool, match_id: &str) -> Result<Option<MatchRecord>> {
	let mut conn = pool.get().await?;
	let fields = conn.hgetall(keys::matchrec(match_id)).await?;
	Ok(MatchRecord::from_fields(&fields))
}

pub async fn record_confirmation(pool: &Pool, match_id: &str, field: &'static str) -> Result {
	let mut conn = pool.get().await?;
	let _: () = conn.hset(keys::matchrec(match_id), field, "1").await?;
	Ok(())
}

pub async fn delete(pool: &Pool, match_id: &str) -> Result {
	let mut conn = pool.get().await?;
	let _: () = conn.del(keys::matchrec(match_id)).await?;
	Ok(())
}

/// Publishes the `create_room` handoff hash in namespace E (DB 1), read by
/// the room manager's `create_room` listener.
pub async fn publish_create_room_event(
	events_pool: &Pool,
	match_id: &str,
	record: &MatchRecord,
) -> Result {
	let mut conn = events_pool.get().await?;
	let fields = [
		("match_id", match_id.to_owned()),
		("user_one", record.user_one.clone()),
		("user_two", record.user_two.clone()),
		("difficulty", record.difficulty.clone()),
		("category", record.category.clone()),
	];
	let _: () = conn.hset_multiple(keys::CREATE_ROOM, &fields).await?;
	Ok(())
}

/// Spawned right after a pair forms. Sleeps 12 s — strictly
/// shorter than the waiter's own 15 s timeout on `match_confirm:*`, so a
/// confirmed-but-abandoned match is always cleaned up before the waiter
/// gives up on its own. If the record still exists after the sleep, at most
/// one side confirmed (both-confirmed records are deleted by the confirming
/// call itself); wake whichever side did confirm with an empty token and
/// tear the record down.
pub fn spawn_supervisor(confirm_pool: Pool, match_id: String) {
	tokio::spawn(async move {
		tokio::time::sleep(std::time::Duration::from_secs(12)).await;

		let record = match get(&confirm_pool, &match_id).await {
			| Ok(Some(record)) => record,
			| Ok(None) => return,
			| Err(e) => {
				tracing::warn!(error = %e, %match_id, "confirmation supervisor could not read match record");
				return;
			},
		};

		if let Some(confirmed_user) = record.lone_confirmed_user() {
			let mut conn = match confirm_pool.get().await {
				| Ok(conn) => conn,
				| Err(e) => {
					tracing::warn!(error = %e, %match_id, "confirmation supervisor could not reach redis");
					return;
				},
			};
			if let Err(e) = rendezvous::notify(&mut conn, &keys::match_confirm(confirmed_user), "").await {
				tracing::warn!(error = %e, %match_id, "confirmation supervisor failed to wake confirmed user");
			}
		}

		if let Err(e) = teardown(&confirm_pool, &match_id, &record).await {
			tracing::warn!(error = %e, %match_id, "confirmation supervisor failed to clean up match record");
		}

		tracing::info!(%match_id, "confirmation supervisor finished");
	});
}

/// Deletes `match:{match_id}` under its lock. Shared by the supervisor's
/// timeout path and by the waiter's own cleanup after a successful
/// confirmation round-trip.
pub async fn teardown(pool: &Pool, match_id: &str, record: &MatchRecord) -> Result {
	let mut conn = pool.get().await?;
	let guard = lock::acquire(&mut conn, &keys::lock(&keys::matchrec(match_id))).await?;
	let _ = record;
	delete(pool, match_id).await?;
	lock::release(&mut conn, guard).await?;
	Ok(())
}

#[must_use]
pub fn confirmation_field(side: super::types::Side) -> &'static str {
	match side {
		| super::types::Side::One => "user_one_confirmation",
		| super::types::Side::Two => "user_two_confirmation",
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn confirmation_field_matches_side() {
		assert_eq!(confirmation_field(super::super::types::Side::One), "user_one_confirmation");
		assert_eq!(confirmation_field(super::super::types::Side::Two), "user_two_confirmation");
	}
}
