//! Grace-hold: when a partner's heartbeat has already lapsed by the
//! time the expiry consumer (or `exit`) notices, the room is held open for
//! 300 s in case the departing user reconnects before it is torn down.

use std::time::Duration;

use deadpool_redis::Pool;

use super::kv;

const GRACE_SECONDS: u64 = 300;
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Spawns the hold timer. `reconnect` cancels it by deleting
/// `cleanup:{room_id}` before this loop next wakes.
pub fn spawn(rooms_pool: Pool, room_id: String, user_one: String, user_two: String, departing_user_id: String) {
	tokio::spawn(async move {
		if let Err(e) = kv::set_cleanup_marker(&rooms_pool, &room_id, &departing_user_id).await {
			tracing::warn!(error = %e, room_id = %room_id, "grace-hold could not set cleanup marker");
			return;
		}

		for _ in 0..GRACE_SECONDS {
			tokio::time::sleep(POLL_INTERVAL).await;
			match kv::cleanup_marker_present(&rooms_pool, &room_id).await {
				| Ok(true) => continue,
				| Ok(false) => {
					tracing::info!(room_id = %room_id, "grace-hold cancelled by reconnect");
					return;
				},
				| Err(e) => {
					tracing::warn!(error = %e, room_id = %room_id, "grace-hold could not poll cleanup marker");
					return;
				},
			}
		}

		if let Err(e) = kv::teardown_room(&rooms_pool, &room_id, &user_one, &user_two).await {
			tracing::warn!(error = %e, room_id = %room_id, "grace-hold teardown failed");
		} else {
			tracing::info!(room_id = %room_id, "room cleared after grace-hold expiry");
		}
	});
}
