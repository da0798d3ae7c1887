//! Centralized key syntax for every namespace.
//!
//! Every formatter lives here so that no other module spells out a prefix
//! literal; drift between, say, the matchmaker and the room manager over
//! the exact shape of a key is a class of bug this module exists to rule
//! out structurally.

/// `inqueue:{user_id}` — namespace M, DB 0.
#[must_use]
pub fn inqueue(user_id: &str) -> String { format!("inqueue:{user_id}") }

/// `queue:{difficulty}:{category}` — namespace M, DB 0.
#[must_use]
pub fn queue(difficulty: &str, category: &str) -> String {
	format!("queue:{difficulty}:{category}")
}

/// `lock:{resource}` — the resource is itself a fully formatted key from one
/// of the other formatters, or a literal like `event_manager_lock`.
#[must_use]
pub fn lock(resource: &str) -> String { format!("lock:{resource}") }

/// `match:{match_id}` — namespace X, DB 2.
#[must_use]
pub fn matchrec(match_id: &str) -> String { format!("match:{match_id}") }

/// `match_found:{user_id}` — namespace E, DB 1.
#[must_use]
pub fn match_found(user_id: &str) -> String { format!("match_found:{user_id}") }

/// `match_confirm:{user_id}` — namespace E, DB 1.
#[must_use]
pub fn match_confirm(user_id: &str) -> String { format!("match_confirm:{user_id}") }

/// `create_room` — namespace E, DB 1. Singleton key: the matchmaker
/// publishes at most one pending room-creation hash at a time, matching the
/// upstream's one-shot handoff.
pub const CREATE_ROOM: &str = "create_room";

/// `expired_ttl` — namespace E, DB 1, durable stream.
pub const EXPIRED_TTL_STREAM: &str = "expired_ttl";

/// `userroom:{user_id}` — namespace R, DB 3.
#[must_use]
pub fn userroom(user_id: &str) -> String { format!("userroom:{user_id}") }

/// `heartbeat:{user_id}` — namespace R, DB 3.
#[must_use]
pub fn heartbeat(user_id: &str) -> String { format!("heartbeat:{user_id}") }

/// `cleanup:{room_id}` — namespace R, DB 3.
#[must_use]
pub fn cleanup(room_id: &str) -> String { format!("cleanup:{room_id}") }

/// Recover the `user_id` from a `heartbeat:{user_id}` key as observed in an
/// expiry-stream event. Returns `None` for any other key shape (e.g. a
/// `cleanup:*` key, which this implementation never lets expire but is
/// tolerated defensively).
#[must_use]
pub fn user_id_from_heartbeat_key(key: &str) -> Option<&str> { key.strip_prefix("heartbeat:") }

/// `event_manager_lock` — namespace E, DB 1. Guards the `create_room`
/// poller against concurrent Room Manager instances. The upstream's
/// separate "queued-users set" is folded into `inqueue:*` existence here —
/// there is no separate formatter for it.
pub const EVENT_MANAGER_LOCK: &str = "event_manager_lock";

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn formatters_match_spec_syntax() {
		assert_eq!(inqueue("alice"), "inqueue:alice");
		assert_eq!(queue("easy", "arrays"), "queue:easy:arrays");
		assert_eq!(lock(&queue("easy", "arrays")), "lock:queue:easy:arrays");
		assert_eq!(matchrec("m1"), "match:m1");
		assert_eq!(match_found("alice"), "match_found:alice");
		assert_eq!(match_confirm("alice"), "match_confirm:alice");
		assert_eq!(userroom("alice"), "userroom:alice");
		assert_eq!(heartbeat("alice"), "heartbeat:alice");
		assert_eq!(cleanup("room-1"), "cleanup:room-1");
	}

	#[test]
	fn heartbeat_key_parses_user_id() {
		assert_eq!(user_id_from_heartbeat_key("heartbeat:alice"), Some("alice"));
		assert_eq!(user_id_from_heartbeat_key("cleanup:room-1"), None);
		assert_eq!(user_id_from_heartbeat_key("userroom:alice"), None);
	}
}
