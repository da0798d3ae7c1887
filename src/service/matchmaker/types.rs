//! Pure decision types for the matchmaker — no KV access, so the FSM itself
//! is unit-testable without a live Redis server.

use std::collections::HashMap;

use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
	One,
	Two,
}

/// `inqueue:{user_id}` decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InQueue {
	pub difficulty: String,
	pub category: String,
	pub match_found: bool,
}

impl InQueue {
	#[must_use]
	pub fn new(difficulty: impl Into<String>, category: impl Into<String>) -> Self {
		Self { difficulty: difficulty.into(), category: category.into(), match_found: false }
	}

	#[must_use]
	pub fn from_fields(fields: &HashMap<String, String>) -> Option<Self> {
		Some(Self {
			difficulty: fields.get("difficulty")?.clone(),
			category: fields.get("category")?.clone(),
			match_found: fields.get("match_found").map(String::as_str) == Some("1"),
		})
	}

	#[must_use]
	pub fn as_fields(&self) -> [(&'static str, String); 3] {
		[
			("difficulty", self.difficulty.clone()),
			("category", self.category.clone()),
			("match_found", if self.match_found { "1".into() } else { "0".into() }),
		]
	}
}

/// The wake value observed on `match_found:{user_id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindWake {
	Terminated,
	Superseded,
	Matched(String),
}

pub const TERMINATE_TOKEN: &str = "terminate";
pub const SUPERSEDED_TOKEN: &str = "new request made";

#[must_use]
pub fn classify_find_wake(value: &str) -> FindWake {
	match value {
		| TERMINATE_TOKEN => FindWake::Terminated,
		| SUPERSEDED_TOKEN => FindWake::Superseded,
		| other => FindWake::Matched(other.to_owned()),
	}
}

/// `match:{match_id}` decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
	pub user_one: String,
	pub user_two: String,
	pub difficulty: String,
	pub category: String,
	pub user_one_confirmation: bool,
	pub user_two_confirmation: bool,
}

impl MatchRecord {
	#[must_use]
	pub fn new(
		user_one: impl Into<String>,
		user_two: impl Into<String>,
		difficulty: impl Into<String>,
		category: impl Into<String>,
	) -> Self {
		Self {
			user_one: user_one.into(),
			user_two: user_two.into(),
			difficulty: difficulty.into(),
			category: category.into(),
			user_one_confirmation: false,
			user_two_confirmation: false,
		}
	}

	#[must_use]
	pub fn from_fields(fields: &HashMap<String, String>) -> Option<Self> {
		Some(Self {
			user_one: fields.get("user_one")?.clone(),
			user_two: fields.get("user_two")?.clone(),
			difficulty: fields.get("difficulty")?.clone(),
			category: fields.get("category")?.clone(),
			user_one_confirmation: fields.get("user_one_confirmation").map(String::as_str) == Some("1"),
			user_two_confirmation: fields.get("user_two_confirmation").map(String::as_str) == Some("1"),
		})
	}

	#[must_use]
	pub fn as_fields(&self) -> [(&'static str, String); 6] {
		[
			("user_one", self.user_one.clone()),
			("user_two", self.user_two.clone()),
			("difficulty", self.difficulty.clone()),
			("category", self.category.clone()),
			("user_one_confirmation", bool_flag(self.user_one_confirmation)),
			("user_two_confirmation", bool_flag(self.user_two_confirmation)),
		]
	}

	#[must_use]
	pub fn side_of(&self, user_id: &str) -> Option<Side> {
		if self.user_one == user_id {
			Some(Side::One)
		} else if self.user_two == user_id {
			Some(Side::Two)
		} else {
			None
		}
	}

	#[must_use]
	pub fn partner_of(&self, user_id: &str) -> Option<&str> {
		match self.side_of(user_id)? {
			| Side::One => Some(&self.user_two),
			| Side::Two => Some(&self.user_one),
		}
	}

	pub fn confirm(&mut self, side: Side) {
		match side {
			| Side::One => self.user_one_confirmation = true,
			| Side::Two => self.user_two_confirmation = true,
		}
	}

	#[must_use]
	pub fn both_confirmed(&self) -> bool { self.user_one_confirmation && self.user_two_confirmation }

	/// The user id of whichever single side has confirmed, if exactly one
	/// has — used by the confirmation supervisor to decide who to wake
	/// with an empty (declined) token.
	#[must_use]
	pub fn lone_confirmed_user(&self) -> Option<&str> {
		match (self.user_one_confirmation, self.user_two_confirmation) {
			| (true, false) => Some(&self.user_one),
			| (false, true) => Some(&self.user_two),
			| _ => None,
		}
	}
}

fn bool_flag(b: bool) -> String { if b { "1".into() } else { "0".into() } }

/// Deterministic match id from an ordered pair:
/// `uuid5(NAMESPACE_DNS, requester_id || partner_id)`. Only the side that
/// pops a waiting partner computes this; the partner simply receives it as
/// its wake value.
#[must_use]
pub fn derive_match_id(requester_id: &str, partner_id: &str) -> String {
	let name = format!("{requester_id}{partner_id}");
	Uuid::new_v5(&Uuid::NAMESPACE_DNS, name.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn match_id_is_deterministic() {
		let a = derive_match_id("alice", "bob");
		let b = derive_match_id("alice", "bob");
		assert_eq!(a, b);
	}

	#[test]
	fn match_id_is_order_sensitive_like_the_source_algorithm() {
		assert_ne!(derive_match_id("alice", "bob"), derive_match_id("bob", "alice"));
	}

	#[test]
	fn classify_wake_values() {
		assert_eq!(classify_find_wake("terminate"), FindWake::Terminated);
		assert_eq!(classify_find_wake("new request made"), FindWake::Superseded);
		assert_eq!(classify_find_wake("m-1"), FindWake::Matched("m-1".into()));
	}

	#[test]
	fn match_record_tracks_sides_and_partner() {
		let record = MatchRecord::new("alice", "bob", "easy", "arrays");
		assert_eq!(record.side_of("alice"), Some(Side::One));
		assert_eq!(record.side_of("bob"), Some(Side::Two));
		assert_eq!(record.side_of("carol"), None);
		assert_eq!(record.partner_of("alice"), Some("bob"));
		assert_eq!(record.partner_of("bob"), Some("alice"));
	}

	#[test]
	fn match_record_confirmation_flow() {
		let mut record = MatchRecord::new("alice", "bob", "easy", "arrays");
		assert!(!record.both_confirmed());
		record.confirm(Side::One);
		assert_eq!(record.lone_confirmed_user(), Some("alice"));
		assert!(!record.both_confirmed());
		record.confirm(Side::Two);
		assert!(record.both_confirmed());
		assert_eq!(record.lone_confirmed_user(), None);
	}

	#[test]
	fn in_queue_round_trips_through_fields() {
		let mut original = InQueue::new("hard", "graphs");
		original.match_found = true;
		let fields: HashMap<String, String> = original.as_fields().into_iter().collect();
		let decoded = InQueue::from_fields(&fields).expect("decodes");
		assert_eq!(decoded, original);
	}

	#[test]
	fn match_record_round_trips_through_fields() {
		let mut original = MatchRecord::new("alice", "bob", "easy", "arrays");
		original.confirm(Side::One);
		let fields: HashMap<String, String> = original.as_fields().into_iter().collect();
		let decoded = MatchRecord::from_fields(&fields).expect("decodes");
		assert_eq!(decoded, original);
	}
}
