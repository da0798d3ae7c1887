//! Pure decision types for the room manager — mirrors
//! `matchmaker::types` in spirit: no KV access, fully unit-testable.

use std::collections::HashMap;

use crate::collaborators::Question;

/// `userroom:{user_id}` decoded. Both sides of a room hold an identical
/// copy except that each only ever sees its own key; the question fields
/// are mirrored into both by whoever triggers lazy assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomRecord {
	pub match_id: String,
	pub user_one: String,
	pub user_two: String,
	pub difficulty: String,
	pub category: String,
	pub start_time: String,
	pub question: Option<Question>,
}

impl RoomRecord {
	#[must_use]
	pub fn new(
		match_id: impl Into<String>,
		user_one: impl Into<String>,
		user_two: impl Into<String>,
		difficulty: impl Into<String>,
		category: impl Into<String>,
		start_time: impl Into<String>,
	) -> Self {
		Self {
			match_id: match_id.into(),
			user_one: user_one.into(),
			user_two: user_two.into(),
			difficulty: difficulty.into(),
			category: category.into(),
			start_time: start_time.into(),
			question: None,
		}
	}

	#[must_use]
	pub fn from_fields(fields: &HashMap<String, String>) -> Option<Self> {
		let question = if fields.contains_key("title") {
			Some(Question {
				title: fields.get("title")?.clone(),
				description: fields.get("description")?.clone(),
				code_template: fields.get("code_template")?.clone(),
				solution_sample: fields.get("solution_sample")?.clone(),
				difficulty: fields.get("difficulty")?.clone(),
				category: fields.get("category")?.clone(),
			})
		} else {
			None
		};

		Some(Self {
			match_id: fields.get("match_id")?.clone(),
			user_one: fields.get("user_one")?.clone(),
			user_two: fields.get("user_two")?.clone(),
			difficulty: fields.get("difficulty")?.clone(),
			category: fields.get("category")?.clone(),
			start_time: fields.get("start_time")?.clone(),
			question,
		})
	}

	#[must_use]
	pub fn as_fields(&self) -> Vec<(&'static str, String)> {
		let mut fields = vec![
			("match_id", self.match_id.clone()),
			("user_one", self.user_one.clone()),
			("user_two", self.user_two.clone()),
			("difficulty", self.difficulty.clone()),
			("category", self.category.clone()),
			("start_time", self.start_time.clone()),
		];
		if let Some(question) = &self.question {
			fields.push(("title", question.title.clone()));
			fields.push(("description", question.description.clone()));
			fields.push(("code_template", question.code_template.clone()));
			fields.push(("solution_sample", question.solution_sample.clone()));
		}
		fields
	}

	#[must_use]
	pub fn partner_of(&self, user_id: &str) -> Option<&str> {
		if self.user_one == user_id {
			Some(&self.user_two)
		} else if self.user_two == user_id {
			Some(&self.user_one)
		} else {
			None
		}
	}

	#[must_use]
	pub fn name_placeholder_of(&self, user_id: &str) -> &str {
		// Peer identities in this system are bare user ids (no separate
		// display-name field was ever introduced upstream); `partner_name`
		// in the `connect` response is therefore just the partner's id.
		self.partner_of(user_id).unwrap_or("")
	}

	#[must_use]
	pub fn has_question(&self) -> bool { self.question.is_some() }

	pub fn set_question(&mut self, question: Question) { self.question = Some(question); }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> RoomRecord { RoomRecord::new("m-1", "alice", "bob", "easy", "arrays", "2026-01-01T00:00:00Z") }

	#[test]
	fn partner_of_resolves_either_side() {
		let room = sample();
		assert_eq!(room.partner_of("alice"), Some("bob"));
		assert_eq!(room.partner_of("bob"), Some("alice"));
		assert_eq!(room.partner_of("carol"), None);
	}

	#[test]
	fn round_trips_without_question() {
		let original = sample();
		let fields: HashMap<String, String> = original.as_fields().into_iter().collect();
		let decoded = RoomRecord::from_fields(&fields).expect("decodes");
		assert_eq!(decoded, original);
		assert!(!decoded.has_question());
	}

	#[test]
	fn round_trips_with_question() {
		let mut original = sample();
		original.set_question(Question {
			title: "Two Sum".into(),
			description: "...".into(),
			code_template: "fn solve() {}".into(),
			solution_sample: "...".into(),
			difficulty: "easy".into(),
			category: "arrays".into(),
		});
		let fields: HashMap<String, String> = original.as_fields().into_iter().collect();
		let decoded = RoomRecord::from_fields(&fields).expect("decodes");
		assert!(decoded.has_question());
		assert_eq!(decoded, original);
	}
}
