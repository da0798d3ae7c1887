//! Wire DTOs for the public HTTP surface. Kept separate from the domain
//! types in `collab_service` so a wire-format change never has to touch
//! FSM logic, and vice versa.

use collab_service::collaborators::Question;
use collab_service::matchmaker::{ConfirmOutcome, FindMatchOutcome, MatchDetails};
use collab_service::room::ConnectOutcome;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct FindMatchRequest {
	pub user_id: String,
	pub difficulty: String,
	pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FindMatchResponse {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub match_id: Option<String>,
	pub message: String,
}

impl From<FindMatchOutcome> for FindMatchResponse {
	fn from(outcome: FindMatchOutcome) -> Self {
		match outcome {
			| FindMatchOutcome::Matched { match_id } =>
				Self { match_id: Some(match_id), message: "match has been found".into() },
			| FindMatchOutcome::NoMatch =>
				Self { match_id: None, message: "could not find a match after 3 minutes".into() },
			| FindMatchOutcome::Terminated =>
				Self { match_id: None, message: "matchmaking has been terminated".into() },
		}
	}
}

pub type TerminateMatchRequest = FindMatchRequest;

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
	pub message: String,
}

impl MessageResponse {
	#[must_use]
	pub fn new(message: impl Into<String>) -> Self { Self { message: message.into() } }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfirmMatchRequest {
	pub user_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchDetailsDto {
	pub match_id: String,
	pub difficulty: String,
	pub category: String,
}

impl From<MatchDetails> for MatchDetailsDto {
	fn from(details: MatchDetails) -> Self {
		Self { match_id: details.match_id, difficulty: details.difficulty, category: details.category }
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfirmMatchResponse {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub match_details: Option<MatchDetailsDto>,
	pub message: String,
}

impl From<ConfirmOutcome> for ConfirmMatchResponse {
	fn from(outcome: ConfirmOutcome) -> Self {
		match outcome {
			| ConfirmOutcome::Started(details) =>
				Self { match_details: Some(details.into()), message: "starting match".into() },
			| ConfirmOutcome::PartnerDeclined =>
				Self { match_details: None, message: "partner failed to accept the match".into() },
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionDto {
	pub title: String,
	pub description: String,
	pub code_template: String,
	pub solution_sample: String,
	pub difficulty: String,
	pub category: String,
}

impl From<Question> for QuestionDto {
	fn from(q: Question) -> Self {
		Self {
			title: q.title,
			description: q.description,
			code_template: q.code_template,
			solution_sample: q.solution_sample,
			difficulty: q.difficulty,
			category: q.category,
		}
	}
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectResponse {
	pub question: QuestionDto,
	pub partner_name: String,
}

impl From<ConnectOutcome> for ConnectResponse {
	fn from(outcome: ConnectOutcome) -> Self {
		Self { question: outcome.question.into(), partner_name: outcome.partner_name }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct TerminateRoomRequest {
	pub data: String,
}
