//! Thin clients for the two downstream HTTP collaborators: the question
//! bank (lazy question assignment) and the review service (terminate's
//! best-effort submission).

use std::sync::Arc;

use collab_core::{Config, Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
	pub title: String,
	pub description: String,
	pub code_template: String,
	pub solution_sample: String,
	pub difficulty: String,
	pub category: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewSubmission<'a> {
	pub title: &'a str,
	pub description: &'a str,
	pub code_template: &'a str,
	pub solution_sample: &'a str,
	pub difficulty: &'a str,
	pub category: &'a str,
	pub time_elapsed: i64,
	pub submitted_solution: &'a str,
	pub users: [&'a str; 2],
}

#[derive(Clone)]
pub struct Collaborators {
	http: reqwest::Client,
	config: Arc<Config>,
}

impl Collaborators {
	#[must_use]
	pub fn new(config: Arc<Config>) -> Self { Self { http: reqwest::Client::new(), config } }

	/// `GET {svc}/pool/{category}/{difficulty}/`. A failure here is surfaced
	/// to the caller as a client error so the UI can retry the
	/// `connect` call, rather than being treated as a server fault.
	pub async fn fetch_question(&self, category: &str, difficulty: &str) -> Result<Question> {
		let url = format!(
			"{}/{}/{}/",
			self.config.question_service_pool_url.trim_end_matches('/'),
			category,
			difficulty
		);

		let response = self
			.http
			.get(&url)
			.send()
			.await
			.map_err(|e| Error::client(format!("question bank unreachable: {e}")))?;

		if !response.status().is_success() {
			return Err(Error::client(format!(
				"question bank returned {}",
				response.status()
			)));
		}

		response
			.json::<Question>()
			.await
			.map_err(|e| Error::client(format!("question bank returned malformed payload: {e}")))
	}

	/// `POST {svc}` with the terminate payload. Best-effort: failures are
	/// logged by the caller and never unwind the terminate flow.
	pub async fn submit_for_review(&self, submission: &ReviewSubmission<'_>) -> Result {
		self.http
			.post(&self.config.question_service_history_url)
			.json(submission)
			.send()
			.await?
			.error_for_status()?;
		Ok(())
	}
}
