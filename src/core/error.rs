use axum::{
	Json,
	response::{IntoResponse, Response},
};
use http::StatusCode;
use serde_json::json;

/// Shared error taxonomy for the matchmaker, expiry observer and room
/// manager binaries.
///
/// `Client` and
/// `Conflict` are caller mistakes (400), `Upstream` is a downstream
/// collaborator failure (502), `Store` is KV connectivity (503), and
/// anything else is an internal bug (500) whose detail is logged but never
/// returned to the caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("{0}")]
	Client(String),

	#[error("{0}")]
	Conflict(String),

	#[error("upstream collaborator error: {0}")]
	Upstream(String),

	#[error("store error: {0}")]
	Store(String),

	#[error("internal error: {0}")]
	Internal(String),
}

pub type Result<T = (), E = Error> = std::result::Result<T, E>;

impl Error {
	pub fn client(msg: impl Into<String>) -> Self { Self::Client(msg.into()) }

	pub fn conflict(msg: impl Into<String>) -> Self { Self::Conflict(msg.into()) }

	pub fn upstream(msg: impl Into<String>) -> Self { Self::Upstream(msg.into()) }

	fn status(&self) -> StatusCode {
		match self {
			| Self::Client(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
			| Self::Upstream(_) => StatusCode::BAD_GATEWAY,
			| Self::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
			| Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

impl From<redis::RedisError> for Error {
	fn from(e: redis::RedisError) -> Self { Self::Store(e.to_string()) }
}

impl From<deadpool_redis::PoolError> for Error {
	fn from(e: deadpool_redis::PoolError) -> Self { Self::Store(e.to_string()) }
}

impl From<reqwest::Error> for Error {
	fn from(e: reqwest::Error) -> Self { Self::Upstream(e.to_string()) }
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status();
		if status == StatusCode::INTERNAL_SERVER_ERROR {
			tracing::error!(error = %self, "internal error");
			return (status, Json(json!({ "message": "internal error" }))).into_response();
		}

		tracing::debug!(error = %self, %status, "request failed");
		(status, Json(json!({ "message": self.to_string() }))).into_response()
	}
}
