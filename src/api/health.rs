//! `/health` and `/` — wired ahead of the domain routes on every binary,
//! regardless of what domain surface that binary otherwise exposes.

use axum::{
	Json, Router,
	extract::State,
	response::{IntoResponse, Response},
	routing::get,
};
use http::StatusCode;
use serde_json::json;

/// Implemented by each binary's `AppState` so this module stays generic
/// over which domain state the binary actually carries.
pub trait HasDatabases {
	fn databases(&self) -> &collab_kv::Databases;
}

pub fn routes<S>() -> Router<S>
where
	S: HasDatabases + Clone + Send + Sync + 'static,
{
	Router::new().route("/health", get(health::<S>)).route("/", get(root))
}

async fn health<S>(State(state): State<S>) -> Response
where
	S: HasDatabases + Clone + Send + Sync + 'static,
{
	match state.databases().ping().await {
		| Ok(()) => (StatusCode::OK, Json(json!({"status": "ok"}))).into_response(),
		| Err(e) => (
			StatusCode::SERVICE_UNAVAILABLE,
			Json(json!({"status": "error", "detail": e.to_string()})),
		)
			.into_response(),
	}
}

async fn root() -> Response { Json(json!({"status": "working"})).into_response() }
