use axum::{
	Json, Router,
	extract::{Path, State},
	routing::{delete, post},
};
use collab_api::dto::{
	ConfirmMatchRequest, ConfirmMatchResponse, FindMatchRequest, FindMatchResponse, MessageResponse,
	TerminateMatchRequest,
};
use collab_core::Result;
use collab_kv::Databases;
use collab_service::Matchmaker;

#[derive(Clone)]
pub struct AppState {
	pub matchmaker: Matchmaker,
}

impl collab_api::HasDatabases for AppState {
	fn databases(&self) -> &Databases { self.matchmaker.databases() }
}

pub fn build(state: AppState) -> Router {
	collab_api::health::routes::<AppState>()
		.route("/find_match", post(find_match))
		.route("/terminate_match", delete(terminate_match))
		.route("/confirm_match/{match_id}", post(confirm_match))
		.with_state(state)
}

async fn find_match(
	State(state): State<AppState>,
	Json(body): Json<FindMatchRequest>,
) -> Result<Json<FindMatchResponse>> {
	let outcome = state.matchmaker.find_match(&body.user_id, &body.difficulty, &body.category).await?;
	Ok(Json(outcome.into()))
}

async fn terminate_match(
	State(state): State<AppState>,
	Json(body): Json<TerminateMatchRequest>,
) -> Result<Json<MessageResponse>> {
	state.matchmaker.terminate_match(&body.user_id, &body.difficulty, &body.category).await?;
	Ok(Json(MessageResponse::new("matchmaking has been terminated")))
}

async fn confirm_match(
	State(state): State<AppState>,
	Path(match_id): Path<String>,
	Json(body): Json<ConfirmMatchRequest>,
) -> Result<Json<ConfirmMatchResponse>> {
	let outcome = state.matchmaker.confirm_match(&match_id, &body.user_id).await?;
	Ok(Json(outcome.into()))
}
