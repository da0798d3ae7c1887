use axum::{
	Json, Router,
	extract::{Path, State},
	http::HeaderMap,
	routing::post,
};
use collab_api::dto::{ConnectResponse, MessageResponse, TerminateRoomRequest};
use collab_core::{Error, Result};
use collab_kv::Databases;
use collab_service::RoomManager;

#[derive(Clone)]
pub struct AppState {
	pub room_manager: RoomManager,
	pub databases: Databases,
}

impl collab_api::HasDatabases for AppState {
	fn databases(&self) -> &Databases { &self.databases }
}

pub fn build(state: AppState) -> Router {
	collab_api::health::routes::<AppState>()
		.route("/connect/{room_id}", post(connect))
		.route("/reconnect", post(reconnect))
		.route("/exit", post(exit))
		.route("/terminate/{room_id}", post(terminate))
		.with_state(state)
}

/// Every route here identifies the caller via this header rather than a
/// request body field, matching how `reconnect`/`exit`/`terminate` carry no
/// other meaningful payload than the caller's own id.
fn user_id_from_headers(headers: &HeaderMap) -> Result<String> {
	headers
		.get("x-user-id")
		.and_then(|v| v.to_str().ok())
		.map(str::to_owned)
		.ok_or_else(|| Error::client("missing X-User-ID header"))
}

async fn connect(
	State(state): State<AppState>,
	Path(room_id): Path<String>,
	headers: HeaderMap,
) -> Result<Json<ConnectResponse>> {
	let user_id = user_id_from_headers(&headers)?;
	let outcome = state.room_manager.connect(&user_id, &room_id).await?;
	Ok(Json(outcome.into()))
}

async fn reconnect(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<MessageResponse>> {
	let user_id = user_id_from_headers(&headers)?;
	state.room_manager.reconnect(&user_id).await?;
	Ok(Json(MessageResponse::new("reconnected to room")))
}

async fn exit(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<MessageResponse>> {
	let user_id = user_id_from_headers(&headers)?;
	state.room_manager.exit(&user_id).await?;
	Ok(Json(MessageResponse::new("left the room")))
}

async fn terminate(
	State(state): State<AppState>,
	Path(room_id): Path<String>,
	headers: HeaderMap,
	Json(body): Json<TerminateRoomRequest>,
) -> Result<Json<MessageResponse>> {
	let user_id = user_id_from_headers(&headers)?;
	state.room_manager.terminate(&user_id, &room_id, &body.data).await?;
	Ok(Json(MessageResponse::new("match terminated")))
}
