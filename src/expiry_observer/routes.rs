use axum::Router;
use collab_kv::Databases;

/// No domain routes of its own — only the ambient `/health` and `/` every
/// binary mounts regardless of what it otherwise exposes.
#[derive(Clone)]
pub struct AppState {
	pub databases: Databases,
}

impl collab_api::HasDatabases for AppState {
	fn databases(&self) -> &Databases { &self.databases }
}

pub fn build(state: AppState) -> Router { collab_api::health::routes::<AppState>().with_state(state) }
