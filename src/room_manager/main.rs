//! The room manager binary (C3): `POST /connect/{room_id}`,
//! `POST /reconnect`, `POST /exit`, `POST /terminate/{room_id}`, plus the
//! background room-creation poll, the expiry-stream consumer and the
//! outbound gateway connection.

mod routes;

use std::{sync::Arc, time::Duration};

use clap::Parser;
use collab_core::{
	Server,
	config::{Args, Config},
	shutdown::{self, StopWatch},
};
use collab_kv::Databases;
use collab_registry::{RegistryClient, Role, RouteDescriptor};
use collab_service::{Collaborators, RoomManager, room::kv as room_kv, ws_gateway};
use deadpool_redis::Pool;
use tokio::sync::mpsc;

/// How often `on_match_confirmed_tick` polls for a pending `create_room`
/// handoff.
const ROOM_CREATION_POLL: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() {
	let args = Args::parse();
	let config = Config::load(&args).unwrap_or_else(|e| {
		eprintln!("failed to load configuration: {e}");
		std::process::exit(1);
	});
	let _log_guard = collab_core::log::init("room-manager", config.log_format);

	let server = Server::new("room-manager", config);

	let databases = Databases::open(&server.config).unwrap_or_else(|e| {
		tracing::error!(error = %e, "failed to open redis connection pools");
		std::process::exit(1);
	});

	let (stop, mut stop_watch) = shutdown::channel();
	tokio::spawn(shutdown::listen(stop.clone()));

	let (gateway, inbound_rx) = ws_gateway::start(server.config.clone(), stop_watch.clone());
	let collaborators = Collaborators::new(server.config.clone());
	let room_manager =
		RoomManager::new(databases.rooms.clone(), databases.events.clone(), collaborators, gateway.clone());

	tokio::spawn(collab_service::room::heartbeat::run(
		server.config.clone(),
		databases.rooms.clone(),
		server.instance_id,
		gateway,
		stop_watch.clone(),
	));
	tokio::spawn(dispatch_inbound_frames(inbound_rx, databases.rooms.clone(), stop_watch.clone()));
	tokio::spawn(poll_room_creation(room_manager.clone(), stop_watch.clone()));

	let routes = vec![
		RouteDescriptor { method: "POST", path: "/connect/{room_id}", roles: &[Role::User] },
		RouteDescriptor { method: "POST", path: "/reconnect", roles: &[Role::User] },
		RouteDescriptor { method: "POST", path: "/exit", roles: &[Role::User] },
		RouteDescriptor { method: "POST", path: "/terminate/{room_id}", roles: &[Role::User] },
	];
	let registry = Arc::new(RegistryClient::new(server.config.clone(), server.name, server.instance_id, routes));
	registry.register_with_retry(&mut stop_watch.clone()).await;
	tokio::spawn({
		let registry = registry.clone();
		let stop_watch = stop_watch.clone();
		async move { registry.heartbeat_loop(stop_watch).await }
	});

	let app = routes::build(routes::AppState { room_manager, databases });

	let listener = tokio::net::TcpListener::bind(&server.config.bind_addr)
		.await
		.unwrap_or_else(|e| panic!("failed to bind {}: {e}", server.config.bind_addr));
	tracing::info!(addr = %server.config.bind_addr, "room manager listening");

	axum::serve(listener, app)
		.with_graceful_shutdown(async move { stop_watch.signaled().await })
		.await
		.expect("server loop failed");
}

/// Dispatches frames the gateway forwards from clients — today just
/// `{"message": "heartbeat"}`, which refreshes the sender's own TTL the same
/// way an explicit `reconnect` call does.
async fn dispatch_inbound_frames(
	mut inbound_rx: mpsc::UnboundedReceiver<ws_gateway::InboundFrame>,
	rooms_pool: Pool,
	mut stop: StopWatch,
) {
	loop {
		let frame = tokio::select! {
			frame = inbound_rx.recv() => frame,
			() = stop.signaled() => return,
		};
		let Some(frame) = frame else { return };

		if frame.message == "heartbeat" {
			if let Err(e) = room_kv::set_heartbeat(&rooms_pool, &frame.user_id).await {
				tracing::warn!(error = %e, user_id = %frame.user_id, "failed to refresh heartbeat from websocket frame");
			}
		}
	}
}

/// Polls for a pending `create_room` handoff at a fixed interval. Any
/// instance may win the race for `event_manager_lock`; the others simply
/// find no event waiting and tick again.
async fn poll_room_creation(room_manager: RoomManager, mut stop: StopWatch) {
	let mut interval = tokio::time::interval(ROOM_CREATION_POLL);
	loop {
		tokio::select! {
			_ = interval.tick() => {
				if let Err(e) = room_manager.on_match_confirmed_tick().await {
					tracing::warn!(error = %e, "room creation tick failed");
				}
			},
			() = stop.signaled() => {
				tracing::info!("room creation poll stopping");
				return;
			},
		}
	}
}
