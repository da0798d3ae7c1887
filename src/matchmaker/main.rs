//! The matchmaker binary (C1): `POST /find_match`, `DELETE /terminate_match`,
//! `POST /confirm_match/{match_id}`.

mod routes;

use std::sync::Arc;

use clap::Parser;
use collab_core::{
	Server,
	config::{Args, Config},
	shutdown,
};
use collab_kv::Databases;
use collab_registry::{RegistryClient, Role, RouteDescriptor};
use collab_service::Matchmaker;

#[tokio::main]
async fn main() {
	let args = Args::parse();
	let config = Config::load(&args).unwrap_or_else(|e| {
		eprintln!("failed to load configuration: {e}");
		std::process::exit(1);
	});
	let _log_guard = collab_core::log::init("matchmaker", config.log_format);

	let server = Server::new("matchmaker", config);

	let databases = Databases::open(&server.config).unwrap_or_else(|e| {
		tracing::error!(error = %e, "failed to open redis connection pools");
		std::process::exit(1);
	});

	let matchmaker = Matchmaker::new(databases, server.config.clone());

	let (stop, mut stop_watch) = shutdown::channel();
	tokio::spawn(shutdown::listen(stop.clone()));

	let routes = vec![
		RouteDescriptor { method: "POST", path: "/find_match", roles: &[Role::User] },
		RouteDescriptor { method: "DELETE", path: "/terminate_match", roles: &[Role::User] },
		RouteDescriptor { method: "POST", path: "/confirm_match/{match_id}", roles: &[Role::User] },
	];
	let registry = Arc::new(RegistryClient::new(server.config.clone(), server.name, server.instance_id, routes));
	registry.register_with_retry(&mut stop_watch.clone()).await;
	tokio::spawn({
		let registry = registry.clone();
		let stop_watch = stop_watch.clone();
		async move { registry.heartbeat_loop(stop_watch).await }
	});

	let app = routes::build(routes::AppState { matchmaker });

	let listener = tokio::net::TcpListener::bind(&server.config.bind_addr)
		.await
		.unwrap_or_else(|e| panic!("failed to bind {}: {e}", server.config.bind_addr));
	tracing::info!(addr = %server.config.bind_addr, "matchmaker listening");

	axum::serve(listener, app)
		.with_graceful_shutdown(async move { stop_watch.signaled().await })
		.await
		.expect("server loop failed");
}
