//! The expiry observer binary (C2): bridges rooms-database key expiry into
//! the durable `expired_ttl` stream. It registers with the gateway and
//! shares the same logging and shutdown handling as the other two binaries,
//! but advertises no domain routes — only the ambient `/health` and `/`.

mod observer;
mod routes;

use std::sync::Arc;

use clap::Parser;
use collab_core::{
	Server,
	config::{Args, Config},
	shutdown,
};
use collab_kv::Databases;
use collab_registry::{RegistryClient, RouteDescriptor};

#[tokio::main]
async fn main() {
	let args = Args::parse();
	let config = Config::load(&args).unwrap_or_else(|e| {
		eprintln!("failed to load configuration: {e}");
		std::process::exit(1);
	});
	let _log_guard = collab_core::log::init("expiry-observer", config.log_format);

	let server = Server::new("expiry-observer", config);

	let databases = Databases::open(&server.config).unwrap_or_else(|e| {
		tracing::error!(error = %e, "failed to open redis connection pools");
		std::process::exit(1);
	});

	let (stop, mut stop_watch) = shutdown::channel();
	tokio::spawn(shutdown::listen(stop.clone()));

	let routes: Vec<RouteDescriptor> = Vec::new();
	let registry = Arc::new(RegistryClient::new(server.config.clone(), server.name, server.instance_id, routes));
	registry.register_with_retry(&mut stop_watch.clone()).await;
	tokio::spawn({
		let registry = registry.clone();
		let stop_watch = stop_watch.clone();
		async move { registry.heartbeat_loop(stop_watch).await }
	});

	tokio::spawn(observer::run(server.config.clone(), databases.events.clone(), stop_watch.clone()));

	let app = routes::build(routes::AppState { databases });

	let listener = tokio::net::TcpListener::bind(&server.config.bind_addr)
		.await
		.unwrap_or_else(|e| panic!("failed to bind {}: {e}", server.config.bind_addr));
	tracing::info!(addr = %server.config.bind_addr, "expiry observer listening");

	axum::serve(listener, app)
		.with_graceful_shutdown(async move { stop_watch.signaled().await })
		.await
		.expect("server loop failed");
}
