//! Service registry client (C4): registers this instance and its routes
//! with the external API gateway on startup, then heartbeats periodically.
//!
//! This is deliberately the simplest of the five components — a thin
//! `reqwest` client with its own retry/backoff loop, wired into the process
//! lifecycle the same way the KV pool and the WebSocket gateway connection
//! are: built once in `main`, started explicitly, stopped on shutdown.

use std::{sync::Arc, time::Duration};

use collab_core::{Config, shutdown::StopWatch};
use serde::Serialize;
use uuid::Uuid;

/// Authorization annotation the gateway expects per registered operation.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	User,
	Admin,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteDescriptor {
	pub method: &'static str,
	pub path: &'static str,
	pub roles: &'static [Role],
}

#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
	service_name: &'static str,
	instance_id: Uuid,
	address: &'a str,
	openapi: OpenApiDoc<'a>,
}

#[derive(Debug, Serialize)]
struct OpenApiDoc<'a> {
	routes: &'a [RouteDescriptor],
}

#[derive(Debug, Serialize)]
struct HeartbeatBody {
	service_name: &'static str,
	instance_id: Uuid,
}

pub struct RegistryClient {
	http: reqwest::Client,
	config: Arc<Config>,
	service_name: &'static str,
	instance_id: Uuid,
	routes: Vec<RouteDescriptor>,
}

const BACKOFF_INITIAL: Duration = Duration::from_secs(1);
const BACKOFF_MAX: Duration = Duration::from_secs(30);

impl RegistryClient {
	#[must_use]
	pub fn new(
		config: Arc<Config>,
		service_name: &'static str,
		instance_id: Uuid,
		routes: Vec<RouteDescriptor>,
	) -> Self {
		Self { http: reqwest::Client::new(), config, service_name, instance_id, routes }
	}

	/// Registers with the gateway, retrying with exponential backoff
	/// (capped at [`BACKOFF_MAX`]) until `stop` is signaled or registration
	/// succeeds. A gateway that never comes up only delays this task, never
	/// the binary's own HTTP handlers.
	pub async fn register_with_retry(&self, stop: &mut StopWatch) {
		let mut backoff = BACKOFF_INITIAL;
		loop {
			match self.register_once().await {
				| Ok(()) => {
					tracing::info!(service = self.service_name, %self.instance_id, "registered with gateway");
					return;
				},
				| Err(e) => {
					tracing::warn!(error = %e, ?backoff, "gateway registration failed, retrying");
				},
			}

			tokio::select! {
				() = tokio::time::sleep(backoff) => {},
				() = stop.signaled() => return,
			}
			backoff = (backoff * 2).min(BACKOFF_MAX);
		}
	}

	async fn register_once(&self) -> Result<(), reqwest::Error> {
		let url = format!("{}{}", self.config.apigateway_url, self.config.registry_path);
		let body = RegisterBody {
			service_name: self.service_name,
			instance_id: self.instance_id,
			address: &self.config.host_url,
			openapi: OpenApiDoc { routes: &self.routes },
		};
		self.http.post(url).json(&body).send().await?.error_for_status()?;
		Ok(())
	}

	/// Runs until `stop` fires, POSTing a heartbeat every
	/// `heartbeat_period_secs`. Individual heartbeat failures are logged and
	/// do not end the loop — the gateway is expected to evict instances
	/// that stop heartbeating on its own schedule.
	pub async fn heartbeat_loop(&self, mut stop: StopWatch) {
		let mut interval = tokio::time::interval(self.config.heartbeat_period());
		loop {
			tokio::select! {
				_ = interval.tick() => {
					if let Err(e) = self.heartbeat_once().await {
						tracing::warn!(error = %e, "gateway heartbeat failed");
					}
				},
				() = stop.signaled() => {
					tracing::info!("registry heartbeat loop stopping");
					return;
				},
			}
		}
	}

	async fn heartbeat_once(&self) -> Result<(), reqwest::Error> {
		let url = format!("{}{}", self.config.apigateway_url, self.config.heartbeat_path);
		let body = HeartbeatBody { service_name: self.service_name, instance_id: self.instance_id };
		self.http.post(url).json(&body).send().await?.error_for_status()?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn route_descriptor_serializes_role_annotations() {
		let route = RouteDescriptor { method: "POST", path: "/find_match", roles: &[Role::User] };
		let json = serde_json::to_value(&route).expect("serializable");
		assert_eq!(json["roles"][0], "user");
	}
}
