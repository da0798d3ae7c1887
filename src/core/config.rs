use std::time::Duration;

use clap::Parser;
use figment::{
	Figment,
	providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Command-line arguments common to all three binaries.
///
/// Only a config file path is exposed on the CLI; everything else is
/// supplied by the environment, matching how this codebase lets the
/// orchestrator (compose/k8s) own configuration rather than flags.
#[derive(Debug, Parser)]
#[command(about, version)]
pub struct Args {
	/// Path to an optional TOML config file, merged beneath environment
	/// variables.
	#[arg(long, env = "CONFIG_FILE")]
	pub config_file: Option<String>,
}

/// Layered configuration shared by the matchmaker, expiry observer and room
/// manager binaries. Precedence, lowest to highest: compiled-in defaults,
/// `config_file` (TOML) if present, then environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
	pub redis_host: String,
	pub redis_port: u16,
	pub redis_stream_key: String,
	pub redis_group: String,

	pub front_end_url: String,
	pub host_url: String,
	pub bind_addr: String,

	pub apigateway_url: String,
	pub registry_path: String,
	pub heartbeat_path: String,
	pub heartbeat_period_secs: u64,

	pub question_service_pool_url: String,
	pub question_service_history_url: String,
	pub gateway_websocket_url: String,

	pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	Pretty,
	Json,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			redis_host: "127.0.0.1".into(),
			redis_port: 6379,
			redis_stream_key: "expired_ttl".into(),
			redis_group: "collab".into(),

			front_end_url: "http://localhost:3000".into(),
			host_url: "http://localhost:8080".into(),
			bind_addr: "0.0.0.0:8080".into(),

			apigateway_url: "http://localhost:8000".into(),
			registry_path: "/registry/register-openapi".into(),
			heartbeat_path: "/registry/heartbeat".into(),
			heartbeat_period_secs: 30,

			question_service_pool_url: "http://localhost:8081/pool".into(),
			question_service_history_url: "http://localhost:8082".into(),
			gateway_websocket_url: "ws://localhost:8000/ws".into(),

			log_format: LogFormat::Pretty,
		}
	}
}

impl Config {
	pub fn load(args: &Args) -> Result<Self> {
		let mut figment = Figment::from(Serialized::defaults(Config::default()));
		if let Some(path) = &args.config_file {
			figment = figment.merge(Toml::file(path));
		}
		figment = figment.merge(Env::raw());

		figment
			.extract()
			.map_err(|e| Error::Internal(format!("failed to load configuration: {e}")))
	}

	#[must_use]
	pub fn heartbeat_period(&self) -> Duration { Duration::from_secs(self.heartbeat_period_secs) }

	#[must_use]
	pub fn redis_url(&self, db: u8) -> String {
		format!("redis://{}:{}/{db}", self.redis_host, self.redis_port)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_are_internally_consistent() {
		let config = Config::default();
		assert_eq!(config.redis_url(3), "redis://127.0.0.1:6379/3");
		assert_eq!(config.heartbeat_period(), Duration::from_secs(30));
	}

	#[test]
	fn env_overrides_defaults() {
		// figment::providers::Env::raw() reads process environment at
		// extract-time; exercise the merge logic directly instead of
		// mutating global env state from a test.
		let figment = Figment::from(Serialized::defaults(Config::default()))
			.merge(("redis_host", "redis.internal"));
		let config: Config = figment.extract().expect("valid config");
		assert_eq!(config.redis_host, "redis.internal");
	}
}
