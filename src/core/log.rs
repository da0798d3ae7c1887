use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LogFormat;

/// Initialize the global tracing subscriber for a binary.
///
/// Human-readable output goes to stderr; when `log_format` is `Json` a
/// second layer writes newline-delimited JSON to a daily-rotated file under
/// `./logs/{service_name}.log`, matching how this codebase keeps a
/// machine-parseable record in production without losing the readable
/// console stream used in development.
///
/// The returned `WorkerGuard` must be kept alive for the lifetime of the
/// process; dropping it flushes and stops the background writer.
pub fn init(service_name: &str, format: LogFormat) -> WorkerGuard {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

	let file_appender = tracing_appender::rolling::daily("logs", format!("{service_name}.log"));
	let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

	let file_layer = fmt::layer()
		.json()
		.with_writer(non_blocking)
		.with_ansi(false);

	let console_layer = match format {
		| LogFormat::Pretty => fmt::layer().pretty().boxed(),
		| LogFormat::Json => fmt::layer().json().boxed(),
	};

	tracing_subscriber::registry()
		.with(filter)
		.with(console_layer)
		.with(file_layer)
		.init();

	guard
}
