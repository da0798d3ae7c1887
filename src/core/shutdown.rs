use tokio::sync::watch;

/// Cooperative shutdown signal shared by every background task in a binary.
///
/// Cloned freely; `signaled()` resolves once `Stop::fire` has been called
/// from the `SIGINT`/`SIGTERM` handler installed in `main`. Loops select
/// between their own work and `signaled()` so that a blocking KV pop or a
/// grace-hold sleep never prevents shutdown from completing within the
/// process's drain budget.
#[derive(Debug, Clone)]
pub struct Stop {
	tx: watch::Sender<bool>,
}

#[derive(Debug, Clone)]
pub struct StopWatch {
	rx: watch::Receiver<bool>,
}

#[must_use]
pub fn channel() -> (Stop, StopWatch) {
	let (tx, rx) = watch::channel(false);
	(Stop { tx }, StopWatch { rx })
}

impl Stop {
	pub fn fire(&self) { let _ = self.tx.send(true); }
}

impl StopWatch {
	#[must_use]
	pub fn is_stopped(&self) -> bool { *self.rx.borrow() }

	/// Resolves once shutdown has been signaled. Safe to await repeatedly
	/// and from multiple tasks.
	pub async fn signaled(&mut self) {
		if self.is_stopped() {
			return;
		}
		let _ = self.rx.changed().await;
	}
}

/// Waits for `SIGINT` (and `SIGTERM` on unix) and fires `stop`.
pub async fn listen(stop: Stop) {
	#[cfg(unix)]
	{
		use tokio::signal::unix::{SignalKind, signal};
		let mut term = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
		tokio::select! {
			_ = tokio::signal::ctrl_c() => {},
			_ = term.recv() => {},
		}
	}
	#[cfg(not(unix))]
	{
		let _ = tokio::signal::ctrl_c().await;
	}

	tracing::info!("shutdown signal received");
	stop.fire();
}
