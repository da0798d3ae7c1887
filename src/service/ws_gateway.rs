//! The single outbound WebSocket connection each process holds to the
//! gateway. The Room Manager is the only binary that actually opens this
//! connection today, but the type lives here so any future binary that
//! needs to speak to the gateway reuses the same framing and reconnect
//! policy.

use std::sync::Arc;

use collab_core::{Config, shutdown::StopWatch};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// One of the three outbound notifications the room manager sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboundKind {
	PartnerLeft,
	PartnerJoin,
	MatchTerminate,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutboundFrame {
	pub user_id: String,
	pub room_id: String,
	pub message: OutboundKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundFrame {
	pub user_id: String,
	pub message: String,
}

const RECONNECT_BACKOFF_INITIAL_MS: u64 = 500;
const RECONNECT_BACKOFF_MAX_MS: u64 = 15_000;

/// Handle for sending frames to the gateway from any task. Cheap to clone.
#[derive(Clone)]
pub struct WsGateway {
	outbound: mpsc::UnboundedSender<OutboundFrame>,
}

impl WsGateway {
	pub fn send(&self, frame: OutboundFrame) {
		if self.outbound.send(frame).is_err() {
			tracing::warn!("gateway connection task has exited, dropping outbound frame");
		}
	}
}

/// Spawns the connection-owning task and returns a cloneable sender handle
/// plus the channel of frames received from clients (currently only
/// `{"message": "heartbeat"}`). Reconnects with capped exponential backoff
/// whenever the connection drops, and exits once `stop` fires.
#[must_use]
pub fn start(config: Arc<Config>, mut stop: StopWatch) -> (WsGateway, mpsc::UnboundedReceiver<InboundFrame>) {
	let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<OutboundFrame>();
	let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<InboundFrame>();

	tokio::spawn(async move {
		let mut backoff_ms = RECONNECT_BACKOFF_INITIAL_MS;

		loop {
			if stop.is_stopped() {
				return;
			}

			let connected = tokio_tungstenite::connect_async(&config.gateway_websocket_url).await;
			let Ok((stream, _response)) = connected else {
				tracing::warn!(url = %config.gateway_websocket_url, backoff_ms, "gateway websocket connect failed");
				tokio::select! {
					() = tokio::time::sleep(std::time::Duration::from_millis(backoff_ms)) => {},
					() = stop.signaled() => return,
				}
				backoff_ms = (backoff_ms * 2).min(RECONNECT_BACKOFF_MAX_MS);
				continue;
			};

			tracing::info!(url = %config.gateway_websocket_url, "connected to gateway websocket");
			backoff_ms = RECONNECT_BACKOFF_INITIAL_MS;

			let (mut write, mut read) = stream.split();
			loop {
				tokio::select! {
					Some(frame) = outbound_rx.recv() => {
						match serde_json::to_string(&frame) {
							Ok(text) => {
								if let Err(e) = write.send(Message::Text(text)).await {
									tracing::warn!(error = %e, "gateway websocket send failed, reconnecting");
									break;
								}
							},
							Err(e) => tracing::error!(error = %e, "failed to encode outbound frame"),
						}
					},
					msg = read.next() => {
						match msg {
							Some(Ok(Message::Text(text))) => {
								match serde_json::from_str::<InboundFrame>(&text) {
									Ok(frame) => { let _ = inbound_tx.send(frame); },
									Err(e) => tracing::warn!(error = %e, %text, "ignoring malformed inbound frame"),
								}
							},
							Some(Ok(Message::Close(_))) | None => {
								tracing::warn!("gateway websocket closed, reconnecting");
								break;
							},
							Some(Ok(_)) => {},
							Some(Err(e)) => {
								tracing::warn!(error = %e, "gateway websocket read error, reconnecting");
								break;
							},
						}
					},
					() = stop.signaled() => {
						let _ = write.close().await;
						return;
					},
				}
			}
		}
	});

	(WsGateway { outbound: outbound_tx }, inbound_rx)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn outbound_frame_serializes_snake_case_message() {
		let frame = OutboundFrame {
			user_id: "bob".into(),
			room_id: "room-1".into(),
			message: OutboundKind::PartnerLeft,
		};
		let json = serde_json::to_value(&frame).unwrap();
		assert_eq!(json["message"], "partner_left");
	}

	#[test]
	fn inbound_heartbeat_frame_parses() {
		let frame: InboundFrame =
			serde_json::from_str(r#"{"user_id":"alice","message":"heartbeat"}"#).unwrap();
		assert_eq!(frame.user_id, "alice");
		assert_eq!(frame.message, "heartbeat");
	}
}
