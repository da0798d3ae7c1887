//! Domain logic shared by the three binaries: the matchmaker FSM, the room
//! manager, the downstream HTTP collaborators, and the outbound gateway
//! WebSocket. Pure decision types live in each submodule's `types.rs`; KV
//! access is a thin wrapper over `collab_kv` so the decisions stay
//! unit-testable without a live Redis server.

pub mod collaborators;
pub mod matchmaker;
pub mod room;
pub mod ws_gateway;

pub use collaborators::Collaborators;
pub use matchmaker::Matchmaker;
pub use room::RoomManager;
pub use ws_gateway::WsGateway;
