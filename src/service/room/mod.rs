//! Room Manager (C3): `on_match_confirmed_tick`, `connect`, `reconnect`,
//! `exit`, `terminate`, wired atop the namespace R primitives in [`kv`].

pub mod grace;
pub mod heartbeat;
pub mod kv;
pub mod types;

use std::collections::HashMap;

use collab_core::{Error, Result};
use collab_kv::{keys, lock};
use deadpool_redis::Pool;
use redis::AsyncCommands;

use self::types::RoomRecord;
use crate::collaborators::{Collaborators, Question, ReviewSubmission};
use crate::ws_gateway::{OutboundFrame, OutboundKind, WsGateway};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOutcome {
	pub question: Question,
	pub partner_name: String,
}

#[derive(Clone)]
pub struct RoomManager {
	rooms_pool: Pool,
	events_pool: Pool,
	collaborators: Collaborators,
	gateway: WsGateway,
}

impl RoomManager {
	#[must_use]
	pub fn new(rooms_pool: Pool, events_pool: Pool, collaborators: Collaborators, gateway: WsGateway) -> Self {
		Self { rooms_pool, events_pool, collaborators, gateway }
	}

	/// Polled on an interval by the binary; returns whether a room was
	/// actually built this tick, purely for logging.
	pub async fn on_match_confirmed_tick(&self) -> Result<bool> {
		let event_lock_key = keys::lock(keys::EVENT_MANAGER_LOCK);
		let mut events_conn = self.events_pool.get().await?;
		let guard = lock::acquire(&mut events_conn, &event_lock_key).await?;

		let event = read_create_room_event(&self.events_pool).await?;
		let did_work = event.is_some();

		if let Some(fields) = event {
			self.build_room(&fields).await?;
			delete_create_room_event(&self.events_pool).await?;
		}

		lock::release(&mut events_conn, guard).await?;
		Ok(did_work)
	}

	async fn build_room(&self, fields: &HashMap<String, String>) -> Result {
		let match_id = fields.get("match_id").cloned().unwrap_or_default();
		let user_one = fields.get("user_one").cloned().unwrap_or_default();
		let user_two = fields.get("user_two").cloned().unwrap_or_default();
		let difficulty = fields.get("difficulty").cloned().unwrap_or_default();
		let category = fields.get("category").cloned().unwrap_or_default();
		let start_time = collab_core::time::now_rfc3339();

		let record = RoomRecord::new(&match_id, &user_one, &user_two, &difficulty, &category, start_time);
		kv::set_room(&self.rooms_pool, &user_one, &record).await?;
		kv::set_room(&self.rooms_pool, &user_two, &record).await?;
		kv::set_heartbeat(&self.rooms_pool, &user_one).await?;
		kv::set_heartbeat(&self.rooms_pool, &user_two).await?;

		tracing::info!(%match_id, %user_one, %user_two, "room created");
		Ok(())
	}

	/// Lazily assigns a question: the first `connect` for a room fetches it
	/// and mirrors it into both sides' hashes.
	pub async fn connect(&self, user_id: &str, room_id: &str) -> Result<ConnectOutcome> {
		let Some(mut record) = kv::get_room(&self.rooms_pool, user_id).await? else {
			return Err(Error::client("user has no active room"));
		};
		if record.match_id != room_id {
			return Err(Error::client("room id does not match user's active room"));
		}

		let room_lock_key = keys::lock(room_id);
		let mut conn = self.rooms_pool.get().await?;
		let guard = lock::acquire(&mut conn, &room_lock_key).await?;

		if !record.has_question() {
			let question = self.collaborators.fetch_question(&record.category, &record.difficulty).await?;
			record.set_question(question.clone());
			kv::set_room(&self.rooms_pool, user_id, &record).await?;

			if let Some(partner) = record.partner_of(user_id) {
				if let Some(mut partner_record) = kv::get_room(&self.rooms_pool, partner).await? {
					partner_record.set_question(question);
					kv::set_room(&self.rooms_pool, partner, &partner_record).await?;
				}
			}
		}

		lock::release(&mut conn, guard).await?;

		let partner_name = record.name_placeholder_of(user_id).to_owned();
		let question = record.question.clone().expect("question assigned immediately above if missing");
		Ok(ConnectOutcome { question, partner_name })
	}

	/// Refreshes the caller's heartbeat and cancels any pending grace-hold.
	pub async fn reconnect(&self, user_id: &str) -> Result {
		let Some(record) = kv::get_room(&self.rooms_pool, user_id).await? else {
			return Err(Error::client("user has no active room"));
		};

		kv::delete_cleanup_marker(&self.rooms_pool, &record.match_id).await?;
		kv::set_heartbeat(&self.rooms_pool, user_id).await?;

		if let Some(partner) = record.partner_of(user_id) {
			if kv::heartbeat_alive(&self.rooms_pool, partner).await? {
				self.gateway.send(OutboundFrame {
					user_id: partner.to_owned(),
					room_id: record.match_id.clone(),
					message: OutboundKind::PartnerJoin,
				});
			}
		}
		Ok(())
	}

	/// Does not go through the expiry stream (no TTL lapses), so it invokes
	/// [`notify_partner_or_grace_hold`] directly — the same function the
	/// expiry consumer's own partner-left branch calls, so the two call
	/// sites can never drift.
	pub async fn exit(&self, user_id: &str) -> Result {
		if !kv::heartbeat_alive(&self.rooms_pool, user_id).await? {
			return Err(Error::client("user is not in a room"));
		}
		let Some(record) = kv::get_room(&self.rooms_pool, user_id).await? else {
			return Err(Error::client("user is not in a room"));
		};

		kv::delete_heartbeat(&self.rooms_pool, user_id).await?;
		notify_partner_or_grace_hold(&self.rooms_pool, &self.gateway, &record, user_id).await
	}

	/// Ends the match for both sides and submits the solution for review.
	pub async fn terminate(&self, user_id: &str, room_id: &str, submitted_solution: &str) -> Result {
		if !kv::heartbeat_alive(&self.rooms_pool, user_id).await? {
			return Err(Error::client("user is not in a room"));
		}
		let Some(record) = kv::get_room(&self.rooms_pool, user_id).await? else {
			return Err(Error::client("user is not in a room"));
		};
		if record.match_id != room_id {
			return Err(Error::client("room id does not match user's active room"));
		}

		if let Some(partner) = record.partner_of(user_id) {
			self.gateway.send(OutboundFrame {
				user_id: partner.to_owned(),
				room_id: room_id.to_owned(),
				message: OutboundKind::MatchTerminate,
			});
		}

		kv::teardown_room(&self.rooms_pool, room_id, &record.user_one, &record.user_two).await?;
		kv::delete_heartbeat(&self.rooms_pool, &record.user_one).await?;
		kv::delete_heartbeat(&self.rooms_pool, &record.user_two).await?;

		if let Some(question) = &record.question {
			let elapsed = collab_core::time::elapsed_seconds_since(&record.start_time);
			let submission = ReviewSubmission {
				title: &question.title,
				description: &question.description,
				code_template: &question.code_template,
				solution_sample: &question.solution_sample,
				difficulty: &record.difficulty,
				category: &record.category,
				time_elapsed: elapsed,
				submitted_solution,
				users: [&record.user_one, &record.user_two],
			};
			if let Err(e) = self.collaborators.submit_for_review(&submission).await {
				tracing::warn!(error = %e, %room_id, "best-effort review submission failed");
			}
		}

		tracing::info!(%room_id, %user_id, "match terminated");
		Ok(())
	}
}

/// The partner-left decision shared by `RoomManager::exit` and the expiry
/// consumer (`heartbeat::handle_entry`): if the partner's heartbeat is still
/// alive, tell them directly; otherwise both sides are gone and the room
/// only needs a grace-hold in case either reconnects.
pub async fn notify_partner_or_grace_hold(
	rooms_pool: &Pool,
	gateway: &WsGateway,
	room: &RoomRecord,
	departing_user_id: &str,
) -> Result {
	let Some(partner) = room.partner_of(departing_user_id) else {
		return Ok(());
	};

	if kv::heartbeat_alive(rooms_pool, partner).await? {
		gateway.send(OutboundFrame {
			user_id: partner.to_owned(),
			room_id: room.match_id.clone(),
			message: OutboundKind::PartnerLeft,
		});
	} else {
		grace::spawn(
			rooms_pool.clone(),
			room.match_id.clone(),
			room.user_one.clone(),
			room.user_two.clone(),
			departing_user_id.to_owned(),
		);
	}
	Ok(())
}

async fn read_create_room_event(events_pool: &Pool) -> Result<Option<HashMap<String, String>>> {
	let mut conn = events_pool.get().await?;
	let fields: HashMap<String, String> = conn.hgetall(keys::CREATE_ROOM).await?;
	Ok(if fields.is_empty() { None } else { Some(fields) })
}

async fn delete_create_room_event(events_pool: &Pool) -> Result {
	let mut conn = events_pool.get().await?;
	let _: () = conn.del(keys::CREATE_ROOM).await?;
	Ok(())
}
