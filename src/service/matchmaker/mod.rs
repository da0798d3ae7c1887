//! Matchmaker (C1): `find_match`, `confirm_match`, `terminate_match`, wired
//! atop the namespace M/E/X primitives in [`queue`] and [`confirm`].

pub mod confirm;
pub mod queue;
pub mod types;

use std::sync::Arc;

use collab_core::{Config, Error, Result};
use collab_kv::{keys, lock, pool, rendezvous};

use self::types::{FindWake, InQueue, MatchRecord, classify_find_wake, derive_match_id};

/// The matchmaker request's 180 s hard cap.
const FIND_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(180);
/// The confirmation wait's 15 s cap. What matters is that the supervisor's
/// own 12 s sleep always resolves an abandoned match before a second
/// `confirm_match` call's own wait gives up, so the caller never times out
/// against a record that the supervisor is about to delete out from under
/// it without a wake.
const CONFIRM_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindMatchOutcome {
	Matched { match_id: String },
	NoMatch,
	Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchDetails {
	pub match_id: String,
	pub difficulty: String,
	pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
	Started(MatchDetails),
	PartnerDeclined,
}

#[derive(Clone)]
pub struct Matchmaker {
	databases: pool::Databases,
	config: Arc<Config>,
}

impl Matchmaker {
	#[must_use]
	pub fn new(databases: pool::Databases, config: Arc<Config>) -> Self { Self { databases, config } }

	#[must_use]
	pub fn databases(&self) -> &pool::Databases { &self.databases }

	/// Pairs the caller with a waiting partner if one exists, otherwise queues
	/// the caller and waits. Supersedes any prior in-flight request from the
	/// same user before starting this one.
	pub async fn find_match(&self, user_id: &str, difficulty: &str, category: &str) -> Result<FindMatchOutcome> {
		if let Some(prior) = queue::get_inqueue(&self.databases.matchmaking, user_id).await? {
			if prior.match_found {
				return Err(Error::conflict("user is already in a confirmed match"));
			}
			self.supersede_prior_request(user_id, &prior).await?;
		}

		queue::set_inqueue(&self.databases.matchmaking, user_id, &InQueue::new(difficulty, category)).await?;

		let bucket_lock_key = keys::lock(&keys::queue(difficulty, category));
		let mut bucket_conn = self.databases.matchmaking.get().await?;
		let guard = lock::acquire(&mut bucket_conn, &bucket_lock_key).await?;

		let partner = queue::pop_next(&self.databases.matchmaking, difficulty, category).await?;

		let Some(partner) = partner else {
			queue::push_self(&self.databases.matchmaking, difficulty, category, user_id).await?;
			lock::release(&mut bucket_conn, guard).await?;
			return self.wait_for_match(user_id, difficulty, category).await;
		};

		let match_id = derive_match_id(user_id, &partner);
		let record = MatchRecord::new(partner.clone(), user_id.to_owned(), difficulty, category);

		confirm::create(&self.databases.confirm, &match_id, &record).await?;
		queue::mark_match_found(&self.databases.matchmaking, user_id).await?;
		queue::mark_match_found(&self.databases.matchmaking, &partner).await?;

		let mut events_conn = self.databases.events.get().await?;
		rendezvous::notify(&mut events_conn, &keys::match_found(&partner), &match_id).await?;

		lock::release(&mut bucket_conn, guard).await?;

		confirm::spawn_supervisor(self.databases.confirm.clone(), match_id.clone());

		tracing::info!(%user_id, partner = %partner, %match_id, "match formed");
		Ok(FindMatchOutcome::Matched { match_id })
	}

	async fn supersede_prior_request(&self, user_id: &str, prior: &InQueue) -> Result {
		let mut events_conn = self.databases.events.get().await?;
		rendezvous::notify(&mut events_conn, &keys::match_found(user_id), types::SUPERSEDED_TOKEN).await?;

		let bucket_lock_key = keys::lock(&keys::queue(&prior.difficulty, &prior.category));
		let mut bucket_conn = self.databases.matchmaking.get().await?;
		let guard = lock::acquire(&mut bucket_conn, &bucket_lock_key).await?;
		queue::remove_from_queue(&self.databases.matchmaking, &prior.difficulty, &prior.category, user_id).await?;
		lock::release(&mut bucket_conn, guard).await?;

		queue::clear_inqueue(&self.databases.matchmaking, user_id).await?;
		Ok(())
	}

	async fn wait_for_match(&self, user_id: &str, difficulty: &str, category: &str) -> Result<FindMatchOutcome> {
		let mut dedicated = pool::dedicated_connection(&self.config, pool::DB_EVENTS).await?;
		let woken = rendezvous::wait(&mut dedicated, &keys::match_found(user_id), FIND_TIMEOUT).await?;

		let Some(value) = woken else {
			let bucket_lock_key = keys::lock(&keys::queue(difficulty, category));
			let mut bucket_conn = self.databases.matchmaking.get().await?;
			let guard = lock::acquire(&mut bucket_conn, &bucket_lock_key).await?;
			queue::remove_from_queue(&self.databases.matchmaking, difficulty, category, user_id).await?;
			lock::release(&mut bucket_conn, guard).await?;
			queue::clear_inqueue(&self.databases.matchmaking, user_id).await?;
			return Ok(FindMatchOutcome::NoMatch);
		};

		match classify_find_wake(&value) {
			| FindWake::Terminated => Ok(FindMatchOutcome::Terminated),
			| FindWake::Superseded =>
				Err(Error::conflict("a newer matchmaking request for this user replaced this one")),
			| FindWake::Matched(match_id) => Ok(FindMatchOutcome::Matched { match_id }),
		}
	}

	pub async fn confirm_match(&self, match_id: &str, user_id: &str) -> Result<ConfirmOutcome> {
		let Some(record) = confirm::get(&self.databases.confirm, match_id).await? else {
			return Err(Error::client("invalid match id"));
		};
		let Some(side) = record.side_of(user_id) else {
			return Err(Error::client("user does not have access to this match"));
		};

		let match_lock_key = keys::lock(&keys::matchrec(match_id));
		let mut confirm_conn = self.databases.confirm.get().await?;
		let guard = lock::acquire(&mut confirm_conn, &match_lock_key).await?;

		confirm::record_confirmation(&self.databases.confirm, match_id, confirm::confirmation_field(side)).await?;

		// Both sides can call confirm_match within the same instant, so the
		// partner's flag must be re-read from KV under the lock rather than
		// trusted from the snapshot taken before we held it.
		let Some(record) = confirm::get(&self.databases.confirm, match_id).await? else {
			lock::release(&mut confirm_conn, guard).await?;
			return Err(Error::client("invalid match id"));
		};

		if !record.both_confirmed() {
			lock::release(&mut confirm_conn, guard).await?;
			return self.wait_for_confirmation(match_id, &record).await;
		}

		let outcome = self.finalize_match(match_id, user_id, &record).await?;
		lock::release(&mut confirm_conn, guard).await?;
		Ok(outcome)
	}

	/// Match-confirmed side effects, run under `lock:match:{match_id}` by the
	/// caller. Builds `create_room`, wakes the partner, clears both users
	/// from the queue, and deletes the match record — all atomic w.r.t. the
	/// lock.
	async fn finalize_match(&self, match_id: &str, user_id: &str, record: &MatchRecord) -> Result<ConfirmOutcome> {
		confirm::publish_create_room_event(&self.databases.events, match_id, record).await?;

		let partner = record.partner_of(user_id).expect("side_of already validated membership above");
		let mut events_conn = self.databases.events.get().await?;
		rendezvous::notify(&mut events_conn, &keys::match_confirm(partner), match_id).await?;

		queue::clear_inqueue(&self.databases.matchmaking, &record.user_one).await?;
		queue::clear_inqueue(&self.databases.matchmaking, &record.user_two).await?;
		confirm::delete(&self.databases.confirm, match_id).await?;

		tracing::info!(%match_id, "match confirmed by both sides");
		Ok(ConfirmOutcome::Started(MatchDetails {
			match_id: match_id.to_owned(),
			difficulty: record.difficulty.clone(),
			category: record.category.clone(),
		}))
	}

	async fn wait_for_confirmation(&self, match_id: &str, record: &MatchRecord) -> Result<ConfirmOutcome> {
		let side = record
			.lone_confirmed_user()
			.expect("caller just confirmed one side and the other was already false");
		let mut dedicated = pool::dedicated_connection(&self.config, pool::DB_EVENTS).await?;
		let woken = rendezvous::wait(&mut dedicated, &keys::match_confirm(side), CONFIRM_TIMEOUT).await?;

		match woken {
			| Some(value) if !value.is_empty() => Ok(ConfirmOutcome::Started(MatchDetails {
				match_id: value,
				difficulty: record.difficulty.clone(),
				category: record.category.clone(),
			})),
			| _ => Ok(ConfirmOutcome::PartnerDeclined),
		}
	}

	pub async fn terminate_match(&self, user_id: &str, difficulty: &str, category: &str) -> Result {
		let Some(entry) = queue::get_inqueue(&self.databases.matchmaking, user_id).await? else {
			return Err(Error::client("user is not currently matchmaking"));
		};
		if entry.difficulty != difficulty || entry.category != category {
			return Err(Error::client(format!("user is not queuing for {difficulty} and {category}")));
		}

		let bucket_lock_key = keys::lock(&keys::queue(difficulty, category));
		let mut bucket_conn = self.databases.matchmaking.get().await?;
		let guard = lock::acquire(&mut bucket_conn, &bucket_lock_key).await?;
		queue::remove_from_queue(&self.databases.matchmaking, difficulty, category, user_id).await?;
		lock::release(&mut bucket_conn, guard).await?;

		queue::clear_inqueue(&self.databases.matchmaking, user_id).await?;

		let mut events_conn = self.databases.events.get().await?;
		rendezvous::notify(&mut events_conn, &keys::match_found(user_id), types::TERMINATE_TOKEN).await?;

		tracing::info!(%user_id, "matchmaking request terminated");
		Ok(())
	}
}
