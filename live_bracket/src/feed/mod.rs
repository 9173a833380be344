//! Live snapshot feed.
//!
//! Turns a request/response [`SnapshotStore`] into a stream of redacted
//! snapshots. Every [`SnapshotFeed::subscribe`] call spawns one ticker task
//! that, once per interval:
//!
//! 1. fetches the full snapshot of the tournament
//! 2. projects it to a [`PublicTournament`](crate::view::PublicTournament)
//! 3. pushes it as one serialized [`Frame`]
//!
//! A failed fetch pushes an error frame instead and the ticker keeps going;
//! the next tick is the retry. Subscribers are independent: N subscribers of
//! one tournament cause N fetches per tick.
//!
//! ## Example
//!
//! ```no_run
//! use live_bracket::feed::{FeedConfig, SnapshotFeed};
//! use live_bracket::store::MemorySnapshotStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = Arc::new(MemorySnapshotStore::new());
//!     let feed = SnapshotFeed::new(store, FeedConfig::default());
//!
//!     let mut subscription = feed.subscribe("t1");
//!     while let Some(frame) = subscription.recv().await {
//!         println!("{}", frame.data());
//!     }
//! }
//! ```

pub mod frame;
pub mod subscription;

pub use frame::{FETCH_ERROR_MESSAGE, Frame, FrameKind};
pub use subscription::{Subscription, SubscriptionHandle, SubscriptionState};

use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::model::TournamentId;
use crate::store::{SnapshotStore, StoreError, StoreResult};
use crate::view::{PublicTournament, Redact};

/// Default push cadence
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(2);

/// Default number of frames buffered per subscriber
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Feed configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    /// Time between two pushes of one subscription
    pub tick_interval: Duration,
    /// Frames buffered per subscription before the ticker waits
    pub channel_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Hands out subscriptions backed by a shared store
pub struct SnapshotFeed<S: ?Sized> {
    store: Arc<S>,
    config: FeedConfig,
}

impl<S: ?Sized> Clone for SnapshotFeed<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
        }
    }
}

impl<S> SnapshotFeed<S>
where
    S: SnapshotStore + ?Sized + 'static,
{
    pub fn new(store: Arc<S>, config: FeedConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Open a subscription to `tournament_id`.
    ///
    /// The timer is armed immediately; the first frame is pushed one interval
    /// later and then once per interval until the subscription is dropped.
    /// Must be called from within a tokio runtime.
    pub fn subscribe(&self, tournament_id: impl Into<TournamentId>) -> Subscription {
        let tournament_id = tournament_id.into();
        let period = self.config.tick_interval;
        let (sender, receiver) = mpsc::channel(self.config.channel_capacity.max(1));

        let task = tokio::spawn(run_ticker(
            Arc::clone(&self.store),
            tournament_id.clone(),
            Instant::now() + period,
            period,
            sender,
        ));

        info!(
            "Subscription opened: tournament={}, interval={:?}",
            tournament_id, period
        );

        Subscription::new(receiver, SubscriptionHandle::new(tournament_id, task))
    }

    /// Fetch and redact once, outside any subscription
    pub async fn fetch_public(&self, tournament_id: &str) -> StoreResult<PublicTournament> {
        fetch_public(self.store.as_ref(), tournament_id).await
    }
}

/// Fetch a snapshot and project it to its public view
pub async fn fetch_public<S>(store: &S, tournament_id: &str) -> StoreResult<PublicTournament>
where
    S: SnapshotStore + ?Sized,
{
    let snapshot = store.fetch_tournament_snapshot(tournament_id).await?;
    Ok(snapshot.redact()?)
}

/// Produce the frame for one tick. Never fails: every error becomes the
/// generic error frame after being logged.
pub async fn next_frame<S>(store: &S, tournament_id: &str) -> Frame
where
    S: SnapshotStore + ?Sized,
{
    let started = Instant::now();
    let result = fetch_public(store, tournament_id).await;
    metrics::histogram!("feed_fetch_duration_ms")
        .record(started.elapsed().as_secs_f64() * 1000.0);

    match result {
        Ok(view) => match Frame::snapshot(&view) {
            Ok(frame) => frame,
            Err(e) => {
                error!(
                    "Failed to serialize snapshot of tournament {}: {}",
                    tournament_id, e
                );
                Frame::fetch_error()
            }
        },
        Err(StoreError::NotFound(_)) => {
            warn!("Tournament {} not found", tournament_id);
            Frame::fetch_error()
        }
        Err(e) => {
            error!(
                "Error fetching data for tournament {}: {}",
                tournament_id, e
            );
            Frame::fetch_error()
        }
    }
}

async fn run_ticker<S>(
    store: Arc<S>,
    tournament_id: TournamentId,
    start: Instant,
    period: Duration,
    sender: mpsc::Sender<Frame>,
) where
    S: SnapshotStore + ?Sized,
{
    let mut ticker = time::interval_at(start, period);
    // A fetch slower than the period pushes the next tick back instead of
    // bursting to catch up.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = sender.closed() => break,
            _ = ticker.tick() => {}
        }

        let frame = next_frame(store.as_ref(), &tournament_id).await;
        metrics::counter!("feed_frames_total", "kind" => frame.kind().as_str()).increment(1);

        if sender.send(frame).await.is_err() {
            break;
        }
    }

    debug!("Ticker stopped: tournament={}", tournament_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySnapshotStore;
    use serde_json::json;

    fn store_with_t1() -> MemorySnapshotStore {
        let snapshot = serde_json::from_value(json!({
            "tournament": {
                "id": "t1", "name": "Cup", "code": "CUP", "password": "pw",
                "tournamentSize": "SMALL", "tournamentState": "LOBBY",
                "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"
            }
        }))
        .unwrap();
        MemorySnapshotStore::from_snapshots([snapshot]).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = FeedConfig::default();
        assert_eq!(config.tick_interval, Duration::from_secs(2));
        assert_eq!(config.channel_capacity, 16);
    }

    #[tokio::test]
    async fn test_next_frame_snapshot() {
        let store = store_with_t1();
        let frame = next_frame(&store, "t1").await;
        assert_eq!(frame.kind(), FrameKind::Snapshot);
        let value: serde_json::Value = serde_json::from_str(frame.data()).unwrap();
        assert_eq!(value["id"], "t1");
        assert!(value.get("password").is_none());
    }

    #[tokio::test]
    async fn test_next_frame_not_found_is_error_frame() {
        let store = store_with_t1();
        let frame = next_frame(&store, "t404").await;
        assert_eq!(frame, Frame::fetch_error());
    }

    #[tokio::test]
    async fn test_fetch_public_through_feed() {
        let feed = SnapshotFeed::new(Arc::new(store_with_t1()), FeedConfig::default());
        let view = feed.fetch_public("t1").await.unwrap();
        assert_eq!(view.code, "CUP");
        assert!(feed.fetch_public("t2").await.unwrap_err().is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_is_idempotent() {
        let feed = SnapshotFeed::new(Arc::new(store_with_t1()), FeedConfig::default());
        let mut subscription = feed.subscribe("t1");
        assert_eq!(subscription.state(), SubscriptionState::Open);

        subscription.close();
        subscription.close();
        assert_eq!(subscription.state(), SubscriptionState::Closed);
        assert!(subscription.recv().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_works_with_trait_object_store() {
        let store: Arc<dyn SnapshotStore> = Arc::new(store_with_t1());
        let feed = SnapshotFeed::new(store, FeedConfig::default());
        let mut subscription = feed.subscribe("t1");
        let frame = subscription.recv().await.unwrap();
        assert!(!frame.is_error());
        assert_eq!(subscription.tournament_id(), "t1");
    }
}
