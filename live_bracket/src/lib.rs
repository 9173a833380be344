//! # Live Bracket
//!
//! Live state distribution for bracket and group tournaments.
//!
//! Viewers follow a tournament (teams, players, groups, matches, scores and
//! outcomes) without the storage layer offering any change notification. A
//! per-viewer ticker re-reads the whole tournament on a fixed cadence and
//! pushes a redacted copy.
//!
//! ## Core Modules
//!
//! - [`model`]: Entities and the invariants every writer must honor
//! - [`store`]: Snapshot store contract, PostgreSQL and in-memory backends
//! - [`view`]: Password-free public projection of a snapshot
//! - [`feed`]: Per-subscription ticker producing serialized frames
//!
//! Data flows one way: storage → snapshot → redaction → wire.
//!
//! ## Example
//!
//! ```no_run
//! use live_bracket::feed::{FeedConfig, SnapshotFeed};
//! use live_bracket::store::{DatabaseConfig, PgSnapshotStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PgSnapshotStore::connect(&DatabaseConfig::new("postgres://localhost/bracket")).await?;
//!     let feed = SnapshotFeed::new(Arc::new(store), FeedConfig::default());
//!
//!     let mut subscription = feed.subscribe("tournament-id");
//!     if let Some(frame) = subscription.recv().await {
//!         println!("{}", frame.data());
//!     }
//!     Ok(())
//! }
//! ```

/// Tournament entities, snapshot and invariants.
pub mod model;

/// Snapshot store contract and backends.
pub mod store;

/// Viewer-facing projection.
pub mod view;

/// Live snapshot feed.
pub mod feed;

pub use feed::{FeedConfig, Frame, SnapshotFeed, Subscription};
pub use model::{ModelError, TournamentSnapshot};
pub use store::{SnapshotStore, StoreError};
pub use view::{PublicTournament, Redact};
