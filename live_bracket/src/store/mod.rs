//! Snapshot store contract and its implementations.
//!
//! The feed depends on one read operation: load every entity reachable from a
//! tournament in one call. Implementations never write, lock, or open a
//! transaction; a snapshot is as consistent as the backing storage makes it.

use async_trait::async_trait;

use crate::model::{Team, TournamentId, TournamentSnapshot};

pub mod config;
pub mod errors;
pub mod memory;
pub mod postgres;

pub use config::DatabaseConfig;
pub use errors::{StoreError, StoreResult};
pub use memory::MemorySnapshotStore;
pub use postgres::PgSnapshotStore;

/// Read access to tournament snapshots
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Load a tournament with its teams, players, groups and matches.
    ///
    /// An unknown or malformed id yields [`StoreError::NotFound`]; a snapshot
    /// that breaks a model invariant yields [`StoreError::Integrity`]. No
    /// partial snapshot is ever returned.
    async fn fetch_tournament_snapshot(&self, tournament_id: &str)
    -> StoreResult<TournamentSnapshot>;

    /// Resolve a tournament join code to its id
    async fn find_tournament_id_by_code(&self, code: &str) -> StoreResult<TournamentId>;

    /// Look a team up by its code across all tournaments.
    ///
    /// Yields [`StoreError::TeamNotFound`] when no team uses `code`.
    async fn find_team_by_code(&self, code: &str) -> StoreResult<Team>;

    /// Check that the backing storage is reachable
    async fn health_check(&self) -> StoreResult<()>;
}
