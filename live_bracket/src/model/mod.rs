//! Tournament data model.
//!
//! Entities are created and mutated by the administrative write side; this
//! crate only reads them. A [`TournamentSnapshot`] holds one tournament with
//! its teams, players, groups and matches as flat collections, and
//! [`TournamentSnapshot::validate`] checks the invariants every writer must
//! honor:
//!
//! - every team, group and match belongs to the snapshot's tournament
//! - a team's group belongs to the same tournament as the team
//! - a match pairs two distinct teams
//! - winner and looser, when set, are participants and differ from each other
//!
//! Team names and codes are unique within a tournament. Stores that hold more
//! than one tournament also keep them unique across tournaments, so a team
//! code alone locates a team.

pub mod entities;
pub mod errors;
pub mod snapshot;

pub use entities::{
    Group, GroupId, Match, MatchId, MatchOutcome, MatchRole, Player, PlayerId, Team, TeamId, Tournament,
    TournamentId, TournamentSize, TournamentState,
};
pub use errors::{ModelError, ModelResult};
pub use snapshot::{TournamentSnapshot, validate_match};
