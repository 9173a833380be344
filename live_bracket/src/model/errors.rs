//! Model integrity error types.

use thiserror::Error;

use super::entities::MatchRole;

/// Integrity violations found in a tournament snapshot
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Entity hangs off a different tournament than the snapshot root
    #[error("{entity} {id} belongs to tournament {found}, expected {expected}")]
    ForeignTournament {
        entity: &'static str,
        id: String,
        expected: String,
        found: String,
    },

    /// Reference to a team that is not part of the tournament
    #[error("{entity} {id} references unknown team {team}")]
    UnknownTeam {
        entity: &'static str,
        id: String,
        team: String,
    },

    /// Team assigned to a group that is not part of the tournament
    #[error("team {team} references unknown group {group}")]
    UnknownGroup { team: String, group: String },

    /// Match pairs a team with itself
    #[error("match {0} pairs a team with itself")]
    SelfMatch(String),

    /// Winner or looser is not one of the two participants
    #[error("match {match_id}: {role} {team} is not a participant")]
    NotAParticipant {
        match_id: String,
        role: MatchRole,
        team: String,
    },

    /// Winner and looser are the same team
    #[error("match {0} has the same winner and looser")]
    WinnerIsLooser(String),

    /// Score that cannot be represented (negative in storage)
    #[error("match {match_id} has invalid score {score}")]
    InvalidScore { match_id: String, score: i64 },

    /// Team name or code used twice within one tournament
    #[error("duplicate team {field} {value:?} in tournament {tournament}")]
    DuplicateTeamKey {
        field: &'static str,
        value: String,
        tournament: String,
    },

    /// Team name or code already used by a team of another tournament
    #[error("team {field} {value:?} is already used in tournament {tournament}")]
    TeamKeyTaken {
        field: &'static str,
        value: String,
        tournament: String,
    },

    /// Join code already used by another tournament
    #[error("tournament code {0:?} is already taken")]
    DuplicateTournamentCode(String),

    /// Identifier used by more than one entity
    #[error("duplicate id {0}")]
    DuplicateId(String),

    /// Enum text that does not name a known variant
    #[error("unknown {kind} value {value:?}")]
    UnknownVariant { kind: &'static str, value: String },
}

/// Result type for model operations
pub type ModelResult<T> = Result<T, ModelError>;
