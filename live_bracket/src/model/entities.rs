//! Tournament entities as stored by the write side.
//!
//! Field names serialize in camelCase so that snapshots round-trip with the
//! existing browser clients and the seed files they were exported from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::ModelError;

/// Tournament ID type
pub type TournamentId = String;
/// Team ID type
pub type TeamId = String;
/// Player ID type
pub type PlayerId = String;
/// Group ID type
pub type GroupId = String;
/// Match ID type
pub type MatchId = String;

/// Capacity tier of a tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentSize {
    Small,
    Medium,
    Large,
    Big,
}

impl TournamentSize {
    pub fn as_str(self) -> &'static str {
        match self {
            TournamentSize::Small => "SMALL",
            TournamentSize::Medium => "MEDIUM",
            TournamentSize::Large => "LARGE",
            TournamentSize::Big => "BIG",
        }
    }
}

impl FromStr for TournamentSize {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SMALL" => Ok(TournamentSize::Small),
            "MEDIUM" => Ok(TournamentSize::Medium),
            "LARGE" => Ok(TournamentSize::Large),
            "BIG" => Ok(TournamentSize::Big),
            other => Err(ModelError::UnknownVariant {
                kind: "tournament size",
                value: other.to_string(),
            }),
        }
    }
}

/// Lifecycle state of a tournament
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TournamentState {
    /// Accepting teams
    Lobby,
    /// Matches in progress
    Running,
    /// Terminal
    Finished,
}

impl TournamentState {
    pub fn as_str(self) -> &'static str {
        match self {
            TournamentState::Lobby => "LOBBY",
            TournamentState::Running => "RUNNING",
            TournamentState::Finished => "FINISHED",
        }
    }
}

impl FromStr for TournamentState {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LOBBY" => Ok(TournamentState::Lobby),
            "RUNNING" => Ok(TournamentState::Running),
            "FINISHED" => Ok(TournamentState::Finished),
            other => Err(ModelError::UnknownVariant {
                kind: "tournament state",
                value: other.to_string(),
            }),
        }
    }
}

/// Tournament record.
///
/// Only `Deserialize` is derived: the record carries the admin password and
/// must go through [`crate::view::PublicTournament`] before it is written
/// anywhere a viewer can read it.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: TournamentId,
    pub name: String,
    /// Join code, unique across tournaments
    pub code: String,
    /// Admin write access only
    pub password: String,
    pub tournament_size: TournamentSize,
    pub tournament_state: TournamentState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl fmt::Debug for Tournament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tournament")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("code", &self.code)
            .field("password", &"<redacted>")
            .field("tournament_size", &self.tournament_size)
            .field("tournament_state", &self.tournament_state)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Team record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tournament_id: TournamentId,
    pub group_id: Option<GroupId>,
}

/// Player record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub team_id: TeamId,
}

/// Group record. Member teams point at the group through `Team::group_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tournament_id: TournamentId,
}

/// The slot a team occupies in a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchRole {
    Team1,
    Team2,
    Winner,
    Looser,
}

impl fmt::Display for MatchRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchRole::Team1 => "team1",
            MatchRole::Team2 => "team2",
            MatchRole::Winner => "winner",
            MatchRole::Looser => "looser",
        };
        f.write_str(name)
    }
}

/// Match record.
///
/// `looser` keeps the spelling used on the wire by existing clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub winner_id: Option<TeamId>,
    pub looser_id: Option<TeamId>,
    pub tournament_id: TournamentId,
    pub team1_score: u32,
    pub team2_score: u32,
}

impl Match {
    /// Team occupying `role`, if any.
    pub fn team_in_role(&self, role: MatchRole) -> Option<&str> {
        match role {
            MatchRole::Team1 => Some(&self.team1_id),
            MatchRole::Team2 => Some(&self.team2_id),
            MatchRole::Winner => self.winner_id.as_deref(),
            MatchRole::Looser => self.looser_id.as_deref(),
        }
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.team1_id == team_id || self.team2_id == team_id
    }

    pub fn outcome(&self) -> MatchOutcome<'_> {
        match (self.winner_id.as_deref(), self.looser_id.as_deref()) {
            (None, None) => MatchOutcome::Undecided,
            (Some(winner), Some(looser)) => MatchOutcome::Decided { winner, looser },
            _ => MatchOutcome::Partial,
        }
    }
}

/// Result of a match as recorded by the write side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome<'a> {
    /// Neither winner nor looser set
    Undecided,
    /// Both set
    Decided { winner: &'a str, looser: &'a str },
    /// Only one of winner and looser set, e.g. while an admin is mid-edit
    Partial,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_match(winner: Option<&str>, looser: Option<&str>) -> Match {
        let now = Utc::now();
        Match {
            id: "m1".to_string(),
            created_at: now,
            updated_at: now,
            team1_id: "a".to_string(),
            team2_id: "b".to_string(),
            winner_id: winner.map(str::to_string),
            looser_id: looser.map(str::to_string),
            tournament_id: "t1".to_string(),
            team1_score: 2,
            team2_score: 1,
        }
    }

    #[test]
    fn test_size_round_trips_through_str() {
        for size in [
            TournamentSize::Small,
            TournamentSize::Medium,
            TournamentSize::Large,
            TournamentSize::Big,
        ] {
            assert_eq!(size.as_str().parse::<TournamentSize>().unwrap(), size);
        }
        assert!("HUGE".parse::<TournamentSize>().is_err());
    }

    #[test]
    fn test_state_parse() {
        assert_eq!(
            "RUNNING".parse::<TournamentState>().unwrap(),
            TournamentState::Running
        );
        assert_eq!(TournamentState::Finished.as_str(), "FINISHED");
        assert!(matches!(
            "lobby".parse::<TournamentState>(),
            Err(ModelError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn test_enums_serialize_screaming_case() {
        assert_eq!(
            serde_json::to_string(&TournamentState::Lobby).unwrap(),
            "\"LOBBY\""
        );
        assert_eq!(
            serde_json::to_string(&TournamentSize::Big).unwrap(),
            "\"BIG\""
        );
    }

    #[test]
    fn test_tournament_debug_hides_password() {
        let now = Utc::now();
        let tournament = Tournament {
            id: "t1".to_string(),
            name: "Cup".to_string(),
            code: "CUP".to_string(),
            password: "hunter2".to_string(),
            tournament_size: TournamentSize::Small,
            tournament_state: TournamentState::Lobby,
            created_at: now,
            updated_at: now,
        };
        let debug = format!("{:?}", tournament);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_match_roles() {
        let m = sample_match(Some("a"), Some("b"));
        assert_eq!(m.team_in_role(MatchRole::Team1), Some("a"));
        assert_eq!(m.team_in_role(MatchRole::Winner), Some("a"));
        assert_eq!(m.team_in_role(MatchRole::Looser), Some("b"));
        assert!(m.involves("b"));
        assert!(!m.involves("c"));
        assert_eq!(
            m.outcome(),
            MatchOutcome::Decided {
                winner: "a",
                looser: "b"
            }
        );
    }

    #[test]
    fn test_match_without_outcome_is_undecided() {
        let m = sample_match(None, None);
        assert_eq!(m.outcome(), MatchOutcome::Undecided);
        assert_eq!(m.team_in_role(MatchRole::Winner), None);
    }

    #[test]
    fn test_match_with_one_side_set_is_partial() {
        assert_eq!(sample_match(Some("a"), None).outcome(), MatchOutcome::Partial);
        assert_eq!(sample_match(None, Some("b")).outcome(), MatchOutcome::Partial);
    }

    #[test]
    fn test_match_serializes_camel_case() {
        let json = serde_json::to_value(sample_match(Some("a"), None)).unwrap();
        assert_eq!(json["team1Id"], "a");
        assert_eq!(json["winnerId"], "a");
        assert!(json["looserId"].is_null());
        assert_eq!(json["team1Score"], 2);
    }
}
