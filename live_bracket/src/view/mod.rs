//! Viewer-facing projection of a tournament snapshot.
//!
//! [`PublicTournament`] is the only shape a snapshot leaves the server in. It
//! has no password field, so the admin secret cannot be serialized by
//! accident: any new secret added to [`Tournament`](crate::model::Tournament)
//! stays private unless it is copied here explicitly.
//!
//! The projection also re-nests the normalized snapshot into the tree that
//! browser clients consume:
//!
//! ```text
//! tournament
//! ├── teams[]   (players, team1Matches, team2Matches, winnerMatches, looserMatches)
//! ├── matches[] (team1, team2, winner, looser)
//! └── groups[]  (teams, matches[] with team1/team2/winner/looser)
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::model::{
    Group, Match, MatchRole, ModelError, ModelResult, Player, Team, TournamentId,
    TournamentSize, TournamentSnapshot, TournamentState,
};

/// Redacted tournament tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTournament {
    pub id: TournamentId,
    pub name: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tournament_size: TournamentSize,
    pub tournament_state: TournamentState,
    pub teams: Vec<PublicTeam>,
    pub matches: Vec<PublicMatch>,
    pub groups: Vec<PublicGroup>,
}

/// Team with its players and the matches it appears in
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicTeam {
    #[serde(flatten)]
    pub team: Team,
    pub players: Vec<Player>,
    pub team1_matches: Vec<Match>,
    pub team2_matches: Vec<Match>,
    pub winner_matches: Vec<Match>,
    pub looser_matches: Vec<Match>,
}

/// Match with its team references resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicMatch {
    #[serde(flatten)]
    pub game: Match,
    pub team1: Team,
    pub team2: Team,
    pub winner: Option<Team>,
    pub looser: Option<Team>,
}

/// Group with its member teams and the matches reachable through them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicGroup {
    #[serde(flatten)]
    pub group: Group,
    pub teams: Vec<Team>,
    pub matches: Vec<PublicMatch>,
}

/// Produce the viewer-facing form of a value.
///
/// Applying `redact` to an already redacted value yields an equal value.
pub trait Redact {
    /// # Errors
    ///
    /// Fails when a match references a team missing from the snapshot.
    fn redact(&self) -> ModelResult<PublicTournament>;
}

impl Redact for TournamentSnapshot {
    fn redact(&self) -> ModelResult<PublicTournament> {
        PublicTournament::try_from(self)
    }
}

impl Redact for PublicTournament {
    fn redact(&self) -> ModelResult<PublicTournament> {
        Ok(self.clone())
    }
}

impl TryFrom<&TournamentSnapshot> for PublicTournament {
    type Error = ModelError;

    fn try_from(snapshot: &TournamentSnapshot) -> Result<Self, Self::Error> {
        let teams_by_id: HashMap<&str, &Team> =
            snapshot.teams.iter().map(|t| (t.id.as_str(), t)).collect();
        let resolve = |m: &Match| resolve_match(m, &teams_by_id);

        let teams = snapshot
            .teams
            .iter()
            .map(|team| {
                let in_role = |role| {
                    snapshot
                        .team_matches(&team.id, role)
                        .cloned()
                        .collect::<Vec<_>>()
                };
                PublicTeam {
                    team: team.clone(),
                    players: snapshot.team_players(&team.id).cloned().collect(),
                    team1_matches: in_role(MatchRole::Team1),
                    team2_matches: in_role(MatchRole::Team2),
                    winner_matches: in_role(MatchRole::Winner),
                    looser_matches: in_role(MatchRole::Looser),
                }
            })
            .collect();

        let matches = snapshot
            .matches
            .iter()
            .map(resolve)
            .collect::<ModelResult<Vec<_>>>()?;

        let groups = snapshot
            .groups
            .iter()
            .map(|group| {
                Ok(PublicGroup {
                    group: group.clone(),
                    teams: snapshot.group_teams(&group.id).cloned().collect(),
                    matches: snapshot
                        .group_matches(&group.id)
                        .into_iter()
                        .map(resolve)
                        .collect::<ModelResult<Vec<_>>>()?,
                })
            })
            .collect::<ModelResult<Vec<_>>>()?;

        let t = &snapshot.tournament;
        Ok(PublicTournament {
            id: t.id.clone(),
            name: t.name.clone(),
            code: t.code.clone(),
            created_at: t.created_at,
            updated_at: t.updated_at,
            tournament_size: t.tournament_size,
            tournament_state: t.tournament_state,
            teams,
            matches,
            groups,
        })
    }
}

fn resolve_match(m: &Match, teams: &HashMap<&str, &Team>) -> ModelResult<PublicMatch> {
    let lookup = |team_id: &str| {
        teams
            .get(team_id)
            .map(|t| (*t).clone())
            .ok_or_else(|| ModelError::UnknownTeam {
                entity: "match",
                id: m.id.clone(),
                team: team_id.to_string(),
            })
    };

    Ok(PublicMatch {
        game: m.clone(),
        team1: lookup(&m.team1_id)?,
        team2: lookup(&m.team2_id)?,
        winner: m.winner_id.as_deref().map(lookup).transpose()?,
        looser: m.looser_id.as_deref().map(lookup).transpose()?,
    })
}
