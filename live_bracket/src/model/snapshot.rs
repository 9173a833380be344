//! Normalized point-in-time view of one tournament.

use serde::Deserialize;
use std::collections::HashSet;

use super::entities::{Group, Match, MatchOutcome, MatchRole, Player, Team, Tournament};
use super::errors::{ModelError, ModelResult};

/// A tournament and everything it owns, as flat collections linked by id.
///
/// Nesting (players under teams, matches under groups) is left to the view
/// layer; see [`crate::view::PublicTournament`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentSnapshot {
    pub tournament: Tournament,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub matches: Vec<Match>,
}

impl TournamentSnapshot {
    /// Snapshot of a tournament that owns nothing yet
    pub fn new(tournament: Tournament) -> Self {
        Self {
            tournament,
            teams: Vec::new(),
            players: Vec::new(),
            groups: Vec::new(),
            matches: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.tournament.id
    }

    pub fn team(&self, team_id: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == team_id)
    }

    pub fn group(&self, group_id: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == group_id)
    }

    pub fn team_players<'a>(&'a self, team_id: &'a str) -> impl Iterator<Item = &'a Player> {
        self.players.iter().filter(move |p| p.team_id == team_id)
    }

    /// Matches in which `team_id` occupies `role`
    pub fn team_matches<'a>(
        &'a self,
        team_id: &'a str,
        role: MatchRole,
    ) -> impl Iterator<Item = &'a Match> {
        self.matches
            .iter()
            .filter(move |m| m.team_in_role(role) == Some(team_id))
    }

    pub fn group_teams<'a>(&'a self, group_id: &'a str) -> impl Iterator<Item = &'a Team> {
        self.teams
            .iter()
            .filter(move |t| t.group_id.as_deref() == Some(group_id))
    }

    /// Matches reachable through the group's teams: at least one participant
    /// is a member of the group.
    pub fn group_matches(&self, group_id: &str) -> Vec<&Match> {
        let members: HashSet<&str> = self.group_teams(group_id).map(|t| t.id.as_str()).collect();
        self.matches
            .iter()
            .filter(|m| {
                members.contains(m.team1_id.as_str()) || members.contains(m.team2_id.as_str())
            })
            .collect()
    }

    /// Check every referential and match invariant.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> ModelResult<()> {
        let tournament_id = self.tournament.id.as_str();

        let mut ids = HashSet::new();
        ids.insert(tournament_id);
        let all_ids = self
            .teams
            .iter()
            .map(|t| t.id.as_str())
            .chain(self.players.iter().map(|p| p.id.as_str()))
            .chain(self.groups.iter().map(|g| g.id.as_str()))
            .chain(self.matches.iter().map(|m| m.id.as_str()));
        for id in all_ids {
            if !ids.insert(id) {
                return Err(ModelError::DuplicateId(id.to_string()));
            }
        }

        let check_owner = |entity: &'static str, id: &str, owner: &str| {
            if owner == tournament_id {
                Ok(())
            } else {
                Err(ModelError::ForeignTournament {
                    entity,
                    id: id.to_string(),
                    expected: tournament_id.to_string(),
                    found: owner.to_string(),
                })
            }
        };

        let mut group_ids = HashSet::new();
        for group in &self.groups {
            check_owner("group", &group.id, &group.tournament_id)?;
            group_ids.insert(group.id.as_str());
        }

        let mut team_ids = HashSet::new();
        let mut team_names = HashSet::new();
        let mut team_codes = HashSet::new();
        for team in &self.teams {
            check_owner("team", &team.id, &team.tournament_id)?;
            if let Some(group) = &team.group_id
                && !group_ids.contains(group.as_str())
            {
                return Err(ModelError::UnknownGroup {
                    team: team.id.clone(),
                    group: group.clone(),
                });
            }
            if !team_names.insert(team.name.as_str()) {
                return Err(ModelError::DuplicateTeamKey {
                    field: "name",
                    value: team.name.clone(),
                    tournament: tournament_id.to_string(),
                });
            }
            if !team_codes.insert(team.code.as_str()) {
                return Err(ModelError::DuplicateTeamKey {
                    field: "code",
                    value: team.code.clone(),
                    tournament: tournament_id.to_string(),
                });
            }
            team_ids.insert(team.id.as_str());
        }

        for player in &self.players {
            if !team_ids.contains(player.team_id.as_str()) {
                return Err(ModelError::UnknownTeam {
                    entity: "player",
                    id: player.id.clone(),
                    team: player.team_id.clone(),
                });
            }
        }

        for m in &self.matches {
            check_owner("match", &m.id, &m.tournament_id)?;
            validate_match(m)?;
            for team in [&m.team1_id, &m.team2_id] {
                if !team_ids.contains(team.as_str()) {
                    return Err(ModelError::UnknownTeam {
                        entity: "match",
                        id: m.id.clone(),
                        team: team.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Invariants local to one match.
///
/// Whether the winner must also hold the higher score is deliberately not
/// checked here.
pub fn validate_match(m: &Match) -> ModelResult<()> {
    if m.team1_id == m.team2_id {
        return Err(ModelError::SelfMatch(m.id.clone()));
    }

    for role in [MatchRole::Winner, MatchRole::Looser] {
        if let Some(team) = m.team_in_role(role)
            && !m.involves(team)
        {
            return Err(ModelError::NotAParticipant {
                match_id: m.id.clone(),
                role,
                team: team.to_string(),
            });
        }
    }

    if let MatchOutcome::Decided { winner, looser } = m.outcome()
        && winner == looser
    {
        return Err(ModelError::WinnerIsLooser(m.id.clone()));
    }

    Ok(())
}
