//! PostgreSQL snapshot store.
//!
//! Reads the tables written by the administrative service. Table and column
//! names are the quoted camelCase identifiers of that schema, e.g.
//! `"Match"."team1Id"`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;

use super::{DatabaseConfig, SnapshotStore, StoreError, StoreResult};
use crate::model::{
    Group, Match, ModelError, Player, Team, Tournament, TournamentId, TournamentSnapshot,
};

const TOURNAMENT_QUERY: &str = r#"
    SELECT id, name, code, password,
           "tournamentSize"::text AS tournament_size,
           "tournamentState"::text AS tournament_state,
           "createdAt" AS created_at, "updatedAt" AS updated_at
    FROM "Tournament"
    WHERE id = $1
"#;

const TEAMS_QUERY: &str = r#"
    SELECT id, name, code, "tournamentId" AS tournament_id, "groupId" AS group_id,
           "createdAt" AS created_at, "updatedAt" AS updated_at
    FROM "Team"
    WHERE "tournamentId" = $1
    ORDER BY "createdAt", id
"#;

const TEAM_BY_CODE_QUERY: &str = r#"
    SELECT id, name, code, "tournamentId" AS tournament_id, "groupId" AS group_id,
           "createdAt" AS created_at, "updatedAt" AS updated_at
    FROM "Team"
    WHERE code = $1
    ORDER BY "createdAt", id
    LIMIT 1
"#;

const PLAYERS_QUERY: &str = r#"
    SELECT p.id, p.name, p."teamId" AS team_id,
           p."createdAt" AS created_at, p."updatedAt" AS updated_at
    FROM "Player" p
    JOIN "Team" t ON t.id = p."teamId"
    WHERE t."tournamentId" = $1
    ORDER BY p."createdAt", p.id
"#;

const GROUPS_QUERY: &str = r#"
    SELECT id, "tournamentId" AS tournament_id,
           "createdAt" AS created_at, "updatedAt" AS updated_at
    FROM "Group"
    WHERE "tournamentId" = $1
    ORDER BY "createdAt", id
"#;

const MATCHES_QUERY: &str = r#"
    SELECT id, "tournamentId" AS tournament_id,
           "team1Id" AS team1_id, "team2Id" AS team2_id,
           "winnerId" AS winner_id, "looserId" AS looser_id,
           "team1Score" AS team1_score, "team2Score" AS team2_score,
           "createdAt" AS created_at, "updatedAt" AS updated_at
    FROM "Match"
    WHERE "tournamentId" = $1
    ORDER BY "createdAt", id
"#;

/// Snapshot store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgSnapshotStore {
    pool: PgPool,
}

impl PgSnapshotStore {
    /// Open a connection pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use live_bracket::store::{DatabaseConfig, PgSnapshotStore};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), sqlx::Error> {
    ///     let config = DatabaseConfig::new("postgres://localhost/bracket");
    ///     let store = PgSnapshotStore::connect(&config).await?;
    ///     store.close().await;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl SnapshotStore for PgSnapshotStore {
    async fn fetch_tournament_snapshot(
        &self,
        tournament_id: &str,
    ) -> StoreResult<TournamentSnapshot> {
        let row = sqlx::query(TOURNAMENT_QUERY)
            .bind(tournament_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(tournament_id.to_string()))?;
        let tournament = tournament_from_row(&row)?;

        let teams = sqlx::query(TEAMS_QUERY)
            .bind(tournament_id)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(team_from_row)
            .collect::<StoreResult<Vec<_>>>()?;

        let players = sqlx::query(PLAYERS_QUERY)
            .bind(tournament_id)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(player_from_row)
            .collect::<StoreResult<Vec<_>>>()?;

        let groups = sqlx::query(GROUPS_QUERY)
            .bind(tournament_id)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(group_from_row)
            .collect::<StoreResult<Vec<_>>>()?;

        let matches = sqlx::query(MATCHES_QUERY)
            .bind(tournament_id)
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(match_from_row)
            .collect::<StoreResult<Vec<_>>>()?;

        let snapshot = TournamentSnapshot {
            tournament,
            teams,
            players,
            groups,
            matches,
        };
        snapshot.validate()?;

        Ok(snapshot)
    }

    async fn find_tournament_id_by_code(&self, code: &str) -> StoreResult<TournamentId> {
        let row = sqlx::query(r#"SELECT id FROM "Tournament" WHERE code = $1"#)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(code.to_string()))?;

        Ok(row.try_get("id")?)
    }

    async fn find_team_by_code(&self, code: &str) -> StoreResult<Team> {
        let row = sqlx::query(TEAM_BY_CODE_QUERY)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::TeamNotFound(code.to_string()))?;

        team_from_row(&row)
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn timestamp(row: &PgRow, column: &str) -> StoreResult<DateTime<Utc>> {
    Ok(row.try_get::<NaiveDateTime, _>(column)?.and_utc())
}

fn score(row: &PgRow, column: &str, match_id: &str) -> StoreResult<u32> {
    let raw: i32 = row.try_get(column)?;
    u32::try_from(raw).map_err(|_| {
        StoreError::Integrity(ModelError::InvalidScore {
            match_id: match_id.to_string(),
            score: i64::from(raw),
        })
    })
}

fn tournament_from_row(row: &PgRow) -> StoreResult<Tournament> {
    Ok(Tournament {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        code: row.try_get("code")?,
        password: row.try_get("password")?,
        tournament_size: row.try_get::<String, _>("tournament_size")?.parse()?,
        tournament_state: row.try_get::<String, _>("tournament_state")?.parse()?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

fn team_from_row(row: &PgRow) -> StoreResult<Team> {
    Ok(Team {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        code: row.try_get("code")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
        tournament_id: row.try_get("tournament_id")?,
        group_id: row.try_get("group_id")?,
    })
}

fn player_from_row(row: &PgRow) -> StoreResult<Player> {
    Ok(Player {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
        team_id: row.try_get("team_id")?,
    })
}

fn group_from_row(row: &PgRow) -> StoreResult<Group> {
    Ok(Group {
        id: row.try_get("id")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
        tournament_id: row.try_get("tournament_id")?,
    })
}

fn match_from_row(row: &PgRow) -> StoreResult<Match> {
    let id: String = row.try_get("id")?;
    Ok(Match {
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
        team1_id: row.try_get("team1_id")?,
        team2_id: row.try_get("team2_id")?,
        winner_id: row.try_get("winner_id")?,
        looser_id: row.try_get("looser_id")?,
        tournament_id: row.try_get("tournament_id")?,
        team1_score: score(row, "team1_score", &id)?,
        team2_score: score(row, "team2_score", &id)?,
        id,
    })
}
