//! In-memory snapshot store.
//!
//! Serves seeded snapshots without a database, for demos and tests. Writes go
//! through the same invariant checks the administrative service applies.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::{SnapshotStore, StoreError, StoreResult};
use crate::model::{ModelError, Team, TournamentId, TournamentSnapshot};

/// Snapshots keyed by tournament id
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: RwLock<HashMap<TournamentId, TournamentSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from already assembled snapshots.
    ///
    /// # Errors
    ///
    /// Fails on the first snapshot that violates an invariant, reuses a
    /// tournament code, or reuses a team name or code of another tournament.
    pub fn from_snapshots(
        snapshots: impl IntoIterator<Item = TournamentSnapshot>,
    ) -> StoreResult<Self> {
        let mut map = HashMap::new();
        for snapshot in snapshots {
            check_insert(&map, &snapshot)?;
            map.insert(snapshot.tournament.id.clone(), snapshot);
        }

        Ok(Self {
            snapshots: RwLock::new(map),
        })
    }

    /// Build a store from a JSON array of snapshots
    pub fn from_json_str(json: &str) -> StoreResult<Self> {
        let snapshots: Vec<TournamentSnapshot> = serde_json::from_str(json)?;
        Self::from_snapshots(snapshots)
    }

    /// Insert or replace a snapshot
    pub async fn insert(&self, snapshot: TournamentSnapshot) -> StoreResult<()> {
        let mut snapshots = self.snapshots.write().await;
        check_insert(&snapshots, &snapshot)?;
        snapshots.insert(snapshot.tournament.id.clone(), snapshot);
        Ok(())
    }

    /// Apply `change` to a stored snapshot, keeping the old one if the result
    /// is invalid.
    pub async fn update<F>(&self, tournament_id: &str, change: F) -> StoreResult<()>
    where
        F: FnOnce(&mut TournamentSnapshot),
    {
        let mut snapshots = self.snapshots.write().await;
        let current = snapshots
            .get(tournament_id)
            .ok_or_else(|| StoreError::NotFound(tournament_id.to_string()))?;

        let mut next = current.clone();
        change(&mut next);
        if next.tournament.id != tournament_id {
            return Err(ModelError::ForeignTournament {
                entity: "tournament",
                id: next.tournament.id.clone(),
                expected: tournament_id.to_string(),
                found: next.tournament.id.clone(),
            }
            .into());
        }
        check_insert(&snapshots, &next)?;
        snapshots.insert(tournament_id.to_string(), next);
        Ok(())
    }

    pub async fn remove(&self, tournament_id: &str) -> Option<TournamentSnapshot> {
        self.snapshots.write().await.remove(tournament_id)
    }

    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

fn check_insert(
    existing: &HashMap<TournamentId, TournamentSnapshot>,
    snapshot: &TournamentSnapshot,
) -> StoreResult<()> {
    snapshot.validate()?;

    let code = &snapshot.tournament.code;
    let taken = existing
        .values()
        .any(|other| other.tournament.code == *code && other.tournament.id != snapshot.tournament.id);
    if taken {
        return Err(ModelError::DuplicateTournamentCode(code.clone()).into());
    }

    // Team name and code are lookup keys across tournaments too.
    let others = existing
        .values()
        .filter(|other| other.tournament.id != snapshot.tournament.id);
    for other in others {
        for team in &snapshot.teams {
            let clash = other.teams.iter().find_map(|t| {
                if t.name == team.name {
                    Some(("name", &team.name))
                } else if t.code == team.code {
                    Some(("code", &team.code))
                } else {
                    None
                }
            });
            if let Some((field, value)) = clash {
                return Err(ModelError::TeamKeyTaken {
                    field,
                    value: value.clone(),
                    tournament: other.tournament.id.clone(),
                }
                .into());
            }
        }
    }

    Ok(())
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn fetch_tournament_snapshot(
        &self,
        tournament_id: &str,
    ) -> StoreResult<TournamentSnapshot> {
        self.snapshots
            .read()
            .await
            .get(tournament_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(tournament_id.to_string()))
    }

    async fn find_tournament_id_by_code(&self, code: &str) -> StoreResult<TournamentId> {
        self.snapshots
            .read()
            .await
            .values()
            .find(|s| s.tournament.code == code)
            .map(|s| s.tournament.id.clone())
            .ok_or_else(|| StoreError::NotFound(code.to_string()))
    }

    async fn find_team_by_code(&self, code: &str) -> StoreResult<Team> {
        self.snapshots
            .read()
            .await
            .values()
            .flat_map(|s| &s.teams)
            .find(|t| t.code == code)
            .cloned()
            .ok_or_else(|| StoreError::TeamNotFound(code.to_string()))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot_json(id: &str, code: &str) -> serde_json::Value {
        json!({
            "tournament": {
                "id": id, "name": "Cup", "code": code, "password": "pw",
                "tournamentSize": "MEDIUM", "tournamentState": "LOBBY",
                "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"
            },
            "teams": [
                { "id": format!("{id}-a"), "name": format!("{id} A"), "code": format!("{id}-A"),
                  "tournamentId": id,
                  "groupId": null,
                  "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z" },
                { "id": format!("{id}-b"), "name": format!("{id} B"), "code": format!("{id}-B"),
                  "tournamentId": id,
                  "groupId": null,
                  "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z" }
            ]
        })
    }

    fn snapshot(id: &str, code: &str) -> TournamentSnapshot {
        serde_json::from_value(snapshot_json(id, code)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_inserted_snapshot() {
        let store = MemorySnapshotStore::new();
        store.insert(snapshot("t1", "ONE")).await.unwrap();

        let fetched = store.fetch_tournament_snapshot("t1").await.unwrap();
        assert_eq!(fetched.teams.len(), 2);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let store = MemorySnapshotStore::new();
        let err = store.fetch_tournament_snapshot("nope").await.unwrap_err();
        assert!(err.is_not_found());

        let err = store.fetch_tournament_snapshot("").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_lookup_by_code() {
        let store =
            MemorySnapshotStore::from_snapshots([snapshot("t1", "ONE"), snapshot("t2", "TWO")])
                .unwrap();
        assert_eq!(store.find_tournament_id_by_code("TWO").await.unwrap(), "t2");
        assert!(
            store
                .find_tournament_id_by_code("THREE")
                .await
                .unwrap_err()
                .is_not_found()
        );
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let store = MemorySnapshotStore::new();
        store.insert(snapshot("t1", "SAME")).await.unwrap();
        let err = store.insert(snapshot("t2", "SAME")).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Integrity(ModelError::DuplicateTournamentCode(_))
        ));

        // Replacing the same tournament keeps its code.
        store.insert(snapshot("t1", "SAME")).await.unwrap();
    }

    #[tokio::test]
    async fn test_team_code_taken_by_other_tournament_rejected() {
        let mut second = snapshot("t2", "TWO");
        second.teams[0].code = "t1-A".to_string();

        let err = MemorySnapshotStore::from_snapshots([snapshot("t1", "ONE"), second]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Integrity(ModelError::TeamKeyTaken { field: "code", ref tournament, .. })
                if tournament == "t1"
        ));
    }

    #[tokio::test]
    async fn test_team_name_taken_by_other_tournament_rejected() {
        let store = MemorySnapshotStore::from_snapshots([snapshot("t1", "ONE")]).unwrap();
        let mut second = snapshot("t2", "TWO");
        second.teams[1].name = "t1 B".to_string();

        let err = store.insert(second).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Integrity(ModelError::TeamKeyTaken { field: "name", .. })
        ));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_replacing_snapshot_keeps_its_own_team_keys() {
        let store = MemorySnapshotStore::from_snapshots([snapshot("t1", "ONE")]).unwrap();
        store.insert(snapshot("t1", "ONE")).await.unwrap();
        store
            .update("t1", |s| s.teams[0].name = "Renamed".to_string())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_find_team_by_code_across_tournaments() {
        let store =
            MemorySnapshotStore::from_snapshots([snapshot("t1", "ONE"), snapshot("t2", "TWO")])
                .unwrap();

        let team = store.find_team_by_code("t2-B").await.unwrap();
        assert_eq!(team.id, "t2-b");
        assert_eq!(team.tournament_id, "t2");

        let err = store.find_team_by_code("ZZZ").await.unwrap_err();
        assert!(matches!(err, StoreError::TeamNotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_update_keeps_previous_snapshot() {
        let store = MemorySnapshotStore::new();
        store.insert(snapshot("t1", "ONE")).await.unwrap();

        let err = store
            .update("t1", |s| s.teams[1].id = s.teams[0].id.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)));

        let fetched = store.fetch_tournament_snapshot("t1").await.unwrap();
        assert_eq!(fetched.teams[1].id, "t1-b");
    }

    #[tokio::test]
    async fn test_update_cannot_change_tournament_id() {
        let store = MemorySnapshotStore::new();
        store.insert(snapshot("t1", "ONE")).await.unwrap();
        let err = store
            .update("t1", |s| s.tournament.id = "t2".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Integrity(_)));
    }

    #[tokio::test]
    async fn test_from_json_str() {
        let json = serde_json::to_string(&vec![snapshot_json("t1", "ONE")]).unwrap();
        let store = MemorySnapshotStore::from_json_str(&json).unwrap();
        assert!(!store.is_empty().await);

        assert!(matches!(
            MemorySnapshotStore::from_json_str("{not json"),
            Err(StoreError::Seed(_))
        ));
    }

    #[tokio::test]
    async fn test_remove() {
        let store = MemorySnapshotStore::from_snapshots([snapshot("t1", "ONE")]).unwrap();
        assert!(store.remove("t1").await.is_some());
        assert!(store.is_empty().await);
    }
}
