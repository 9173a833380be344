//! Snapshot store error types.

use thiserror::Error;

use crate::model::ModelError;

/// Snapshot store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No tournament with the requested id or code
    #[error("Tournament not found: {0}")]
    NotFound(String),

    /// No team with the requested code
    #[error("Team not found: {0}")]
    TeamNotFound(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data violates a model invariant
    #[error("Integrity violation: {0}")]
    Integrity(#[from] ModelError),

    /// Seed data could not be parsed
    #[error("Invalid seed data: {0}")]
    Seed(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_) | StoreError::TeamNotFound(_))
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Database and integrity errors are collapsed into a generic message so
    /// that neither SQL details nor internal ids reach a viewer.
    pub fn client_message(&self) -> String {
        match self {
            StoreError::NotFound(_) => "Tournament not found".to_string(),
            StoreError::TeamNotFound(_) => "Team not found".to_string(),
            StoreError::Database(_) | StoreError::Integrity(_) => {
                "Internal server error".to_string()
            }
            StoreError::Seed(_) => "Invalid seed data".to_string(),
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_message_hides_internals() {
        let err = StoreError::Integrity(ModelError::SelfMatch("m-internal".to_string()));
        assert!(!err.client_message().contains("m-internal"));
        assert!(err.to_string().contains("m-internal"));

        let err = StoreError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.client_message(), "Internal server error");
    }

    #[test]
    fn test_not_found() {
        let err = StoreError::NotFound("t9".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.client_message(), "Tournament not found");
        assert!(!StoreError::Database(sqlx::Error::PoolClosed).is_not_found());
    }

    #[test]
    fn test_team_not_found() {
        let err = StoreError::TeamNotFound("XYZ".to_string());
        assert!(err.is_not_found());
        assert_eq!(err.client_message(), "Team not found");
    }
}
