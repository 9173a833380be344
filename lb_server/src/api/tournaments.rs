//! Read-only tournament lookups.
//!
//! One-shot counterparts of the SSE feed: the same redacted view, fetched once.
//! Team records carry no secret and are returned as stored.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use live_bracket::model::Team;
use live_bracket::{PublicTournament, StoreError};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::request_id::RequestId;

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Tournament id resolved from a join code
#[derive(Debug, Serialize, Deserialize)]
pub struct TournamentIdResponse {
    pub id: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

/// Redacted snapshot of one tournament.
///
/// # Response
///
/// - `200 OK`: The public view, same shape as an SSE frame
/// - `404 Not Found`: Unknown tournament id
/// - `500 Internal Server Error`: Storage fault or integrity violation
pub async fn get_tournament(
    State(state): State<AppState>,
    Path(tournament_id): Path<String>,
    request_id: RequestId,
) -> ApiResult<PublicTournament> {
    state
        .feed
        .fetch_public(&tournament_id)
        .await
        .map(Json)
        .map_err(|e| store_error_response(e, &request_id))
}

/// Resolve a join code to a tournament id.
///
/// # Response
///
/// - `200 OK`: `{ "id": "..." }`
/// - `404 Not Found`: No tournament uses this code
pub async fn find_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
    request_id: RequestId,
) -> ApiResult<TournamentIdResponse> {
    state
        .feed
        .store()
        .find_tournament_id_by_code(&code)
        .await
        .map(|id| Json(TournamentIdResponse { id }))
        .map_err(|e| store_error_response(e, &request_id))
}

/// Look a team up by its code, across all tournaments.
///
/// # Response
///
/// - `200 OK`: The team record
/// - `404 Not Found`: No team uses this code
pub async fn find_team_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
    request_id: RequestId,
) -> ApiResult<Team> {
    state
        .feed
        .store()
        .find_team_by_code(&code)
        .await
        .map(Json)
        .map_err(|e| store_error_response(e, &request_id))
}

fn store_error_response(
    err: StoreError,
    request_id: &RequestId,
) -> (StatusCode, Json<ErrorResponse>) {
    let status = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        tracing::error!(request_id = request_id.as_str(), "Store error: {}", err);
        StatusCode::INTERNAL_SERVER_ERROR
    };

    (
        status,
        Json(ErrorResponse {
            error: err.client_message(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use live_bracket::ModelError;

    #[test]
    fn test_not_found_maps_to_404() {
        let (status, Json(body)) = store_error_response(
            StoreError::NotFound("t9".to_string()),
            &RequestId("r1".to_string()),
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Tournament not found");
    }

    #[test]
    fn test_team_not_found_maps_to_404() {
        let (status, Json(body)) = store_error_response(
            StoreError::TeamNotFound("ZZZ".to_string()),
            &RequestId("r3".to_string()),
        );
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.error, "Team not found");
    }

    #[test]
    fn test_integrity_maps_to_500_without_details() {
        let (status, Json(body)) = store_error_response(
            StoreError::Integrity(ModelError::SelfMatch("m-secret".to_string())),
            &RequestId("r2".to_string()),
        );
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.error.contains("m-secret"));
    }
}
