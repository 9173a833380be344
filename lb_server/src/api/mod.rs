//! HTTP API for the live bracket server.
//!
//! # Modules
//!
//! - [`subscribe`]: SSE stream of redacted snapshots
//! - [`tournaments`]: One-shot lookups by id, by join code and by team code
//! - [`request_id`]: Request correlation middleware
//!
//! # Endpoints Overview
//!
//! ```text
//! GET /subscribe/{tournament_id}                 - SSE stream
//! GET /api/v1/tournaments/{tournament_id}/events - SSE stream (versioned path)
//! GET /api/v1/tournaments/{tournament_id}        - Redacted snapshot
//! GET /api/v1/codes/{code}                       - Tournament id for a join code
//! GET /api/v1/teams/code/{code}                  - Team for a team code
//! GET /health                                    - Store health
//! ```
//!
//! Nothing here writes. There is no authentication; the tournament password
//! never leaves the store layer.
//!
//! # CORS
//!
//! Any origin may read. Methods are limited to GET, HEAD and OPTIONS.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use lb_server::api::{AppState, create_router};
//! use live_bracket::feed::{FeedConfig, SnapshotFeed};
//! use live_bracket::store::{MemorySnapshotStore, SnapshotStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store: Arc<dyn SnapshotStore> = Arc::new(MemorySnapshotStore::new());
//! let app = create_router(AppState {
//!     feed: SnapshotFeed::new(store, FeedConfig::default()),
//! });
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod request_id;
pub mod subscribe;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::{
        Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    response::{IntoResponse, Json},
    routing::get,
};
use live_bracket::{SnapshotFeed, SnapshotStore};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across all HTTP handlers.
///
/// Cloning is cheap: the feed holds the store behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub feed: SnapshotFeed<dyn SnapshotStore>,
}

/// Create the complete API router with all endpoints and middleware.
pub fn create_router(state: AppState) -> Router {
    let root_routes = Router::new()
        .route("/health", get(health_check))
        .route("/subscribe/{tournament_id}", get(subscribe::subscribe));

    Router::new()
        .merge(root_routes)
        .nest("/api/v1", create_v1_router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .layer(cors_layer())
        .with_state(state)
}

fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/tournaments/{tournament_id}",
            get(tournaments::get_tournament),
        )
        .route(
            "/tournaments/{tournament_id}/events",
            get(subscribe::subscribe),
        )
        .route("/codes/{code}", get(tournaments::find_by_code))
        .route("/teams/code/{code}", get(tournaments::find_team_by_code))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::HEAD, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers, `503 Service Unavailable` otherwise.
///
/// ```bash
/// curl http://localhost:3000/health
/// # {"status":"healthy","version":"0.1.0","store":true,"timestamp":"2025-11-22T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let store_healthy = match state.feed.store().health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Store health check failed: {}", e);
            false
        }
    };

    let status_code = if store_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if store_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
