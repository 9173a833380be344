//! Server-Sent Events endpoint.
//!
//! Each request opens one [`Subscription`](live_bracket::Subscription) and
//! streams its frames as `data:` events until the client goes away. Dropping
//! the response body drops the subscription, which stops its ticker; no frame
//! is fetched or sent after that.
//!
//! The stream is unauthenticated and read-only. Anything the client sends
//! after the request line is ignored.

use std::convert::Infallible;

use axum::{
    extract::{MatchedPath, Path, State},
    response::sse::{Event, Sse},
};
use futures_util::stream::{Stream, StreamExt};

use super::AppState;
use super::request_id::RequestId;
use crate::{logging, metrics};

/// Stream redacted snapshots of a tournament.
///
/// Frames arrive once per tick, starting one tick after connect. A tournament
/// that cannot be fetched yields `{"error":"Error fetching data"}` frames and
/// the stream stays open. No keep-alive comments are interleaved.
pub async fn subscribe(
    State(state): State<AppState>,
    Path(tournament_id): Path<String>,
    route: MatchedPath,
    request_id: RequestId,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    logging::log_subscriber_connected(&tournament_id, route.as_str());
    metrics::sse_connections_total(route.as_str());
    tracing::debug!(request_id = request_id.as_str(), "Opening subscription");

    let subscription = state.feed.subscribe(tournament_id);
    Sse::new(subscription.map(|frame| Ok(Event::default().data(frame.into_data()))))
}
