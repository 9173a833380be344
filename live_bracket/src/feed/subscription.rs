//! Per-connection subscription: an owned ticker task plus the receiving end
//! of its frame channel.

use futures_util::Stream;
use log::info;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::frame::Frame;
use crate::model::TournamentId;

/// Lifecycle of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    /// Ticker armed, frames being pushed
    Open,
    /// Terminal, ticker cancelled
    Closed,
}

/// Owns the ticker task of one subscription.
///
/// The task is aborted exactly once: by [`SubscriptionHandle::close`] or,
/// failing that, when the handle is dropped.
#[derive(Debug)]
pub struct SubscriptionHandle {
    tournament_id: TournamentId,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    pub(crate) fn new(tournament_id: TournamentId, task: JoinHandle<()>) -> Self {
        metrics::gauge!("feed_subscriptions_active").increment(1.0);
        Self {
            tournament_id,
            task: Some(task),
        }
    }

    pub fn state(&self) -> SubscriptionState {
        if self.task.is_some() {
            SubscriptionState::Open
        } else {
            SubscriptionState::Closed
        }
    }

    /// Cancel the ticker. Calling this again is a no-op.
    pub fn close(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            metrics::gauge!("feed_subscriptions_active").decrement(1.0);
            info!("Subscription closed: tournament={}", self.tournament_id);
        }
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Stream of frames for one tournament.
///
/// Dropping the subscription is the disconnect signal: the ticker is
/// cancelled and no further fetch happens.
#[derive(Debug)]
pub struct Subscription {
    receiver: mpsc::Receiver<Frame>,
    handle: SubscriptionHandle,
}

impl Subscription {
    pub(crate) fn new(receiver: mpsc::Receiver<Frame>, handle: SubscriptionHandle) -> Self {
        Self { receiver, handle }
    }

    pub fn tournament_id(&self) -> &str {
        &self.handle.tournament_id
    }

    pub fn state(&self) -> SubscriptionState {
        self.handle.state()
    }

    /// Wait for the next frame. Returns `None` once closed.
    pub async fn recv(&mut self) -> Option<Frame> {
        if self.state() == SubscriptionState::Closed {
            return None;
        }
        self.receiver.recv().await
    }

    /// Cancel the ticker and drop any buffered frames
    pub fn close(&mut self) {
        self.handle.close();
        self.receiver.close();
        while self.receiver.try_recv().is_ok() {}
    }
}

impl Stream for Subscription {
    type Item = Frame;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.state() == SubscriptionState::Closed {
            return Poll::Ready(None);
        }
        this.receiver.poll_recv(cx)
    }
}
