//! HTTP front end for `live_bracket`.
//!
//! Serves the live snapshot feed over Server-Sent Events, plus one-shot
//! lookups and a health check.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
