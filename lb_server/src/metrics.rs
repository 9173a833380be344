//! Prometheus metrics for the snapshot server.
//!
//! The exporter is optional: without [`init_metrics`] every helper below
//! records into the no-op recorder.
//!
//! # Metrics Categories
//!
//! - **HTTP Metrics**: Request counts and handler duration per route
//! - **SSE Metrics**: Subscribers connected per route
//!
//! Feed-level metrics (`feed_subscriptions_active`, `feed_frames_total`,
//! `feed_fetch_duration_ms`) are recorded by `live_bracket` itself.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use lb_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("GET", "/health", 200);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`. Must be called from
/// within a tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record HTTP request.
///
/// `path` must be the matched route template, not the raw URI.
pub fn http_requests_total(method: &str, path: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record HTTP request duration in milliseconds.
pub fn http_request_duration_ms(method: &str, path: &str, duration_ms: f64) {
    metrics::histogram!("http_request_duration_ms",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// SSE Metrics
// ============================================================================

/// Increment total SSE subscribers counter.
pub fn sse_connections_total(route: &str) {
    metrics::counter!("sse_connections_total",
        "route" => route.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helpers_without_recorder() {
        http_requests_total("GET", "/health", 200);
        http_request_duration_ms("GET", "/health", 1.5);
        sse_connections_total("/subscribe/{tournament_id}");
    }
}
