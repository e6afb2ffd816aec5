// Entropy Engine Stream - Prometheus metrics definitions
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Prometheus metrics for the entropy monitor.

use crate::transport::StatsSnapshot;
use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use entropy_engine::TickRecord;
use lazy_static::lazy_static;
use prometheus::{register_gauge, register_int_counter, Encoder, Gauge, IntCounter, TextEncoder};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{info, warn};

lazy_static! {
    // ============================================================
    // Engine Metrics (from TickRecord)
    // ============================================================

    /// Smoothed normalized entropy (0-1).
    pub static ref ENTROPY_H: Gauge = register_gauge!(
        "ee_entropy_h",
        "Smoothed normalized entropy H (0-1)"
    ).unwrap();

    /// Unsmoothed normalized entropy for the last tick.
    pub static ref ENTROPY_RAW: Gauge = register_gauge!(
        "ee_entropy_raw",
        "Unsmoothed normalized entropy of the last tick (0-1)"
    ).unwrap();

    pub static ref ENTROPY_SLOPE: Gauge = register_gauge!(
        "ee_entropy_slope",
        "Slope Y of the smoothed entropy"
    ).unwrap();

    pub static ref ENTROPY_CURVATURE: Gauge = register_gauge!(
        "ee_entropy_curvature",
        "Curvature Z of the smoothed entropy"
    ).unwrap();

    pub static ref TICKS_TOTAL: IntCounter = register_int_counter!(
        "ee_ticks_total",
        "Engine ticks processed"
    ).unwrap();

    /// Full histogram rebuilds under the adaptive edge policy.
    pub static ref ADAPTIVE_REBUILDS: Gauge = register_gauge!(
        "ee_histogram_rebuilds",
        "Full histogram rebuilds after an edge recomputation"
    ).unwrap();

    // ============================================================
    // Transport Metrics (from TransportStats)
    // ============================================================

    pub static ref TRANSPORT_CONNECTED: Gauge = register_gauge!(
        "ee_transport_connected",
        "Transport connection state (1=connected, 0=disconnected)"
    ).unwrap();

    pub static ref TRANSPORT_CONNECTS: Gauge = register_gauge!(
        "ee_transport_connects",
        "Successful transport connections"
    ).unwrap();

    pub static ref TRANSPORT_DISCONNECTS: Gauge = register_gauge!(
        "ee_transport_disconnects",
        "Transport disconnections"
    ).unwrap();

    pub static ref TRANSPORT_LINES_ACCEPTED: Gauge = register_gauge!(
        "ee_transport_lines_accepted",
        "Lines decoded into samples"
    ).unwrap();

    pub static ref TRANSPORT_LINES_MALFORMED: Gauge = register_gauge!(
        "ee_transport_lines_malformed",
        "Lines discarded as malformed"
    ).unwrap();
}

/// Update engine metrics from one tick.
pub fn update_tick(record: &TickRecord, rebuilds: u64) {
    ENTROPY_H.set(record.h);
    ENTROPY_RAW.set(record.raw);
    ENTROPY_SLOPE.set(record.y);
    ENTROPY_CURVATURE.set(record.z);
    ADAPTIVE_REBUILDS.set(rebuilds as f64);
    TICKS_TOTAL.inc();
}

/// Update transport metrics from a stats snapshot.
pub fn update_transport(stats: &StatsSnapshot) {
    TRANSPORT_CONNECTED.set(if stats.connected { 1.0 } else { 0.0 });
    TRANSPORT_CONNECTS.set(stats.connects as f64);
    TRANSPORT_DISCONNECTS.set(stats.disconnects as f64);
    TRANSPORT_LINES_ACCEPTED.set(stats.lines_accepted as f64);
    TRANSPORT_LINES_MALFORMED.set(stats.lines_malformed as f64);
}

/// Encode all metrics to Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Metrics handler - returns Prometheus text format.
async fn metrics_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        encode_metrics(),
    )
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Router exposing `/metrics` and `/health`.
pub fn router() -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
}

/// Bind `addr` and serve the metrics router in the background.
pub async fn serve_metrics(addr: SocketAddr) -> std::io::Result<JoinHandle<()>> {
    let listener = TcpListener::bind(addr).await?;
    info!("Metrics endpoint: http://{}/metrics", listener.local_addr()?);
    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router()).await {
            warn!("Metrics server stopped: {}", e);
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_metrics() {
        let record = TickRecord {
            t: 1.0,
            h: 0.4,
            y: 0.1,
            z: -0.2,
            raw: 0.5,
        };
        update_tick(&record, 2);
        update_transport(&StatsSnapshot {
            connects: 1,
            connected: true,
            ..Default::default()
        });

        let output = encode_metrics();
        assert!(output.contains("ee_entropy_h"));
        assert!(output.contains("ee_ticks_total"));
        assert!(output.contains("ee_transport_lines_malformed"));
    }
}
