/// Health probes, mounted outside the authenticated scope
use actix_web::{web, HttpResponse};
use std::time::Instant;

use crate::AppState;

pub async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": "vidtube-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Ready once the entity store answers a round-trip
pub async fn readiness_check(state: web::Data<AppState>) -> HttpResponse {
    let start = Instant::now();
    let result = state.store.ping().await;
    let latency_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "ready": true,
            "store": { "status": "healthy", "latency_ms": latency_ms }
        })),
        Err(e) => {
            tracing::error!(error = %e, "readiness check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "ready": false,
                "store": { "status": "unhealthy", "latency_ms": latency_ms }
            }))
        }
    }
}
