//! Prometheus metrics for vidtube-service.
//!
//! Exposes engagement and mutation counters and an HTTP handler for the
//! `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    /// Engagement toggles by kind and resulting state (activated/deactivated/rejected).
    pub static ref ENGAGEMENT_TOGGLES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "vidtube_engagement_toggles_total",
        "Engagement toggles segmented by kind and outcome",
        &["kind", "outcome"]
    )
    .expect("failed to register vidtube_engagement_toggles_total");

    /// Successful create/update/delete calls per resource.
    pub static ref RESOURCE_MUTATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "vidtube_resource_mutations_total",
        "Resource mutations segmented by resource and action",
        &["resource", "action"]
    )
    .expect("failed to register vidtube_resource_mutations_total");

    /// Media gateway upload attempts (success/error).
    pub static ref MEDIA_UPLOADS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "vidtube_media_uploads_total",
        "Media gateway uploads segmented by result",
        &["result"]
    )
    .expect("failed to register vidtube_media_uploads_total");
}

pub fn record_toggle(kind: &str, outcome: &str) {
    ENGAGEMENT_TOGGLES_TOTAL
        .with_label_values(&[kind, outcome])
        .inc();
}

pub fn record_mutation(resource: &str, action: &str) {
    RESOURCE_MUTATIONS_TOTAL
        .with_label_values(&[resource, action])
        .inc();
}

pub fn record_media_upload(success: bool) {
    let result = if success { "success" } else { "error" };
    MEDIA_UPLOADS_TOTAL.with_label_values(&[result]).inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
