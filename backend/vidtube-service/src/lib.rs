/// VidTube Service Library
///
/// Video catalogue, comments, likes, subscriptions, playlists and community
/// posts for a video-sharing platform.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers mounted under `/api/v1`
/// - `models`: Entities, projections and listing parameters
/// - `services`: Business logic, engagement aggregation and the media gateway
/// - `db`: `EntityStore` trait with Postgres and in-memory implementations
/// - `middleware`: JWT identity and ownership checks
/// - `error`: Error types and the error envelope
/// - `response`: Success envelope
/// - `config`: Configuration management
/// - `metrics`: Prometheus counters
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod response;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};

use actix_web::web;
use std::sync::Arc;

use config::{MediaConfig, PaginationConfig};
use db::EntityStore;
use middleware::{JwtAuthMiddleware, JwtValidator};
use services::MediaGateway;

/// Shared collaborators handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub media: Arc<dyn MediaGateway>,
    pub media_config: MediaConfig,
    pub pagination: PaginationConfig,
}

/// Metrics, health probes and the authenticated `/api/v1` scope
pub fn configure_routes(cfg: &mut web::ServiceConfig, validator: Arc<JwtValidator>) {
    cfg.route("/metrics", web::get().to(metrics::serve_metrics))
        .route("/api/v1/health", web::get().to(handlers::health::liveness_check))
        .route(
            "/api/v1/health/ready",
            web::get().to(handlers::health::readiness_check),
        )
        .service(
            web::scope("/api/v1")
                .wrap(JwtAuthMiddleware::new(validator))
                .configure(handlers::configure),
        );
}
