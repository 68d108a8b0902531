use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidtube_service::config::{Config, StoreBackend};
use vidtube_service::db::{EntityStore, InMemoryStore, PgStore};
use vidtube_service::middleware::JwtValidator;
use vidtube_service::services::{CloudinaryGateway, MediaGateway};
use vidtube_service::{configure_routes, AppState};

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing(json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn EntityStore>> {
    match config.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Postgres => {
            // Pool tuning (DB_MIN_CONNECTIONS, DB_*_TIMEOUT_SECS) comes from db-pool;
            // sizing and the statement timeout follow the service config
            let mut db_cfg = DbPoolConfig::from_env("vidtube-service").unwrap_or_default();
            db_cfg.service_name = "vidtube-service".to_string();
            db_cfg.database_url = config.database.url.clone();
            db_cfg.max_connections = config.database.max_connections;
            db_cfg.min_connections = db_cfg.min_connections.min(db_cfg.max_connections);
            db_cfg.statement_timeout_ms = config.database.statement_timeout_ms;
            db_cfg.log_config();

            let pool = create_pg_pool(db_cfg)
                .await
                .context("Failed to create database pool")?;
            tracing::info!("Connected to database via db-pool crate");

            let store = PgStore::new(pool);
            store
                .migrate()
                .await
                .context("Failed to run database migrations")?;
            tracing::info!("Database migrations applied");

            Ok(Arc::new(store))
        }
    }
}

/// VidTube Service
///
/// Serves the video catalogue and its engagement features over HTTP.
///
/// # Routes
///
/// - `/api/v1/videos/*` - Catalogue, uploads, publish toggle, comments, likes
/// - `/api/v1/comments/*`, `/api/v1/tweets/*`, `/api/v1/posts/*` - Comments and community posts
/// - `/api/v1/channels/*` - Subscriptions and channel dashboard
/// - `/api/v1/playlists/*` - Playlists
/// - `/api/v1/users/*` - Profile sync and per-user listings
/// - `/api/v1/health`, `/api/v1/health/ready`, `/metrics` - Probes and metrics
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(config.app.json_logs);

    tracing::info!("Starting vidtube-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let store = build_store(&config).await?;

    if !config.media.is_configured() {
        tracing::warn!("Cloudinary credentials not configured; video uploads will fail");
    }
    let media: Arc<dyn MediaGateway> = Arc::new(
        CloudinaryGateway::new(&config.media).context("Failed to build media gateway client")?,
    );

    let validator = Arc::new(JwtValidator::new(&config.auth));

    let state = web::Data::new(AppState {
        store,
        media,
        media_config: config.media.clone(),
        pagination: config.pagination,
    });

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        let validator = validator.clone();
        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(move |cfg| configure_routes(cfg, validator))
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, stopping HTTP server");
        handle.stop(true).await;
    });

    server.await.context("HTTP server error")?;
    tracing::info!("vidtube-service stopped");
    Ok(())
}
