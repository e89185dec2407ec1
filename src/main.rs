//! Subtrack Server
//!
//! Subscription management service: CRUD over user subscriptions and
//! billing totals across calendar-month windows.

use actix_cors::Cors;
use actix_web::{http::header, middleware, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use subtrack_api::{configure_api, json_config, query_config};
use subtrack_core::config::{LogFormat, LoggingConfig};
use subtrack_core::AppConfig;
use subtrack_db::{create_pool, run_migrations, PgSubscriptionRepository};
use subtrack_services::SubscriptionService;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging
///
/// `RUST_LOG` takes precedence over the configured level when set.
fn init_tracing(config: &LoggingConfig) {
    let level = &config.level;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "subtrack={level},subtrack_api={level},subtrack_services={level},subtrack_db={level},actix_web=info,sqlx=warn"
        ))
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_line_number(true),
            )
            .init(),
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // An explicit config file replaces the config/ directory lookup
    let config = match std::env::var("SUBTRACK_CONFIG_FILE") {
        Ok(path) => AppConfig::from_file(&path),
        Err(_) => AppConfig::load(),
    }
    .context("failed to load configuration")?;

    init_tracing(&config.logging);

    info!("Starting Subtrack v{}", env!("CARGO_PKG_VERSION"));

    info!("Connecting to database...");
    let pool = create_pool(&config.database)
        .await
        .context("failed to create database pool")?;

    if config.database.run_migrations {
        run_migrations(&pool)
            .await
            .context("failed to apply database migrations")?;
    } else {
        warn!("Skipping database migrations");
    }

    let service = web::Data::new(SubscriptionService::new(Arc::new(
        PgSubscriptionRepository::new(pool),
    )));

    let cors_origins = config.server.cors_origin_list();
    let bind_addr = config.server_addr();
    let workers = config.server.workers.max(1);

    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    HttpServer::new(move || {
        let allowed = cors_origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _req_head| {
                origin
                    .to_str()
                    .map(|o| allowed.iter().any(|a| a == o))
                    .unwrap_or(false)
            })
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .max_age(3600);

        App::new()
            .app_data(service.clone())
            .app_data(json_config())
            .app_data(query_config())
            // Middleware
            .wrap(cors)
            .wrap(TracingLogger::default())
            .wrap(middleware::NormalizePath::trim())
            // Configure routes
            .configure(configure_api)
            // Root redirect to health
            .route(
                "/",
                web::get().to(|| async {
                    HttpResponse::Found()
                        .append_header(("Location", "/api/v1/health"))
                        .finish()
                }),
            )
    })
    .workers(workers)
    .shutdown_timeout(config.server.shutdown_timeout_secs)
    .bind(&bind_addr)
    .with_context(|| format!("failed to bind {}", bind_addr))?
    .run()
    .await?;

    info!("Server stopped");
    Ok(())
}
