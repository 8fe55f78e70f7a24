mod auth;
mod config;
mod db;
mod error;
mod extractors;
mod handlers;
mod middleware;
mod models;
mod openapi;
mod startup;
mod store;
mod timesheet;

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use handlers::MetricsState;

use store::{PgManagerDirectory, PgTimesheetStore};
use timesheet::TimesheetService;

#[derive(Clone)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub timesheets: TimesheetService,
    pub config: AppConfig,
    pub metrics: Arc<MetricsState>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing with conditional JSON/text output
    let use_json = std::env::var("LOG_FORMAT")
        .unwrap_or_else(|_| "text".to_string()) == "json";

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,weeklog_axum=debug,tower_http=debug".into());

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    dotenvy::dotenv().ok();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("Configuration error: {}", e);
        e
    })?;

    // Internal error details only leave the process outside production
    error::set_expose_internal_errors(!config.is_production());

    let db = db::create_pool(&config.database_url).await.map_err(|e| {
        tracing::error!("Failed to create database pool: {}", e);
        e
    })?;
    tracing::info!("Database pool created successfully");

    db::run_migrations(&db).await.map_err(|e| {
        tracing::error!("Failed to apply migrations: {}", e);
        e
    })?;

    let metrics_state = Arc::new(handlers::setup_metrics_recorder()?);
    tracing::info!("Metrics recorder initialized");

    let timesheets = TimesheetService::new(
        Arc::new(PgTimesheetStore::new(db.clone())),
        Arc::new(PgManagerDirectory::new(db.clone())),
    );

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState {
        db,
        timesheets,
        config,
        metrics: metrics_state,
    });

    let app = startup::build_router(state);

    handlers::health::mark_started();
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
