use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    handlers::{self, entries_handler, periods_handler},
    middleware::{metrics_middleware, request_id_middleware},
    openapi::ApiDoc,
    AppState,
};

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            HeaderName::from_static("x-request-id"),
        ])
        .allow_credentials(true);

    match origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(e) => {
            tracing::warn!(origin, error = %e, "Ignoring unparseable CORS origin");
            cors
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    // Period routes - /team must stay next to /{id} so it is never read as an ID
    let period_routes = Router::new()
        .route(
            "/",
            get(periods_handler::list_periods).post(periods_handler::create_period),
        )
        .route("/team", get(periods_handler::list_team_periods))
        .route(
            "/{id}",
            get(periods_handler::get_period)
                .put(periods_handler::update_period)
                .delete(periods_handler::delete_period),
        )
        .route("/{id}/submit", post(periods_handler::submit_period))
        .route("/{id}/approve", post(periods_handler::approve_period))
        .route("/{id}/deny", post(periods_handler::deny_period))
        .route(
            "/{id}/entries",
            get(entries_handler::list_entries).post(entries_handler::create_entry),
        );

    // Entry routes
    let entry_routes = Router::new().route(
        "/{id}",
        put(entries_handler::update_entry).delete(entries_handler::delete_entry),
    );

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .nest("/api/periods", period_routes)
        .nest("/api/entries", entry_routes)
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        // Matched route templates are only visible inside the router
        .route_layer(middleware::from_fn(metrics_middleware))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .with_state(state)
}
