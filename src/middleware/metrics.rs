use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use std::time::Instant;

/// Routes that are scraped or probed too often to be worth recording.
const UNMETERED: [&str; 2] = ["/metrics", "/health"];

/// Middleware that collects HTTP request metrics per route template
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    // Route template (e.g. /api/periods/{id}) keeps label cardinality bounded
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string());

    let Some(route) = route.filter(|r| !UNMETERED.contains(&r.as_str())) else {
        return next.run(request).await;
    };

    let start = Instant::now();
    let method = request.method().to_string();

    let response = next.run(request).await;

    let status = response.status().as_u16().to_string();
    let duration = start.elapsed().as_secs_f64();

    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "route" => route,
        "method" => method
    )
    .record(duration);

    response
}
