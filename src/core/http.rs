//! HTTP endpoint server using Axum
//!
//! Hands scan results to an external presentation layer as JSON. No
//! rendering or session handling happens here.

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, Level};

use crate::core::scanner::Scanner;
use crate::metrics::Metrics;
use crate::models::signal::ScanStatus;

pub const SERVICE_NAME: &str = "altpulse-signal-scanner";

#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub scanner: Option<Arc<Scanner>>,
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": "healthy",
        "uptime_seconds": uptime_seconds,
        "service": SERVICE_NAME
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Deserialize)]
struct SignalsQuery {
    /// Overrides the configured catalog cap for this run.
    limit: Option<usize>,
}

/// Run a scan on demand and return both ordered signal lists
async fn get_signals(
    State(state): State<AppState>,
    Query(params): Query<SignalsQuery>,
) -> Response {
    let Some(scanner) = state.scanner.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": ScanStatus::UpstreamError,
                "error": "scanner not configured"
            })),
        )
            .into_response();
    };

    let limit = params.limit.or(scanner.config().max_symbols);
    match scanner.run_with_limit(limit).await {
        Ok(report) => Json(json!({
            "status": report.status(),
            "generated_at": report.generated_at,
            "reference_symbol": report.reference_symbol,
            "scanned": report.scanned,
            "longs": report.longs,
            "shorts": report.shorts,
            "skipped": report.skipped,
        }))
        .into_response(),
        Err(e) => {
            error!(error = %e, "Scan failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "status": ScanStatus::UpstreamError,
                    "error": e.to_string()
                })),
            )
                .into_response()
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/signals", get(get_signals))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(
    port: u16,
    scanner: Arc<Scanner>,
    metrics: Arc<Metrics>,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState {
        metrics,
        start_time: Arc::new(Instant::now()),
        scanner: Some(scanner),
    };
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!("Signals endpoint available at http://0.0.0.0:{}/api/signals", port);
    axum::serve(listener, app).await?;

    Ok(())
}
