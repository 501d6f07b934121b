use axum::{
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::Health;

use crate::state::AppState;

pub mod cars;
pub mod pages;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn metrics() -> impl IntoResponse {
    let (code, body) = service::metrics::encode_metrics();
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body)
}

/// Whether the client asked for a rendered page rather than JSON.
pub fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|accept| accept.contains("text/html"))
        .unwrap_or(false)
}

/// Whether the request body is an HTML form submission.
pub fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// Build the full application router: car API + pages, health, metrics and static assets.
pub fn build_router(state: AppState, cors: CorsLayer, static_dir: &str) -> Router {
    let car_routes = Router::new()
        .route("/cars", get(cars::list_cars).post(cars::create_cars))
        .route(
            "/cars/:id",
            get(cars::get_car).put(cars::update_car).delete(cars::delete_car),
        );

    let page_routes = Router::new()
        .route("/", get(pages::root))
        .route("/create", get(pages::create_form))
        .route("/search", post(pages::search));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(car_routes)
        .merge(page_routes)
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 5xx are logged at ERROR
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
