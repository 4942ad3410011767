pub mod api;
pub mod config;
pub mod info;
pub mod security;
pub mod state;

use axum::{
    Json, Router, middleware,
    routing::{any, get},
};
use serde::Serialize;
use tower_http::services::ServeDir;

use crate::state::AppState;

#[derive(Debug, Serialize)]
struct HealthzResponse {
    status: &'static str,
    version: &'static str,
}

async fn healthz() -> Json<HealthzResponse> {
    Json(HealthzResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Full control surface: JSON API, display redirect, static front-end.
pub fn router(state: AppState) -> Router {
    let public_dir = state.config.public_dir.clone();

    let api_router = Router::new()
        .route("/api/status", get(api::status))
        .route(
            "/api/check-docker",
            get(api::check_docker).post(api::check_docker),
        )
        .route("/api/start", get(api::start).post(api::start))
        .route("/api/stop", get(api::stop).post(api::stop))
        .route("/api", any(info::info))
        .route("/api/", any(info::info))
        .route("/api/info", any(info::info))
        .layer(middleware::from_fn(security::cors));

    Router::new()
        .route("/healthz", get(healthz))
        .route("/vnc", any(api::vnc_redirect))
        .route("/vnc/", any(api::vnc_redirect))
        .route("/vnc/*rest", any(api::vnc_redirect))
        .merge(api_router)
        .fallback_service(ServeDir::new(public_dir))
        .with_state(state)
}

/// Standalone status probe: every path answers with the info payload.
pub fn info_router() -> Router {
    Router::new()
        .fallback(info::info)
        .layer(middleware::from_fn(security::cors))
}
