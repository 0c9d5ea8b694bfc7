use axum::{
    Router,
    http::StatusCode,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::adapters::inbound::webhook;
use crate::shell::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook/event", post(webhook::handle))
        .route("/healthz", get(|| async { StatusCode::OK }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
