use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/reset", post(handlers::reset_form))
        .route("/api/session", get(handlers::get_session))
        .route("/api/session/reset", post(handlers::reset))
        .route("/api/upload", post(handlers::upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
