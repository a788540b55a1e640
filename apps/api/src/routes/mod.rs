pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::corpus::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_mb * 1024 * 1024;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/documents",
            get(handlers::handle_list_documents)
                .post(handlers::handle_upload_documents)
                .delete(handlers::handle_clear_documents),
        )
        .route(
            "/api/v1/documents/:id",
            delete(handlers::handle_remove_document),
        )
        .route("/api/v1/rankings", post(handlers::handle_rank))
        .route(
            "/api/v1/assessments",
            get(handlers::handle_list_assessments).post(handlers::handle_assess),
        )
        .layer(DefaultBodyLimit::max(upload_limit))
        .with_state(state)
}
