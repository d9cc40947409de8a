use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::usecases::u501_import_questions::ImportExecutor;

/// Общее состояние для handlers
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<ImportExecutor>,
}

/// Конфигурация всех роутов приложения
pub fn configure_routes(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        // ========================================
        // UseCase u501: Import questions
        // ========================================
        .route(
            "/api/questions/import",
            post(handlers::u501_import_questions::import_file),
        )
        .route(
            "/api/questions/import/preview",
            post(handlers::u501_import_questions::preview_file),
        )
        .route(
            "/api/questions/import-rows",
            post(handlers::u501_import_questions::import_rows),
        )
        .route(
            "/api/questions/export",
            get(handlers::u501_import_questions::export),
        )
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
