/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - /health, /cas
 */
use axum::{Router, routing::get};

use crate::state::AppState;

use crate::api::v1::handlers::{cas::login, health::health};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/cas", get(login))
}
