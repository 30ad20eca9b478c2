/*
 * Responsibility
 * - GET /health (疎通用)
 * - どの CAS バージョン / SSO に向いているかも返す (設定ミスの確認用)
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.cas.config();
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "cas": {
                "version": config.version().as_str(),
                "ssoBaseUrl": config.sso_base_url(),
            }
        })),
    )
}
