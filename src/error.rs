/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - CasError を統一的に変換
 *   - SSO 側の問題 (通信失敗 / 壊れたレスポンス) は 502
 *   - verify step や設定の問題は 500
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::cas::CasError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("sso server unavailable")]
    BadGateway,
    #[error("internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::BadGateway => (StatusCode::BAD_GATEWAY, "SSO_UNAVAILABLE"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CasError> for AppError {
    fn from(e: CasError) -> Self {
        match e {
            CasError::AuthenticationRejected(rejection) => {
                AppError::Unauthorized(rejection.to_string())
            }
            CasError::Network(_) | CasError::MalformedResponse(_) => {
                tracing::warn!(error = ?e, "cas validation error");
                AppError::BadGateway
            }
            // These indicate server-side config / programming errors
            CasError::VerifyFailed(_)
            | CasError::Configuration(_)
            | CasError::UnsupportedVersion(_)
            | CasError::InvalidUrl(_) => {
                tracing::error!(error = ?e, "cas authentication error");
                AppError::Internal
            }
        }
    }
}
