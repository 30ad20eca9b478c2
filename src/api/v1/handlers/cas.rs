/*
 * Responsibility
 * - GET /cas (CAS ログイン / チケット検証)
 * - エンジンの Authentication を HTTP response へ変換する (Responder の実装)
 *   - redirect → 302 Location
 *   - success  → 200 JSON
 *   - fail     → 401
 *   - error    → AppError 経由 (502 / 500)
 */
use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::api::v1::dto::login::LoginResponse;
use crate::api::v1::extractors::CasRequest;
use crate::error::AppError;
use crate::services::cas::{AuthenticateOptions, CasError, Failure, Responder};
use crate::services::user_directory::CasUser;
use crate::state::AppState;

pub async fn login(State(state): State<AppState>, CasRequest(ctx): CasRequest) -> Response {
    state
        .cas
        .authenticate(&ctx, &AuthenticateOptions::default())
        .await
        .respond(HttpResponder)
}

struct HttpResponder;

impl Responder<CasUser> for HttpResponder {
    type Output = Response;

    fn success(self, user: CasUser, info: Option<String>) -> Response {
        tracing::info!(user = %user.net_id, "cas login succeeded");
        (
            StatusCode::OK,
            Json(LoginResponse {
                auth: true,
                user,
                info,
            }),
        )
            .into_response()
    }

    fn fail(self, failure: Failure) -> Response {
        AppError::Unauthorized(failure.to_string()).into_response()
    }

    fn error(self, cause: CasError) -> Response {
        AppError::from(cause).into_response()
    }

    fn redirect(self, url: String) -> Response {
        (StatusCode::FOUND, [(header::LOCATION, url)]).into_response()
    }
}
