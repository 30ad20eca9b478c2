use std::convert::Infallible;

use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::request::Parts;

use crate::services::cas::RequestContext;
use crate::state::AppState;

// The demo listener terminates plain TCP; TLS (if any) lives in front of it
// and is reported through X-Forwarded-Proto.
const LISTENER_SCHEME: &str = "http";

/// Handler で RequestContext を受け取るための extractor
/// nest された Router でも元のパス (OriginalUri) を使う。service URL がずれると CAS の検証が失敗するため
pub struct CasRequest(pub RequestContext);

impl FromRequestParts<AppState> for CasRequest
where
    AppState: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());

        Ok(CasRequest(RequestContext::from_http(
            LISTENER_SCHEME,
            &parts.headers,
            &uri,
        )))
    }
}
