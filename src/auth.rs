//! Bearer-token gate applied to every route except the health check.
use axum::{Extension, extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::SharedState;
use crate::error::AppError;

const BEARER_PREFIX: &str = "Bearer ";

/// Axum extractor that succeeds when the request carries the configured token.
pub struct Authorized;

impl<S> FromRequestParts<S> for Authorized
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // The state is SharedState via Extension
        let Extension(app_state): Extension<SharedState> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::Internal(anyhow::anyhow!("missing state")))?;

        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if token_matches(&app_state.config.auth_token, header) {
            Ok(Authorized)
        } else {
            debug!(path = %parts.uri.path(), "rejected request without valid bearer token");
            Err(AppError::Unauthorized)
        }
    }
}

/// An empty expected token lets everything through.
pub fn token_matches(expected: &str, header: Option<&str>) -> bool {
    if expected.is_empty() {
        return true;
    }
    header
        .and_then(|h| h.strip_prefix(BEARER_PREFIX))
        .is_some_and(|presented| presented == expected)
}
