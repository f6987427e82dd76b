use axum::{
    Json,
    body::{Body, Bytes},
    extract::rejection::JsonRejection,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::powerdns::client::GatewayError;
use crate::validation::ValidationError;

#[derive(Debug, Serialize)]
pub struct ErrorResponseBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_status: Option<u16>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("not found")]
    NotFound,

    /// Upstream answered with status >= 300; forwarded as-is.
    #[error("upstream rejected request with {status}")]
    Upstream {
        status: StatusCode,
        content_type: Option<HeaderValue>,
        body: Bytes,
    },

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg, upstream_status) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "invalid or missing bearer token".into(),
                None,
            ),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not found".into(), None),
            AppError::Upstream {
                status,
                content_type,
                body,
            } => {
                let content_type = content_type
                    .unwrap_or_else(|| HeaderValue::from_static("application/json"));
                return (status, [(header::CONTENT_TYPE, content_type)], Body::from(body))
                    .into_response();
            }
            AppError::Gateway(err) => {
                warn!("upstream call failed: {err}");
                let upstream_status = match &err {
                    GatewayError::Decode { status, .. } => Some(status.as_u16()),
                    _ => None,
                };
                (StatusCode::BAD_GATEWAY, err.to_string(), upstream_status)
            }
            AppError::Internal(err) => {
                warn!("internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".into(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponseBody {
            error: msg,
            upstream_status,
        });
        (status, body).into_response()
    }
}
