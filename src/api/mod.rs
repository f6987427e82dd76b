pub mod records;
pub mod simple;
pub mod zones;

use axum::{
    Extension, Json, Router,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
};
use serde::Serialize;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::SharedState;
use crate::auth::Authorized;
use crate::error::AppError;
use crate::powerdns::client::UpstreamReply;

pub fn create_router(state: SharedState) -> Router {
    // Upstream timeout plus headroom.
    let request_timeout = state.config.pdns_timeout + std::time::Duration::from_secs(10);

    Router::new()
        .route("/zones", get(zones::list).post(zones::create))
        .route(
            "/zones/{zone}",
            patch(zones::update)
                .delete(zones::delete)
                .post(simple::zones_zone),
        )
        .route(
            "/zones/{zone}/records/",
            get(zones::records).post(records::create),
        )
        .route(
            "/zones/{zone}/records",
            get(zones::records).post(records::create),
        )
        .route(
            "/zones/{zone}/records/{record_id}",
            patch(records::update).delete(records::delete),
        )
        .route("/{zone}/create", post(simple::create))
        .route("/{zone}/update", post(simple::update))
        .route("/{zone}/delete", post(simple::delete))
        .route_layer(middleware::from_extractor::<Authorized>())
        .route("/health", get(health))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(Extension(state))
}

async fn health() -> &'static str {
    "ok"
}

/// Turn an upstream status >= 300 into a verbatim passthrough error.
pub(crate) fn ensure_success<T>(reply: UpstreamReply<T>) -> Result<UpstreamReply<T>, AppError> {
    if reply.is_success() {
        Ok(reply)
    } else {
        Err(AppError::Upstream {
            status: reply.status,
            content_type: reply.content_type,
            body: reply.raw,
        })
    }
}

/// Respond with the upstream status and decoded body, or forward the rejection.
pub(crate) fn passthrough<T: Serialize>(reply: UpstreamReply<T>) -> Result<Response, AppError> {
    let reply = ensure_success(reply)?;
    Ok(match reply.body {
        Some(body) => (reply.status, Json(body)).into_response(),
        None => reply.status.into_response(),
    })
}
