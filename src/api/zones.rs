//! Zone-level endpoints: list, create, partial update, delete, and rrset listing.
use axum::{
    Extension, Json,
    extract::{Path, rejection::JsonRejection},
    response::Response,
};
use serde_json::Value;
use tracing::info;

use super::passthrough;
use crate::SharedState;
use crate::error::AppError;
use crate::powerdns::client::UpstreamReply;
use crate::translate::{self, CreateZoneRequest, UpdateZoneRequest};
use crate::validation::zone_name;

// GET /zones
pub async fn list(Extension(state): Extension<SharedState>) -> Result<Response, AppError> {
    let reply: UpstreamReply<Value> = state.pdns.list_zones().await?;
    passthrough(reply)
}

// POST /zones
pub async fn create(
    Extension(state): Extension<SharedState>,
    payload: Result<Json<CreateZoneRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(req) = payload?;
    let zone = translate::zone_create(req)?;

    info!(zone = %zone.name, kind = %zone.kind, "creating zone");
    let reply: UpstreamReply<Value> = state.pdns.create_zone(&zone).await?;
    passthrough(reply)
}

// PATCH /zones/{zone}
pub async fn update(
    Path(zone): Path<String>,
    Extension(state): Extension<SharedState>,
    payload: Result<Json<UpdateZoneRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let zone = zone_name(&zone)?;
    let Json(req) = payload?;
    let patch = translate::zone_update(req);

    info!(%zone, rrsets = patch.rrsets.len(), "updating zone");
    let reply: UpstreamReply<Value> = state.pdns.patch_zone(&zone, &patch).await?;
    passthrough(reply)
}

// DELETE /zones/{zone}
pub async fn delete(
    Path(zone): Path<String>,
    Extension(state): Extension<SharedState>,
) -> Result<Response, AppError> {
    let zone = zone_name(&zone)?;

    info!(%zone, "deleting zone");
    let reply: UpstreamReply<Value> = state.pdns.delete_zone(&zone).await?;
    passthrough(reply)
}

// GET /zones/{zone}/records/
pub async fn records(
    Path(zone): Path<String>,
    Extension(state): Extension<SharedState>,
) -> Result<Response, AppError> {
    let zone = zone_name(&zone)?;
    let reply: UpstreamReply<Value> = state.pdns.get_zone(&zone).await?;
    passthrough(reply)
}
