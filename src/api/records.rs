//! Single-rrset endpoints addressed by body or by `name:type` identifier.
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
use crate::powerdns::types::PdnsZonePatch;
use crate::translate::{self, RrsetRequest};
use crate::validation::{parse_record_id, zone_name};

// POST /zones/{zone}/records/
pub async fn create(
    Path(zone): Path<String>,
    Extension(state): Extension<SharedState>,
    payload: Result<Json<RrsetRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let zone = zone_name(&zone)?;
    let Json(req) = payload?;
    let patch = translate::rrset_create(req)?;
    apply(&state, &zone, &patch).await
}

// PATCH /zones/{zone}/records/{record_id}
pub async fn update(
    Path((zone, record_id)): Path<(String, String)>,
    Extension(state): Extension<SharedState>,
    payload: Result<Json<RrsetRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let zone = zone_name(&zone)?;
    let id = parse_record_id(&record_id)?;
    let Json(req) = payload?;
    let patch = translate::rrset_update(id, req)?;
    apply(&state, &zone, &patch).await
}

// DELETE /zones/{zone}/records/{record_id}
pub async fn delete(
    Path((zone, record_id)): Path<(String, String)>,
    Extension(state): Extension<SharedState>,
) -> Result<Response, AppError> {
    let zone = zone_name(&zone)?;
    let id = parse_record_id(&record_id)?;
    let patch = translate::rrset_delete(id);
    apply(&state, &zone, &patch).await
}

async fn apply(
    state: &SharedState,
    zone: &str,
    patch: &PdnsZonePatch,
) -> Result<Response, AppError> {
    for change in &patch.rrsets {
        info!(
            %zone,
            name = %change.name,
            rrtype = %change.rrtype,
            changetype = ?change.changetype,
            "patching rrset"
        );
    }
    let reply: UpstreamReply<Value> = state.pdns.patch_zone(zone, patch).await?;
    passthrough(reply)
}
