//! Multi-type record endpoints: one name and value fanned out over several types.
//!
//! Every request becomes a single zone PATCH, so PowerDNS applies or rejects
//! the whole set at once.
use axum::{
    Extension, Json,
    extract::{Path, rejection::JsonRejection},
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::ensure_success;
use crate::SharedState;
use crate::error::AppError;
use crate::powerdns::client::UpstreamReply;
use crate::translate::{self, SimpleAction, SimpleRecordRequest};
use crate::validation::zone_name;

#[derive(Debug, Serialize)]
pub struct SimpleRecordResponse {
    pub status: &'static str,
    pub zone: String,
    pub name: String,
    pub types: Vec<String>,
}

// POST /{zone}/create
pub async fn create(
    path: Path<String>,
    state: Extension<SharedState>,
    payload: Result<Json<SimpleRecordRequest>, JsonRejection>,
) -> Result<Json<SimpleRecordResponse>, AppError> {
    handle(SimpleAction::Create, path, state, payload).await
}

// POST /{zone}/update
pub async fn update(
    path: Path<String>,
    state: Extension<SharedState>,
    payload: Result<Json<SimpleRecordRequest>, JsonRejection>,
) -> Result<Json<SimpleRecordResponse>, AppError> {
    handle(SimpleAction::Update, path, state, payload).await
}

// POST /{zone}/delete
pub async fn delete(
    path: Path<String>,
    state: Extension<SharedState>,
    payload: Result<Json<SimpleRecordRequest>, JsonRejection>,
) -> Result<Json<SimpleRecordResponse>, AppError> {
    handle(SimpleAction::Delete, path, state, payload).await
}

// POST /zones/{action}
//
// `/zones/{zone}` shadows `/{zone}/{action}` for a zone literally named `zones`.
pub async fn zones_zone(
    Path(action): Path<String>,
    state: Extension<SharedState>,
    payload: Result<Json<SimpleRecordRequest>, JsonRejection>,
) -> Result<Json<SimpleRecordResponse>, AppError> {
    let action = match action.as_str() {
        "create" => SimpleAction::Create,
        "update" => SimpleAction::Update,
        "delete" => SimpleAction::Delete,
        _ => return Err(AppError::NotFound),
    };
    handle(action, Path("zones".to_string()), state, payload).await
}

async fn handle(
    action: SimpleAction,
    Path(zone): Path<String>,
    Extension(state): Extension<SharedState>,
    payload: Result<Json<SimpleRecordRequest>, JsonRejection>,
) -> Result<Json<SimpleRecordResponse>, AppError> {
    let zone = zone_name(&zone)?;
    let Json(req) = payload?;
    let changes = translate::simple_changes(action, req)?;

    info!(%zone, name = %changes.name, types = ?changes.types, ?action, "applying record changes");
    let reply: UpstreamReply<Value> = state.pdns.patch_zone(&zone, &changes.patch).await?;
    ensure_success(reply)?;

    Ok(Json(SimpleRecordResponse {
        status: "ok",
        zone,
        name: changes.name,
        types: changes.types,
    }))
}
