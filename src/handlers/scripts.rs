use axum::{extract::State, Json};
use std::sync::Arc;

use crate::models::*;
use crate::scripts::{self, ScriptOutput};
use crate::AppState;

use super::ApiError;

/// POST /api/scripts/new-branch
pub async fn new_branch(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewBranchRequest>,
) -> Result<Json<ScriptOutput>, ApiError> {
    let output = scripts::new_branch(state.inventory.as_ref(), &req).await?;
    Ok(Json(output))
}

/// POST /api/scripts/deploy-site
pub async fn deploy_site(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<DeploySiteRequest>,
) -> Result<Json<ScriptOutput>, ApiError> {
    let output = scripts::deploy_site(state.inventory.as_ref(), &state.fetcher, &req).await?;
    Ok(Json(output))
}

/// POST /api/scripts/create-vlans
pub async fn create_vlans(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateVlansRequest>,
) -> Result<Json<ScriptOutput>, ApiError> {
    let output = scripts::create_vlans(state.inventory.as_ref(), &state.fetcher, &req).await?;
    Ok(Json(output))
}

/// POST /api/scripts/import-vlans
pub async fn import_vlans(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ImportVlansRequest>,
) -> Result<Json<ScriptOutput>, ApiError> {
    let output = scripts::import_vlans(state.inventory.as_ref(), &state.fetcher, &req).await?;
    Ok(Json(output))
}
