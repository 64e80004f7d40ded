use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::inventory::{SiteStore, VlanStore};
use crate::models::*;
use crate::AppState;

use super::ApiError;

/// GET /api/sites
pub async fn list_sites(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Site>>, ApiError> {
    Ok(Json(state.inventory.list_sites().await?))
}

/// GET /api/sites/:id
pub async fn get_site(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Site>, ApiError> {
    let site = state
        .inventory
        .get_site(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Site"))?;
    Ok(Json(site))
}

/// GET /api/sites/:id/devices
pub async fn list_site_devices(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Device>>, ApiError> {
    Ok(Json(state.inventory.list_devices(id).await?))
}

/// GET /api/devices/:id/interfaces
pub async fn list_device_interfaces(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Interface>>, ApiError> {
    Ok(Json(state.inventory.list_interfaces(id).await?))
}

/// GET /api/sites/:id/vlans
pub async fn list_site_vlans(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Vlan>>, ApiError> {
    Ok(Json(state.inventory.list_vlans(id).await?))
}

/// GET /api/sites/:id/prefixes
pub async fn list_site_prefixes(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Prefix>>, ApiError> {
    Ok(Json(state.inventory.list_prefixes(id).await?))
}

/// GET /api/device-roles
pub async fn list_device_roles(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DeviceRole>>, ApiError> {
    Ok(Json(state.inventory.list_device_roles().await?))
}

/// GET /api/device-types
pub async fn list_device_types(
    _auth: crate::auth::AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DeviceType>>, ApiError> {
    Ok(Json(state.inventory.list_device_types().await?))
}
