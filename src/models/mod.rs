use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::importer::ColumnMap;

/// User represents an authenticated user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// LoginRequest for authenticating a user
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// LoginResponse returned on successful authentication
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: usize,
    pub iat: usize,
}

/// Site status values (NetBox choice values)
pub mod site_status {
    pub const PLANNED: &str = "planned";
    pub const ACTIVE: &str = "active";
}

/// Device status values
pub mod device_status {
    pub const PLANNED: &str = "planned";
}

/// Prefix status values
pub mod prefix_status {
    pub const ACTIVE: &str = "active";
}

/// Device role names the provisioning scripts look up
pub mod switch_role {
    pub const CORE: &str = "Core Switch";
    pub const ACCESS: &str = "Access Switch";
    pub const CABIN: &str = "Cabin Switch";
}

/// Site is a physical or logical location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewSite {
    pub name: String,
    pub slug: String,
    pub status: String,
    pub description: Option<String>,
}

/// DeviceRole groups devices by function (e.g. "Access Switch")
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRole {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub color: String,
}

/// DeviceType is a hardware model from a manufacturer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceType {
    pub id: i64,
    pub manufacturer: String,
    pub model: String,
    pub slug: String,
}

/// Device is a network device installed at a site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    pub name: String,
    pub site_id: i64,
    pub role_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_name: Option<String>,
    pub device_type_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct NewDevice {
    pub name: String,
    pub site_id: i64,
    pub role_id: i64,
    pub device_type_id: i64,
    pub status: String,
}

/// Interface on a device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interface {
    pub id: i64,
    pub device_id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub iface_type: String,
}

/// VlanGroup is a named set of VLANs scoped to a site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VlanGroup {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct NewVlanGroup {
    pub name: String,
    pub slug: String,
    pub site_id: i64,
}

/// Vlan is a layer-2 segment identified by `vid`, unique per site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vlan {
    pub id: i64,
    pub vid: i32,
    pub name: String,
    pub site_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewVlan {
    pub vid: i32,
    pub name: String,
    pub site_id: i64,
    pub group_id: Option<i64>,
}

/// Prefix is an IPv4 block allocated to a site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prefix {
    pub id: i64,
    pub prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_id: Option<i64>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPrefix {
    pub prefix: String,
    pub site_id: i64,
    pub status: String,
    pub description: Option<String>,
}

// ========== Script requests ==========

/// Input of the "New Branch" script
#[derive(Debug, Clone, Deserialize)]
pub struct NewBranchRequest {
    pub site_name: String,
    pub switch_count: u32,
    pub switch_model: i64,
}

/// Input of the "Deploy Site with VLANs" script
#[derive(Debug, Clone, Deserialize)]
pub struct DeploySiteRequest {
    pub site_name: String,
    pub ship_id: String,
    pub prefix: String,
    #[serde(default)]
    pub core_switch_count: u32,
    #[serde(default)]
    pub core_switch_model: Option<i64>,
    #[serde(default)]
    pub access_switch_count: u32,
    #[serde(default)]
    pub access_switch_model: Option<i64>,
    #[serde(default)]
    pub cabin_switch_count: u32,
    #[serde(default)]
    pub cabin_switch_model: Option<i64>,
    pub csv_url: String,
    #[serde(default)]
    pub column_map: ColumnMap,
    #[serde(default)]
    pub management_interface: Option<String>,
}

/// Input of the "Create VLANs from CSV" script
#[derive(Debug, Clone, Deserialize)]
pub struct CreateVlansRequest {
    pub site_id: i64,
    pub vlan_group_name: String,
    #[serde(alias = "csv_file_path")]
    pub source: String,
    #[serde(default = "group_csv_columns")]
    pub column_map: ColumnMap,
}

/// Group CSVs carry a plain `name` column rather than `vlan_name`
fn group_csv_columns() -> ColumnMap {
    ColumnMap {
        id: "vlan_id".to_string(),
        name: "name".to_string(),
    }
}

/// Input of the standalone "Import VLANs" script
#[derive(Debug, Clone, Deserialize)]
pub struct ImportVlansRequest {
    pub site_id: i64,
    pub source: String,
    #[serde(default)]
    pub column_map: ColumnMap,
}
