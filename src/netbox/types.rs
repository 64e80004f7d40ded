use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::*;

// --- NetBox API types ---

#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NestedRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChoice {
    pub value: String,
    pub label: String,
}

fn status_value(status: &Option<StatusChoice>, default: &str) -> String {
    status
        .as_ref()
        .map(|s| s.value.clone())
        .unwrap_or_else(|| default.to_string())
}

fn non_empty(s: String) -> Option<String> {
    Some(s).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbSite {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub status: Option<StatusChoice>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
}

impl From<NbSite> for Site {
    fn from(s: NbSite) -> Self {
        Site {
            id: s.id,
            status: status_value(&s.status, site_status::ACTIVE),
            name: s.name,
            slug: s.slug,
            description: non_empty(s.description),
            created_at: s.created,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbDeviceRole {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub color: String,
}

impl From<NbDeviceRole> for DeviceRole {
    fn from(r: NbDeviceRole) -> Self {
        DeviceRole { id: r.id, name: r.name, slug: r.slug, color: r.color }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbDeviceType {
    pub id: i64,
    pub model: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub manufacturer: Option<NestedRef>,
}

impl From<NbDeviceType> for DeviceType {
    fn from(t: NbDeviceType) -> Self {
        DeviceType {
            id: t.id,
            manufacturer: t.manufacturer.map(|m| m.name).unwrap_or_default(),
            model: t.model,
            slug: t.slug,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbDevice {
    pub id: i64,
    pub name: Option<String>,
    #[serde(default)]
    pub device_type: Option<NbDeviceType>,
    #[serde(default, alias = "device_role")]
    pub role: Option<NestedRef>,
    #[serde(default)]
    pub site: Option<NestedRef>,
    #[serde(default)]
    pub status: Option<StatusChoice>,
}

impl From<NbDevice> for Device {
    fn from(d: NbDevice) -> Self {
        Device {
            id: d.id,
            name: d.name.unwrap_or_default(),
            site_id: d.site.as_ref().map(|s| s.id).unwrap_or_default(),
            role_id: d.role.as_ref().map(|r| r.id).unwrap_or_default(),
            role_name: d.role.map(|r| r.name),
            device_type_id: d.device_type.as_ref().map(|t| t.id).unwrap_or_default(),
            manufacturer: d
                .device_type
                .as_ref()
                .and_then(|t| t.manufacturer.as_ref())
                .map(|m| m.name.clone()),
            model: d.device_type.map(|t| t.model),
            status: status_value(&d.status, device_status::PLANNED),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbInterface {
    pub id: i64,
    pub name: String,
    #[serde(default, rename = "type")]
    pub iface_type: Option<StatusChoice>,
    #[serde(default)]
    pub device: Option<NestedRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbVlanGroup {
    pub id: i64,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbVlan {
    pub id: i64,
    pub vid: i32,
    pub name: String,
    #[serde(default)]
    pub site: Option<NestedRef>,
    #[serde(default)]
    pub group: Option<NestedRef>,
}

impl From<NbVlan> for Vlan {
    fn from(v: NbVlan) -> Self {
        Vlan {
            id: v.id,
            vid: v.vid,
            name: v.name,
            site_id: v.site.map(|s| s.id).unwrap_or_default(),
            group_id: v.group.as_ref().map(|g| g.id),
            group_name: v.group.map(|g| g.name),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NbPrefix {
    pub id: i64,
    pub prefix: String,
    #[serde(default)]
    pub site: Option<NestedRef>,
    #[serde(default)]
    pub status: Option<StatusChoice>,
    #[serde(default)]
    pub description: String,
}

impl From<NbPrefix> for Prefix {
    fn from(p: NbPrefix) -> Self {
        Prefix {
            id: p.id,
            status: status_value(&p.status, prefix_status::ACTIVE),
            prefix: p.prefix,
            site_id: p.site.map(|s| s.id),
            description: non_empty(p.description),
        }
    }
}

// --- Create request types ---

#[derive(Debug, Serialize)]
pub(crate) struct SiteCreate {
    pub name: String,
    pub slug: String,
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DeviceCreate {
    pub name: String,
    pub device_type: i64,
    pub role: i64,
    pub site: i64,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct InterfaceCreate {
    pub device: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub iface_type: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct VlanGroupCreate {
    pub name: String,
    pub slug: String,
    pub scope_type: String,
    pub scope_id: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct VlanCreate {
    pub vid: i32,
    pub name: String,
    pub site: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<i64>,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct PrefixCreate {
    pub prefix: String,
    pub site: i64,
    pub status: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}
