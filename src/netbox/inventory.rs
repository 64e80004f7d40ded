use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::inventory::{CreateOutcome, SiteStore, VlanStore};
use crate::models::*;
use crate::utils;

use super::client::{is_duplicate_rejection, NetBoxClient, PostOutcome};
use super::types::*;

const SITES: &str = "/dcim/sites/";
const DEVICE_ROLES: &str = "/dcim/device-roles/";
const DEVICE_TYPES: &str = "/dcim/device-types/";
const DEVICES: &str = "/dcim/devices/";
const INTERFACES: &str = "/dcim/interfaces/";
const VLAN_GROUPS: &str = "/ipam/vlan-groups/";
const VLANS: &str = "/ipam/vlans/";
const PREFIXES: &str = "/ipam/prefixes/";

fn site_filter(site_id: i64) -> Vec<(&'static str, String)> {
    vec![("site_id", site_id.to_string())]
}

/// NetBox omits `device`/`type` in some responses; fall back to what we asked for
fn interface_from(nb: NbInterface, device_id: i64, iface_type: &str) -> Interface {
    Interface {
        id: nb.id,
        device_id: nb.device.map(|d| d.id).unwrap_or(device_id),
        name: nb.name,
        iface_type: nb.iface_type.map(|t| t.value).unwrap_or_else(|| iface_type.to_string()),
    }
}

#[async_trait]
impl VlanStore for NetBoxClient {
    async fn vlan_exists(&self, site_id: i64, vid: i32) -> Result<bool> {
        let mut query = site_filter(site_id);
        query.push(("vid", vid.to_string()));
        let count = self.count::<NbVlan>(VLANS, &query).await?;
        Ok(count > 0)
    }

    async fn create_vlan(&self, vlan: &NewVlan) -> Result<CreateOutcome<Vlan>> {
        let body = VlanCreate {
            vid: vlan.vid,
            name: vlan.name.clone(),
            site: vlan.site_id,
            group: vlan.group_id,
            status: "active".to_string(),
        };
        match self.post_resource::<NbVlan, _>(VLANS, &body).await? {
            PostOutcome::Created(created) => Ok(CreateOutcome::Created(created.into())),
            PostOutcome::Rejected { status, body } if is_duplicate_rejection(status, &body) => {
                Ok(CreateOutcome::AlreadyExists)
            }
            PostOutcome::Rejected { status, body } => {
                Err(anyhow::anyhow!("NetBox API create error {}: {}", status, body))
            }
        }
    }

    async fn create_vlan_group(&self, group: &NewVlanGroup) -> Result<VlanGroup> {
        let body = VlanGroupCreate {
            name: group.name.clone(),
            slug: group.slug.clone(),
            scope_type: "dcim.site".to_string(),
            scope_id: group.site_id,
        };
        let created: NbVlanGroup = self
            .create_resource(VLAN_GROUPS, &body)
            .await
            .with_context(|| format!("failed to create VLAN group {}", group.name))?;
        Ok(VlanGroup {
            id: created.id,
            name: created.name,
            slug: created.slug,
            site_id: Some(group.site_id),
        })
    }

    async fn list_vlans(&self, site_id: i64) -> Result<Vec<Vlan>> {
        let vlans: Vec<NbVlan> = self.list_all(VLANS, &site_filter(site_id)).await?;
        Ok(vlans.into_iter().map(Vlan::from).collect())
    }
}

#[async_trait]
impl SiteStore for NetBoxClient {
    async fn create_site(&self, site: &NewSite) -> Result<Site> {
        let body = SiteCreate {
            name: site.name.clone(),
            slug: site.slug.clone(),
            status: site.status.clone(),
            description: site.description.clone().unwrap_or_default(),
        };
        let created: NbSite = self
            .create_resource(SITES, &body)
            .await
            .with_context(|| format!("failed to create site {}", site.name))?;
        Ok(created.into())
    }

    async fn get_site(&self, id: i64) -> Result<Option<Site>> {
        let site: Option<NbSite> = self.get_by_id(SITES, id).await?;
        Ok(site.map(Site::from))
    }

    async fn list_sites(&self) -> Result<Vec<Site>> {
        let sites: Vec<NbSite> = self.list_all(SITES, &[]).await?;
        Ok(sites.into_iter().map(Site::from).collect())
    }

    async fn find_device_role(&self, name: &str) -> Result<Option<DeviceRole>> {
        let role: Option<NbDeviceRole> = self.find_first(DEVICE_ROLES, &[("name", name.to_string())]).await?;
        Ok(role.map(DeviceRole::from))
    }

    async fn list_device_roles(&self) -> Result<Vec<DeviceRole>> {
        let roles: Vec<NbDeviceRole> = self.list_all(DEVICE_ROLES, &[]).await?;
        Ok(roles.into_iter().map(DeviceRole::from).collect())
    }

    async fn get_device_type(&self, id: i64) -> Result<Option<DeviceType>> {
        let device_type: Option<NbDeviceType> = self.get_by_id(DEVICE_TYPES, id).await?;
        Ok(device_type.map(DeviceType::from))
    }

    async fn list_device_types(&self) -> Result<Vec<DeviceType>> {
        let types: Vec<NbDeviceType> = self.list_all(DEVICE_TYPES, &[]).await?;
        Ok(types.into_iter().map(DeviceType::from).collect())
    }

    async fn create_device(&self, device: &NewDevice) -> Result<Device> {
        let body = DeviceCreate {
            name: device.name.clone(),
            device_type: device.device_type_id,
            role: device.role_id,
            site: device.site_id,
            status: device.status.clone(),
        };
        let created: NbDevice = self
            .create_resource(DEVICES, &body)
            .await
            .with_context(|| format!("failed to create device {}", device.name))?;
        Ok(created.into())
    }

    async fn list_devices(&self, site_id: i64) -> Result<Vec<Device>> {
        let devices: Vec<NbDevice> = self.list_all(DEVICES, &site_filter(site_id)).await?;
        Ok(devices.into_iter().map(Device::from).collect())
    }

    async fn create_interface(&self, device_id: i64, name: &str, iface_type: &str) -> Result<Interface> {
        let body = InterfaceCreate {
            device: device_id,
            name: name.to_string(),
            iface_type: iface_type.to_string(),
        };
        let created: NbInterface = self
            .create_resource(INTERFACES, &body)
            .await
            .with_context(|| format!("failed to create interface {}", name))?;
        Ok(interface_from(created, device_id, iface_type))
    }

    async fn list_interfaces(&self, device_id: i64) -> Result<Vec<Interface>> {
        let ifaces: Vec<NbInterface> = self
            .list_all(INTERFACES, &[("device_id", device_id.to_string())])
            .await?;
        Ok(ifaces.into_iter().map(|i| interface_from(i, device_id, "")).collect())
    }

    async fn create_prefix(&self, prefix: &NewPrefix) -> Result<Prefix> {
        let (network, _, len) = utils::parse_cidr(&prefix.prefix).map_err(anyhow::Error::msg)?;
        let body = PrefixCreate {
            prefix: utils::format_cidr(network, len),
            site: prefix.site_id,
            status: prefix.status.clone(),
            description: prefix.description.clone().unwrap_or_default(),
        };
        let created: NbPrefix = self
            .create_resource(PREFIXES, &body)
            .await
            .with_context(|| format!("failed to create prefix {}", prefix.prefix))?;
        Ok(created.into())
    }

    async fn list_prefixes(&self, site_id: i64) -> Result<Vec<Prefix>> {
        let prefixes: Vec<NbPrefix> = self.list_all(PREFIXES, &site_filter(site_id)).await?;
        Ok(prefixes.into_iter().map(Prefix::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Inventory;
    use axum::extract::Query;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::time::Duration;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client(base: String) -> NetBoxClient {
        NetBoxClient::new(base, "secret".to_string(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_vlan_exists_filters_by_site_and_vid() {
        let app = Router::new().route(
            "/api/ipam/vlans/",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                let hit = q.get("site_id").map(String::as_str) == Some("9") && q.get("vid").map(String::as_str) == Some("100");
                let count = if hit { 1 } else { 0 };
                Json(serde_json::json!({"count": count, "next": null, "previous": null, "results": []}))
            }),
        );
        let nb = client(serve(app).await);
        assert!(nb.vlan_exists(9, 100).await.unwrap());
        assert!(!nb.vlan_exists(9, 200).await.unwrap());
        assert!(!nb.vlan_exists(10, 100).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_vlan_duplicate_is_already_exists() {
        let app = Router::new().route(
            "/api/ipam/vlans/",
            axum::routing::post(|Json(body): Json<serde_json::Value>| async move {
                if body["vid"] == 100 {
                    (
                        StatusCode::BAD_REQUEST,
                        Json(serde_json::json!({"__all__": ["VLAN with this Site and VID already exists."]})),
                    )
                } else if body["vid"] == 300 {
                    (StatusCode::BAD_REQUEST, Json(serde_json::json!({"name": ["This field is required."]})))
                } else {
                    (
                        StatusCode::CREATED,
                        Json(serde_json::json!({
                            "id": 41, "vid": body["vid"], "name": body["name"],
                            "site": {"id": body["site"], "name": "Harbor"}
                        })),
                    )
                }
            }),
        );
        let nb = client(serve(app).await);
        let new_vlan = |vid| NewVlan { vid, name: "Guest".to_string(), site_id: 9, group_id: None };

        assert_eq!(nb.create_vlan(&new_vlan(100)).await.unwrap(), CreateOutcome::AlreadyExists);
        assert!(nb.create_vlan(&new_vlan(300)).await.is_err());
        match nb.create_vlan(&new_vlan(200)).await.unwrap() {
            CreateOutcome::Created(vlan) => {
                assert_eq!(vlan.id, 41);
                assert_eq!(vlan.vid, 200);
                assert_eq!(vlan.site_id, 9);
            }
            CreateOutcome::AlreadyExists => panic!("expected a created VLAN"),
        }
    }

    #[tokio::test]
    async fn test_list_follows_pagination() {
        let app = Router::new().route(
            "/api/dcim/sites/",
            get(|headers: HeaderMap, Query(q): Query<HashMap<String, String>>| async move {
                if q.get("offset").map(String::as_str) == Some("1") {
                    return Json(serde_json::json!({
                        "count": 2, "next": null, "previous": null,
                        "results": [{"id": 2, "name": "Cove", "slug": "cove"}]
                    }));
                }
                // NetBox hands out absolute `next` links
                let host = headers.get("host").and_then(|h| h.to_str().ok()).unwrap_or_default();
                Json(serde_json::json!({
                    "count": 2,
                    "next": format!("http://{}/api/dcim/sites/?offset=1", host),
                    "previous": null,
                    "results": [{"id": 1, "name": "Harbor", "slug": "harbor"}]
                }))
            }),
        );
        let nb = client(serve(app).await);
        let sites = nb.list_sites().await.unwrap();
        let names: Vec<_> = sites.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Harbor", "Cove"]);
    }

    #[tokio::test]
    async fn test_get_missing_site_is_none() {
        let app = Router::new().route(
            "/api/dcim/sites/:id/",
            get(|| async { (StatusCode::NOT_FOUND, Json(serde_json::json!({"detail": "Not found."}))) }),
        );
        let nb = client(serve(app).await);
        let inv: &dyn Inventory = &nb;
        assert!(inv.get_site(77).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_interfaces_filters_by_device() {
        let app = Router::new().route(
            "/api/dcim/interfaces/",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                let results = if q.get("device_id").map(String::as_str) == Some("5") {
                    serde_json::json!([
                        {"id": 1, "name": "mgmt0", "type": {"value": "virtual", "label": "Virtual"}, "device": {"id": 5, "name": "SW-1"}},
                        {"id": 2, "name": "eth1"}
                    ])
                } else {
                    serde_json::json!([])
                };
                Json(serde_json::json!({"count": 2, "next": null, "previous": null, "results": results}))
            }),
        );
        let nb = client(serve(app).await);

        let ifaces = nb.list_interfaces(5).await.unwrap();
        assert_eq!(ifaces.len(), 2);
        assert_eq!(ifaces[0].iface_type, "virtual");
        assert_eq!(ifaces[1].device_id, 5);
        assert!(nb.list_interfaces(6).await.unwrap().is_empty());
    }
}
