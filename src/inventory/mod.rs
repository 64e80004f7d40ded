//! Inventory backends the scripts write through.
//!
//! Scripts never reach into a database or API directly: they receive an
//! `Inventory` handle, which is either the local SQLite `Store` or a
//! `NetBoxClient` talking to a remote NetBox instance.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::*;

/// Result of a create call against a store that enforces uniqueness at write time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome<T> {
    Created(T),
    AlreadyExists,
}

/// Persistence for VLANs and VLAN groups
#[async_trait]
pub trait VlanStore: Send + Sync {
    /// Whether a VLAN with `vid` already exists at the site
    async fn vlan_exists(&self, site_id: i64, vid: i32) -> Result<bool>;

    /// Create a VLAN. Returns `AlreadyExists` when `(site, vid)` is taken.
    async fn create_vlan(&self, vlan: &NewVlan) -> Result<CreateOutcome<Vlan>>;

    async fn create_vlan_group(&self, group: &NewVlanGroup) -> Result<VlanGroup>;

    async fn list_vlans(&self, site_id: i64) -> Result<Vec<Vlan>>;
}

/// Persistence for sites and the records hanging off them
#[async_trait]
pub trait SiteStore: Send + Sync {
    async fn create_site(&self, site: &NewSite) -> Result<Site>;
    async fn get_site(&self, id: i64) -> Result<Option<Site>>;
    async fn list_sites(&self) -> Result<Vec<Site>>;

    async fn find_device_role(&self, name: &str) -> Result<Option<DeviceRole>>;
    async fn list_device_roles(&self) -> Result<Vec<DeviceRole>>;
    async fn get_device_type(&self, id: i64) -> Result<Option<DeviceType>>;
    async fn list_device_types(&self) -> Result<Vec<DeviceType>>;

    async fn create_device(&self, device: &NewDevice) -> Result<Device>;
    async fn list_devices(&self, site_id: i64) -> Result<Vec<Device>>;
    async fn create_interface(&self, device_id: i64, name: &str, iface_type: &str) -> Result<Interface>;
    async fn list_interfaces(&self, device_id: i64) -> Result<Vec<Interface>>;

    async fn create_prefix(&self, prefix: &NewPrefix) -> Result<Prefix>;
    async fn list_prefixes(&self, site_id: i64) -> Result<Vec<Prefix>>;
}

/// Everything a script needs from a backend
pub trait Inventory: VlanStore + SiteStore {}

impl<T: VlanStore + SiteStore> Inventory for T {}
