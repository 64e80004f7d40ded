mod device_roles;
mod device_types;
mod devices;
mod prefixes;
pub(crate) mod row_helpers;
pub mod seeds;
mod sites;
mod users;
mod vlans;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::inventory::{CreateOutcome, SiteStore, VlanStore};
use crate::models::*;

/// Typed "resource not found" error, downcast by the API error handler
#[derive(Debug)]
pub struct NotFoundError {
    pub resource: String,
    pub id: String,
}

impl NotFoundError {
    pub fn new(resource: &str, id: &str) -> Self {
        Self {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }
}

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} not found: {}", self.resource, self.id)
    }
}

impl std::error::Error for NotFoundError {}

/// True when a sqlx error is a UNIQUE constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

/// Store is the local source of truth, delegating to per-entity repo modules.
#[derive(Clone)]
pub struct Store {
    pool: Pool<Sqlite>,
}

impl Store {
    /// Create a new database store with a specific pool size
    pub async fn with_pool_size(db_path: &str, max_connections: u32) -> Result<Self> {
        let db_url = format!("sqlite:{}?mode=rwc", db_path);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Single-connection in-memory store for tests
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        Self::with_pool_size(":memory:", 1).await
    }

    /// Run database migrations
    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;

        self.seed_default_device_roles().await?;
        self.seed_default_device_types().await?;

        Ok(())
    }

    async fn seed_default_device_roles(&self) -> Result<()> {
        for (name, slug, color) in seeds::seed_device_role_params() {
            sqlx::query(
                r#"
                INSERT INTO device_roles (name, slug, color, created_at, updated_at)
                SELECT ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP
                WHERE NOT EXISTS (SELECT 1 FROM device_roles WHERE name = ?)
                "#,
            )
            .bind(name)
            .bind(slug)
            .bind(color)
            .bind(name)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    async fn seed_default_device_types(&self) -> Result<()> {
        for (manufacturer, model, slug) in seeds::seed_device_type_params() {
            sqlx::query(
                r#"
                INSERT INTO device_types (manufacturer, model, slug, created_at, updated_at)
                SELECT ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP
                WHERE NOT EXISTS (SELECT 1 FROM device_types WHERE slug = ?)
                "#,
            )
            .bind(manufacturer)
            .bind(model)
            .bind(slug)
            .bind(slug)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }

    /// Create the admin account on first start
    pub async fn ensure_admin_user(&self, username: &str, password: &str) -> Result<()> {
        if users::UserRepo::find_by_username(&self.pool, username).await?.is_some() {
            return Ok(());
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {}", e))?;
        match users::UserRepo::create(&self.pool, username, &password_hash).await {
            Ok(user) => {
                tracing::info!("Created admin user '{}' ({})", user.username, user.id);
                Ok(())
            }
            // Another instance sharing the database seeded it first
            Err(e) if e.downcast_ref::<sqlx::Error>().is_some_and(is_unique_violation) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // ========== User Operations ==========

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        users::UserRepo::find_by_username(&self.pool, username).await
    }
}

#[async_trait]
impl VlanStore for Store {
    async fn vlan_exists(&self, site_id: i64, vid: i32) -> Result<bool> {
        vlans::VlanRepo::exists(&self.pool, site_id, vid).await
    }

    async fn create_vlan(&self, vlan: &NewVlan) -> Result<CreateOutcome<Vlan>> {
        vlans::VlanRepo::create(&self.pool, vlan).await
    }

    async fn create_vlan_group(&self, group: &NewVlanGroup) -> Result<VlanGroup> {
        vlans::VlanGroupRepo::create(&self.pool, group).await
    }

    async fn list_vlans(&self, site_id: i64) -> Result<Vec<Vlan>> {
        vlans::VlanRepo::list_by_site(&self.pool, site_id).await
    }
}

#[async_trait]
impl SiteStore for Store {
    async fn create_site(&self, site: &NewSite) -> Result<Site> {
        sites::SiteRepo::create(&self.pool, site).await
    }

    async fn get_site(&self, id: i64) -> Result<Option<Site>> {
        sites::SiteRepo::get(&self.pool, id).await
    }

    async fn list_sites(&self) -> Result<Vec<Site>> {
        sites::SiteRepo::list(&self.pool).await
    }

    async fn find_device_role(&self, name: &str) -> Result<Option<DeviceRole>> {
        device_roles::DeviceRoleRepo::find_by_name(&self.pool, name).await
    }

    async fn list_device_roles(&self) -> Result<Vec<DeviceRole>> {
        device_roles::DeviceRoleRepo::list(&self.pool).await
    }

    async fn get_device_type(&self, id: i64) -> Result<Option<DeviceType>> {
        device_types::DeviceTypeRepo::get(&self.pool, id).await
    }

    async fn list_device_types(&self) -> Result<Vec<DeviceType>> {
        device_types::DeviceTypeRepo::list(&self.pool).await
    }

    async fn create_device(&self, device: &NewDevice) -> Result<Device> {
        devices::DeviceRepo::create(&self.pool, device).await
    }

    async fn list_devices(&self, site_id: i64) -> Result<Vec<Device>> {
        devices::DeviceRepo::list_by_site(&self.pool, site_id).await
    }

    async fn create_interface(&self, device_id: i64, name: &str, iface_type: &str) -> Result<Interface> {
        devices::InterfaceRepo::create(&self.pool, device_id, name, iface_type).await
    }

    async fn list_interfaces(&self, device_id: i64) -> Result<Vec<Interface>> {
        devices::InterfaceRepo::list_by_device(&self.pool, device_id).await
    }

    async fn create_prefix(&self, prefix: &NewPrefix) -> Result<Prefix> {
        prefixes::PrefixRepo::create(&self.pool, prefix).await
    }

    async fn list_prefixes(&self, site_id: i64) -> Result<Vec<Prefix>> {
        prefixes::PrefixRepo::list_by_site(&self.pool, site_id).await
    }
}
