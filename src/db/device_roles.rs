use anyhow::Result;
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::models::*;

fn map_device_role_row(row: &SqliteRow) -> DeviceRole {
    DeviceRole {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        color: row.get("color"),
    }
}

/// Device role lookups. Roles are seeded, never created by scripts.
pub struct DeviceRoleRepo;

impl DeviceRoleRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<DeviceRole>> {
        let rows = sqlx::query("SELECT * FROM device_roles ORDER BY name")
            .fetch_all(pool).await?;
        Ok(rows.iter().map(map_device_role_row).collect())
    }

    pub async fn find_by_name(pool: &Pool<Sqlite>, name: &str) -> Result<Option<DeviceRole>> {
        let row = sqlx::query("SELECT * FROM device_roles WHERE name = ?")
            .bind(name)
            .fetch_optional(pool).await?;
        Ok(row.as_ref().map(map_device_role_row))
    }
}
