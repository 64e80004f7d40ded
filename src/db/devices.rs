use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};

use crate::models::*;
use super::row_helpers::map_device_row;

const SELECT_DEVICE: &str = r#"
    SELECT d.*,
           r.name as role_name,
           t.manufacturer as manufacturer,
           t.model as model
    FROM devices d
    JOIN device_roles r ON d.role_id = r.id
    JOIN device_types t ON d.device_type_id = t.id
"#;

/// Device database operations
pub struct DeviceRepo;

impl DeviceRepo {
    pub async fn list_by_site(pool: &Pool<Sqlite>, site_id: i64) -> Result<Vec<Device>> {
        let rows = sqlx::query(&format!("{} WHERE d.site_id = ? ORDER BY d.id", SELECT_DEVICE))
            .bind(site_id)
            .fetch_all(pool).await?;
        Ok(rows.iter().map(map_device_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Device>> {
        let row = sqlx::query(&format!("{} WHERE d.id = ?", SELECT_DEVICE))
            .bind(id)
            .fetch_optional(pool).await?;
        Ok(row.as_ref().map(map_device_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &NewDevice) -> Result<Device> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"INSERT INTO devices (name, site_id, role_id, device_type_id, status, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&req.name)
        .bind(req.site_id)
        .bind(req.role_id)
        .bind(req.device_type_id)
        .bind(&req.status)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create device '{}'", req.name))?;

        let id = result.last_insert_rowid();
        Self::get(pool, id).await?
            .ok_or_else(|| super::NotFoundError::new("Device", &id.to_string()).into())
    }
}

/// Interface database operations
pub struct InterfaceRepo;

impl InterfaceRepo {
    pub async fn list_by_device(pool: &Pool<Sqlite>, device_id: i64) -> Result<Vec<Interface>> {
        let rows = sqlx::query("SELECT id, device_id, name, type FROM interfaces WHERE device_id = ? ORDER BY id")
            .bind(device_id)
            .fetch_all(pool)
            .await
            .with_context(|| format!("Failed to list interfaces of device {}", device_id))?;
        Ok(rows
            .iter()
            .map(|row| Interface {
                id: row.get("id"),
                device_id: row.get("device_id"),
                name: row.get("name"),
                iface_type: row.get("type"),
            })
            .collect())
    }

    pub async fn create(pool: &Pool<Sqlite>, device_id: i64, name: &str, iface_type: &str) -> Result<Interface> {
        let result = sqlx::query(
            "INSERT INTO interfaces (device_id, name, type, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(device_id)
        .bind(name)
        .bind(iface_type)
        .bind(Utc::now())
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create interface '{}' on device {}", name, device_id))?;

        Ok(Interface {
            id: result.last_insert_rowid(),
            device_id,
            name: name.to_string(),
            iface_type: iface_type.to_string(),
        })
    }
}
