use anyhow::Result;
use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use crate::models::*;

fn map_device_type_row(row: &SqliteRow) -> DeviceType {
    DeviceType {
        id: row.get("id"),
        manufacturer: row.get("manufacturer"),
        model: row.get("model"),
        slug: row.get("slug"),
    }
}

pub struct DeviceTypeRepo;

impl DeviceTypeRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<DeviceType>> {
        let rows = sqlx::query("SELECT * FROM device_types ORDER BY manufacturer, model")
            .fetch_all(pool).await?;
        Ok(rows.iter().map(map_device_type_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<DeviceType>> {
        let row = sqlx::query("SELECT * FROM device_types WHERE id = ?")
            .bind(id)
            .fetch_optional(pool).await?;
        Ok(row.as_ref().map(map_device_type_row))
    }
}
