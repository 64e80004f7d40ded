use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::inventory::CreateOutcome;
use crate::models::*;
use super::row_helpers::map_vlan_row;
use super::{is_unique_violation, NotFoundError};

const SELECT_VLAN: &str = r#"
    SELECT v.*, g.name as group_name
    FROM vlans v
    LEFT JOIN vlan_groups g ON v.group_id = g.id
"#;

/// VLAN database operations. `(site_id, vid)` is unique at the schema level.
pub struct VlanRepo;

impl VlanRepo {
    pub async fn exists(pool: &Pool<Sqlite>, site_id: i64, vid: i32) -> Result<bool> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM vlans WHERE site_id = ? AND vid = ?")
            .bind(site_id)
            .bind(vid)
            .fetch_one(pool).await?;
        Ok(count.0 > 0)
    }

    pub async fn list_by_site(pool: &Pool<Sqlite>, site_id: i64) -> Result<Vec<Vlan>> {
        let rows = sqlx::query(&format!("{} WHERE v.site_id = ? ORDER BY v.vid", SELECT_VLAN))
            .bind(site_id)
            .fetch_all(pool).await?;
        Ok(rows.iter().map(map_vlan_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Vlan>> {
        let row = sqlx::query(&format!("{} WHERE v.id = ?", SELECT_VLAN))
            .bind(id)
            .fetch_optional(pool).await?;
        Ok(row.as_ref().map(map_vlan_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &NewVlan) -> Result<CreateOutcome<Vlan>> {
        let result = sqlx::query(
            "INSERT INTO vlans (vid, name, site_id, group_id, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(req.vid)
        .bind(&req.name)
        .bind(req.site_id)
        .bind(req.group_id)
        .bind(Utc::now())
        .execute(pool)
        .await;

        let result = match result {
            Ok(r) => r,
            Err(e) if is_unique_violation(&e) => return Ok(CreateOutcome::AlreadyExists),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to create VLAN {} ({})", req.vid, req.name));
            }
        };

        let id = result.last_insert_rowid();
        let vlan = Self::get(pool, id).await?
            .ok_or_else(|| NotFoundError::new("Vlan", &id.to_string()))?;
        Ok(CreateOutcome::Created(vlan))
    }
}

/// VLAN group database operations
pub struct VlanGroupRepo;

impl VlanGroupRepo {
    pub async fn create(pool: &Pool<Sqlite>, req: &NewVlanGroup) -> Result<VlanGroup> {
        let result = sqlx::query(
            "INSERT INTO vlan_groups (name, slug, site_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&req.name)
        .bind(&req.slug)
        .bind(req.site_id)
        .bind(Utc::now())
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create VLAN group '{}'", req.name))?;

        Ok(VlanGroup {
            id: result.last_insert_rowid(),
            name: req.name.clone(),
            slug: req.slug.clone(),
            site_id: Some(req.site_id),
        })
    }
}
