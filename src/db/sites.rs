use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;
use super::row_helpers::map_site_row;

/// Site database operations
pub struct SiteRepo;

impl SiteRepo {
    pub async fn list(pool: &Pool<Sqlite>) -> Result<Vec<Site>> {
        let rows = sqlx::query("SELECT * FROM sites ORDER BY name")
            .fetch_all(pool).await?;
        Ok(rows.iter().map(map_site_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Site>> {
        let row = sqlx::query("SELECT * FROM sites WHERE id = ?")
            .bind(id)
            .fetch_optional(pool).await?;
        Ok(row.as_ref().map(map_site_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &NewSite) -> Result<Site> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"INSERT INTO sites (name, slug, status, description, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&req.name)
        .bind(&req.slug)
        .bind(&req.status)
        .bind(req.description.as_deref().unwrap_or(""))
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create site '{}'", req.name))?;

        let id = result.last_insert_rowid();
        Self::get(pool, id).await?
            .ok_or_else(|| super::NotFoundError::new("Site", &id.to_string()).into())
    }
}
