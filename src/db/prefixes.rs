use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Sqlite};

use crate::models::*;
use crate::utils;
use super::row_helpers::map_prefix_row;
use super::NotFoundError;

/// Prefix database operations
pub struct PrefixRepo;

impl PrefixRepo {
    pub async fn list_by_site(pool: &Pool<Sqlite>, site_id: i64) -> Result<Vec<Prefix>> {
        let rows = sqlx::query("SELECT * FROM prefixes WHERE site_id = ? ORDER BY prefix")
            .bind(site_id)
            .fetch_all(pool).await?;
        Ok(rows.iter().map(map_prefix_row).collect())
    }

    pub async fn get(pool: &Pool<Sqlite>, id: i64) -> Result<Option<Prefix>> {
        let row = sqlx::query("SELECT * FROM prefixes WHERE id = ?")
            .bind(id)
            .fetch_optional(pool).await?;
        Ok(row.as_ref().map(map_prefix_row))
    }

    pub async fn create(pool: &Pool<Sqlite>, req: &NewPrefix) -> Result<Prefix> {
        let (network, _, prefix_len) = utils::parse_cidr(&req.prefix)
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        let canonical_prefix = utils::format_cidr(network, prefix_len);

        // Check for duplicate CIDR within the same site
        let existing: Option<(i64,)> = sqlx::query_as(
            "SELECT id FROM prefixes WHERE prefix = ? AND site_id = ?",
        )
        .bind(&canonical_prefix)
        .bind(req.site_id)
        .fetch_optional(pool).await?;

        if let Some((existing_id,)) = existing {
            return Err(anyhow::anyhow!(
                "Duplicate prefix: {} already exists (id={})",
                canonical_prefix, existing_id
            ));
        }

        let now = Utc::now();
        let result = sqlx::query(
            r#"INSERT INTO prefixes (prefix, site_id, status, description, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&canonical_prefix)
        .bind(req.site_id)
        .bind(&req.status)
        .bind(req.description.as_deref().unwrap_or(""))
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .with_context(|| format!("Failed to create prefix {}", canonical_prefix))?;

        let id = result.last_insert_rowid();
        Self::get(pool, id).await?
            .ok_or_else(|| NotFoundError::new("Prefix", &id.to_string()).into())
    }
}
