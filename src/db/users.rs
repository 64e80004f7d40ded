use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{sqlite::SqliteRow, Pool, Row, Sqlite};

use crate::models::User;

fn map_user_row(row: &SqliteRow) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Local login accounts; these stay in SQLite whatever the inventory backend
pub struct UserRepo;

impl UserRepo {
    pub async fn find_by_username(pool: &Pool<Sqlite>, username: &str) -> Result<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await
            .with_context(|| format!("Failed to look up user '{}'", username))?;
        Ok(row.as_ref().map(map_user_row))
    }

    /// Insert an account with a fresh uuid. A taken username is a unique
    /// violation, left for the caller to interpret.
    pub async fn create(pool: &Pool<Sqlite>, username: &str, password_hash: &str) -> Result<User> {
        let now = Utc::now();
        let user = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };

        sqlx::query("INSERT INTO users (id, username, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?)")
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .bind(user.updated_at)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to create user '{}'", username))?;
        Ok(user)
    }
}
