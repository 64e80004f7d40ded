use sqlx::{Row, sqlite::SqliteRow};

use crate::models::*;

/// Filter empty strings to None; the DB may store '' instead of NULL
pub fn none_if_empty(opt: Option<String>) -> Option<String> {
    opt.filter(|s| !s.is_empty())
}

/// Map a SQLite row to a Site struct
pub fn map_site_row(row: &SqliteRow) -> Site {
    Site {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        status: row.get("status"),
        description: none_if_empty(row.get("description")),
        created_at: row.try_get("created_at").ok(),
    }
}

/// Map a SQLite row (joined with role and type) to a Device struct
pub fn map_device_row(row: &SqliteRow) -> Device {
    Device {
        id: row.get("id"),
        name: row.get("name"),
        site_id: row.get("site_id"),
        role_id: row.get("role_id"),
        role_name: row.try_get("role_name").ok(),
        device_type_id: row.get("device_type_id"),
        manufacturer: row.try_get("manufacturer").ok(),
        model: row.try_get("model").ok(),
        status: row.get("status"),
    }
}

/// Map a SQLite row to a Vlan struct
pub fn map_vlan_row(row: &SqliteRow) -> Vlan {
    Vlan {
        id: row.get("id"),
        vid: row.get("vid"),
        name: row.get("name"),
        site_id: row.get("site_id"),
        group_id: row.try_get::<Option<i64>, _>("group_id").ok().flatten(),
        group_name: row.try_get::<Option<String>, _>("group_name").ok().flatten(),
    }
}

/// Map a SQLite row to a Prefix struct
pub fn map_prefix_row(row: &SqliteRow) -> Prefix {
    Prefix {
        id: row.get("id"),
        prefix: row.get("prefix"),
        site_id: row.try_get::<Option<i64>, _>("site_id").ok().flatten(),
        status: row.get("status"),
        description: none_if_empty(row.get("description")),
    }
}
