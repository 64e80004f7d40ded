use anyhow::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Which inventory the scripts write to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryBackend {
    Local,
    NetBox { url: String, token: String },
}

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub db_max_connections: u32,
    pub listen_addr: String,
    pub jwt_secret: String,
    pub backend: InventoryBackend,
    pub fetch_timeout: Duration,
    /// Local CSV sources are resolved under this directory
    pub import_dir: PathBuf,
    pub admin_username: String,
    pub admin_password: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let backend = match get("INVENTORY_BACKEND", "local").trim().to_lowercase().as_str() {
            "local" => InventoryBackend::Local,
            "netbox" => {
                let url = get("NETBOX_URL", "");
                let token = get("NETBOX_TOKEN", "");
                if url.is_empty() || token.is_empty() {
                    anyhow::bail!("INVENTORY_BACKEND=netbox requires NETBOX_URL and NETBOX_TOKEN");
                }
                InventoryBackend::NetBox { url, token }
            }
            other => anyhow::bail!("unknown INVENTORY_BACKEND '{}' (expected local or netbox)", other),
        };

        Ok(Self {
            db_path: get("DB_PATH", "/data/forge-scripts.db"),
            db_max_connections: get("DB_MAX_CONNECTIONS", "5").parse().unwrap_or(5),
            listen_addr: get("LISTEN_ADDR", "0.0.0.0:8080"),
            jwt_secret: get("JWT_SECRET", ""),
            backend,
            fetch_timeout: Duration::from_secs(get("FETCH_TIMEOUT_SECS", "30").parse().unwrap_or(30)),
            import_dir: PathBuf::from(get("IMPORT_DIR", "/data/imports")),
            admin_username: get("ADMIN_USERNAME", "admin"),
            admin_password: get("ADMIN_PASSWORD", "admin"),
        })
    }
}
