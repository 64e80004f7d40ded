use anyhow::Result;
use reqwest::Client;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use super::ImportError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Where a CSV document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    Path(PathBuf),
}

impl Source {
    /// `http://` and `https://` select a URL, anything else is a local path
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(raw.to_string())
        } else {
            Source::Path(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => write!(f, "{}", url),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Reads CSV sources over HTTP or from files under the import directory
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    import_dir: PathBuf,
}

impl Fetcher {
    pub fn new(timeout: Duration, import_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Ok(Self {
            client,
            import_dir: import_dir.into(),
        })
    }

    /// Fetch the whole document as raw bytes, minus a leading UTF-8 BOM.
    ///
    /// Decoding happens per record in the importer, so one bad line does not
    /// sink the batch.
    pub async fn fetch(&self, source: &Source) -> Result<Vec<u8>, ImportError> {
        let mut bytes = match source {
            Source::Url(url) => self.fetch_url(url).await?,
            Source::Path(path) => {
                let fetch_error = |message: String| ImportError::Fetch {
                    location: source.to_string(),
                    message,
                };
                let resolved = self.resolve_path(path).await.map_err(fetch_error)?;
                tokio::fs::read(&resolved)
                    .await
                    .map_err(|e| fetch_error(e.to_string()))?
            }
        };

        tracing::debug!("Fetched {} bytes from {}", bytes.len(), source);
        if bytes.starts_with(UTF8_BOM) {
            bytes.drain(..UTF8_BOM.len());
        }
        Ok(bytes)
    }

    /// Map a relative path onto the import directory, refusing anything that
    /// would land outside it (absolute paths, `..`, symlinks pointing out).
    async fn resolve_path(&self, path: &Path) -> Result<PathBuf, String> {
        let relative = path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !relative || path.as_os_str().is_empty() {
            return Err("path must be relative to the import directory".to_string());
        }

        let base = tokio::fs::canonicalize(&self.import_dir)
            .await
            .map_err(|e| format!("import directory {}: {}", self.import_dir.display(), e))?;
        let resolved = tokio::fs::canonicalize(base.join(path))
            .await
            .map_err(|e| e.to_string())?;
        if !resolved.starts_with(&base) {
            return Err("path escapes the import directory".to_string());
        }
        Ok(resolved)
    }

    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, ImportError> {
        let fetch_error = |message: String| ImportError::Fetch {
            location: url.to_string(),
            message,
        };

        let resp = self
            .client
            .get(url)
            .header("Accept", "text/csv, text/plain, */*")
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(fetch_error(format!("HTTP {}", resp.status())));
        }

        let body = resp.bytes().await.map_err(|e| fetch_error(e.to_string()))?;
        Ok(body.to_vec())
    }
}
