use anyhow::Result;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// NetBox API client
pub struct NetBoxClient {
    base_url: String,
    token: String,
    client: Client,
}

/// Response of a POST that NetBox may refuse with a validation error
pub(crate) enum PostOutcome<T> {
    Created(T),
    Rejected { status: StatusCode, body: String },
}

impl NetBoxClient {
    pub fn new(url: String, token: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            base_url: url.trim_end_matches('/').to_string(),
            token,
            client,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }

    /// GET a list endpoint, following `next` links until exhausted
    pub(crate) async fn list_all<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let mut results = Vec::new();
        let mut page: super::types::PaginatedResponse<T> = self.get_json(&self.api_url(endpoint), query).await?;

        loop {
            results.append(&mut page.results);
            match page.next.take() {
                Some(next) => page = self.get_json(&next, &[]).await?,
                None => break,
            }
        }

        Ok(results)
    }

    /// GET a list endpoint and return the first match, if any
    pub(crate) async fn find_first<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>> {
        let mut query = query.to_vec();
        query.push(("limit", "1".to_string()));
        let page: super::types::PaginatedResponse<T> = self.get_json(&self.api_url(endpoint), &query).await?;
        Ok(page.results.into_iter().next())
    }

    /// Number of objects a filtered list endpoint reports
    pub(crate) async fn count<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<i64> {
        let mut query = query.to_vec();
        query.push(("limit", "1".to_string()));
        let page: super::types::PaginatedResponse<T> = self.get_json(&self.api_url(endpoint), &query).await?;
        Ok(page.count)
    }

    /// GET a single object by id; 404 maps to None
    pub(crate) async fn get_by_id<T: serde::de::DeserializeOwned>(&self, endpoint: &str, id: i64) -> Result<Option<T>> {
        let resp = self
            .client
            .get(self.api_url(&format!("{}{}/", endpoint, id)))
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("NetBox API error {}: {}", status, body));
        }

        Ok(Some(resp.json().await?))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("NetBox API error {}: {}", status, body));
        }

        Ok(resp.json().await?)
    }

    /// POST a resource, handing validation refusals back to the caller
    pub(crate) async fn post_resource<T, B>(&self, endpoint: &str, body: &B) -> Result<PostOutcome<T>>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize,
    {
        let resp = self
            .client
            .post(self.api_url(endpoint))
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Ok(PostOutcome::Rejected { status, body });
        }

        Ok(PostOutcome::Created(resp.json().await?))
    }

    /// Helper to create a resource via POST
    pub(crate) async fn create_resource<T, B>(&self, endpoint: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize,
    {
        match self.post_resource(endpoint, body).await? {
            PostOutcome::Created(item) => Ok(item),
            PostOutcome::Rejected { status, body } => {
                Err(anyhow::anyhow!("NetBox API create error {}: {}", status, body))
            }
        }
    }

    /// Test connectivity to NetBox
    pub async fn test_connection(&self) -> bool {
        match self
            .client
            .get(self.api_url("/dcim/sites/?limit=1"))
            .header("Authorization", self.auth_header())
            .header("Accept", "application/json")
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }
}

/// NetBox reports uniqueness violations as a 400 whose body says "already exists"
pub(crate) fn is_duplicate_rejection(status: StatusCode, body: &str) -> bool {
    status == StatusCode::BAD_REQUEST && body.to_lowercase().contains("already exists")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_rejection() {
        let body = r#"{"__all__": ["VLAN with this Site and VID already exists."]}"#;
        assert!(is_duplicate_rejection(StatusCode::BAD_REQUEST, body));
        assert!(!is_duplicate_rejection(StatusCode::BAD_REQUEST, r#"{"vid": ["Ensure this value is less than or equal to 4094."]}"#));
        assert!(!is_duplicate_rejection(StatusCode::INTERNAL_SERVER_ERROR, body));
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let nb = NetBoxClient::new("https://netbox.example.com/".to_string(), "t".to_string(), Duration::from_secs(1)).unwrap();
        assert_eq!(nb.api_url("/ipam/vlans/"), "https://netbox.example.com/api/ipam/vlans/");
        assert_eq!(nb.auth_header(), "Token t");
    }
}
