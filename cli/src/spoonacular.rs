use anyhow::Context;
use serde::de::DeserializeOwned;
use tracing::debug;

use spoonful_core::repository::RecipeSource;
use spoonful_core::spoonacular::{RecipeInformation, SearchResponse};
use spoonful_core::{Error, Result};

pub struct SpoonacularClient {
    client: reqwest::Client,
    base_url: String,
}

impl SpoonacularClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "spoonful/{} (recipe browser)",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(std::time::Duration::from_secs(15))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(transport)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Transport(format!("{url} returned {status}")));
        }

        let body = resp.text().await.map_err(transport)?;
        debug!(url, bytes = body.len(), "Spoonacular response");
        Ok(serde_json::from_str(&body)?)
    }
}

// The request URL carries the apiKey query parameter; keep it out of errors.
fn transport(e: reqwest::Error) -> Error {
    Error::Transport(e.without_url().to_string())
}

impl RecipeSource for SpoonacularClient {
    async fn fetch_previews(&self, key: &str, count: u32, offset: u32) -> Result<SearchResponse> {
        let number = count.to_string();
        let offset = offset.to_string();
        self.get_json(
            &self.endpoint("complexSearch"),
            &[("apiKey", key), ("number", number.as_str()), ("offset", offset.as_str())],
        )
        .await
    }

    async fn fetch_previews_by_query(
        &self,
        key: &str,
        query: &str,
        count: u32,
    ) -> Result<SearchResponse> {
        let number = count.to_string();
        self.get_json(
            &self.endpoint("complexSearch"),
            &[("apiKey", key), ("query", query), ("number", number.as_str())],
        )
        .await
    }

    async fn fetch_detail(&self, id: i64, key: &str) -> Result<RecipeInformation> {
        self.get_json(&self.endpoint(&format!("{id}/information")), &[("apiKey", key)])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BASE_URL;

    #[tokio::test]
    async fn test_endpoint_joins_paths() {
        let client = SpoonacularClient::new(DEFAULT_BASE_URL).unwrap();
        assert_eq!(
            client.endpoint("complexSearch"),
            "https://api.spoonacular.com/recipes/complexSearch"
        );
        assert_eq!(
            client.endpoint("716429/information"),
            "https://api.spoonacular.com/recipes/716429/information"
        );

        let bare = SpoonacularClient::new("http://localhost:9000").unwrap();
        assert_eq!(
            bare.endpoint("complexSearch"),
            "http://localhost:9000/complexSearch"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP
        let client = SpoonacularClient::new("http://127.0.0.1:9").unwrap();
        let err = client.fetch_detail(1, "secret-key").await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(!err.to_string().contains("secret-key"));
    }

    // --- Integration tests (hit real Spoonacular API, need SPOONFUL_API_KEY) ---

    fn api_key() -> String {
        std::env::var(crate::config::API_KEY_ENV).expect("SPOONFUL_API_KEY must be set")
    }

    #[tokio::test]
    #[ignore = "hits Spoonacular API"]
    async fn test_fetch_previews_page() {
        let client = SpoonacularClient::new(DEFAULT_BASE_URL).unwrap();
        let response = client.fetch_previews(&api_key(), 5, 0).await.unwrap();
        assert_eq!(response.results.len(), 5);
        assert!(response.total_results > 0);
    }

    #[tokio::test]
    #[ignore = "hits Spoonacular API"]
    async fn test_fetch_by_query() {
        let client = SpoonacularClient::new(DEFAULT_BASE_URL).unwrap();
        let response = client
            .fetch_previews_by_query(&api_key(), "pasta", 3)
            .await
            .unwrap();
        assert!(!response.results.is_empty());
    }

    #[tokio::test]
    #[ignore = "hits Spoonacular API"]
    async fn test_fetch_detail_known_recipe() {
        let client = SpoonacularClient::new(DEFAULT_BASE_URL).unwrap();
        let info = client.fetch_detail(716_429, &api_key()).await.unwrap();
        assert_eq!(info.id, 716_429);
        assert!(!info.extended_ingredients.is_empty());
    }

    #[tokio::test]
    #[ignore = "hits Spoonacular API"]
    async fn test_bad_key_is_transport_error() {
        let client = SpoonacularClient::new(DEFAULT_BASE_URL).unwrap();
        let err = client.fetch_previews("not-a-key", 1, 0).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
    }
}
