use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::info;

use crate::config::{FetchStrategy, ScraperConfig};
use crate::error::{NetworkError, ScraperError};
use crate::review::ProductId;
use crate::traits::PageFetcher;

use super::FetchedPage;

/// HTTP GET 1回でページを取得する
pub struct StaticFetcher {
    config: ScraperConfig,
    client: reqwest::Client,
}

impl StaticFetcher {
    pub fn new(config: ScraperConfig) -> Result<Self, ScraperError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
        );
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(
            header::UPGRADE_INSECURE_REQUESTS,
            HeaderValue::from_static("1"),
        );

        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScraperError::Environment(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, product_id: &ProductId) -> Result<FetchedPage, ScraperError> {
        let url = self.config.target_url(product_id.as_str());
        info!("Fetching {} via HTTP", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(NetworkError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                status: status.as_u16(),
                url,
            }
            .into());
        }

        let html = response.text().await.map_err(NetworkError::from)?;
        info!("Received {} bytes (status {})", html.len(), status.as_u16());

        FetchedPage::inspect(url, FetchStrategy::Static, Some(status.as_u16()), html)
    }
}
