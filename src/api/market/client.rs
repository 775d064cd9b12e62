use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use tracing::debug;

use crate::api::{handle_error_response, ApiError};
use crate::models::IndexRecord;

/// Source of the raw index snapshot
#[async_trait]
pub trait IndexSource: Send + Sync {
    async fn fetch_indices(&self) -> Result<Vec<IndexRecord>, ApiError>;
}

/// Client for the market data endpoint (`GET <url>` -> JSON array)
pub struct MarketDataClient {
    http_client: HttpClient,
    url: String,
    timeout: Duration,
}

impl MarketDataClient {
    pub fn new(url: String, timeout: Duration) -> Self {
        Self {
            http_client: HttpClient::new(),
            url,
            timeout,
        }
    }
}

#[async_trait]
impl IndexSource for MarketDataClient {
    async fn fetch_indices(&self) -> Result<Vec<IndexRecord>, ApiError> {
        debug!("GET {}", self.url);
        let response = self
            .http_client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        if !response.status().is_success() {
            return Err(handle_error_response(response).await);
        }

        let body = response.text().await.map_err(ApiError::from_transport)?;
        parse_indices(&body)
    }
}

/// Decode the endpoint body. Anything other than an array of well-typed
/// records is rejected here, before the report builder sees it.
pub fn parse_indices(body: &str) -> Result<Vec<IndexRecord>, ApiError> {
    serde_json::from_str::<Vec<IndexRecord>>(body)
        .map_err(|e| ApiError::DeserializationError(format!("Failed to parse indices: {}", e)))
}
