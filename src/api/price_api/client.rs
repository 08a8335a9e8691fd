use async_trait::async_trait;
use reqwest::Client as HttpClient;
use reqwest::header::RETRY_AFTER;
use reqwest::Url;
use tracing::{debug, warn};

use super::models::{ApiError, ErrorResponse};
use super::PriceBackend;
use crate::models::{PricePoint, Product, StoreQuote};

/// HTTP client for the price-comparison backend
pub struct PriceApiClient {
    http_client: HttpClient,
    base_url: String,
}

impl PriceApiClient {
    /// Create a client for the given base URL (no trailing slash required)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(HttpClient::new(), base_url)
    }

    /// Create a client reusing an existing reqwest client
    pub fn with_client(http_client: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http_client,
            base_url,
        }
    }

    /// Join path segments onto the base URL, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::RequestError(format!("Invalid base URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::RequestError(format!("Base URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn products_url(&self) -> Result<Url, ApiError> {
        self.endpoint(&["api", "products-client"])
    }

    fn cheapest_url(&self) -> Result<Url, ApiError> {
        self.endpoint(&["api", "cheapest"])
    }

    fn history_url(&self, barcode: &str) -> Result<Url, ApiError> {
        self.endpoint(&["api", "product", barcode.trim(), "history"])
    }

    /// Parse error response based on HTTP status code
    async fn handle_error_response(
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> ApiError {
        let status_code = status.as_u16();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok());
        let body_text = response.text().await.unwrap_or_default();

        match status_code {
            400 => {
                let message = serde_json::from_str::<ErrorResponse>(&body_text)
                    .ok()
                    .and_then(|e| e.message.or(e.error))
                    .unwrap_or(body_text);
                ApiError::BadRequest(message)
            }
            404 => ApiError::NotFound(body_text),
            429 => {
                warn!("Rate limited by backend, retry after {:?} s", retry_after);
                ApiError::RateLimited { retry_after }
            }
            500..=599 => {
                warn!("Server error {}: {}", status_code, body_text);
                ApiError::ServerError(status_code, body_text)
            }
            _ => ApiError::HttpError(status_code, body_text),
        }
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        if !response.status().is_success() {
            let status = response.status();
            return Err(Self::handle_error_response(status, response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }

    /// GET /api/products-client
    ///
    /// Retrieves the selectable product catalog in backend order.
    pub async fn get_products(&self) -> Result<Vec<Product>, ApiError> {
        let url = self.products_url()?;
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        Self::read_json(response).await
    }

    /// GET /api/product/{barcode}/history
    ///
    /// Retrieves the price observations for one product. The backend does
    /// not guarantee any ordering.
    pub async fn get_price_history(&self, barcode: &str) -> Result<Vec<PricePoint>, ApiError> {
        let url = self.history_url(barcode)?;
        debug!("GET {}", url);

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        Self::read_json(response).await
    }

    /// POST /api/cheapest
    ///
    /// Sends the chosen products and returns stores ranked by ascending
    /// total price.
    pub async fn find_cheapest(&self, products: &[Product]) -> Result<Vec<StoreQuote>, ApiError> {
        let url = self.cheapest_url()?;
        debug!("POST {} ({} products)", url, products.len());

        let response = self
            .http_client
            .post(url)
            .json(products)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        Self::read_json(response).await
    }
}

#[async_trait]
impl PriceBackend for PriceApiClient {
    async fn load_catalog(&self) -> Result<Vec<Product>, ApiError> {
        self.get_products().await
    }

    async fn fetch_history(&self, barcode: &str) -> Result<Vec<PricePoint>, ApiError> {
        self.get_price_history(barcode).await
    }

    async fn cheapest(&self, products: &[Product]) -> Result<Vec<StoreQuote>, ApiError> {
        self.find_cheapest(products).await
    }
}
