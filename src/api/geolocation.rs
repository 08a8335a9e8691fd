use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::debug;

use super::price_api::ApiError;
use crate::models::Coordinates;

/// Source of the device's position
#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn locate(&self) -> Result<Coordinates, ApiError>;
}

/// Position fixed by configuration
pub struct FixedLocator {
    coordinates: Coordinates,
}

impl FixedLocator {
    pub fn new(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

#[async_trait]
impl GeoLocator for FixedLocator {
    async fn locate(&self) -> Result<Coordinates, ApiError> {
        Ok(self.coordinates)
    }
}

/// Geolocation switched off; every lookup fails
pub struct DisabledLocator;

#[async_trait]
impl GeoLocator for DisabledLocator {
    async fn locate(&self) -> Result<Coordinates, ApiError> {
        Err(ApiError::Unavailable("geolocation is disabled".to_string()))
    }
}

/// Reply of an ip-api.com style lookup service
#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: Option<String>,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLookupResponse {
    fn into_coordinates(self) -> Result<Coordinates, ApiError> {
        if let Some(status) = self.status.as_deref() {
            if status != "success" {
                let reason = self.message.unwrap_or_else(|| status.to_string());
                return Err(ApiError::Unavailable(reason));
            }
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(ApiError::DeserializationError(
                "lookup response has no coordinates".to_string(),
            )),
        }
    }
}

/// Approximate position from the public IP address
pub struct IpGeolocator {
    http_client: HttpClient,
    url: String,
}

impl IpGeolocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl GeoLocator for IpGeolocator {
    async fn locate(&self) -> Result<Coordinates, ApiError> {
        debug!("GET {}", self.url);
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::HttpError(status, body));
        }

        response
            .json::<IpLookupResponse>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))?
            .into_coordinates()
    }
}
