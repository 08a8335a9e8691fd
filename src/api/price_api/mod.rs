pub mod client;
pub mod models;

pub use client::PriceApiClient;
pub use models::ApiError;

use async_trait::async_trait;

use crate::models::{PricePoint, Product, StoreQuote};

/// The backend operations the session depends on
#[async_trait]
pub trait PriceBackend: Send + Sync {
    /// Load the selectable product catalog
    async fn load_catalog(&self) -> Result<Vec<Product>, ApiError>;

    /// Load the (unsorted) price history for a barcode
    async fn fetch_history(&self, barcode: &str) -> Result<Vec<PricePoint>, ApiError>;

    /// Rank stores by total price for the given products
    async fn cheapest(&self, products: &[Product]) -> Result<Vec<StoreQuote>, ApiError>;
}
