//! Product and shopping list models

use serde::{Deserialize, Serialize};

use super::chart::SeriesColor;

/// A selectable product from the backend catalog. Identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub barcode: String,
    pub name: String,
}

/// A product chosen onto the shopping list
#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingListEntry {
    pub product: Product,
    /// Whether the price trend for this entry is shown on the chart
    pub chart_enabled: bool,
    /// Series color, fixed when the entry is created
    pub color: SeriesColor,
}

impl ShoppingListEntry {
    pub fn new(product: Product) -> Self {
        let color = SeriesColor::for_product(&product.id);
        Self {
            product,
            chart_enabled: false,
            color,
        }
    }
}
