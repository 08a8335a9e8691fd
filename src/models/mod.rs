//! Data models shared by the API client, the session state and the views
//!
//! Wire types mirror the backend's JSON; the rest are client-side derived data.

pub mod chart;
pub mod price;
pub mod product;
pub mod store;

// Re-export commonly used types for convenience
pub use chart::{ChartDataset, ChartSeries};
pub use price::PricePoint;
pub use product::{Product, ShoppingListEntry};
pub use store::{Coordinates, SelectedStore, StoreQuote};
