//! Store quote and map location models

use serde::{Deserialize, Serialize};

/// A point on the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// One row of a cheapest-store result, as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreQuote {
    pub store: String,
    #[serde(rename = "totalPrice")]
    pub total_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

impl StoreQuote {
    /// Store location, present only when the backend sent both coordinates
    pub fn location(&self) -> Option<Coordinates> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        }
    }
}

/// What the map is currently centered on
#[derive(Debug, Clone, PartialEq)]
pub enum SelectedStore {
    /// The device's own position, no label
    Device(Coordinates),
    /// A store picked from the cheapest-store results
    Store { label: String, location: Coordinates },
}

impl SelectedStore {
    pub fn location(&self) -> Coordinates {
        match self {
            SelectedStore::Device(location) => *location,
            SelectedStore::Store { location, .. } => *location,
        }
    }

    pub fn label(&self) -> Option<&str> {
        match self {
            SelectedStore::Device(_) => None,
            SelectedStore::Store { label, .. } => Some(label),
        }
    }
}
