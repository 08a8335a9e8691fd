pub mod geolocation;
pub mod price_api;

pub use geolocation::{DisabledLocator, FixedLocator, GeoLocator, IpGeolocator};
pub use price_api::{ApiError, PriceApiClient, PriceBackend};
