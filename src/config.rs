use std::time::Duration;

use thiserror::Error;

use crate::models::Coordinates;
use crate::utils::RetryPolicy;

const DEFAULT_API_BASE_URL: &str = "http://localhost:3333";
const DEFAULT_GEOLOCATION_URL: &str = "http://ip-api.com/json";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_RETRIES: u32 = 1;
// Sofia, matching the BGN totals the backend reports
const DEFAULT_ORIGIN: Coordinates = Coordinates {
    latitude: 42.6977,
    longitude: 23.3219,
};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("{0} is set but {1} is missing")]
    Incomplete(&'static str, &'static str),
}

/// Where the device position comes from
#[derive(Debug, Clone, PartialEq)]
pub enum GeolocationSource {
    Fixed(Coordinates),
    Lookup(String),
    Disabled,
}

/// Settings resolved once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub retry: RetryPolicy,
    pub geolocation: GeolocationSource,
    pub default_origin: Coordinates,
    pub chart_size: (u32, u32),
}

impl Config {
    /// Read configuration from the process environment (after `.env` is loaded)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_base_url = get("API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = parse_or("REQUEST_TIMEOUT_SECS", get("REQUEST_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS)?;
        let retries = parse_or("REQUEST_RETRIES", get("REQUEST_RETRIES"), DEFAULT_RETRIES)?;
        let retry = RetryPolicy::new(Duration::from_secs(timeout_secs.max(1)), retries);

        let device = coordinates_pair(("DEVICE_LAT", get("DEVICE_LAT")), ("DEVICE_LNG", get("DEVICE_LNG")))?;
        let geolocation = match (device, get("GEOLOCATION_URL")) {
            (Some(coordinates), _) => GeolocationSource::Fixed(coordinates),
            (None, Some(url)) if url.eq_ignore_ascii_case("off") => GeolocationSource::Disabled,
            (None, Some(url)) => GeolocationSource::Lookup(url),
            (None, None) => GeolocationSource::Lookup(DEFAULT_GEOLOCATION_URL.to_string()),
        };

        let default_origin = coordinates_pair(
            ("MAP_DEFAULT_LAT", get("MAP_DEFAULT_LAT")),
            ("MAP_DEFAULT_LNG", get("MAP_DEFAULT_LNG")),
        )?
        .unwrap_or(DEFAULT_ORIGIN);

        let chart_width = parse_or("CHART_WIDTH", get("CHART_WIDTH"), 1024u32)?;
        let chart_height = parse_or("CHART_HEIGHT", get("CHART_HEIGHT"), 640u32)?;

        Ok(Self {
            api_base_url,
            retry,
            geolocation,
            default_origin,
            chart_size: (chart_width, chart_height),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
        None => Ok(default),
    }
}

fn coordinates_pair(
    lat: (&'static str, Option<String>),
    lng: (&'static str, Option<String>),
) -> Result<Option<Coordinates>, ConfigError> {
    match (lat, lng) {
        ((lat_key, Some(lat)), (lng_key, Some(lng))) => {
            let latitude: f64 = parse_or(lat_key, Some(lat), 0.0)?;
            let longitude: f64 = parse_or(lng_key, Some(lng), 0.0)?;
            Ok(Some(Coordinates::new(latitude, longitude)))
        }
        ((lat_key, Some(_)), (lng_key, None)) => Err(ConfigError::Incomplete(lat_key, lng_key)),
        ((lat_key, None), (lng_key, Some(_))) => Err(ConfigError::Incomplete(lng_key, lat_key)),
        _ => Ok(None),
    }
}
