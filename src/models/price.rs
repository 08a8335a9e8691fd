//! Price history models

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// A single historical price observation for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(deserialize_with = "deserialize_price_date")]
    pub date: NaiveDate,
    pub price: f64,
}

/// Parse a history date. Accepts `YYYY-MM-DD` or an RFC 3339 timestamp,
/// in which case only the calendar date is kept.
pub fn parse_price_date(raw: &str) -> Result<NaiveDate, chrono::ParseError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
}

fn deserialize_price_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_price_date(&raw).map_err(serde::de::Error::custom)
}
