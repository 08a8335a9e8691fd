use std::collections::HashMap;

use tracing::debug;

use crate::models::PricePoint;

use super::token::{RequestToken, TokenIssuer};

/// Outcome of settling a history response against the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// The response was the latest request for its key and was applied
    Applied,
    /// A newer request was issued, or the key was evicted; response dropped
    Stale,
}

/// Per-product price histories, keyed by product id
///
/// Every fetch is registered with [`PriceHistoryCache::begin_fetch`], which
/// records the latest token for that key. A response settles only if it
/// carries that token, so a slow earlier fetch can never overwrite a newer
/// one, and eviction drops whatever is still in flight.
#[derive(Debug, Default)]
pub struct PriceHistoryCache {
    entries: HashMap<String, Vec<PricePoint>>,
    in_flight: HashMap<String, RequestToken>,
    tokens: TokenIssuer,
}

impl PriceHistoryCache {
    /// Register a new fetch for `product_id`, superseding any earlier one
    pub fn begin_fetch(&mut self, product_id: &str) -> RequestToken {
        let token = self.tokens.issue();
        self.in_flight.insert(product_id.to_string(), token);
        token
    }

    fn take_if_current(&mut self, product_id: &str, token: RequestToken) -> bool {
        if self.in_flight.get(product_id) == Some(&token) {
            self.in_flight.remove(product_id);
            true
        } else {
            false
        }
    }

    /// Store a successful response, sorted ascending by date
    pub fn apply(&mut self, product_id: &str, token: RequestToken, mut points: Vec<PricePoint>) -> Settled {
        if !self.take_if_current(product_id, token) {
            debug!("Discarding stale price history for {} ({:?})", product_id, token);
            return Settled::Stale;
        }
        points.sort_by(|a, b| a.date.cmp(&b.date));
        self.entries.insert(product_id.to_string(), points);
        Settled::Applied
    }

    /// Settle a failed fetch. Any previous value stays as it was.
    pub fn fail(&mut self, product_id: &str, token: RequestToken) -> Settled {
        if self.take_if_current(product_id, token) {
            Settled::Applied
        } else {
            Settled::Stale
        }
    }

    /// Drop the entry and forget any in-flight fetch for it
    pub fn evict(&mut self, product_id: &str) -> Option<Vec<PricePoint>> {
        self.in_flight.remove(product_id);
        self.entries.remove(product_id)
    }

    pub fn get(&self, product_id: &str) -> Option<&[PricePoint]> {
        self.entries.get(product_id).map(Vec::as_slice)
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.entries.contains_key(product_id)
    }

    pub fn is_pending(&self, product_id: &str) -> bool {
        self.in_flight.contains_key(product_id)
    }

    pub fn pending_count(&self) -> usize {
        self.in_flight.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn point(date: &str, price: f64) -> PricePoint {
        PricePoint {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            price,
        }
    }

    #[test]
    fn test_applied_history_is_sorted() {
        let mut cache = PriceHistoryCache::default();
        let token = cache.begin_fetch("1");

        let settled = cache.apply("1", token, vec![point("2024-01-02", 1.5), point("2024-01-01", 1.2)]);

        assert_eq!(settled, Settled::Applied);
        let stored = cache.get("1").unwrap();
        let dates: Vec<String> = stored.iter().map(|p| p.date.to_string()).collect();
        let prices: Vec<f64> = stored.iter().map(|p| p.price).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(prices, vec![1.2, 1.5]);
    }

    #[test]
    fn test_later_issued_fetch_wins_when_it_completes_first() {
        let mut cache = PriceHistoryCache::default();
        let first = cache.begin_fetch("1");
        let second = cache.begin_fetch("1");

        assert_eq!(cache.apply("1", second, vec![point("2024-02-01", 2.0)]), Settled::Applied);
        assert_eq!(cache.apply("1", first, vec![point("2024-01-01", 1.0)]), Settled::Stale);

        assert_eq!(cache.get("1").unwrap(), &[point("2024-02-01", 2.0)]);
    }

    #[test]
    fn test_earlier_fetch_completing_first_is_dropped() {
        let mut cache = PriceHistoryCache::default();
        let first = cache.begin_fetch("1");
        let second = cache.begin_fetch("1");

        assert_eq!(cache.apply("1", first, vec![point("2024-01-01", 1.0)]), Settled::Stale);
        assert!(!cache.contains("1"));
        assert!(cache.is_pending("1"));
        assert_eq!(cache.apply("1", second, vec![point("2024-02-01", 2.0)]), Settled::Applied);
        assert!(!cache.is_pending("1"));
    }

    #[test]
    fn test_evicted_key_discards_in_flight_response() {
        let mut cache = PriceHistoryCache::default();
        let token = cache.begin_fetch("1");
        cache.evict("1");

        assert_eq!(cache.apply("1", token, vec![point("2024-01-01", 1.0)]), Settled::Stale);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_failure_keeps_previous_value() {
        let mut cache = PriceHistoryCache::default();
        let token = cache.begin_fetch("1");
        cache.apply("1", token, vec![point("2024-01-01", 1.0)]);

        let refresh = cache.begin_fetch("1");
        assert_eq!(cache.fail("1", refresh), Settled::Applied);
        assert_eq!(cache.get("1").unwrap().len(), 1);
        assert_eq!(cache.fail("1", refresh), Settled::Stale);
    }

    #[test]
    fn test_tokens_are_independent_per_key() {
        let mut cache = PriceHistoryCache::default();
        let milk = cache.begin_fetch("1");
        let _bread = cache.begin_fetch("2");

        assert_eq!(cache.apply("1", milk, vec![point("2024-01-01", 1.0)]), Settled::Applied);
        assert_eq!(cache.pending_count(), 1);
    }
}
