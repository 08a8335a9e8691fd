use tracing::debug;

use super::shopping_list::ShoppingList;
use super::token::{RequestToken, TokenIssuer};
use crate::models::{Product, StoreQuote};

/// Result set of the latest cheapest-store query
#[derive(Debug, Default)]
pub struct CheapestStoreQuery {
    quotes: Vec<StoreQuote>,
    in_flight: Option<RequestToken>,
    tokens: TokenIssuer,
}

impl CheapestStoreQuery {
    /// Start a query for the current list. Returns `None` for an empty list,
    /// in which case nothing is sent and the previous result stays.
    pub fn begin(&mut self, list: &ShoppingList) -> Option<(RequestToken, Vec<Product>)> {
        if list.entries().is_empty() {
            return None;
        }
        let token = self.tokens.issue();
        self.in_flight = Some(token);
        Some((token, list.products()))
    }

    /// Replace the whole result set, in backend order, if `token` is current
    pub fn apply(&mut self, token: RequestToken, quotes: Vec<StoreQuote>) -> bool {
        if self.in_flight != Some(token) {
            debug!("Discarding superseded cheapest-store result ({:?})", token);
            return false;
        }
        self.in_flight = None;
        self.quotes = quotes;
        true
    }

    /// Clear the result set if `token` is current; returns whether it was
    pub fn fail(&mut self, token: RequestToken) -> bool {
        if self.in_flight != Some(token) {
            return false;
        }
        self.in_flight = None;
        self.quotes.clear();
        true
    }

    /// Forget the current result and any query still in flight.
    /// Used whenever the list changes.
    pub fn invalidate(&mut self) {
        self.in_flight = None;
        self.quotes.clear();
    }

    pub fn quotes(&self) -> &[StoreQuote] {
        &self.quotes
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }
}
