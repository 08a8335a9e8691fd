use std::collections::VecDeque;

use tracing::{info, warn};

use super::catalog_service::ProductCatalog;
use super::chart_service;
use super::cheapest_service::CheapestStoreQuery;
use super::history_cache::{PriceHistoryCache, Settled};
use super::location_service::LocationResolver;
use super::shopping_list::ShoppingList;
use super::token::RequestToken;
use crate::api::ApiError;
use crate::models::{
    ChartDataset, Coordinates, PricePoint, Product, SelectedStore, ShoppingListEntry, StoreQuote,
};
use crate::utils::SessionError;

const MAX_NOTICES: usize = 20;

/// A history fetch the caller must perform
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRequest {
    pub product_id: String,
    pub barcode: String,
    pub token: RequestToken,
}

/// A cheapest-store query the caller must perform
#[derive(Debug, Clone, PartialEq)]
pub struct CheapestRequest {
    pub token: RequestToken,
    pub products: Vec<Product>,
}

/// A reported failure, numbered so views can tell new ones apart
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub seq: u64,
    pub error: SessionError,
}

/// What is still in flight
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pending {
    pub catalog: bool,
    pub histories: usize,
    pub cheapest: bool,
}

/// Immutable view of the state after a mutation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub revision: u64,
    pub catalog: Vec<Product>,
    pub list: Vec<ShoppingListEntry>,
    pub quotes: Vec<StoreQuote>,
    pub chart: ChartDataset,
    pub selected_store: Option<SelectedStore>,
    pub map_center: Option<Coordinates>,
    pub notices: Vec<Notice>,
    pub pending: Pending,
}

/// The whole client state. Mutated only through the named commands below;
/// each command that touches the list or the cache ends with a recompute of
/// the chart dataset.
#[derive(Debug)]
pub struct AppState {
    pub catalog: ProductCatalog,
    pub list: ShoppingList,
    pub history: PriceHistoryCache,
    pub cheapest: CheapestStoreQuery,
    pub location: LocationResolver,
    chart: ChartDataset,
    notices: VecDeque<Notice>,
    notice_seq: u64,
    revision: u64,
}

impl AppState {
    pub fn new(default_origin: Coordinates) -> Self {
        Self {
            catalog: ProductCatalog::default(),
            list: ShoppingList::default(),
            history: PriceHistoryCache::default(),
            cheapest: CheapestStoreQuery::default(),
            location: LocationResolver::new(default_origin),
            chart: ChartDataset::default(),
            notices: VecDeque::new(),
            notice_seq: 0,
            revision: 0,
        }
    }

    #[cfg(test)]
    pub fn chart(&self) -> &ChartDataset {
        &self.chart
    }

    #[cfg(test)]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn recompute(&mut self) {
        self.chart = chart_service::project(&self.list, &self.history);
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn report(&mut self, error: SessionError) {
        warn!("{}", error);
        self.notice_seq += 1;
        self.notices.push_back(Notice {
            seq: self.notice_seq,
            error,
        });
        while self.notices.len() > MAX_NOTICES {
            self.notices.pop_front();
        }
    }

    // ---- catalog ----

    pub fn request_catalog(&mut self) -> RequestToken {
        let token = self.catalog.begin_load();
        self.touch();
        token
    }

    pub fn set_catalog(&mut self, token: RequestToken, result: Result<Vec<Product>, ApiError>) {
        match result {
            Ok(products) => {
                let count = products.len();
                if self.catalog.apply(token, products) {
                    info!("Catalog loaded: {} products", count);
                }
            }
            Err(e) => {
                if self.catalog.fail(token) {
                    self.report(SessionError::CatalogLoadFailed(e));
                }
            }
        }
        self.touch();
    }

    // ---- shopping list ----

    /// Append a product; a list change clears the cheapest-store result
    pub fn add_product(&mut self, product: Product) -> bool {
        if !self.list.add(product) {
            return false;
        }
        self.cheapest.invalidate();
        self.recompute();
        self.touch();
        true
    }

    /// Remove a product together with its cache entry
    pub fn remove_product(&mut self, product_id: &str) -> Option<ShoppingListEntry> {
        let entry = self.list.remove(product_id)?;
        self.history.evict(product_id);
        self.cheapest.invalidate();
        self.recompute();
        self.touch();
        Some(entry)
    }

    /// Flip the chart flag. Turning it on returns the fetch to issue;
    /// turning it off evicts the cached history.
    pub fn toggle_chart(&mut self, product_id: &str) -> Result<Option<HistoryRequest>, String> {
        let enabled = self
            .list
            .get(product_id)
            .map(|e| !e.chart_enabled)
            .ok_or_else(|| format!("❌ '{}' is not on the list", product_id))?;
        self.list.set_chart_enabled(product_id, enabled);

        if enabled {
            let request = self.request_history(product_id)?;
            Ok(Some(request))
        } else {
            self.history.evict(product_id);
            self.recompute();
            self.touch();
            Ok(None)
        }
    }

    /// Issue a history fetch for a listed product
    pub fn request_history(&mut self, product_id: &str) -> Result<HistoryRequest, String> {
        let barcode = self
            .list
            .get(product_id)
            .map(|e| e.product.barcode.clone())
            .ok_or_else(|| format!("❌ '{}' is not on the list", product_id))?;
        let token = self.history.begin_fetch(product_id);
        self.touch();
        Ok(HistoryRequest {
            product_id: product_id.to_string(),
            barcode,
            token,
        })
    }

    pub fn set_history(
        &mut self,
        product_id: &str,
        token: RequestToken,
        result: Result<Vec<PricePoint>, ApiError>,
    ) {
        let settled = match result {
            Ok(points) => self.history.apply(product_id, token, points),
            Err(e) => {
                let settled = self.history.fail(product_id, token);
                if settled == Settled::Applied {
                    let product = self
                        .list
                        .get(product_id)
                        .map(|entry| entry.product.name.clone())
                        .unwrap_or_else(|| product_id.to_string());
                    self.report(SessionError::HistoryFetchFailed { product, source: e });
                }
                settled
            }
        };
        if settled == Settled::Applied {
            self.recompute();
        }
        self.touch();
    }

    // ---- cheapest store ----

    /// Start a cheapest-store query; `None` when the list is empty
    pub fn request_cheapest(&mut self) -> Option<CheapestRequest> {
        let (token, products) = self.cheapest.begin(&self.list)?;
        self.touch();
        Some(CheapestRequest { token, products })
    }

    pub fn set_quotes(&mut self, token: RequestToken, result: Result<Vec<StoreQuote>, ApiError>) {
        match result {
            Ok(quotes) => {
                let count = quotes.len();
                if self.cheapest.apply(token, quotes) {
                    info!("Cheapest-store query returned {} stores", count);
                }
            }
            Err(e) => {
                if self.cheapest.fail(token) {
                    self.report(SessionError::CheapestQueryFailed(e));
                }
            }
        }
        self.touch();
    }

    // ---- location ----

    pub fn request_device_location(&mut self) -> bool {
        self.location.begin_device_request()
    }

    pub fn set_location(&mut self, result: Result<Coordinates, ApiError>) {
        match result {
            Ok(coordinates) => {
                if self.location.apply_device_location(coordinates) {
                    info!(
                        "Device location: {:.4}, {:.4}",
                        coordinates.latitude, coordinates.longitude
                    );
                }
            }
            Err(e) => self.report(SessionError::GeolocationUnavailable(e)),
        }
        self.touch();
    }

    /// Highlight the quote at `index` (0-based) on the map
    pub fn select_store(&mut self, index: usize) -> Result<&SelectedStore, String> {
        let quote = self
            .cheapest
            .quotes()
            .get(index)
            .cloned()
            .ok_or_else(|| format!("❌ There is no store #{}", index + 1))?;
        if !self.location.select_store(&quote) {
            return Err(format!("❌ {} has no location to show", quote.store));
        }
        self.touch();
        self.location
            .selected()
            .ok_or_else(|| "❌ No store selected".to_string())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            revision: self.revision,
            catalog: self.catalog.products().to_vec(),
            list: self.list.entries().to_vec(),
            quotes: self.cheapest.quotes().to_vec(),
            chart: self.chart.clone(),
            selected_store: self.location.selected().cloned(),
            map_center: Some(self.location.center()),
            notices: self.notices.iter().cloned().collect(),
            pending: Pending {
                catalog: self.catalog.is_loading(),
                histories: self.history.pending_count(),
                cheapest: self.cheapest.is_pending(),
            },
        }
    }
}
