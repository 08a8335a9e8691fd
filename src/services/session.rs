use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use super::state::{AppState, CheapestRequest, HistoryRequest, Snapshot};
use super::token::RequestToken;
use crate::api::{ApiError, GeoLocator, PriceBackend};
use crate::models::{Coordinates, PricePoint, Product, StoreQuote};
use crate::utils::{with_retry, RetryPolicy};

/// A user action
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// (Re)load the product catalog
    LoadCatalog,
    /// Add a catalog product by id, barcode or name
    AddProduct(String),
    /// Remove a listed product by id, barcode, position or name
    RemoveProduct(String),
    /// Turn a listed product's price chart on or off
    ToggleChart(String),
    /// Re-fetch the history of a charted product
    RefreshHistory(String),
    /// Compare the list across stores
    FindCheapest,
    /// Highlight a store (1-based position in the results) on the map
    SelectStore(usize),
}

/// A finished asynchronous call, delivered back to the session
#[derive(Debug)]
pub enum Completion {
    Catalog {
        token: RequestToken,
        result: Result<Vec<Product>, ApiError>,
    },
    History {
        product_id: String,
        token: RequestToken,
        result: Result<Vec<PricePoint>, ApiError>,
    },
    Cheapest {
        token: RequestToken,
        result: Result<Vec<StoreQuote>, ApiError>,
    },
    Location(Result<Coordinates, ApiError>),
}

/// Receiving end for completions; drained by the event loop
pub type Completions = mpsc::UnboundedReceiver<Completion>;

/// Owns the application state. Fetches run as spawned tasks and report back
/// through the completion channel; the event loop hands each completion to
/// [`Session::apply`], so state is only ever mutated from one place.
pub struct Session {
    state: AppState,
    backend: Arc<dyn PriceBackend>,
    locator: Arc<dyn GeoLocator>,
    policy: RetryPolicy,
    completions: mpsc::UnboundedSender<Completion>,
    snapshots: watch::Sender<Snapshot>,
}

impl Session {
    pub fn new(
        backend: Arc<dyn PriceBackend>,
        locator: Arc<dyn GeoLocator>,
        policy: RetryPolicy,
        default_origin: Coordinates,
    ) -> (Self, Completions) {
        let state = AppState::new(default_origin);
        let (completions, receiver) = mpsc::unbounded_channel();
        let (snapshots, _) = watch::channel(state.snapshot());
        let session = Self {
            state,
            backend,
            locator,
            policy,
            completions,
            snapshots,
        };
        (session, receiver)
    }

    /// Observe a new snapshot after every mutation
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.snapshots.subscribe()
    }

    #[cfg(test)]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Session start: load the catalog and ask for the device location once
    pub fn start(&mut self) {
        info!("Starting session");
        self.spawn_catalog();
        if self.state.request_device_location() {
            self.spawn_location();
        }
        self.publish();
    }

    /// Run a user command. Mutations happen before this returns; any fetch
    /// it triggers completes later through [`Session::apply`].
    pub fn execute(&mut self, command: Command) -> Result<String, String> {
        debug!("Executing {:?}", command);
        let outcome = self.run(command);
        self.publish();
        outcome
    }

    fn run(&mut self, command: Command) -> Result<String, String> {
        match command {
            Command::LoadCatalog => {
                self.spawn_catalog();
                Ok("⏳ Loading product catalog...".to_string())
            }
            Command::AddProduct(query) => {
                let product = self.state.catalog.resolve(&query)?.clone();
                let name = product.name.clone();
                if self.state.add_product(product) {
                    Ok(format!("✅ Added {}", name))
                } else {
                    Ok(format!("{} is already on the list", name))
                }
            }
            Command::RemoveProduct(query) => {
                let id = self.listed_id(&query)?;
                let entry = self
                    .state
                    .remove_product(&id)
                    .ok_or_else(|| format!("❌ '{}' is not on the list", query))?;
                Ok(format!("🗑️ Removed {}", entry.product.name))
            }
            Command::ToggleChart(query) => {
                let id = self.listed_id(&query)?;
                match self.state.toggle_chart(&id)? {
                    Some(request) => {
                        self.spawn_history(request);
                        Ok("📈 Chart on, loading price history...".to_string())
                    }
                    None => Ok("Chart off".to_string()),
                }
            }
            Command::RefreshHistory(query) => {
                let id = self.listed_id(&query)?;
                let charted = self
                    .state
                    .list
                    .get(&id)
                    .map(|e| e.chart_enabled)
                    .unwrap_or(false);
                if !charted {
                    return Err("❌ Turn the chart on first with `chart <product>`".to_string());
                }
                let request = self.state.request_history(&id)?;
                self.spawn_history(request);
                Ok("⏳ Refreshing price history...".to_string())
            }
            Command::FindCheapest => match self.state.request_cheapest() {
                Some(request) => {
                    self.spawn_cheapest(request);
                    Ok("⏳ Comparing stores...".to_string())
                }
                None => Err("❌ The shopping list is empty".to_string()),
            },
            Command::SelectStore(position) => {
                let index = position
                    .checked_sub(1)
                    .ok_or_else(|| "❌ Store numbers start at 1".to_string())?;
                let selected = self.state.select_store(index)?;
                let center = selected.location();
                Ok(format!(
                    "📍 Map centered on {} ({:.4}, {:.4})",
                    selected.label().unwrap_or("device"),
                    center.latitude,
                    center.longitude
                ))
            }
        }
    }

    fn listed_id(&self, query: &str) -> Result<String, String> {
        self.state
            .list
            .resolve(query)
            .map(|e| e.product.id.clone())
            .ok_or_else(|| format!("❌ '{}' is not on the list", query.trim()))
    }

    /// Apply a finished call to the state and publish the result
    pub fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Catalog { token, result } => self.state.set_catalog(token, result),
            Completion::History {
                product_id,
                token,
                result,
            } => self.state.set_history(&product_id, token, result),
            Completion::Cheapest { token, result } => self.state.set_quotes(token, result),
            Completion::Location(result) => self.state.set_location(result),
        }
        self.publish();
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.state.snapshot());
    }

    fn spawn_catalog(&mut self) {
        let token = self.state.request_catalog();
        let backend = Arc::clone(&self.backend);
        let tx = self.completions.clone();
        let policy = self.policy;
        tokio::spawn(async move {
            let result = with_retry("catalog", policy, || backend.load_catalog()).await;
            let _ = tx.send(Completion::Catalog { token, result });
        });
    }

    fn spawn_history(&self, request: HistoryRequest) {
        let backend = Arc::clone(&self.backend);
        let tx = self.completions.clone();
        let policy = self.policy;
        tokio::spawn(async move {
            let HistoryRequest {
                product_id,
                barcode,
                token,
            } = request;
            let result = with_retry("history", policy, || backend.fetch_history(&barcode)).await;
            let _ = tx.send(Completion::History {
                product_id,
                token,
                result,
            });
        });
    }

    fn spawn_cheapest(&self, request: CheapestRequest) {
        let backend = Arc::clone(&self.backend);
        let tx = self.completions.clone();
        let policy = self.policy;
        tokio::spawn(async move {
            let CheapestRequest { token, products } = request;
            let result = with_retry("cheapest", policy, || backend.cheapest(&products)).await;
            let _ = tx.send(Completion::Cheapest { token, result });
        });
    }

    fn spawn_location(&self) {
        let locator = Arc::clone(&self.locator);
        let tx = self.completions.clone();
        let policy = self.policy;
        tokio::spawn(async move {
            let result = with_retry("geolocation", policy, || locator.locate()).await;
            let _ = tx.send(Completion::Location(result));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DisabledLocator;
    use crate::api::FixedLocator;
    use crate::utils::SessionError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory backend; cheapest replies are queued per call
    struct FakeBackend {
        catalog: Vec<Product>,
        cheapest_replies: Mutex<Vec<Result<Vec<StoreQuote>, ApiError>>>,
        cheapest_calls: AtomicUsize,
    }

    impl FakeBackend {
        fn new(cheapest_replies: Vec<Result<Vec<StoreQuote>, ApiError>>) -> Self {
            Self {
                catalog: vec![
                    Product {
                        id: "1".into(),
                        name: "Milk".into(),
                        barcode: "111".into(),
                    },
                    Product {
                        id: "2".into(),
                        name: "Bread".into(),
                        barcode: "222".into(),
                    },
                ],
                cheapest_replies: Mutex::new(cheapest_replies),
                cheapest_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PriceBackend for FakeBackend {
        async fn load_catalog(&self) -> Result<Vec<Product>, ApiError> {
            Ok(self.catalog.clone())
        }

        async fn fetch_history(&self, barcode: &str) -> Result<Vec<PricePoint>, ApiError> {
            match barcode {
                "111" => Ok(vec![
                    PricePoint {
                        date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                        price: 1.5,
                    },
                    PricePoint {
                        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                        price: 1.2,
                    },
                ]),
                _ => Err(ApiError::NotFound(format!("no history for {}", barcode))),
            }
        }

        async fn cheapest(&self, _products: &[Product]) -> Result<Vec<StoreQuote>, ApiError> {
            self.cheapest_calls.fetch_add(1, Ordering::SeqCst);
            self.cheapest_replies.lock().unwrap().remove(0)
        }
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::new(Duration::from_secs(2), 0)
    }

    fn origin() -> Coordinates {
        Coordinates::new(42.6977, 23.3219)
    }

    fn lidl() -> StoreQuote {
        StoreQuote {
            store: "Lidl".into(),
            total_price: 4.2,
            lat: Some(42.66),
            lng: Some(23.31),
        }
    }

    async fn drain(session: &mut Session, completions: &mut Completions, count: usize) {
        for _ in 0..count {
            let completion = completions.recv().await.expect("completion channel closed");
            session.apply(completion);
        }
    }

    async fn started(backend: Arc<FakeBackend>) -> (Session, Completions) {
        let (mut session, mut completions) = Session::new(
            backend,
            Arc::new(FixedLocator::new(Coordinates::new(42.0, 23.0))),
            policy(),
            origin(),
        );
        session.start();
        drain(&mut session, &mut completions, 2).await;
        (session, completions)
    }

    #[tokio::test]
    async fn test_start_loads_catalog_and_device_location() {
        let (session, _completions) = started(Arc::new(FakeBackend::new(vec![]))).await;
        let snapshot = session.snapshot();

        assert_eq!(snapshot.catalog.len(), 2);
        assert_eq!(snapshot.map_center, Some(Coordinates::new(42.0, 23.0)));
        assert_eq!(snapshot.selected_store.unwrap().label(), None);
    }

    #[tokio::test]
    async fn test_geolocation_failure_uses_default_origin() {
        let (mut session, mut completions) = Session::new(
            Arc::new(FakeBackend::new(vec![])),
            Arc::new(DisabledLocator),
            policy(),
            origin(),
        );
        session.start();
        drain(&mut session, &mut completions, 2).await;

        let snapshot = session.snapshot();
        assert!(snapshot.selected_store.is_none());
        assert_eq!(snapshot.map_center, Some(origin()));
        assert!(snapshot
            .notices
            .iter()
            .any(|n| matches!(n.error, SessionError::GeolocationUnavailable(_))));
    }

    #[tokio::test]
    async fn test_chart_toggle_fetches_sorted_history() {
        let (mut session, mut completions) = started(Arc::new(FakeBackend::new(vec![]))).await;
        session.execute(Command::AddProduct("milk".into())).unwrap();
        session.execute(Command::ToggleChart("milk".into())).unwrap();
        drain(&mut session, &mut completions, 1).await;

        let chart = session.snapshot().chart;
        let labels: Vec<String> = chart.labels.iter().map(|d| d.to_string()).collect();
        assert_eq!(labels, vec!["2024-01-01", "2024-01-02"]);
        assert_eq!(chart.series[0].values, vec![Some(1.2), Some(1.5)]);
    }

    #[tokio::test]
    async fn test_add_add_remove_through_commands() {
        let (mut session, mut completions) = started(Arc::new(FakeBackend::new(vec![]))).await;
        session.execute(Command::AddProduct("1".into())).unwrap();
        session.execute(Command::AddProduct("2".into())).unwrap();
        session.execute(Command::ToggleChart("1".into())).unwrap();
        drain(&mut session, &mut completions, 1).await;

        session.execute(Command::RemoveProduct("1".into())).unwrap();

        let snapshot = session.snapshot();
        let ids: Vec<&str> = snapshot.list.iter().map(|e| e.product.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
        assert!(!session.state().history.contains("1"));
        assert!(snapshot.chart.is_empty());
    }

    #[tokio::test]
    async fn test_cheapest_on_empty_list_sends_nothing() {
        let backend = Arc::new(FakeBackend::new(vec![]));
        let (mut session, _completions) = started(Arc::clone(&backend)).await;

        assert!(session.execute(Command::FindCheapest).is_err());
        assert_eq!(backend.cheapest_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cheapest_failure_clears_previous_result() {
        let backend = Arc::new(FakeBackend::new(vec![
            Ok(vec![lidl()]),
            Err(ApiError::ServerError(500, "boom".into())),
        ]));
        let (mut session, mut completions) = started(Arc::clone(&backend)).await;
        session.execute(Command::AddProduct("Bread".into())).unwrap();

        session.execute(Command::FindCheapest).unwrap();
        drain(&mut session, &mut completions, 1).await;
        assert_eq!(session.snapshot().quotes, vec![lidl()]);

        let message = session.execute(Command::SelectStore(1)).unwrap();
        assert!(message.contains("Lidl"));

        session.execute(Command::FindCheapest).unwrap();
        drain(&mut session, &mut completions, 1).await;
        assert!(session.snapshot().quotes.is_empty());
        assert_eq!(backend.cheapest_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_snapshots_are_published() {
        let (mut session, _completions) = started(Arc::new(FakeBackend::new(vec![]))).await;
        let mut snapshots = session.subscribe();
        let before = snapshots.borrow_and_update().revision;

        session.execute(Command::AddProduct("Milk".into())).unwrap();

        assert!(snapshots.has_changed().unwrap());
        let snapshot = snapshots.borrow_and_update().clone();
        assert!(snapshot.revision > before);
        assert_eq!(snapshot.list.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_requires_chart() {
        let (mut session, _completions) = started(Arc::new(FakeBackend::new(vec![]))).await;
        session.execute(Command::AddProduct("Milk".into())).unwrap();
        assert!(session.execute(Command::RefreshHistory("Milk".into())).is_err());
        assert!(session.execute(Command::RemoveProduct("Eggs".into())).is_err());
    }
}
