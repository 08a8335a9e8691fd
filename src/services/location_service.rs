use tracing::debug;

use crate::models::{Coordinates, SelectedStore, StoreQuote};

/// Tracks what the map is centered on
#[derive(Debug)]
pub struct LocationResolver {
    selected: Option<SelectedStore>,
    default_origin: Coordinates,
    device_requested: bool,
}

impl LocationResolver {
    pub fn new(default_origin: Coordinates) -> Self {
        Self {
            selected: None,
            default_origin,
            device_requested: false,
        }
    }

    /// Mark the device location as requested. Returns `false` if it already
    /// was; the device is asked at most once per session.
    pub fn begin_device_request(&mut self) -> bool {
        !std::mem::replace(&mut self.device_requested, true)
    }

    /// Center on the device, unless the user already picked a store
    pub fn apply_device_location(&mut self, location: Coordinates) -> bool {
        if let Some(SelectedStore::Store { label, .. }) = &self.selected {
            debug!("Keeping selected store {} over late device location", label);
            return false;
        }
        self.selected = Some(SelectedStore::Device(location));
        true
    }

    /// Highlight a store. Quotes without a location are ignored.
    pub fn select_store(&mut self, quote: &StoreQuote) -> bool {
        match quote.location() {
            Some(location) => {
                self.selected = Some(SelectedStore::Store {
                    label: quote.store.clone(),
                    location,
                });
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> Option<&SelectedStore> {
        self.selected.as_ref()
    }

    /// Map center: the selection, or the default origin when nothing is set
    pub fn center(&self) -> Coordinates {
        self.selected
            .as_ref()
            .map(SelectedStore::location)
            .unwrap_or(self.default_origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Coordinates {
        Coordinates::new(42.6977, 23.3219)
    }

    #[test]
    fn test_device_requested_once() {
        let mut resolver = LocationResolver::new(origin());
        assert!(resolver.begin_device_request());
        assert!(!resolver.begin_device_request());
    }

    #[test]
    fn test_unset_falls_back_to_default_origin() {
        let resolver = LocationResolver::new(origin());
        assert!(resolver.selected().is_none());
        assert_eq!(resolver.center(), origin());
    }

    #[test]
    fn test_store_selection_replaces_device_location() {
        let mut resolver = LocationResolver::new(origin());
        resolver.apply_device_location(Coordinates::new(42.0, 23.0));
        assert_eq!(resolver.selected().unwrap().label(), None);

        let quote = StoreQuote {
            store: "Lidl Mladost".into(),
            total_price: 12.4,
            lat: Some(42.65),
            lng: Some(23.38),
        };
        assert!(resolver.select_store(&quote));
        assert_eq!(resolver.selected().unwrap().label(), Some("Lidl Mladost"));
        assert_eq!(resolver.center(), Coordinates::new(42.65, 23.38));

        // late device fix does not steal the highlight
        assert!(!resolver.apply_device_location(Coordinates::new(42.0, 23.0)));
    }

    #[test]
    fn test_quote_without_location_is_ignored() {
        let mut resolver = LocationResolver::new(origin());
        let quote = StoreQuote {
            store: "Online".into(),
            total_price: 10.0,
            lat: None,
            lng: None,
        };
        assert!(!resolver.select_store(&quote));
        assert!(resolver.selected().is_none());
    }
}
