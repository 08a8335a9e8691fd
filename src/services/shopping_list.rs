use crate::models::{Product, ShoppingListEntry};

/// Ordered list of chosen products, unique by product id
#[derive(Debug, Clone, Default)]
pub struct ShoppingList {
    entries: Vec<ShoppingListEntry>,
}

impl ShoppingList {
    /// Append `product` unless its id is already listed.
    /// Returns whether the list changed.
    pub fn add(&mut self, product: Product) -> bool {
        if self.contains(&product.id) {
            return false;
        }
        self.entries.push(ShoppingListEntry::new(product));
        true
    }

    /// Remove the entry with this product id
    pub fn remove(&mut self, product_id: &str) -> Option<ShoppingListEntry> {
        let index = self.entries.iter().position(|e| e.product.id == product_id)?;
        Some(self.entries.remove(index))
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.get(product_id).is_some()
    }

    pub fn get(&self, product_id: &str) -> Option<&ShoppingListEntry> {
        self.entries.iter().find(|e| e.product.id == product_id)
    }

    /// Set the chart flag; returns the previous value, `None` if not listed
    pub fn set_chart_enabled(&mut self, product_id: &str, enabled: bool) -> Option<bool> {
        let entry = self.entries.iter_mut().find(|e| e.product.id == product_id)?;
        Some(std::mem::replace(&mut entry.chart_enabled, enabled))
    }

    /// Find an entry by id, barcode, 1-based position, or case-insensitive name
    pub fn resolve(&self, query: &str) -> Option<&ShoppingListEntry> {
        let query = query.trim();
        self.entries
            .iter()
            .find(|e| e.product.id == query || e.product.barcode == query)
            .or_else(|| {
                query
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| self.entries.get(i))
            })
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|e| e.product.name.to_lowercase() == query.to_lowercase())
            })
    }

    pub fn entries(&self) -> &[ShoppingListEntry] {
        &self.entries
    }

    /// Products in list order, as sent to the cheapest-store query
    pub fn products(&self) -> Vec<Product> {
        self.entries.iter().map(|e| e.product.clone()).collect()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
