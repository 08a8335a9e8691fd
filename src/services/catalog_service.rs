use crate::models::Product;

use super::token::{RequestToken, TokenIssuer};

/// The selectable product catalog and its pending load, if any
#[derive(Debug, Default)]
pub struct ProductCatalog {
    products: Vec<Product>,
    in_flight: Option<RequestToken>,
    tokens: TokenIssuer,
}

impl ProductCatalog {
    /// Start a (re)load. Supersedes any load still in flight.
    pub fn begin_load(&mut self) -> RequestToken {
        let token = self.tokens.issue();
        self.in_flight = Some(token);
        token
    }

    /// Install a loaded catalog if `token` is the latest load
    pub fn apply(&mut self, token: RequestToken, products: Vec<Product>) -> bool {
        if self.in_flight != Some(token) {
            return false;
        }
        self.in_flight = None;
        self.products = products;
        true
    }

    /// Settle a failed load. The current products are kept as they were.
    /// Returns whether the failure belongs to the latest load.
    pub fn fail(&mut self, token: RequestToken) -> bool {
        if self.in_flight != Some(token) {
            return false;
        }
        self.in_flight = None;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn find_by_barcode(&self, barcode: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.barcode == barcode)
    }

    /// Case-insensitive exact name match
    pub fn find_by_name(&self, name: &str) -> Option<&Product> {
        self.products
            .iter()
            .find(|p| p.name.to_lowercase() == name.to_lowercase())
    }

    /// Products whose name contains `query`, case-insensitive, in catalog order
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<&Product> {
        let query = query.trim().to_lowercase();
        self.products
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&query))
            .take(limit)
            .collect()
    }

    /// Resolve user input to one product: id, barcode, exact name, then a
    /// unique partial-name match
    pub fn resolve(&self, query: &str) -> Result<&Product, String> {
        let query = query.trim();
        if query.is_empty() {
            return Err("❌ Please name a product".to_string());
        }

        if let Some(product) = self
            .find_by_id(query)
            .or_else(|| self.find_by_barcode(query))
            .or_else(|| self.find_by_name(query))
        {
            return Ok(product);
        }

        match self.suggest(query, 6).as_slice() {
            [] if self.products.is_empty() => Err("❌ The product catalog is not loaded".to_string()),
            [] => Err(format!("❌ No product matches '{}'", query)),
            [only] => Ok(*only),
            many => {
                let names: Vec<&str> = many.iter().map(|p| p.name.as_str()).collect();
                Err(format!("❌ '{}' is ambiguous: {}", query, names.join(", ")))
            }
        }
    }
}
