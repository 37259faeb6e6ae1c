//! Product catalog collaborator.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{Money, ProductId, StoreId};

use crate::Result;

/// A product as order creation sees it: active and owned by the store.
///
/// The name and unit price returned here are what gets frozen into the
/// order's line items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveProduct {
    /// The product id.
    pub product_id: ProductId,
    /// Current display name.
    pub name: String,
    /// Current unit price.
    pub unit_price: Money,
}

/// Trait for catalog lookups during order creation.
///
/// Catalog management (creating products, editing prices, toggling
/// availability) lives elsewhere; the order workflow only reads.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Looks up a product that is active and belongs to the store.
    ///
    /// Returns None for unknown products, inactive products, and
    /// products of other stores alike.
    async fn get_active_product(
        &self,
        product_id: ProductId,
        store_id: StoreId,
    ) -> Result<Option<ActiveProduct>>;
}

#[derive(Debug, Clone)]
struct CatalogEntry {
    store_id: StoreId,
    name: String,
    unit_price: Money,
    active: bool,
}

/// In-memory product catalog for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    state: Arc<RwLock<HashMap<ProductId, CatalogEntry>>>,
}

impl InMemoryProductCatalog {
    /// Creates a new empty in-memory catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an active product of a store.
    pub fn put_product(
        &self,
        store_id: StoreId,
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Money,
    ) {
        self.state.write().unwrap().insert(
            product_id,
            CatalogEntry {
                store_id,
                name: name.into(),
                unit_price,
                active: true,
            },
        );
    }

    /// Changes the price of an existing product.
    pub fn set_price(&self, product_id: ProductId, unit_price: Money) {
        if let Some(entry) = self.state.write().unwrap().get_mut(&product_id) {
            entry.unit_price = unit_price;
        }
    }

    /// Makes a product unavailable for new orders.
    pub fn deactivate(&self, product_id: ProductId) {
        if let Some(entry) = self.state.write().unwrap().get_mut(&product_id) {
            entry.active = false;
        }
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn get_active_product(
        &self,
        product_id: ProductId,
        store_id: StoreId,
    ) -> Result<Option<ActiveProduct>> {
        let state = self.state.read().unwrap();
        let found = state
            .get(&product_id)
            .filter(|entry| entry.active && entry.store_id == store_id)
            .map(|entry| ActiveProduct {
                product_id,
                name: entry.name.clone(),
                unit_price: entry.unit_price,
            });
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_returns_active_product() {
        let catalog = InMemoryProductCatalog::new();
        catalog.put_product(
            StoreId::new(1),
            ProductId::new(10),
            "Empanada",
            Money::from_cents(450),
        );

        let found = catalog
            .get_active_product(ProductId::new(10), StoreId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.name, "Empanada");
        assert_eq!(found.unit_price, Money::from_cents(450));
    }

    #[tokio::test]
    async fn test_lookup_hides_inactive_product() {
        let catalog = InMemoryProductCatalog::new();
        catalog.put_product(
            StoreId::new(1),
            ProductId::new(10),
            "Empanada",
            Money::from_cents(450),
        );
        catalog.deactivate(ProductId::new(10));

        let found = catalog
            .get_active_product(ProductId::new(10), StoreId::new(1))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_lookup_hides_other_stores_product() {
        let catalog = InMemoryProductCatalog::new();
        catalog.put_product(
            StoreId::new(1),
            ProductId::new(10),
            "Empanada",
            Money::from_cents(450),
        );

        let found = catalog
            .get_active_product(ProductId::new(10), StoreId::new(2))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_set_price_changes_future_lookups() {
        let catalog = InMemoryProductCatalog::new();
        catalog.put_product(
            StoreId::new(1),
            ProductId::new(10),
            "Empanada",
            Money::from_cents(450),
        );
        catalog.set_price(ProductId::new(10), Money::from_cents(500));

        let found = catalog
            .get_active_product(ProductId::new(10), StoreId::new(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.unit_price, Money::from_cents(500));
    }
}
