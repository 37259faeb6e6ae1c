use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CourierId, OrderId, OrderState, ProductId, StoreId};

use crate::{NewOrder, OrderRecord, Result};

/// Filters for listing the orders of a store.
///
/// All set fields must hold at once. `product_ids` matches orders that
/// contain at least one of the given products.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Only orders currently in this state.
    pub state: Option<OrderState>,
    /// Only orders created at or after this instant.
    pub created_from: Option<DateTime<Utc>>,
    /// Only orders created at or before this instant.
    pub created_to: Option<DateTime<Utc>>,
    /// Only orders containing any of these products.
    pub product_ids: Option<Vec<ProductId>>,
    /// Only orders claimed by this courier.
    pub courier_id: Option<CourierId>,
}

impl OrderFilter {
    /// Creates an empty filter that matches every order of the store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by current state.
    pub fn state(mut self, state: OrderState) -> Self {
        self.state = Some(state);
        self
    }

    /// Filters by creation time, inclusive lower bound.
    pub fn created_from(mut self, from: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self
    }

    /// Filters by creation time, inclusive upper bound.
    pub fn created_to(mut self, to: DateTime<Utc>) -> Self {
        self.created_to = Some(to);
        self
    }

    /// Filters to orders containing any of the given products.
    pub fn product_ids(mut self, ids: Vec<ProductId>) -> Self {
        self.product_ids = Some(ids);
        self
    }

    /// Filters to orders claimed by the given courier.
    pub fn courier_id(mut self, courier_id: CourierId) -> Self {
        self.courier_id = Some(courier_id);
        self
    }
}

/// Core trait for order store implementations.
///
/// An order store persists orders and carries out the two conditional
/// writes the workflow is built on. All implementations must be
/// thread-safe (Send + Sync), and each conditional write must be atomic
/// with respect to concurrent writers of the same order.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Inserts an order with its line items as one unit.
    ///
    /// Assigns the id and timestamps, derives the total from the line
    /// subtotals, and starts the order in `pending_dispatch` with no
    /// courier. Returns the stored record.
    async fn insert(&self, order: NewOrder) -> Result<OrderRecord>;

    /// Retrieves an order with its line items.
    ///
    /// Returns None if no order has this id.
    async fn get(&self, id: OrderId) -> Result<Option<OrderRecord>>;

    /// Lists the orders of a store matching the filter, newest first.
    async fn list(&self, store_id: StoreId, filter: &OrderFilter) -> Result<Vec<OrderRecord>>;

    /// Conditionally moves an order from `expected` to `new_state`.
    ///
    /// The write succeeds only if the row still holds `expected` at the
    /// moment it executes; a concurrent writer that got there first
    /// makes this a no-op. `failure_note`, when given, is written with
    /// the same statement. `updated_at` is refreshed on success.
    ///
    /// Returns the updated record, or None when zero rows matched.
    async fn update_state(
        &self,
        id: OrderId,
        expected: OrderState,
        new_state: OrderState,
        failure_note: Option<&str>,
    ) -> Result<Option<OrderRecord>>;

    /// Conditionally assigns an order to a courier.
    ///
    /// The write succeeds only if the row is still in
    /// `pending_dispatch` with no courier; it then sets the courier and
    /// the `assigned` state in the same statement. Of any number of
    /// concurrent claimers exactly one sees a row; the rest get None.
    ///
    /// Returns the updated record, or None when zero rows matched.
    async fn claim(&self, id: OrderId, courier_id: CourierId) -> Result<Option<OrderRecord>>;
}

/// Extension trait providing convenience methods for order stores.
#[async_trait]
pub trait OrderStoreExt: OrderStore {
    /// Checks whether an order with this id exists.
    async fn exists(&self, id: OrderId) -> Result<bool> {
        Ok(self.get(id).await?.is_some())
    }
}

// Blanket implementation for all OrderStore implementations
impl<T: OrderStore + ?Sized> OrderStoreExt for T {}
