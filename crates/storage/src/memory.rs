use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use common::{CourierId, OrderId, OrderState, StoreId};
use tokio::sync::RwLock;

use crate::{
    NewOrder, OrderRecord, Result,
    order::LineItem,
    store::{OrderFilter, OrderStore},
};

/// In-memory order store implementation for testing.
///
/// This implementation keeps all orders behind one lock and provides
/// the same interface as the PostgreSQL implementation. The write
/// section of each conditional update stands in for the row-scoped
/// atomicity of a guarded SQL UPDATE.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    orders: HashMap<OrderId, OrderRecord>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.inner.read().await.orders.len()
    }

    /// Clears all orders.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.orders.clear();
        inner.next_id = 0;
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: NewOrder) -> Result<OrderRecord> {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;

        let now = Utc::now();
        let total = order.total();
        let items = order
            .items
            .into_iter()
            .map(|item| {
                let subtotal = item.subtotal();
                LineItem {
                    product_id: item.product_id,
                    product_name: item.product_name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    subtotal,
                }
            })
            .collect();

        let record = OrderRecord {
            id: OrderId::new(inner.next_id),
            store_id: order.store_id,
            courier_id: None,
            customer: order.customer,
            state: OrderState::PendingDispatch,
            total,
            failure_note: None,
            created_at: now,
            updated_at: now,
            items,
        };

        inner.orders.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: OrderId) -> Result<Option<OrderRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.orders.get(&id).cloned())
    }

    async fn list(&self, store_id: StoreId, filter: &OrderFilter) -> Result<Vec<OrderRecord>> {
        let inner = self.inner.read().await;
        let mut orders: Vec<_> = inner
            .orders
            .values()
            .filter(|order| {
                if order.store_id != store_id {
                    return false;
                }
                if let Some(state) = filter.state
                    && order.state != state
                {
                    return false;
                }
                if let Some(from) = filter.created_from
                    && order.created_at < from
                {
                    return false;
                }
                if let Some(to) = filter.created_to
                    && order.created_at > to
                {
                    return false;
                }
                if let Some(ref ids) = filter.product_ids
                    && !order.items.iter().any(|item| ids.contains(&item.product_id))
                {
                    return false;
                }
                if let Some(courier_id) = filter.courier_id
                    && order.courier_id != Some(courier_id)
                {
                    return false;
                }
                true
            })
            .cloned()
            .collect();

        // Newest first; ids break same-instant ties
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.id.as_i64().cmp(&a.id.as_i64()))
        });
        Ok(orders)
    }

    async fn update_state(
        &self,
        id: OrderId,
        expected: OrderState,
        new_state: OrderState,
        failure_note: Option<&str>,
    ) -> Result<Option<OrderRecord>> {
        let mut inner = self.inner.write().await;
        let order = match inner.orders.get_mut(&id) {
            Some(order) => order,
            None => return Ok(None),
        };

        // Guard clause of the conditional update
        if order.state != expected {
            return Ok(None);
        }

        order.state = new_state;
        if let Some(note) = failure_note {
            order.failure_note = Some(note.to_string());
        }
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }

    async fn claim(&self, id: OrderId, courier_id: CourierId) -> Result<Option<OrderRecord>> {
        let mut inner = self.inner.write().await;
        let order = match inner.orders.get_mut(&id) {
            Some(order) => order,
            None => return Ok(None),
        };

        // Guard clause of the conditional update
        if order.state != OrderState::PendingDispatch || order.courier_id.is_some() {
            return Ok(None);
        }

        order.courier_id = Some(courier_id);
        order.state = OrderState::Assigned;
        order.updated_at = Utc::now();
        Ok(Some(order.clone()))
    }
}
