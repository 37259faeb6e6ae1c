//! Order service: the workflow facade.

use common::{OrderId, OrderState, ProductId, StoreId};
use serde::{Deserialize, Serialize};
use storage::{
    CustomerInfo, GrantDirectory, NewLineItem, NewOrder, OrderFilter, OrderRecord, OrderStore,
    ProductCatalog,
};

use crate::access::AccessGate;
use crate::actor::Actor;
use crate::error::{DomainError, ValidationError};
use crate::transition::{can_transition, required_side_effects};

/// A line item as the caller asks for it.
///
/// Only the product and the quantity; the name and the price are
/// frozen out of the catalog when the order is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftItem {
    /// The product to order.
    pub product_id: ProductId,
    /// How many.
    pub quantity: u32,
}

/// An order as the caller asks for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    /// Customer contact and delivery details.
    pub customer: CustomerInfo,
    /// The requested lines.
    pub items: Vec<DraftItem>,
}

/// Service for managing orders.
///
/// Ties together the order store, the product catalog, the grant
/// directory, and the transition rules. All collaborators are injected
/// at construction; the service holds no other state, so one instance
/// serves any number of concurrent callers.
pub struct OrderService<S, C, G>
where
    S: OrderStore,
    C: ProductCatalog,
    G: GrantDirectory,
{
    store: S,
    catalog: C,
    gate: AccessGate<G>,
}

impl<S, C, G> OrderService<S, C, G>
where
    S: OrderStore,
    C: ProductCatalog,
    G: GrantDirectory,
{
    /// Creates a new order service with the given collaborators.
    pub fn new(store: S, catalog: C, grants: G) -> Self {
        Self {
            store,
            catalog,
            gate: AccessGate::new(grants),
        }
    }

    /// Creates an order for a store.
    ///
    /// Validates the draft, freezes product names and prices out of
    /// the catalog, and persists the order and its line items as one
    /// unit, starting in `pending_dispatch`.
    #[tracing::instrument(skip(self, draft))]
    pub async fn create(
        &self,
        actor: &Actor,
        store_id: StoreId,
        draft: OrderDraft,
    ) -> Result<OrderRecord, DomainError> {
        self.gate.allow_create(actor, store_id)?;
        validate_customer(&draft.customer)?;
        if draft.items.is_empty() {
            return Err(ValidationError::NoLineItems.into());
        }

        let mut items = Vec::with_capacity(draft.items.len());
        for item in &draft.items {
            if item.quantity == 0 {
                return Err(ValidationError::InvalidQuantity {
                    product_id: item.product_id,
                    quantity: item.quantity,
                }
                .into());
            }

            let product = self
                .catalog
                .get_active_product(item.product_id, store_id)
                .await?
                .ok_or(DomainError::ProductNotFound(item.product_id))?;

            items.push(NewLineItem {
                product_id: product.product_id,
                product_name: product.name,
                quantity: item.quantity,
                unit_price: product.unit_price,
            });
        }

        let record = self
            .store
            .insert(NewOrder {
                store_id,
                customer: draft.customer,
                items,
            })
            .await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(
            order_id = %record.id,
            store_id = %record.store_id,
            total = %record.total,
            "order created"
        );
        Ok(record)
    }

    /// Loads an order by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, actor: &Actor, order_id: OrderId) -> Result<OrderRecord, DomainError> {
        let order = self
            .store
            .get(order_id)
            .await?
            .ok_or(DomainError::OrderNotFound(order_id))?;

        self.gate.allow_read(actor, order.store_id).await?;
        Ok(order)
    }

    /// Changes an order's state through the update path.
    ///
    /// Checks run in a fixed sequence: load, authorize, consult the
    /// transition table, validate the note, then the guarded write
    /// keyed on the state the order was loaded in. A lost write means
    /// someone moved the order in between; nothing is retried.
    #[tracing::instrument(skip(self))]
    pub async fn update_state(
        &self,
        actor: &Actor,
        order_id: OrderId,
        requested: OrderState,
        note: Option<&str>,
    ) -> Result<OrderRecord, DomainError> {
        let order = self
            .store
            .get(order_id)
            .await?
            .ok_or(DomainError::OrderNotFound(order_id))?;

        self.gate.allow_transition(actor, &order, requested).await?;

        if !can_transition(order.state, requested, actor) {
            return Err(DomainError::InvalidTransition {
                current: order.state,
                requested,
            });
        }

        let effects = required_side_effects(order.state, requested, actor);
        let note = note.map(str::trim).filter(|note| !note.is_empty());
        let failure_note = match effects.auto_note {
            Some(auto) => Some(auto),
            None if effects.note_required => {
                Some(note.ok_or(ValidationError::MissingFailureNote)?)
            }
            None => None,
        };

        match self
            .store
            .update_state(order_id, order.state, requested, failure_note)
            .await?
        {
            Some(updated) => {
                metrics::counter!("order_transitions_total").increment(1);
                tracing::info!(
                    order_id = %updated.id,
                    from = %order.state,
                    to = %updated.state,
                    "order state changed"
                );
                Ok(updated)
            }
            None => {
                // The guarded write lost; look again to report the
                // right failure
                if self.store.get(order_id).await?.is_some() {
                    Err(DomainError::Conflict { order_id })
                } else {
                    Err(DomainError::OrderNotFound(order_id))
                }
            }
        }
    }

    /// Claims an order for the calling courier.
    ///
    /// The guarded write is the only arbiter: of any number of
    /// concurrent claimers exactly one wins, and the rest are told the
    /// order was already claimed.
    #[tracing::instrument(skip(self))]
    pub async fn claim(&self, actor: &Actor, order_id: OrderId) -> Result<OrderRecord, DomainError> {
        let courier_id = match actor {
            Actor::Courier(courier_id) => *courier_id,
            _ => return Err(DomainError::Forbidden),
        };

        let order = self
            .store
            .get(order_id)
            .await?
            .ok_or(DomainError::OrderNotFound(order_id))?;

        self.gate.allow_claim(courier_id, order.store_id).await?;

        match self.store.claim(order_id, courier_id).await? {
            Some(claimed) => {
                metrics::counter!("order_claims_won_total").increment(1);
                tracing::info!(
                    order_id = %claimed.id,
                    courier_id = %courier_id,
                    "order claimed"
                );
                Ok(claimed)
            }
            None => {
                metrics::counter!("order_claims_contended_total").increment(1);
                if self.store.get(order_id).await?.is_some() {
                    Err(DomainError::AlreadyClaimed { order_id })
                } else {
                    Err(DomainError::OrderNotFound(order_id))
                }
            }
        }
    }

    /// Lists a store's orders, newest first.
    #[tracing::instrument(skip(self, filter))]
    pub async fn list(
        &self,
        actor: &Actor,
        store_id: StoreId,
        filter: &OrderFilter,
    ) -> Result<Vec<OrderRecord>, DomainError> {
        self.gate.allow_read(actor, store_id).await?;
        Ok(self.store.list(store_id, filter).await?)
    }
}

fn validate_customer(customer: &CustomerInfo) -> Result<(), ValidationError> {
    if customer.name.trim().is_empty() {
        return Err(ValidationError::MissingField("customer name"));
    }
    if customer.phone.trim().is_empty() {
        return Err(ValidationError::MissingField("customer phone"));
    }
    if customer.address.trim().is_empty() {
        return Err(ValidationError::MissingField("customer address"));
    }
    Ok(())
}
