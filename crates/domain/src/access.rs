//! Role-based authorization for order operations.

use common::{CourierId, OrderState, StoreId};
use storage::{GrantDirectory, OrderRecord};

use crate::actor::Actor;
use crate::error::DomainError;

/// Decides whether an actor may perform an order operation.
///
/// Store accounts act only on their own store. Couriers need a
/// standing grant from the order's store, and may resolve an assigned
/// order only if it is assigned to them. Admins stay out of the
/// workflow but may read any store. Every denial is the same
/// detail-free [`DomainError::Forbidden`].
pub struct AccessGate<G: GrantDirectory> {
    grants: G,
}

impl<G: GrantDirectory> AccessGate<G> {
    /// Creates a gate backed by the given grant directory.
    pub fn new(grants: G) -> Self {
        Self { grants }
    }

    /// May the actor create orders for this store?
    pub fn allow_create(&self, actor: &Actor, store_id: StoreId) -> Result<(), DomainError> {
        match actor {
            Actor::Store(own) if *own == store_id => Ok(()),
            _ => Err(DomainError::Forbidden),
        }
    }

    /// May the actor read this store's orders?
    pub async fn allow_read(&self, actor: &Actor, store_id: StoreId) -> Result<(), DomainError> {
        match actor {
            Actor::Store(own) if *own == store_id => Ok(()),
            Actor::Store(_) => Err(DomainError::Forbidden),
            Actor::Courier(courier_id) => {
                if self.grants.has_grant(*courier_id, store_id).await? {
                    Ok(())
                } else {
                    Err(DomainError::Forbidden)
                }
            }
            Actor::Admin => Ok(()),
        }
    }

    /// May the actor drive this order to `requested`?
    ///
    /// This is the ownership and grant layer only; whether the
    /// lifecycle graph has the edge is the transition table's business.
    pub async fn allow_transition(
        &self,
        actor: &Actor,
        order: &OrderRecord,
        requested: OrderState,
    ) -> Result<(), DomainError> {
        match actor {
            Actor::Store(own) if *own == order.store_id => Ok(()),
            Actor::Store(_) => Err(DomainError::Forbidden),
            Actor::Courier(courier_id) => {
                if !self.grants.has_grant(*courier_id, order.store_id).await? {
                    return Err(DomainError::Forbidden);
                }
                // Resolving an assigned order is for its courier only
                if order.state == OrderState::Assigned
                    && requested.is_terminal()
                    && order.courier_id != Some(*courier_id)
                {
                    return Err(DomainError::Forbidden);
                }
                Ok(())
            }
            Actor::Admin => Err(DomainError::Forbidden),
        }
    }

    /// May the courier claim orders of this store?
    pub async fn allow_claim(
        &self,
        courier_id: CourierId,
        store_id: StoreId,
    ) -> Result<(), DomainError> {
        if self.grants.has_grant(courier_id, store_id).await? {
            Ok(())
        } else {
            Err(DomainError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use common::{Money, OrderId};
    use storage::{CustomerInfo, InMemoryGrantDirectory};

    use super::*;

    fn order(store_id: StoreId, state: OrderState, courier_id: Option<CourierId>) -> OrderRecord {
        let now = Utc::now();
        OrderRecord {
            id: OrderId::new(1),
            store_id,
            courier_id,
            customer: CustomerInfo::new("Ana", "555-0101", "Calle 12 #3"),
            state,
            total: Money::from_cents(900),
            failure_note: None,
            created_at: now,
            updated_at: now,
            items: vec![],
        }
    }

    fn gate_with_grant(courier_id: CourierId, store_id: StoreId) -> AccessGate<InMemoryGrantDirectory> {
        let grants = InMemoryGrantDirectory::new();
        grants.grant(courier_id, store_id);
        AccessGate::new(grants)
    }

    #[test]
    fn only_the_owning_store_creates() {
        let gate = AccessGate::new(InMemoryGrantDirectory::new());
        let store_id = StoreId::new(1);

        assert!(gate.allow_create(&Actor::Store(store_id), store_id).is_ok());
        assert!(
            gate.allow_create(&Actor::Store(StoreId::new(2)), store_id)
                .is_err()
        );
        assert!(
            gate.allow_create(&Actor::Courier(CourierId::new(7)), store_id)
                .is_err()
        );
        assert!(gate.allow_create(&Actor::Admin, store_id).is_err());
    }

    #[tokio::test]
    async fn courier_reads_require_a_grant() {
        let courier = CourierId::new(7);
        let store_id = StoreId::new(1);
        let gate = gate_with_grant(courier, store_id);

        assert!(
            gate.allow_read(&Actor::Courier(courier), store_id)
                .await
                .is_ok()
        );
        assert!(
            gate.allow_read(&Actor::Courier(CourierId::new(8)), store_id)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn admin_reads_any_store_but_mutates_nothing() {
        let gate = AccessGate::new(InMemoryGrantDirectory::new());
        let store_id = StoreId::new(1);

        assert!(gate.allow_read(&Actor::Admin, store_id).await.is_ok());

        let pending = order(store_id, OrderState::PendingDispatch, None);
        assert!(
            gate.allow_transition(&Actor::Admin, &pending, OrderState::Cancelled)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn assigned_orders_are_resolved_only_by_their_courier() {
        let courier = CourierId::new(7);
        let other = CourierId::new(8);
        let store_id = StoreId::new(1);
        let grants = InMemoryGrantDirectory::new();
        grants.grant(courier, store_id);
        grants.grant(other, store_id);
        let gate = AccessGate::new(grants);

        let assigned = order(store_id, OrderState::Assigned, Some(courier));

        assert!(
            gate.allow_transition(&Actor::Courier(courier), &assigned, OrderState::Fulfilled)
                .await
                .is_ok()
        );
        // Granted, but the order belongs to someone else's run
        assert!(
            gate.allow_transition(&Actor::Courier(other), &assigned, OrderState::Fulfilled)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn foreign_store_cannot_touch_the_order() {
        let gate = AccessGate::new(InMemoryGrantDirectory::new());
        let pending = order(StoreId::new(1), OrderState::PendingDispatch, None);

        assert!(
            gate.allow_transition(
                &Actor::Store(StoreId::new(2)),
                &pending,
                OrderState::Cancelled
            )
            .await
            .is_err()
        );
    }
}
