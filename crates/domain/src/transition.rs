//! The order lifecycle transition table.
//!
//! One table holds every edge of the lifecycle graph;
//! [`can_transition`] layers the role rules on top of it, and
//! [`required_side_effects`] describes the auxiliary writes a legal
//! transition carries. Nothing else in the system decides what moves
//! are possible.

use common::OrderState;

use crate::actor::Actor;

/// Note auto-written when a store fulfills an order directly, without
/// a courier ever being involved.
pub const STORE_DELIVERY_NOTE: &str = "delivered at store";

/// Allowed target states per current state.
///
/// Terminal states have no outgoing edges, and no state has a
/// self-edge, so re-requesting the current state is always rejected.
pub fn allowed_targets(state: OrderState) -> &'static [OrderState] {
    match state {
        OrderState::PendingDispatch => &[
            OrderState::Assigned,
            OrderState::Fulfilled,
            OrderState::Cancelled,
        ],
        OrderState::Assigned => &[OrderState::Fulfilled, OrderState::Cancelled],
        OrderState::Fulfilled | OrderState::Cancelled => &[],
    }
}

/// Whether the lifecycle graph has an edge from `current` to `requested`.
pub fn is_edge(current: OrderState, requested: OrderState) -> bool {
    allowed_targets(current).contains(&requested)
}

/// Whether `actor` may drive the order from `current` to `requested`
/// through the update path.
///
/// Stores resolve their own pending orders directly; couriers resolve
/// orders assigned to them. The `pending_dispatch → assigned` edge is
/// owned by the claim protocol and is never legal here, and admins
/// drive no transitions at all.
pub fn can_transition(current: OrderState, requested: OrderState, actor: &Actor) -> bool {
    if !is_edge(current, requested) {
        return false;
    }

    match (actor, current) {
        (Actor::Store(_), OrderState::PendingDispatch) => requested != OrderState::Assigned,
        (Actor::Courier(_), OrderState::Assigned) => true,
        _ => false,
    }
}

/// Auxiliary writes a transition carries with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SideEffects {
    /// A note the transition writes on its own.
    pub auto_note: Option<&'static str>,

    /// Whether the caller must supply a failure note.
    pub note_required: bool,
}

/// Side effects of the transition from `current` to `requested`.
///
/// Meaningful only for edges [`can_transition`] allows: cancelling
/// always needs a caller note, and a store fulfilling a pending order
/// directly gets the hand-over sentinel written for it.
pub fn required_side_effects(
    current: OrderState,
    requested: OrderState,
    actor: &Actor,
) -> SideEffects {
    let mut effects = SideEffects::default();

    if requested == OrderState::Cancelled {
        effects.note_required = true;
    }
    if matches!(actor, Actor::Store(_))
        && current == OrderState::PendingDispatch
        && requested == OrderState::Fulfilled
    {
        effects.auto_note = Some(STORE_DELIVERY_NOTE);
    }

    effects
}

#[cfg(test)]
mod tests {
    use common::{CourierId, StoreId};

    use super::*;

    fn store() -> Actor {
        Actor::Store(StoreId::new(1))
    }

    fn courier() -> Actor {
        Actor::Courier(CourierId::new(7))
    }

    #[test]
    fn test_pending_targets() {
        assert_eq!(
            allowed_targets(OrderState::PendingDispatch),
            &[
                OrderState::Assigned,
                OrderState::Fulfilled,
                OrderState::Cancelled
            ]
        );
    }

    #[test]
    fn test_assigned_targets() {
        assert_eq!(
            allowed_targets(OrderState::Assigned),
            &[OrderState::Fulfilled, OrderState::Cancelled]
        );
    }

    #[test]
    fn test_terminal_states_have_no_targets() {
        assert!(allowed_targets(OrderState::Fulfilled).is_empty());
        assert!(allowed_targets(OrderState::Cancelled).is_empty());
    }

    #[test]
    fn test_no_state_has_a_self_edge() {
        for state in OrderState::ALL {
            assert!(!is_edge(state, state), "{state} must not loop to itself");
        }
    }

    #[test]
    fn test_store_resolves_pending_directly() {
        assert!(can_transition(
            OrderState::PendingDispatch,
            OrderState::Fulfilled,
            &store()
        ));
        assert!(can_transition(
            OrderState::PendingDispatch,
            OrderState::Cancelled,
            &store()
        ));
    }

    #[test]
    fn test_store_cannot_touch_assigned_orders() {
        assert!(!can_transition(
            OrderState::Assigned,
            OrderState::Fulfilled,
            &store()
        ));
        assert!(!can_transition(
            OrderState::Assigned,
            OrderState::Cancelled,
            &store()
        ));
    }

    #[test]
    fn test_courier_resolves_assigned_orders() {
        assert!(can_transition(
            OrderState::Assigned,
            OrderState::Fulfilled,
            &courier()
        ));
        assert!(can_transition(
            OrderState::Assigned,
            OrderState::Cancelled,
            &courier()
        ));
    }

    #[test]
    fn test_courier_cannot_resolve_pending_orders() {
        assert!(!can_transition(
            OrderState::PendingDispatch,
            OrderState::Fulfilled,
            &courier()
        ));
        assert!(!can_transition(
            OrderState::PendingDispatch,
            OrderState::Cancelled,
            &courier()
        ));
    }

    #[test]
    fn test_claim_edge_is_never_legal_through_the_update_path() {
        for actor in [store(), courier(), Actor::Admin] {
            assert!(!can_transition(
                OrderState::PendingDispatch,
                OrderState::Assigned,
                &actor
            ));
        }
    }

    #[test]
    fn test_admin_drives_no_transitions() {
        for current in OrderState::ALL {
            for requested in OrderState::ALL {
                assert!(!can_transition(current, requested, &Actor::Admin));
            }
        }
    }

    #[test]
    fn test_terminal_states_reject_every_request() {
        for current in [OrderState::Fulfilled, OrderState::Cancelled] {
            for requested in OrderState::ALL {
                for actor in [store(), courier(), Actor::Admin] {
                    assert!(!can_transition(current, requested, &actor));
                }
            }
        }
    }

    #[test]
    fn test_cancelling_requires_a_note_for_both_roles() {
        let from_store =
            required_side_effects(OrderState::PendingDispatch, OrderState::Cancelled, &store());
        assert!(from_store.note_required);
        assert!(from_store.auto_note.is_none());

        let from_courier =
            required_side_effects(OrderState::Assigned, OrderState::Cancelled, &courier());
        assert!(from_courier.note_required);
        assert!(from_courier.auto_note.is_none());
    }

    #[test]
    fn test_store_direct_fulfillment_auto_writes_the_sentinel() {
        let effects =
            required_side_effects(OrderState::PendingDispatch, OrderState::Fulfilled, &store());
        assert_eq!(effects.auto_note, Some(STORE_DELIVERY_NOTE));
        assert!(!effects.note_required);
    }

    #[test]
    fn test_courier_fulfillment_carries_no_side_effects() {
        let effects =
            required_side_effects(OrderState::Assigned, OrderState::Fulfilled, &courier());
        assert_eq!(effects, SideEffects::default());
    }
}
