//! Order lifecycle states.

use serde::{Deserialize, Serialize};

/// The state of an order in its lifecycle.
///
/// State transitions:
/// ```text
/// PendingDispatch ──┬──► Assigned ──┬──► Fulfilled
///                   │               │
///                   └───────────────┴──► Cancelled
/// ```
///
/// `PendingDispatch → Assigned` happens only through the claim
/// protocol; `Fulfilled` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderState {
    /// Created and waiting for a courier to claim it, or for the
    /// store to resolve it directly.
    PendingDispatch,

    /// Claimed by exactly one courier.
    Assigned,

    /// Delivered to the customer, or handed over at the store (terminal state).
    Fulfilled,

    /// Abandoned, with a failure note explaining why (terminal state).
    Cancelled,
}

impl OrderState {
    /// Every state, in lifecycle order.
    pub const ALL: [OrderState; 4] = [
        OrderState::PendingDispatch,
        OrderState::Assigned,
        OrderState::Fulfilled,
        OrderState::Cancelled,
    ];

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderState::Fulfilled | OrderState::Cancelled)
    }

    /// Returns the snake_case literal used in storage and on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderState::PendingDispatch => "pending_dispatch",
            OrderState::Assigned => "assigned",
            OrderState::Fulfilled => "fulfilled",
            OrderState::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OrderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderState {
    type Err = UnknownState;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending_dispatch" => Ok(OrderState::PendingDispatch),
            "assigned" => Ok(OrderState::Assigned),
            "fulfilled" => Ok(OrderState::Fulfilled),
            "cancelled" => Ok(OrderState::Cancelled),
            other => Err(UnknownState(other.to_string())),
        }
    }
}

/// Error returned when a literal names no known order state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownState(pub String);

impl std::fmt::Display for UnknownState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown order state: {:?}", self.0)
    }
}

impl std::error::Error for UnknownState {}
