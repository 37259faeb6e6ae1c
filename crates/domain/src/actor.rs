//! Caller identity.

use common::{CourierId, StoreId};

/// The authenticated caller of an order operation.
///
/// Identity is resolved and verified by the surrounding transport; the
/// workflow trusts it as given. The variants are closed on purpose: a
/// new role has to be added here and handled wherever roles matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actor {
    /// A store account, acting on its own store's orders.
    Store(StoreId),

    /// A courier account, acting on orders of stores that granted it.
    Courier(CourierId),

    /// A back-office administrator. Admins manage accounts, not the
    /// order workflow.
    Admin,
}

impl Actor {
    /// Returns the role name, for logs and messages.
    pub fn role(&self) -> &'static str {
        match self {
            Actor::Store(_) => "store",
            Actor::Courier(_) => "courier",
            Actor::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Actor::Store(id) => write!(f, "store:{id}"),
            Actor::Courier(id) => write!(f, "courier:{id}"),
            Actor::Admin => write!(f, "admin"),
        }
    }
}
