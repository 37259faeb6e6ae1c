//! Shared vocabulary types for the comanda order system.
//!
//! This crate provides the typed identifiers, the money value object,
//! and the order lifecycle state enum that every other crate builds on.

pub mod money;
pub mod state;
pub mod types;

pub use money::Money;
pub use state::{OrderState, UnknownState};
pub use types::{CourierId, OrderId, ProductId, StoreId};
