//! Domain layer for the comanda order system.
//!
//! This crate provides the core order workflow:
//! - The lifecycle state machine as an explicit transition table
//! - The courier claim protocol built on the store's conditional writes
//! - The role-based authorization gate
//! - The order service facade tying the three together

pub mod access;
pub mod actor;
pub mod error;
pub mod service;
pub mod transition;

pub use access::AccessGate;
pub use actor::Actor;
pub use error::{DomainError, ValidationError};
pub use service::{DraftItem, OrderDraft, OrderService};
pub use transition::{
    STORE_DELIVERY_NOTE, SideEffects, allowed_targets, can_transition, is_edge,
    required_side_effects,
};
