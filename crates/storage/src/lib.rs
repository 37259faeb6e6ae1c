//! Persistence layer for the comanda order system.
//!
//! This crate provides:
//! - The [`OrderStore`] trait with its conditional-update primitives,
//!   backed by PostgreSQL for production and by memory for tests
//! - The [`ProductCatalog`] and [`GrantDirectory`] collaborator traits
//!   the order workflow reads from
//!
//! The conditional updates ([`OrderStore::update_state`] and
//! [`OrderStore::claim`]) are the system's only serialization points:
//! each is a single guarded write whose affected-row count tells the
//! caller whether it won or lost the race.

pub mod catalog;
pub mod error;
pub mod grants;
pub mod memory;
pub mod order;
pub mod postgres;
pub mod store;

pub use catalog::{ActiveProduct, InMemoryProductCatalog, ProductCatalog};
pub use error::{Result, StorageError};
pub use grants::{GrantDirectory, InMemoryGrantDirectory};
pub use memory::InMemoryOrderStore;
pub use order::{CustomerInfo, LineItem, NewLineItem, NewOrder, OrderRecord};
pub use postgres::{PostgresGrantDirectory, PostgresOrderStore, PostgresProductCatalog};
pub use store::{OrderFilter, OrderStore, OrderStoreExt};
