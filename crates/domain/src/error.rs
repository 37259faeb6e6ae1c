//! Domain error types.

use common::{OrderId, OrderState, ProductId};
use storage::StorageError;
use thiserror::Error;

/// A request rejected before any order was touched.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required customer field was missing or blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// The order had no line items.
    #[error("An order needs at least one line item")]
    NoLineItems,

    /// A line item had a non-positive quantity.
    #[error("Invalid quantity for product {product_id}: {quantity} (must be greater than 0)")]
    InvalidQuantity {
        product_id: ProductId,
        quantity: u32,
    },

    /// Cancelling an order requires a failure note.
    #[error("A failure note is required when cancelling an order")]
    MissingFailureNote,

    /// The requested state literal names no known state.
    #[error("Unknown order state: {0:?}")]
    UnknownState(String),
}

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The request was malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The actor may not perform this operation.
    ///
    /// Deliberately carries no detail about the order or the reason.
    #[error("Operation not permitted")]
    Forbidden,

    /// The lifecycle rules have no such move for this actor.
    #[error("Invalid transition from {current} to {requested}")]
    InvalidTransition {
        current: OrderState,
        requested: OrderState,
    },

    /// Another courier claimed the order first.
    #[error("Order {order_id} was already claimed")]
    AlreadyClaimed { order_id: OrderId },

    /// The order changed under the caller. Reloading and retrying is
    /// the caller's decision; nothing here retries on its own.
    #[error("Order {order_id} was modified concurrently")]
    Conflict { order_id: OrderId },

    /// No order has this id.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// The product is unknown, inactive, or belongs to another store.
    #[error("Product not available: {0}")]
    ProductNotFound(ProductId),

    /// An error occurred in the storage layer.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}
