//! Order records as stored and returned by the order store.

use chrono::{DateTime, Utc};
use common::{CourierId, Money, OrderId, OrderState, ProductId, StoreId};
use serde::{Deserialize, Serialize};

/// Contact and delivery details captured when the order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    /// Customer name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Delivery address.
    pub address: String,
}

impl CustomerInfo {
    /// Creates customer info from its parts.
    pub fn new(
        name: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            address: address.into(),
        }
    }
}

/// A line of an order.
///
/// The product name and unit price are frozen at creation time, so
/// later catalog edits never change an already-placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// The product this line refers to.
    pub product_id: ProductId,

    /// Product name as it read when the order was placed.
    pub product_name: String,

    /// Quantity ordered.
    pub quantity: u32,

    /// Unit price as it read when the order was placed.
    pub unit_price: Money,

    /// `unit_price * quantity`, stored alongside the parts.
    pub subtotal: Money,
}

/// A stored order together with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Store-assigned order id.
    pub id: OrderId,

    /// The store the order belongs to.
    pub store_id: StoreId,

    /// The courier that claimed the order, if any. Set exactly once by
    /// a successful claim and never reassigned.
    pub courier_id: Option<CourierId>,

    /// Customer contact and delivery details.
    pub customer: CustomerInfo,

    /// Current lifecycle state.
    pub state: OrderState,

    /// Sum of line subtotals, fixed at creation.
    pub total: Money,

    /// Why the order was cancelled, or the hand-over sentinel when the
    /// store fulfilled it directly.
    pub failure_note: Option<String>,

    /// When the order was placed.
    pub created_at: DateTime<Utc>,

    /// Refreshed on every state change.
    pub updated_at: DateTime<Utc>,

    /// Line items, in insertion order.
    pub items: Vec<LineItem>,
}

/// A line item to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    /// The product this line refers to.
    pub product_id: ProductId,
    /// Product name snapshot.
    pub product_name: String,
    /// Quantity ordered.
    pub quantity: u32,
    /// Unit price snapshot.
    pub unit_price: Money,
}

impl NewLineItem {
    /// Returns `unit_price * quantity` for this line.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// An order to insert.
///
/// The id, the timestamps, and the initial `pending_dispatch` state are
/// assigned by the store at insert time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    /// The store the order belongs to.
    pub store_id: StoreId,
    /// Customer contact and delivery details.
    pub customer: CustomerInfo,
    /// Line items to insert with the order.
    pub items: Vec<NewLineItem>,
}

impl NewOrder {
    /// Returns the order total: the sum of line subtotals.
    pub fn total(&self) -> Money {
        self.items.iter().map(NewLineItem::subtotal).sum()
    }
}
