//! Port abstraction for the raw order-item maintenance surface.
//!
//! These operations edit line items directly without touching stock or the
//! parent order's total; the HTTP layer restricts them to administrators.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::OrderItem;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by order item repository adapters.
    pub enum OrderItemPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "order item repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order item repository query failed: {message}",
        /// The referenced order or product does not exist.
        MissingParent { message: String } => "order item references a missing record: {message}",
    }
}

/// Attributes for an order item about to be inserted directly.
#[derive(Debug, Clone, Copy)]
pub struct NewOrderItem {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price_cents: i64,
}

/// Partial update applied to an existing order item.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderItemChanges {
    pub quantity: Option<i32>,
    pub unit_price_cents: Option<i64>,
}

#[async_trait]
pub trait OrderItemRepository: Send + Sync {
    /// Insert a line item against an existing order.
    async fn create(&self, new_item: NewOrderItem)
        -> Result<OrderItem, OrderItemPersistenceError>;

    /// Fetch a line item by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<OrderItem>, OrderItemPersistenceError>;

    /// List every line item across all orders.
    async fn list(&self) -> Result<Vec<OrderItem>, OrderItemPersistenceError>;

    /// Apply a partial update, returning the updated item or `None` when it
    /// does not exist.
    async fn update(
        &self,
        id: Uuid,
        changes: OrderItemChanges,
    ) -> Result<Option<OrderItem>, OrderItemPersistenceError>;

    /// Delete a line item, returning whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, OrderItemPersistenceError>;
}
