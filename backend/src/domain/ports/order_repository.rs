//! Port abstraction for order persistence adapters.
//!
//! Order placement is the one multi-step write in the system: the adapter
//! must check stock, decrement it, compute the total, and insert the order
//! with its line items atomically. The port surfaces the two business
//! failures (missing product, insufficient stock) as distinct variants so the
//! HTTP layer can map them precisely.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Order, OrderLine, OrderStatus};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by order repository adapters.
    pub enum OrderPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "order repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "order repository query failed: {message}",
        /// A requested product does not exist; the placement was rolled back.
        ProductNotFound { product_id: Uuid } => "product {product_id} not found",
        /// A requested product has fewer units than asked for; the placement
        /// was rolled back.
        InsufficientStock { product_id: Uuid, available: i32 } =>
            "insufficient stock for product {product_id}: {available} available",
    }
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Atomically place an order for the given user.
    ///
    /// All stock decrements, the total computation, and the order plus item
    /// inserts happen in a single database transaction; any failure leaves
    /// no trace.
    async fn place(
        &self,
        user_id: Uuid,
        lines: Vec<OrderLine>,
    ) -> Result<Order, OrderPersistenceError>;

    /// Fetch an order with its items.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, OrderPersistenceError>;

    /// List every order, newest first.
    async fn list_all(&self) -> Result<Vec<Order>, OrderPersistenceError>;

    /// List the orders a user has placed, newest first.
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, OrderPersistenceError>;

    /// Change an order's status, returning the updated order or `None` when
    /// it does not exist.
    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderPersistenceError>;

    /// Delete an order and its items, returning whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, OrderPersistenceError>;
}
