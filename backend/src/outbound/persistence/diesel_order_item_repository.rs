//! PostgreSQL-backed `OrderItemRepository` implementation using Diesel ORM.
//!
//! Raw line-item maintenance; foreign-key violations surface as
//! `MissingParent` so the HTTP layer can report a bad order or product
//! reference instead of a server error.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    NewOrderItem, OrderItemChanges, OrderItemPersistenceError, OrderItemRepository,
};
use crate::domain::OrderItem;

use super::diesel_error_mapping::{classify_diesel_error, classify_pool_error, DbFailure};
use super::models::{NewOrderItemRow, OrderItemRow, OrderItemRowChanges};
use super::pool::DbPool;
use super::schema::order_items;

/// Diesel-backed implementation of the `OrderItemRepository` port.
#[derive(Clone)]
pub struct DieselOrderItemRepository {
    pool: DbPool,
}

impl DieselOrderItemRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> OrderItemPersistenceError {
    match failure {
        DbFailure::Connection(message) => OrderItemPersistenceError::connection(message),
        DbFailure::Query(message) => OrderItemPersistenceError::query(message),
        DbFailure::UniqueViolation { .. } => {
            OrderItemPersistenceError::query("constraint violation")
        }
        DbFailure::ForeignKeyViolation { constraint } => {
            let parent = if constraint.contains("product") {
                "product does not exist"
            } else {
                "order does not exist"
            };
            OrderItemPersistenceError::missing_parent(parent)
        }
    }
}

/// Convert a database row to a domain order item.
fn row_to_item(row: OrderItemRow) -> Result<OrderItem, OrderItemPersistenceError> {
    OrderItem::new(
        row.id,
        row.order_id,
        row.product_id,
        row.quantity,
        row.unit_price_cents,
    )
    .map_err(|e| OrderItemPersistenceError::query(format!("stored order item is invalid: {e}")))
}

#[async_trait]
impl OrderItemRepository for DieselOrderItemRepository {
    async fn create(
        &self,
        new_item: NewOrderItem,
    ) -> Result<OrderItem, OrderItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let row = NewOrderItemRow {
            id: Uuid::new_v4(),
            order_id: new_item.order_id,
            product_id: new_item.product_id,
            quantity: new_item.quantity,
            unit_price_cents: new_item.unit_price_cents,
        };

        let inserted: OrderItemRow = diesel::insert_into(order_items::table)
            .values(&row)
            .returning(OrderItemRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        row_to_item(inserted)
    }

    async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<OrderItem>, OrderItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let row: Option<OrderItemRow> = order_items::table
            .find(id)
            .select(OrderItemRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        row.map(row_to_item).transpose()
    }

    async fn list(&self) -> Result<Vec<OrderItem>, OrderItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let rows: Vec<OrderItemRow> = order_items::table
            .order(order_items::id.asc())
            .select(OrderItemRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        rows.into_iter().map(row_to_item).collect()
    }

    async fn update(
        &self,
        id: Uuid,
        changes: OrderItemChanges,
    ) -> Result<Option<OrderItem>, OrderItemPersistenceError> {
        if changes.quantity.is_none() && changes.unit_price_cents.is_none() {
            return self.find_by_id(id).await;
        }

        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let row_changes = OrderItemRowChanges {
            quantity: changes.quantity,
            unit_price_cents: changes.unit_price_cents,
        };

        let updated: Option<OrderItemRow> = diesel::update(order_items::table.find(id))
            .set(row_changes)
            .returning(OrderItemRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        updated.map(row_to_item).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, OrderItemPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let deleted = diesel::delete(order_items::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Foreign-key classification for the maintenance surface.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("order_items_product_id_fkey", "product does not exist")]
    #[case("order_items_order_id_fkey", "order does not exist")]
    fn foreign_key_violations_name_the_parent(#[case] constraint: &str, #[case] message: &str) {
        let err = map_failure(DbFailure::ForeignKeyViolation {
            constraint: constraint.to_owned(),
        });
        assert_eq!(err, OrderItemPersistenceError::missing_parent(message));
    }
}
