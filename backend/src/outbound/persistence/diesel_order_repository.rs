//! PostgreSQL-backed `OrderRepository` implementation using Diesel ORM.
//!
//! Order placement runs as a single transaction: each product row is locked
//! with `SELECT ... FOR UPDATE`, stock is checked and decremented, the total
//! accumulated, and the order plus its items inserted. Any failure rolls the
//! whole placement back.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{OrderPersistenceError, OrderRepository};
use crate::domain::{Order, OrderItem, OrderLine, OrderStatus};

use super::diesel_error_mapping::{classify_diesel_error, classify_pool_error, DbFailure};
use super::models::{NewOrderItemRow, NewOrderRow, OrderItemRow, OrderRow, ProductRow};
use super::pool::DbPool;
use super::schema::{order_items, orders, products};

/// Diesel-backed implementation of the `OrderRepository` port.
#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> OrderPersistenceError {
    match failure {
        DbFailure::Connection(message) => OrderPersistenceError::connection(message),
        DbFailure::Query(message) => OrderPersistenceError::query(message),
        DbFailure::UniqueViolation { .. } | DbFailure::ForeignKeyViolation { .. } => {
            OrderPersistenceError::query("constraint violation")
        }
    }
}

/// Failure raised inside the placement transaction.
///
/// Business failures abort the transaction exactly like database errors do,
/// so stock decrements never survive a rejected placement.
#[derive(Debug)]
enum PlacementFailure {
    ProductNotFound(Uuid),
    InsufficientStock { product_id: Uuid, available: i32 },
    Db(diesel::result::Error),
}

impl From<diesel::result::Error> for PlacementFailure {
    fn from(error: diesel::result::Error) -> Self {
        Self::Db(error)
    }
}

impl From<PlacementFailure> for OrderPersistenceError {
    fn from(failure: PlacementFailure) -> Self {
        match failure {
            PlacementFailure::ProductNotFound(product_id) => {
                OrderPersistenceError::product_not_found(product_id)
            }
            PlacementFailure::InsufficientStock {
                product_id,
                available,
            } => OrderPersistenceError::insufficient_stock(product_id, available),
            PlacementFailure::Db(error) => map_failure(classify_diesel_error(error)),
        }
    }
}

/// Convert persisted rows to a domain order.
fn rows_to_order(
    row: OrderRow,
    item_rows: Vec<OrderItemRow>,
) -> Result<Order, OrderPersistenceError> {
    let status: OrderStatus = row
        .status
        .parse()
        .map_err(|e| OrderPersistenceError::query(format!("stored order is invalid: {e}")))?;
    let items = item_rows
        .into_iter()
        .map(|item| {
            OrderItem::new(
                item.id,
                item.order_id,
                item.product_id,
                item.quantity,
                item.unit_price_cents,
            )
            .map_err(|e| OrderPersistenceError::query(format!("stored order item is invalid: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Order::new(
        row.id,
        row.user_id,
        status,
        row.total_cents,
        items,
    ))
}

/// Load the items for a batch of orders and group them by order id.
async fn load_items_grouped(
    conn: &mut diesel_async::AsyncPgConnection,
    order_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<OrderItemRow>>, OrderPersistenceError> {
    let rows: Vec<OrderItemRow> = order_items::table
        .filter(order_items::order_id.eq_any(order_ids))
        .order(order_items::id.asc())
        .select(OrderItemRow::as_select())
        .load(conn)
        .await
        .map_err(|e| map_failure(classify_diesel_error(e)))?;

    let mut grouped: HashMap<Uuid, Vec<OrderItemRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.order_id).or_default().push(row);
    }
    Ok(grouped)
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn place(
        &self,
        user_id: Uuid,
        mut lines: Vec<OrderLine>,
    ) -> Result<Order, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        // Lock product rows in a stable order so concurrent placements cannot
        // deadlock against each other.
        lines.sort_by_key(OrderLine::product_id);

        let order = conn
            .transaction::<OrderRow, PlacementFailure, _>(|conn| {
                async move {
                    let order_id = Uuid::new_v4();
                    let mut total_cents: i64 = 0;
                    let mut item_rows = Vec::with_capacity(lines.len());

                    for line in &lines {
                        let product: Option<ProductRow> = products::table
                            .find(line.product_id())
                            .for_update()
                            .select(ProductRow::as_select())
                            .first(conn)
                            .await
                            .optional()?;
                        let product = product
                            .ok_or(PlacementFailure::ProductNotFound(line.product_id()))?;

                        if product.stock < line.quantity() {
                            return Err(PlacementFailure::InsufficientStock {
                                product_id: product.id,
                                available: product.stock,
                            });
                        }

                        diesel::update(products::table.find(product.id))
                            .set(products::stock.eq(products::stock - line.quantity()))
                            .execute(conn)
                            .await?;

                        total_cents += product.price_cents * i64::from(line.quantity());
                        item_rows.push(NewOrderItemRow {
                            id: Uuid::new_v4(),
                            order_id,
                            product_id: product.id,
                            quantity: line.quantity(),
                            unit_price_cents: product.price_cents,
                        });
                    }

                    let order_row: OrderRow = diesel::insert_into(orders::table)
                        .values(NewOrderRow {
                            id: order_id,
                            user_id,
                            status: OrderStatus::Pending.as_str(),
                            total_cents,
                        })
                        .returning(OrderRow::as_returning())
                        .get_result(conn)
                        .await?;

                    diesel::insert_into(order_items::table)
                        .values(&item_rows)
                        .execute(conn)
                        .await?;

                    Ok(order_row)
                }
                .scope_boxed()
            })
            .await?;

        let items = load_items_grouped(&mut conn, &[order.id])
            .await?
            .remove(&order.id)
            .unwrap_or_default();
        rows_to_order(order, items)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let row: Option<OrderRow> = orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let items = load_items_grouped(&mut conn, &[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        rows_to_order(row, items).map(Some)
    }

    async fn list_all(&self) -> Result<Vec<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let rows: Vec<OrderRow> = orders::table
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        let order_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut grouped = load_items_grouped(&mut conn, &order_ids).await?;
        rows.into_iter()
            .map(|row| {
                let items = grouped.remove(&row.id).unwrap_or_default();
                rows_to_order(row, items)
            })
            .collect()
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let rows: Vec<OrderRow> = orders::table
            .filter(orders::user_id.eq(user_id))
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        let order_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let mut grouped = load_items_grouped(&mut conn, &order_ids).await?;
        rows.into_iter()
            .map(|row| {
                let items = grouped.remove(&row.id).unwrap_or_default();
                rows_to_order(row, items)
            })
            .collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let updated: Option<OrderRow> = diesel::update(orders::table.find(id))
            .set(orders::status.eq(status.as_str()))
            .returning(OrderRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        let Some(row) = updated else {
            return Ok(None);
        };
        let items = load_items_grouped(&mut conn, &[row.id])
            .await?
            .remove(&row.id)
            .unwrap_or_default();
        rows_to_order(row, items).map(Some)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        // order_items rows go with the order via ON DELETE CASCADE.
        let deleted = diesel::delete(orders::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        Ok(deleted > 0)
    }
}
