//! PostgreSQL-backed `ProductRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ProductPersistenceError, ProductRepository};
use crate::domain::{Product, ProductDraft, ProductDraftParts};

use super::diesel_error_mapping::{classify_diesel_error, classify_pool_error, DbFailure};
use super::models::{ProductRow, ProductWriteRow};
use super::pool::DbPool;
use super::schema::products;

/// Diesel-backed implementation of the `ProductRepository` port.
#[derive(Clone)]
pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> ProductPersistenceError {
    match failure {
        DbFailure::Connection(message) => ProductPersistenceError::connection(message),
        DbFailure::Query(message) => ProductPersistenceError::query(message),
        DbFailure::UniqueViolation { .. } | DbFailure::ForeignKeyViolation { .. } => {
            ProductPersistenceError::query("constraint violation")
        }
    }
}

/// Convert a database row to a domain product.
fn row_to_product(row: ProductRow) -> Result<Product, ProductPersistenceError> {
    let draft = ProductDraft::new(ProductDraftParts {
        name: row.name,
        description: row.description,
        brand: row.brand,
        size: row.size,
        color: row.color,
        material: row.material,
        price_cents: row.price_cents,
        stock: row.stock,
    })
    .map_err(|e| ProductPersistenceError::query(format!("stored product is invalid: {e}")))?;
    Ok(Product::new(row.id, draft))
}

fn write_row<'a>(id: Uuid, draft: &'a ProductDraft) -> ProductWriteRow<'a> {
    ProductWriteRow {
        id,
        name: draft.name(),
        description: draft.description(),
        brand: draft.brand(),
        size: draft.size(),
        color: draft.color(),
        material: draft.material(),
        price_cents: draft.price_cents(),
        stock: draft.stock(),
    }
}

/// Escape LIKE metacharacters so user input matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl ProductRepository for DieselProductRepository {
    async fn create(&self, draft: ProductDraft) -> Result<Product, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let inserted: ProductRow = diesel::insert_into(products::table)
            .values(write_row(Uuid::new_v4(), &draft))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        row_to_product(inserted)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let row: Option<ProductRow> = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        row.map(row_to_product).transpose()
    }

    async fn list(&self) -> Result<Vec<Product>, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let rows: Vec<ProductRow> = products::table
            .order(products::name.asc())
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        rows.into_iter().map(row_to_product).collect()
    }

    async fn search(&self, query: &str) -> Result<Vec<Product>, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;
        let pattern = like_pattern(query);

        let rows: Vec<ProductRow> = products::table
            .filter(
                products::name
                    .ilike(pattern.clone())
                    .or(products::brand.ilike(pattern.clone()))
                    .or(products::description.ilike(pattern)),
            )
            .order(products::name.asc())
            .select(ProductRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        rows.into_iter().map(row_to_product).collect()
    }

    async fn update(
        &self,
        id: Uuid,
        draft: ProductDraft,
    ) -> Result<Option<Product>, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let updated: Option<ProductRow> = diesel::update(products::table.find(id))
            .set(write_row(id, &draft))
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        updated.map(row_to_product).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ProductPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let deleted = diesel::delete(products::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        Ok(deleted > 0)
    }
}
