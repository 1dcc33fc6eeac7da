//! Port abstraction for catalogue persistence adapters.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Product, ProductDraft};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by product repository adapters.
    pub enum ProductPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "product repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "product repository query failed: {message}",
    }
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Insert a new product.
    async fn create(&self, draft: ProductDraft) -> Result<Product, ProductPersistenceError>;

    /// Fetch a product by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, ProductPersistenceError>;

    /// List the whole catalogue.
    async fn list(&self) -> Result<Vec<Product>, ProductPersistenceError>;

    /// Case-insensitive substring search over name, brand, and description.
    async fn search(&self, query: &str) -> Result<Vec<Product>, ProductPersistenceError>;

    /// Replace a product's attributes, returning the updated record or `None`
    /// when the product does not exist.
    async fn update(
        &self,
        id: Uuid,
        draft: ProductDraft,
    ) -> Result<Option<Product>, ProductPersistenceError>;

    /// Delete a product, returning whether a record was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, ProductPersistenceError>;
}
