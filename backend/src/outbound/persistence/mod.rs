//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Thin adapters only: repository implementations translate between Diesel
//! row structs and domain types, with no business logic. Row structs
//! (`models.rs`) and the `table!` schema (`schema.rs`) stay internal to this
//! module. Connections come from a `bb8` pool over `diesel-async`, and all
//! database errors are mapped to the domain's persistence error types.

mod diesel_error_mapping;
mod diesel_order_item_repository;
mod diesel_order_repository;
mod diesel_product_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_order_item_repository::DieselOrderItemRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_product_repository::DieselProductRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{run_pending_migrations, MigrationError};
pub use pool::{DbPool, PoolConfig, PoolError};
