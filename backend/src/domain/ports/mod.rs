//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod order_item_repository;
mod order_repository;
mod password_hasher;
mod product_repository;
mod token_service;
mod user_repository;

pub use order_item_repository::{
    NewOrderItem, OrderItemChanges, OrderItemPersistenceError, OrderItemRepository,
};
pub use order_repository::{OrderPersistenceError, OrderRepository};
pub use password_hasher::{PasswordHasher, PasswordHasherError};
pub use product_repository::{ProductPersistenceError, ProductRepository};
pub use token_service::{TokenService, TokenServiceError, TokenSubject};
pub use user_repository::{NewUser, UserChanges, UserPersistenceError, UserRepository};
