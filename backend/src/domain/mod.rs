//! Domain primitives and aggregates.
//!
//! Purpose: define strongly typed domain entities used by the API and
//! persistence layers. Types are immutable once constructed; invariants are
//! enforced by fallible constructors and documented on each type.

pub mod error;
pub mod order;
pub mod ports;
pub mod product;
pub mod user;

pub use self::error::{Error, ErrorCode, TRACE_ID_HEADER};
pub use self::order::{
    validate_lines, Order, OrderItem, OrderLine, OrderStatus, OrderValidationError,
};
pub use self::product::{Product, ProductDraft, ProductDraftParts, ProductValidationError};
pub use self::user::{
    EmailAddress, PasswordHash, Role, User, UserValidationError, Username,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
