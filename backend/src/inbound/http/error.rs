//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use tracing::error;

use crate::domain::ports::{
    OrderItemPersistenceError, OrderPersistenceError, PasswordHasherError,
    ProductPersistenceError, TokenServiceError, UserPersistenceError,
};
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code, ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        redacted.trace_id = error.trace_id.clone();
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code)
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = &self.trace_id {
            builder.insert_header((TRACE_ID_HEADER, id.clone()));
        }

        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

fn unavailable(subsystem: &str, message: String) -> Error {
    error!(subsystem, %message, "repository unavailable");
    Error::service_unavailable("service temporarily unavailable")
}

fn internal(subsystem: &str, message: String) -> Error {
    error!(subsystem, %message, "repository query failed");
    Error::internal("Internal server error")
}

impl From<UserPersistenceError> for Error {
    fn from(err: UserPersistenceError) -> Self {
        match err {
            UserPersistenceError::Connection { message } => unavailable("users", message),
            UserPersistenceError::Query { message } => internal("users", message),
            UserPersistenceError::Duplicate { field } => {
                Error::invalid_request(format!("a user with this {field} already exists"))
            }
        }
    }
}

impl From<ProductPersistenceError> for Error {
    fn from(err: ProductPersistenceError) -> Self {
        match err {
            ProductPersistenceError::Connection { message } => unavailable("products", message),
            ProductPersistenceError::Query { message } => internal("products", message),
        }
    }
}

impl From<OrderPersistenceError> for Error {
    fn from(err: OrderPersistenceError) -> Self {
        match err {
            OrderPersistenceError::Connection { message } => unavailable("orders", message),
            OrderPersistenceError::Query { message } => internal("orders", message),
            OrderPersistenceError::ProductNotFound { product_id } => {
                Error::invalid_request("product not found")
                    .with_details(json!({ "productId": product_id }))
            }
            OrderPersistenceError::InsufficientStock {
                product_id,
                available,
            } => Error::invalid_request("insufficient stock")
                .with_details(json!({ "productId": product_id, "available": available })),
        }
    }
}

impl From<OrderItemPersistenceError> for Error {
    fn from(err: OrderItemPersistenceError) -> Self {
        match err {
            OrderItemPersistenceError::Connection { message } => {
                unavailable("order items", message)
            }
            OrderItemPersistenceError::Query { message } => internal("order items", message),
            OrderItemPersistenceError::MissingParent { message } => {
                Error::invalid_request(format!("order item references a missing record: {message}"))
            }
        }
    }
}

impl From<PasswordHasherError> for Error {
    fn from(err: PasswordHasherError) -> Self {
        let PasswordHasherError::Hashing { message } = err;
        error!(%message, "password hashing failed");
        Error::internal("Internal server error")
    }
}

impl From<TokenServiceError> for Error {
    fn from(err: TokenServiceError) -> Self {
        match err {
            TokenServiceError::Issue { message } => {
                error!(%message, "token issuance failed");
                Error::internal("Internal server error")
            }
            TokenServiceError::Invalid => Error::unauthorized("token is invalid or has expired"),
        }
    }
}
