//! Shared Diesel and pool error classification for the repositories.

use tracing::debug;

use super::pool::PoolError;

/// Transport-agnostic classification of a failed database operation.
///
/// Repositories translate this into their own port error enum; the unique and
/// foreign-key cases carry the violated constraint name so callers can name
/// the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DbFailure {
    Connection(String),
    Query(&'static str),
    UniqueViolation { constraint: String },
    ForeignKeyViolation { constraint: String },
}

/// Classify a pool checkout failure. Always a connection problem.
pub(crate) fn classify_pool_error(error: PoolError) -> DbFailure {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    DbFailure::Connection(message)
}

/// Classify a Diesel error, logging the raw detail at debug level so the
/// message returned to callers stays generic.
pub(crate) fn classify_diesel_error(error: diesel::result::Error) -> DbFailure {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            DbFailure::UniqueViolation {
                constraint: info.constraint_name().unwrap_or_default().to_owned(),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            DbFailure::ForeignKeyViolation {
                constraint: info.constraint_name().unwrap_or_default().to_owned(),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            DbFailure::Connection("database connection error".to_owned())
        }
        DieselError::NotFound => DbFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DbFailure::Query("database query error"),
        _ => DbFailure::Query("database error"),
    }
}
