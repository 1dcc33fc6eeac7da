//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{NewUser, UserChanges, UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, User};

use super::diesel_error_mapping::{classify_diesel_error, classify_pool_error, DbFailure};
use super::models::{NewUserRow, UserRow, UserRowChanges};
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure) -> UserPersistenceError {
    match failure {
        DbFailure::Connection(message) => UserPersistenceError::connection(message),
        DbFailure::Query(message) => UserPersistenceError::query(message),
        DbFailure::UniqueViolation { constraint } => {
            // Constraint names follow Postgres convention: users_<column>_key.
            let field = if constraint.contains("email") {
                "email"
            } else {
                "username"
            };
            UserPersistenceError::duplicate(field)
        }
        DbFailure::ForeignKeyViolation { .. } => {
            UserPersistenceError::query("foreign key violation")
        }
    }
}

/// Convert a database row to a domain user.
///
/// Row contents were validated on the way in, so a failure here means the
/// database holds data the domain no longer accepts.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    User::try_from_parts(row.id, row.username, row.email, row.password_hash, &row.role)
        .map_err(|e| UserPersistenceError::query(format!("stored user is invalid: {e}")))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let row = NewUserRow {
            id: Uuid::new_v4(),
            username: new_user.username.as_ref(),
            email: new_user.email.as_ref(),
            password_hash: new_user.password_hash.as_ref(),
            role: new_user.role.as_str(),
        };

        let inserted: UserRow = diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        row_to_user(inserted)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let row: Option<UserRow> = users::table
            .find(id)
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        row.map(row_to_user).transpose()
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let rows: Vec<UserRow> = users::table
            .order(users::created_at.asc())
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn update(
        &self,
        id: Uuid,
        changes: UserChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let row_changes = UserRowChanges {
            username: changes.username.as_ref().map(AsRef::as_ref),
            email: changes.email.as_ref().map(AsRef::as_ref),
            password_hash: changes.password_hash.as_ref().map(AsRef::as_ref),
            role: changes.role.map(|role| role.as_str()),
        };

        let updated: Option<UserRow> = diesel::update(users::table.find(id))
            .set(&row_changes)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        updated.map(row_to_user).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(|e| map_failure(classify_pool_error(e)))?;

        let deleted = diesel::delete(users::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|e| map_failure(classify_diesel_error(e)))?;

        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Error mapping coverage that does not require a database.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("users_email_key", "email")]
    #[case("users_username_key", "username")]
    #[case("", "username")]
    fn unique_violations_name_the_field(#[case] constraint: &str, #[case] field: &str) {
        let err = map_failure(DbFailure::UniqueViolation {
            constraint: constraint.to_owned(),
        });
        assert_eq!(err, UserPersistenceError::duplicate(field));
    }

    #[test]
    fn connection_failures_stay_connection_errors() {
        let err = map_failure(DbFailure::Connection("refused".to_owned()));
        assert_eq!(err, UserPersistenceError::connection("refused"));
    }
}
