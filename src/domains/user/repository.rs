use crate::errors::{DbError, DomainError, DomainResult};
use crate::domains::user::types::{User, NewUser, UserRow};
use sqlx::{SqlitePool, query, query_as, query_scalar};
use async_trait::async_trait;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by ID
    async fn find_by_id(&self, id: i64) -> DomainResult<User>;

    /// Find a user by username; absent users are not an error here
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;

    /// Create a new user. `user.password` must already hold the password hash.
    async fn create(&self, user: &NewUser) -> DomainResult<User>;

    /// Check if username is unique
    async fn is_username_unique(&self, username: &str) -> DomainResult<bool>;

    /// Check if email is unique
    async fn is_email_unique(&self, email: &str) -> DomainResult<bool>;
}

/// SQLite implementation of UserRepository
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository instance
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: i64) -> DomainResult<User> {
        let row = query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash, role FROM users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Database(DbError::from(e)))?
        .ok_or_else(|| DomainError::EntityNotFound("User".to_string(), id))?;

        row.into_entity()
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let row = query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash, role FROM users WHERE username = ?"
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::Database(DbError::from(e)))?;

        row.map(UserRow::into_entity).transpose()
    }

    async fn create(&self, user: &NewUser) -> DomainResult<User> {
        // --- Start Transaction ---
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let insert_result = query(
            "INSERT INTO users (username, email, password_hash, role) VALUES (?, ?, ?, ?)"
        )
        .bind(user.username.trim())
        .bind(user.email.trim())
        .bind(&user.password)
        .bind(&user.role)
        .execute(&mut *tx)
        .await;

        // --- Commit or Rollback ---
        match insert_result {
            Ok(result) => {
                let id = result.last_insert_rowid();
                tx.commit().await.map_err(DbError::from)?;
                log::info!("Created user account {} ({})", user.username.trim(), user.role);
                self.find_by_id(id).await
            }
            Err(e) => {
                let _ = tx.rollback().await; // Ensure rollback on error
                Err(DomainError::from_write(e))
            }
        }
    }

    async fn is_username_unique(&self, username: &str) -> DomainResult<bool> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::Database(DbError::from(e)))?;

        Ok(count == 0)
    }

    async fn is_email_unique(&self, email: &str) -> DomainResult<bool> {
        let count: i64 = query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::Database(DbError::from(e)))?;

        Ok(count == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db_migration::test_pool;
    use crate::errors::ValidationError;
    use crate::types::UserRole;

    #[tokio::test]
    async fn test_create_and_find_user() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let mut new_user = NewUser::new("asha", "asha@clinic.org", "secret1", UserRole::HealthcareWorker);
        new_user.password = "$argon2id$placeholder".to_string();

        let created = repo.create(&new_user).await.unwrap();
        assert_eq!(created.username, "asha");
        assert_eq!(created.role, UserRole::HealthcareWorker);
        assert_eq!(created.password_hash.as_deref(), Some("$argon2id$placeholder"));

        let found = repo.find_by_username("asha").await.unwrap().unwrap();
        assert_eq!(found, created);
        assert!(repo.find_by_username("nobody").await.unwrap().is_none());
        assert!(!repo.is_username_unique("asha").await.unwrap());
        assert!(repo.is_email_unique("other@clinic.org").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_rejected_at_commit() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let first = NewUser::new("asha", "shared@clinic.org", "secret1", UserRole::HealthcareWorker);
        repo.create(&first).await.unwrap();

        let second = NewUser::new("ravi", "shared@clinic.org", "secret1", UserRole::HealthcareWorker);
        let err = repo.create(&second).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            DomainError::Validation(ValidationError::unique("email")).to_string()
        );
        assert!(repo.find_by_username("ravi").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_missing_user_is_not_found() {
        let repo = SqliteUserRepository::new(test_pool().await);
        let err = repo.find_by_id(42).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
