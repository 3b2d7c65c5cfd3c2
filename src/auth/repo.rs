use sqlx::PgPool;
use thiserror::Error;

use crate::auth::repo_types::User;

#[derive(Debug, Error)]
pub enum CreateUserError {
    /// The unique index rejected the insert. Concurrent registrations can
    /// both pass the handler-level existence check; this is the backstop.
    #[error("Username already exists")]
    UsernameTaken,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl User {
    /// Find a user by username (case-sensitive, as stored).
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with an already-hashed password.
    pub async fn create(
        db: &PgPool,
        username: &str,
        password_hash: &str,
    ) -> Result<User, CreateUserError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(db)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|d| d.is_unique_violation())
            {
                CreateUserError::UsernameTaken
            } else {
                CreateUserError::Database(e)
            }
        })?;
        Ok(user)
    }
}
