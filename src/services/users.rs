use sqlx::PgPool;
use tracing::instrument;

use crate::{
    error::AppResult,
    models::{NewUser, User},
};

/// Read/insert access to user records
///
/// Implementations hold no copies of records between calls; the backing store
/// owns identity and lifetime.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// All users in ascending id order. An empty table yields an empty list.
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// The user with this id, or `None` when no such row exists.
    ///
    /// A missing row is not an error; only failures talking to the database are.
    async fn get_user(&self, id: i32) -> AppResult<Option<User>>;

    /// Inserts a new row unconditionally and returns it with its assigned id.
    async fn create_user(&self, new_user: NewUser) -> AppResult<User>;
}

/// PostgreSQL-backed user store
#[derive(Clone)]
pub struct PgUserService {
    pool: PgPool,
}

impl PgUserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl UserStore for PgUserService {
    #[instrument(skip(self))]
    async fn list_users(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT id, name, email FROM users ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(count = users.len(), "Listed users");
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: i32) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        tracing::debug!(found = user.is_some(), "Looked up user");
        Ok(user)
    }

    #[instrument(skip(self, new_user))]
    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email
            "#,
        )
        .bind(new_user.name)
        .bind(new_user.email)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(id = user.id, "Created user");
        Ok(user)
    }
}
