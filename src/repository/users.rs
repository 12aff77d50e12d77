//! Users repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{conflict_on_unique, AppError, AppResult},
    models::user::{RegisterUser, User},
};

const USER_COLUMNS: &str = "id, username, email, first_name, last_name, password, is_staff, is_active, date_joined, last_login";

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username (case-insensitive)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let query = format!("SELECT {} FROM users WHERE LOWER(username) = LOWER($1)", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Check if username already exists
    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(username) = LOWER($1))")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a regular (non-staff) account
    pub async fn create(&self, form: &RegisterUser, password_hash: &str) -> AppResult<User> {
        let query = format!(
            r#"
            INSERT INTO users (username, email, first_name, last_name, password)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&form.username)
            .bind(&form.email)
            .bind(&form.first_name)
            .bind(&form.last_name)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "A user with that username already exists."))
    }

    pub async fn touch_last_login(&self, id: i32) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remember a logged-out token until it would have expired anyway
    pub async fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("INSERT INTO revoked_tokens (jti, expires_at) VALUES ($1, $2) ON CONFLICT (jti) DO NOTHING")
            .bind(jti)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < NOW()")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn is_token_revoked(&self, jti: Uuid) -> AppResult<bool> {
        let revoked: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM revoked_tokens WHERE jti = $1)")
            .bind(jti)
            .fetch_one(&self.pool)
            .await?;
        Ok(revoked)
    }

    /// False once the account is deleted or deactivated
    pub async fn is_active(&self, id: i32) -> AppResult<bool> {
        let active: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND is_active)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(active)
    }
}
