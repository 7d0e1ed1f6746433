//! Refresh token queries for the SSO server.
//!
//! A refresh token is active while `ttl > now`. Expiring a token moves its
//! `ttl` into the past; rows are only removed by garbage collection.

use sso_core::db::{DatabaseError, unix_timestamp};

use super::db::Database;
use super::models::RefreshToken;

impl Database {
    /// Store a refresh token for `user_id`.
    ///
    /// Runs in one transaction that first expires every token of the user
    /// still active, so at most one active token exists per user.
    pub async fn create_refresh_token(
        &self,
        user_id: i64,
        value: &str,
        ttl: i64,
    ) -> Result<i64, DatabaseError> {
        let now = unix_timestamp();
        let mut tx = self.pool().begin().await?;

        sqlx::query(
            "UPDATE refresh_tokens SET ttl = ?, updated_at = ? WHERE user_id = ? AND ttl > ?",
        )
        .bind(now - 1)
        .bind(now)
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query(
            "INSERT INTO refresh_tokens (user_id, value, ttl, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(value)
        .bind(ttl)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(result.last_insert_rowid())
    }

    /// The user's active refresh token, newest first.
    pub async fn get_active_refresh_token_by_user(
        &self,
        user_id: i64,
    ) -> Result<RefreshToken, DatabaseError> {
        sqlx::query_as::<_, RefreshToken>(
            "SELECT * FROM refresh_tokens WHERE user_id = ? AND ttl > ? ORDER BY id DESC LIMIT 1",
        )
        .bind(user_id)
        .bind(unix_timestamp())
        .fetch_optional(self.pool())
        .await?
        .ok_or_else(|| DatabaseError::NotFound(format!("Active refresh token for user {user_id}")))
    }

    /// Expire a refresh token that is still active.
    ///
    /// An unknown or already-expired value is [`DatabaseError::NotFound`], so
    /// two concurrent redemptions of one token cannot both succeed.
    pub async fn expire_refresh_token(&self, value: &str) -> Result<(), DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "UPDATE refresh_tokens SET ttl = ?, updated_at = ? WHERE value = ? AND ttl > ?",
        )
        .bind(now - 1)
        .bind(now)
        .bind(value)
        .bind(now)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Active refresh token".to_string()));
        }
        Ok(())
    }

    /// Delete refresh tokens whose `ttl` is at or before `before`.
    pub async fn delete_expired_refresh_tokens(&self, before: i64) -> Result<u64, DatabaseError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE ttl <= ?")
            .bind(before)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }
}
