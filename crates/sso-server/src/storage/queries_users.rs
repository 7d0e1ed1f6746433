//! User queries for the SSO server.

use sso_core::db::{DatabaseError, unix_timestamp};

use super::db::Database;
use super::models::{NewUser, Pagination, ProfilePatch, User};

impl Database {
    /// Insert a user and return the id storage assigned to it.
    ///
    /// A duplicate email is reported as [`DatabaseError::Conflict`].
    pub async fn insert_user(&self, user: &NewUser) -> Result<i64, DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, display_name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: i64) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {id}")))
    }

    /// Get a user by exact email.
    pub async fn get_user_by_email(&self, email: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User with email {email}")))
    }

    /// List users ordered by id. Without a page window every user is returned.
    pub async fn list_users(
        &self,
        pagination: Option<Pagination>,
    ) -> Result<Vec<User>, DatabaseError> {
        let users = match pagination {
            Some(page) => {
                sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id LIMIT ? OFFSET ?")
                    .bind(i64::from(page.effective_limit()))
                    .bind(i64::try_from(page.offset).unwrap_or(i64::MAX))
                    .fetch_all(self.pool())
                    .await?
            }
            None => {
                sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
                    .fetch_all(self.pool())
                    .await?
            }
        };

        Ok(users)
    }

    /// Apply a sparse profile update.
    pub async fn update_user_profile(
        &self,
        id: i64,
        patch: &ProfilePatch,
    ) -> Result<(), DatabaseError> {
        let now = unix_timestamp();

        let result = sqlx::query(
            "UPDATE users SET
                display_name = COALESCE(?, display_name),
                phone = COALESCE(?, phone),
                telegram = COALESCE(?, telegram),
                avatar = COALESCE(?, avatar),
                updated_at = ?
             WHERE id = ?",
        )
        .bind(patch.display_name.as_deref())
        .bind(patch.phone.as_deref())
        .bind(patch.telegram.as_deref())
        .bind(patch.avatar.as_deref())
        .bind(now)
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {id}")));
        }
        Ok(())
    }

    /// Mark the user's email as confirmed. There is no way back.
    ///
    /// Only an unconfirmed row is updated; an already confirmed user yields
    /// `Conflict`.
    pub async fn set_email_confirmed(&self, id: i64) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE users SET email_confirmed = 1, updated_at = ? \
             WHERE id = ? AND email_confirmed = 0",
        )
        .bind(unix_timestamp())
        .bind(id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(self.pool())
                .await?;
            return Err(match exists {
                Some(_) => DatabaseError::Conflict(format!("Email of user {id} already confirmed")),
                None => DatabaseError::NotFound(format!("User {id}")),
            });
        }
        Ok(())
    }

    /// Replace the stored password hash.
    pub async fn set_password(&self, id: i64, password_hash: &str) -> Result<(), DatabaseError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
                .bind(password_hash)
                .bind(unix_timestamp())
                .bind(id)
                .execute(self.pool())
                .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("User {id}")));
        }
        Ok(())
    }
}
