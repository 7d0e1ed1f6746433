//! Repository contracts the identity core is written against.
//!
//! Every call takes the request context; the sqlite implementation bounds
//! each query by the request deadline.

use async_trait::async_trait;

use sso_core::RequestContext;
use sso_core::db::DatabaseError;

use super::db::Database;
use super::models::{NewUser, Pagination, ProfilePatch, RefreshToken, User};

#[async_trait]
pub trait UsersRepo: Send + Sync {
    /// Returns the new user id; a taken email is [`DatabaseError::Conflict`].
    async fn insert(&self, ctx: &RequestContext, user: &NewUser) -> Result<i64, DatabaseError>;

    async fn get_by_id(&self, ctx: &RequestContext, id: i64) -> Result<User, DatabaseError>;

    async fn get_by_email(&self, ctx: &RequestContext, email: &str)
    -> Result<User, DatabaseError>;

    async fn list(
        &self,
        ctx: &RequestContext,
        pagination: Option<Pagination>,
    ) -> Result<Vec<User>, DatabaseError>;

    async fn update_profile(
        &self,
        ctx: &RequestContext,
        id: i64,
        patch: &ProfilePatch,
    ) -> Result<(), DatabaseError>;

    async fn set_email_confirmed(&self, ctx: &RequestContext, id: i64)
    -> Result<(), DatabaseError>;

    async fn set_password(
        &self,
        ctx: &RequestContext,
        id: i64,
        password_hash: &str,
    ) -> Result<(), DatabaseError>;
}

#[async_trait]
pub trait AuthRepo: Send + Sync {
    /// Store a new active refresh token, expiring any the user still holds.
    async fn create_refresh_token(
        &self,
        ctx: &RequestContext,
        user_id: i64,
        value: &str,
        ttl: i64,
    ) -> Result<i64, DatabaseError>;

    /// Only tokens with `ttl > now` are returned.
    async fn get_active_refresh_token_by_user(
        &self,
        ctx: &RequestContext,
        user_id: i64,
    ) -> Result<RefreshToken, DatabaseError>;

    async fn expire_refresh_token(
        &self,
        ctx: &RequestContext,
        value: &str,
    ) -> Result<(), DatabaseError>;

    /// Returns the number of rows removed.
    async fn delete_expired_refresh_tokens(
        &self,
        ctx: &RequestContext,
        before: i64,
    ) -> Result<u64, DatabaseError>;
}

#[async_trait]
impl UsersRepo for Database {
    async fn insert(&self, ctx: &RequestContext, user: &NewUser) -> Result<i64, DatabaseError> {
        ctx.guard(self.insert_user(user)).await?
    }

    async fn get_by_id(&self, ctx: &RequestContext, id: i64) -> Result<User, DatabaseError> {
        ctx.guard(self.get_user(id)).await?
    }

    async fn get_by_email(
        &self,
        ctx: &RequestContext,
        email: &str,
    ) -> Result<User, DatabaseError> {
        ctx.guard(self.get_user_by_email(email)).await?
    }

    async fn list(
        &self,
        ctx: &RequestContext,
        pagination: Option<Pagination>,
    ) -> Result<Vec<User>, DatabaseError> {
        ctx.guard(self.list_users(pagination)).await?
    }

    async fn update_profile(
        &self,
        ctx: &RequestContext,
        id: i64,
        patch: &ProfilePatch,
    ) -> Result<(), DatabaseError> {
        ctx.guard(self.update_user_profile(id, patch)).await?
    }

    async fn set_email_confirmed(
        &self,
        ctx: &RequestContext,
        id: i64,
    ) -> Result<(), DatabaseError> {
        ctx.guard(Database::set_email_confirmed(self, id)).await?
    }

    async fn set_password(
        &self,
        ctx: &RequestContext,
        id: i64,
        password_hash: &str,
    ) -> Result<(), DatabaseError> {
        ctx.guard(Database::set_password(self, id, password_hash))
            .await?
    }
}

#[async_trait]
impl AuthRepo for Database {
    async fn create_refresh_token(
        &self,
        ctx: &RequestContext,
        user_id: i64,
        value: &str,
        ttl: i64,
    ) -> Result<i64, DatabaseError> {
        ctx.guard(Database::create_refresh_token(self, user_id, value, ttl))
            .await?
    }

    async fn get_active_refresh_token_by_user(
        &self,
        ctx: &RequestContext,
        user_id: i64,
    ) -> Result<RefreshToken, DatabaseError> {
        ctx.guard(Database::get_active_refresh_token_by_user(self, user_id))
            .await?
    }

    async fn expire_refresh_token(
        &self,
        ctx: &RequestContext,
        value: &str,
    ) -> Result<(), DatabaseError> {
        ctx.guard(Database::expire_refresh_token(self, value))
            .await?
    }

    async fn delete_expired_refresh_tokens(
        &self,
        ctx: &RequestContext,
        before: i64,
    ) -> Result<u64, DatabaseError> {
        ctx.guard(Database::delete_expired_refresh_tokens(self, before))
            .await?
    }
}
