use std::sync::Arc;

use tracing::warn;

use sso_core::RequestContext;
use sso_core::db::DatabaseError;

use crate::error::{Result, SsoError};
use crate::storage::{Pagination, ProfilePatch, User, UsersRepo};

pub struct UsersService {
    users: Arc<dyn UsersRepo>,
}

impl UsersService {
    pub fn new(users: Arc<dyn UsersRepo>) -> Self {
        Self { users }
    }

    pub async fn get_user_by_id(&self, ctx: &RequestContext, id: i64) -> Result<User> {
        self.users
            .get_by_id(ctx, id)
            .await
            .map_err(|e| not_found(ctx, e))
    }

    pub async fn get_user_by_email(&self, ctx: &RequestContext, email: &str) -> Result<User> {
        self.users
            .get_by_email(ctx, email)
            .await
            .map_err(|e| not_found(ctx, e))
    }

    pub async fn get_all_users(
        &self,
        ctx: &RequestContext,
        pagination: Option<Pagination>,
    ) -> Result<Vec<User>> {
        Ok(self.users.list(ctx, pagination).await?)
    }

    pub async fn update_user_profile(
        &self,
        ctx: &RequestContext,
        id: i64,
        patch: &ProfilePatch,
    ) -> Result<()> {
        Ok(self.users.update_profile(ctx, id, patch).await?)
    }

    /// Confirm the email once. A repeated confirmation is
    /// [`SsoError::EmailAlreadyConfirmed`].
    pub async fn set_email_confirmed(&self, ctx: &RequestContext, id: i64) -> Result<()> {
        self.users
            .set_email_confirmed(ctx, id)
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => SsoError::EmailAlreadyConfirmed,
                DatabaseError::NotFound(_) => SsoError::UserNotFound,
                other => other.into(),
            })
    }

    pub async fn set_password(
        &self,
        ctx: &RequestContext,
        id: i64,
        password_hash: &str,
    ) -> Result<()> {
        Ok(self.users.set_password(ctx, id, password_hash).await?)
    }
}

/// Every lookup failure reads as a missing user, except an elapsed deadline.
/// Unexpected causes are logged.
fn not_found(ctx: &RequestContext, e: DatabaseError) -> SsoError {
    match e {
        DatabaseError::NotFound(_) => SsoError::UserNotFound,
        DatabaseError::DeadlineExceeded => SsoError::DeadlineExceeded,
        other => {
            warn!(request_id = ctx.request_id(), error = %other, "User lookup failed");
            SsoError::UserNotFound
        }
    }
}
