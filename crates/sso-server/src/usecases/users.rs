//! Profile reads and updates.

use tracing::{debug, instrument};

use sso_core::RequestContext;

use crate::error::Result;
use crate::storage::{Pagination, ProfilePatch, User};

use super::UseCases;

impl UseCases {
    #[instrument(skip_all, fields(request_id = ctx.request_id()))]
    pub async fn get_me(&self, ctx: &RequestContext, access_token: &str) -> Result<User> {
        let user_id = self.user_id_from_access_token(access_token)?;
        self.users_service.get_user_by_id(ctx, user_id).await
    }

    #[instrument(skip_all, fields(request_id = ctx.request_id(), user_id = id))]
    pub async fn get_user_by_id(&self, ctx: &RequestContext, id: i64) -> Result<User> {
        self.users_service.get_user_by_id(ctx, id).await
    }

    #[instrument(skip_all, fields(request_id = ctx.request_id(), email = %email))]
    pub async fn get_user_by_email(&self, ctx: &RequestContext, email: &str) -> Result<User> {
        self.users_service.get_user_by_email(ctx, email).await
    }

    #[instrument(skip_all, fields(request_id = ctx.request_id()))]
    pub async fn get_all_users(
        &self,
        ctx: &RequestContext,
        pagination: Option<Pagination>,
    ) -> Result<Vec<User>> {
        self.users_service.get_all_users(ctx, pagination).await
    }

    /// Apply the present fields of `patch` to the caller's profile.
    #[instrument(skip_all, fields(request_id = ctx.request_id()))]
    pub async fn update_user_profile(
        &self,
        ctx: &RequestContext,
        access_token: &str,
        patch: ProfilePatch,
    ) -> Result<()> {
        if let Some(display_name) = &patch.display_name {
            self.validator.validate_display_name(display_name)?;
        }
        if let Some(phone) = &patch.phone {
            self.validator.validate_phone(phone)?;
        }
        if let Some(telegram) = &patch.telegram {
            self.validator.validate_telegram(telegram)?;
        }

        let user_id = self.user_id_from_access_token(access_token)?;
        self.users_service.get_user_by_id(ctx, user_id).await?;

        if patch.is_empty() {
            debug!(user_id, "Empty profile update");
        }
        self.users_service
            .update_user_profile(ctx, user_id, &patch)
            .await
    }
}
