//! Email confirmation and password flows.

use tracing::{info, instrument, warn};

use sso_core::RequestContext;

use crate::auth::{TokenKind, encoding};
use crate::error::{Result, SsoError};

use super::UseCases;

impl UseCases {
    /// Sign a verify-email token for `user_id` and publish it.
    pub(super) async fn publish_verify_email(&self, ctx: &RequestContext, user_id: i64) -> Result<()> {
        let (token, _) = self
            .jwt
            .issue_verify_email_token(user_id)
            .map_err(|e| SsoError::Internal(format!("token creation failed: {e}")))?;

        self.notifier
            .verify_email(ctx, user_id.unsigned_abs(), encoding::encode(token))
            .await?;
        Ok(())
    }

    /// Re-send the verify-email event to an unconfirmed account.
    #[instrument(skip_all, fields(request_id = ctx.request_id(), email = %email))]
    pub async fn send_verify_email_message(&self, ctx: &RequestContext, email: &str) -> Result<()> {
        let user = self.users_service.get_user_by_email(ctx, email).await?;

        if user.email_confirmed {
            return Err(SsoError::EmailAlreadyConfirmed);
        }

        self.publish_verify_email(ctx, user.id).await.inspect_err(|e| {
            warn!(user_id = user.id, error = %e, "Verify-email notification failed");
        })
    }

    /// Confirm the email of the account the token was issued for.
    #[instrument(skip_all, fields(request_id = ctx.request_id()))]
    pub async fn verify_user_email(&self, ctx: &RequestContext, verify_email_token: &str) -> Result<()> {
        let user_id = self.user_id_from_opaque_token(verify_email_token, TokenKind::VerifyEmail)?;
        let user = self.users_service.get_user_by_id(ctx, user_id).await?;

        if user.email_confirmed {
            return Err(SsoError::EmailAlreadyConfirmed);
        }

        self.users_service.set_email_confirmed(ctx, user_id).await?;
        info!(user_id, "Email confirmed");
        Ok(())
    }

    /// Publish a forget-password token to a confirmed account.
    #[instrument(skip_all, fields(request_id = ctx.request_id(), email = %email))]
    pub async fn send_forget_password_message(&self, ctx: &RequestContext, email: &str) -> Result<()> {
        let user = self.users_service.get_user_by_email(ctx, email).await?;

        if !user.email_confirmed {
            return Err(SsoError::EmailIsNotConfirmed);
        }

        let (token, _) = self
            .jwt
            .issue_forget_password_token(user.id)
            .map_err(|e| SsoError::Internal(format!("token creation failed: {e}")))?;

        self.notifier
            .forget_password(ctx, user.id.unsigned_abs(), encoding::encode(token))
            .await
            .map_err(|e| {
                warn!(user_id = user.id, error = %e, "Forget-password notification failed");
                SsoError::from(e)
            })
    }

    /// Set a new password using a forget-password token.
    #[instrument(skip_all, fields(request_id = ctx.request_id()))]
    pub async fn forget_password(
        &self,
        ctx: &RequestContext,
        forget_password_token: &str,
        new_password: &str,
    ) -> Result<()> {
        self.validator.validate_password(new_password)?;

        let user_id =
            self.user_id_from_opaque_token(forget_password_token, TokenKind::ForgetPassword)?;
        let user = self.users_service.get_user_by_id(ctx, user_id).await?;

        if self.verify_password(ctx, new_password, &user.password_hash).await? {
            return Err(SsoError::InvalidPassword);
        }

        let password_hash = self.hash_password(ctx, new_password).await?;
        self.users_service
            .set_password(ctx, user_id, &password_hash)
            .await?;

        info!(user_id, "Password reset");
        Ok(())
    }

    /// Change the caller's password after checking the current one.
    #[instrument(skip_all, fields(request_id = ctx.request_id()))]
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        access_token: &str,
        old_password: &str,
        new_password: &str,
    ) -> Result<()> {
        self.validator.validate_password(new_password)?;
        if old_password == new_password {
            return Err(SsoError::InvalidPassword);
        }

        let user_id = self.user_id_from_access_token(access_token)?;
        let user = self.users_service.get_user_by_id(ctx, user_id).await?;

        if !self.verify_password(ctx, old_password, &user.password_hash).await? {
            return Err(SsoError::WrongPassword);
        }

        let password_hash = self.hash_password(ctx, new_password).await?;
        self.users_service
            .set_password(ctx, user_id, &password_hash)
            .await?;

        info!(user_id, "Password changed");
        Ok(())
    }
}
