//! Registration, login, token rotation and logout.

use tracing::{info, instrument, warn};

use sso_core::RequestContext;
use sso_core::db::DatabaseError;

use crate::auth::encoding;
use crate::error::{Result, SsoError};
use crate::storage::NewUser;

use super::{TokenPair, UseCases};

/// Registration input. The password is plaintext here and never stored.
#[derive(Clone)]
pub struct RegisterUser {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl std::fmt::Debug for RegisterUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterUser")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .finish_non_exhaustive()
    }
}

impl UseCases {
    /// Create an unverified account and send the verify-email event.
    ///
    /// A failed publish is logged; the account stays registered.
    #[instrument(skip_all, fields(request_id = ctx.request_id(), email = %input.email))]
    pub async fn register(&self, ctx: &RequestContext, input: RegisterUser) -> Result<i64> {
        self.validator.validate_email(&input.email)?;
        self.validator.validate_password(&input.password)?;
        self.validator.validate_display_name(&input.display_name)?;

        let password_hash = self.hash_password(ctx, &input.password).await?;

        let user_id = self
            .auth_service
            .register_user(
                ctx,
                &NewUser {
                    email: input.email,
                    password_hash,
                    display_name: input.display_name,
                },
            )
            .await?;

        info!(user_id, "User registered");

        if let Err(e) = self.publish_verify_email(ctx, user_id).await {
            warn!(user_id, error = %e, "Verify-email notification dropped");
        }

        Ok(user_id)
    }

    /// Authenticate by email and password and start a new session.
    ///
    /// Any session the user still holds is expired first.
    #[instrument(skip_all, fields(request_id = ctx.request_id(), email = %email))]
    pub async fn login(&self, ctx: &RequestContext, email: &str, password: &str) -> Result<TokenPair> {
        let user = self.users_service.get_user_by_email(ctx, email).await?;

        if !user.email_confirmed {
            return Err(SsoError::EmailIsNotConfirmed);
        }

        if !self.verify_password(ctx, password, &user.password_hash).await? {
            warn!(user_id = user.id, "Failed login attempt");
            return Err(SsoError::WrongPassword);
        }

        self.expire_active_refresh_token(ctx, user.id).await?;

        let pair = self.issue_token_pair(ctx, user.id).await?;
        info!(user_id = user.id, "User logged in");
        Ok(pair)
    }

    /// Redeem an opaque refresh token for a new pair.
    ///
    /// Every token-related failure reads as `InvalidJwt`.
    #[instrument(skip_all, fields(request_id = ctx.request_id()))]
    pub async fn refresh_tokens(&self, ctx: &RequestContext, refresh_token: &str) -> Result<TokenPair> {
        let refresh_token = encoding::decode_string(refresh_token).map_err(|_| SsoError::InvalidJwt)?;

        let access_token = self.jwt.parse_refresh_token(&refresh_token)?;
        let user_id = self.jwt.parse_embedded_access_token(&access_token)?;

        let stored = match self
            .auth_repo
            .get_active_refresh_token_by_user(ctx, user_id)
            .await
        {
            Ok(stored) => stored,
            Err(DatabaseError::NotFound(_)) => return Err(SsoError::InvalidJwt),
            Err(e) => {
                warn!(user_id, error = %e, "Refresh token lookup failed");
                return Err(e.into());
            }
        };

        if stored.value != refresh_token {
            warn!(user_id, "Refresh token does not match the active one");
            return Err(SsoError::InvalidJwt);
        }

        let stored_access_token = self.jwt.parse_refresh_token(&stored.value)?;
        if stored_access_token != access_token {
            return Err(SsoError::AccessTokenDoesNotBelongToRefreshToken);
        }

        if let Err(e) = self.auth_repo.expire_refresh_token(ctx, &stored.value).await {
            warn!(user_id, error = %e, "Refresh token expiry failed");
            return Err(SsoError::InvalidJwt);
        }

        let pair = self.issue_token_pair(ctx, user_id).await?;
        info!(user_id, "Tokens rotated");
        Ok(pair)
    }

    /// End the caller's session. Succeeds when there is none.
    #[instrument(skip_all, fields(request_id = ctx.request_id()))]
    pub async fn logout(&self, ctx: &RequestContext, access_token: &str) -> Result<()> {
        let user_id = self.user_id_from_access_token(access_token)?;

        match self.expire_active_refresh_token(ctx, user_id).await {
            Ok(true) => info!(user_id, "User logged out"),
            // Lost a race with a concurrent logout or rotation.
            Ok(false) | Err(SsoError::RefreshTokenNotFound) => {}
            Err(e) => return Err(e),
        }
        Ok(())
    }
}
