//! Identity operations.
//!
//! [`UseCases`] owns token pairing and rotation, email confirmation and the
//! password flows. It depends only on the repository, publisher and signing
//! capabilities handed to it at construction.

mod auth;
mod email;
mod users;


use std::sync::Arc;

use tracing::warn;

use sso_core::RequestContext;
use sso_core::db::{DatabaseError, unix_timestamp};

use crate::auth::password::{self, PasswordError};
use crate::auth::{JwtManager, TokenKind, encoding};
use crate::error::{Result, SsoError};
use crate::notifications::Notifier;
use crate::services::{AuthService, UsersService};
use crate::storage::{AuthRepo, UsersRepo};
use crate::validation::Validator;

pub use auth::RegisterUser;

/// Access token plus the opaque-encoded refresh token it is paired with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

pub struct UseCases {
    auth_repo: Arc<dyn AuthRepo>,
    auth_service: AuthService,
    users_service: UsersService,
    jwt: Arc<JwtManager>,
    validator: Validator,
    notifier: Notifier,
    hash_cost: u32,
}

impl UseCases {
    pub fn new(
        users_repo: Arc<dyn UsersRepo>,
        auth_repo: Arc<dyn AuthRepo>,
        jwt: Arc<JwtManager>,
        validator: Validator,
        notifier: Notifier,
        hash_cost: u32,
    ) -> Self {
        Self {
            auth_repo,
            auth_service: AuthService::new(Arc::clone(&users_repo)),
            users_service: UsersService::new(users_repo),
            jwt,
            validator,
            notifier,
            hash_cost,
        }
    }

    /// Delete refresh tokens that expired before now. Returns the count.
    pub async fn purge_expired_refresh_tokens(&self, ctx: &RequestContext) -> Result<u64> {
        Ok(self
            .auth_repo
            .delete_expired_refresh_tokens(ctx, unix_timestamp())
            .await?)
    }

    /// Hash off the async runtime, bounded by the request deadline. An
    /// over-long password is `InvalidPassword`.
    async fn hash_password(&self, ctx: &RequestContext, plain: &str) -> Result<String> {
        let plain = plain.to_string();
        let cost = self.hash_cost;
        ctx.guard(tokio::task::spawn_blocking(move || {
            password::hash_password(&plain, cost)
        }))
        .await?
        .map_err(|e| SsoError::Internal(format!("hashing task failed: {e}")))?
            .map_err(|e| match e {
                PasswordError::TooLong => SsoError::InvalidPassword,
                PasswordError::Hash(e) => SsoError::Internal(format!("hashing failed: {e}")),
            })
    }

    async fn verify_password(&self, ctx: &RequestContext, plain: &str, hash: &str) -> Result<bool> {
        let plain = plain.to_string();
        let hash = hash.to_string();
        ctx.guard(tokio::task::spawn_blocking(move || {
            password::verify_password(&plain, &hash)
        }))
        .await?
        .map_err(|e| SsoError::Internal(format!("verification task failed: {e}")))
    }

    fn user_id_from_access_token(&self, access_token: &str) -> Result<i64> {
        Ok(self.jwt.parse_access_token(access_token)?)
    }

    /// Recover the user id from an opaque verify-email or forget-password token.
    fn user_id_from_opaque_token(&self, token: &str, kind: TokenKind) -> Result<i64> {
        let decoded = encoding::decode_string(token).map_err(|_| SsoError::InvalidJwt)?;
        Ok(self.jwt.parse_user_token(&decoded, kind)?)
    }

    /// Sign a fresh access/refresh pair and store the refresh token.
    async fn issue_token_pair(&self, ctx: &RequestContext, user_id: i64) -> Result<TokenPair> {
        let (access_token, _) = self
            .jwt
            .issue_access_token(user_id)
            .map_err(|e| SsoError::Internal(format!("token creation failed: {e}")))?;
        let (refresh_token, refresh_exp) = self
            .jwt
            .issue_refresh_token(&access_token)
            .map_err(|e| SsoError::Internal(format!("token creation failed: {e}")))?;

        self.auth_repo
            .create_refresh_token(ctx, user_id, &refresh_token, refresh_exp)
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => SsoError::RefreshTokenAlreadyExists,
                other => {
                    warn!(request_id = ctx.request_id(), user_id, error = %other, "Refresh token storage failed");
                    other.into()
                }
            })?;

        Ok(TokenPair {
            access_token,
            refresh_token: encoding::encode(refresh_token),
        })
    }

    /// Expire the user's active refresh token, if there is one.
    ///
    /// Returns whether a token was expired.
    async fn expire_active_refresh_token(&self, ctx: &RequestContext, user_id: i64) -> Result<bool> {
        let token = match self.auth_repo.get_active_refresh_token_by_user(ctx, user_id).await {
            Ok(token) => token,
            Err(DatabaseError::NotFound(_)) => return Ok(false),
            Err(e) => return Err(e.into()),
        };

        self.auth_repo
            .expire_refresh_token(ctx, &token.value)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound(_) => SsoError::RefreshTokenNotFound,
                other => other.into(),
            })?;
        Ok(true)
    }
}
