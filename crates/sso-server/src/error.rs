//! Error kinds returned by identity operations and their gRPC status mapping.

use tonic::Status;

use sso_core::DeadlineExceeded;
use sso_core::db::DatabaseError;

use crate::auth::InvalidJwt;
use crate::notifications::NotificationError;

/// Closed set of failures an identity operation can report.
#[derive(Debug, thiserror::Error)]
pub enum SsoError {
    #[error("user not found")]
    UserNotFound,

    #[error("user already exists")]
    UserAlreadyExists,

    #[error("wrong password")]
    WrongPassword,

    #[error("invalid jwt")]
    InvalidJwt,

    #[error("access token does not belong to refresh token")]
    AccessTokenDoesNotBelongToRefreshToken,

    #[error("email already confirmed")]
    EmailAlreadyConfirmed,

    #[error("email is not confirmed")]
    EmailIsNotConfirmed,

    #[error("invalid email")]
    InvalidEmail,

    #[error("invalid password")]
    InvalidPassword,

    #[error("invalid display name")]
    InvalidDisplayName,

    #[error("invalid phone")]
    InvalidPhone,

    #[error("invalid telegram")]
    InvalidTelegram,

    #[error("refresh token not found")]
    RefreshTokenNotFound,

    #[error("refresh token already exists")]
    RefreshTokenAlreadyExists,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("storage error: {0}")]
    Database(#[source] DatabaseError),

    #[error("notification error: {0}")]
    Notification(#[from] NotificationError),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, SsoError>;

impl From<DatabaseError> for SsoError {
    fn from(e: DatabaseError) -> Self {
        match e {
            DatabaseError::DeadlineExceeded => Self::DeadlineExceeded,
            other => Self::Database(other),
        }
    }
}

impl From<InvalidJwt> for SsoError {
    fn from(_: InvalidJwt) -> Self {
        Self::InvalidJwt
    }
}

impl From<DeadlineExceeded> for SsoError {
    fn from(_: DeadlineExceeded) -> Self {
        Self::DeadlineExceeded
    }
}

impl From<SsoError> for Status {
    fn from(e: SsoError) -> Self {
        match e {
            SsoError::UserNotFound => Self::not_found(e.to_string()),
            SsoError::UserAlreadyExists => Self::already_exists(e.to_string()),
            SsoError::WrongPassword
            | SsoError::InvalidJwt
            | SsoError::AccessTokenDoesNotBelongToRefreshToken => {
                Self::unauthenticated(e.to_string())
            }
            SsoError::EmailAlreadyConfirmed
            | SsoError::EmailIsNotConfirmed
            | SsoError::InvalidEmail
            | SsoError::InvalidPassword
            | SsoError::InvalidDisplayName
            | SsoError::InvalidPhone
            | SsoError::InvalidTelegram => Self::failed_precondition(e.to_string()),
            SsoError::DeadlineExceeded => Self::deadline_exceeded(e.to_string()),
            SsoError::RefreshTokenNotFound
            | SsoError::RefreshTokenAlreadyExists
            | SsoError::Database(_)
            | SsoError::Notification(_)
            | SsoError::Internal(_) => Self::internal("internal error"),
        }
    }
}
