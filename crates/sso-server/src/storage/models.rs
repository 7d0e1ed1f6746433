//! Data models for SSO storage.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub email_confirmed: bool,
    pub display_name: String,
    pub phone: Option<String>,
    pub phone_confirmed: bool,
    pub telegram: Option<String>,
    pub telegram_confirmed: bool,
    pub avatar: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RefreshToken {
    pub id: i64,
    pub user_id: i64,
    pub value: String,
    /// Absolute expiry; the token is active while `ttl > now`.
    pub ttl: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Fields supplied at registration. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
}

/// Sparse profile update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub telegram: Option<String>,
    pub avatar: Option<String>,
}

impl ProfilePatch {
    pub const fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.phone.is_none()
            && self.telegram.is_none()
            && self.avatar.is_none()
    }
}

/// Page window for user listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Zero means [`Pagination::DEFAULT_LIMIT`].
    pub limit: u32,
    pub offset: u64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u32 = 100;

    pub const fn effective_limit(&self) -> u32 {
        if self.limit == 0 {
            Self::DEFAULT_LIMIT
        } else {
            self.limit
        }
    }
}
