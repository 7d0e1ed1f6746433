//! JWT claims structure for SSO tokens.

use serde::{Deserialize, Serialize};

/// What a token may be used for. A token is only accepted where its kind is
/// expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
    VerifyEmail,
    ForgetPassword,
}

/// Payload carried in the `value` claim.
///
/// Access, verify-email and forget-password tokens carry the user id; refresh
/// tokens carry the access token they were issued with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    UserId(i64),
    Text(String),
}

impl TokenValue {
    pub const fn as_user_id(&self) -> Option<i64> {
        match self {
            Self::UserId(id) => Some(*id),
            Self::Text(_) => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            Self::UserId(_) => None,
        }
    }
}

/// JWT claims embedded in every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// JWT ID (unique per token).
    pub jti: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
    pub token_type: TokenKind,
    pub value: TokenValue,
}
