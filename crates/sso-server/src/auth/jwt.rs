//! JWT token issuance and validation.

use std::str::FromStr;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use sso_core::config::JwtConfig;
use sso_core::db::unix_timestamp;

use super::claims::{Claims, TokenKind, TokenValue};

/// Any parse, signature, expiry, kind or claim-shape failure. Carries no
/// detail on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid token")]
pub struct InvalidJwt;

/// Manages JWT token creation and validation.
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    verify_email_ttl_secs: i64,
    forget_password_ttl_secs: i64,
}

impl JwtManager {
    /// Create a new `JwtManager` signing with `secret` under `algorithm`.
    pub fn new(
        secret: &[u8],
        algorithm: Algorithm,
        access_ttl_secs: i64,
        refresh_ttl_secs: i64,
    ) -> Self {
        let defaults = JwtConfig::default();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm,
            access_ttl_secs,
            refresh_ttl_secs,
            verify_email_ttl_secs: defaults.verify_email_ttl_secs,
            forget_password_ttl_secs: defaults.forget_password_ttl_secs,
        }
    }

    pub fn from_config(config: &JwtConfig) -> Result<Self, jsonwebtoken::errors::Error> {
        let algorithm = Algorithm::from_str(&config.algorithm)?;
        let mut jwt = Self::new(
            config.secret.as_bytes(),
            algorithm,
            config.access_ttl_secs,
            config.refresh_ttl_secs,
        );
        jwt.verify_email_ttl_secs = config.verify_email_ttl_secs;
        jwt.forget_password_ttl_secs = config.forget_password_ttl_secs;
        Ok(jwt)
    }

    /// Sign `value` as a token of `kind` expiring `ttl_secs` from now.
    ///
    /// Returns the signed token and its absolute expiry.
    pub fn generate(
        &self,
        value: TokenValue,
        kind: TokenKind,
        ttl_secs: i64,
    ) -> Result<(String, i64), jsonwebtoken::errors::Error> {
        let now = unix_timestamp();
        let exp = now + ttl_secs;

        let claims = Claims {
            jti: uuid::Uuid::new_v4().to_string(),
            iat: now,
            exp,
            token_type: kind,
            value,
        };

        let token = jsonwebtoken::encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?;
        Ok((token, exp))
    }

    /// Verify signature, expiry and kind, and return the payload.
    pub fn parse(&self, token: &str, kind: TokenKind) -> Result<TokenValue, InvalidJwt> {
        self.decode(token, kind, true).map(|claims| claims.value)
    }

    fn decode(&self, token: &str, kind: TokenKind, check_exp: bool) -> Result<Claims, InvalidJwt> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_exp = check_exp;

        let claims = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| InvalidJwt)?
            .claims;

        if claims.token_type != kind {
            return Err(InvalidJwt);
        }
        Ok(claims)
    }

    /// Issue an access token for the given user.
    pub fn issue_access_token(&self, user_id: i64) -> Result<(String, i64), jsonwebtoken::errors::Error> {
        self.generate(TokenValue::UserId(user_id), TokenKind::Access, self.access_ttl_secs)
    }

    /// Issue a refresh token bound to `access_token`.
    pub fn issue_refresh_token(
        &self,
        access_token: &str,
    ) -> Result<(String, i64), jsonwebtoken::errors::Error> {
        self.generate(
            TokenValue::Text(access_token.to_string()),
            TokenKind::Refresh,
            self.refresh_ttl_secs,
        )
    }

    pub fn issue_verify_email_token(
        &self,
        user_id: i64,
    ) -> Result<(String, i64), jsonwebtoken::errors::Error> {
        self.generate(
            TokenValue::UserId(user_id),
            TokenKind::VerifyEmail,
            self.verify_email_ttl_secs,
        )
    }

    pub fn issue_forget_password_token(
        &self,
        user_id: i64,
    ) -> Result<(String, i64), jsonwebtoken::errors::Error> {
        self.generate(
            TokenValue::UserId(user_id),
            TokenKind::ForgetPassword,
            self.forget_password_ttl_secs,
        )
    }

    /// Recover the user id from a live access token.
    pub fn parse_access_token(&self, token: &str) -> Result<i64, InvalidJwt> {
        self.parse_user_token(token, TokenKind::Access)
    }

    /// Recover the user id from an access token, accepting expired ones.
    ///
    /// Only used for the access token embedded in a refresh token, whose own
    /// expiry has already been checked.
    pub fn parse_embedded_access_token(&self, token: &str) -> Result<i64, InvalidJwt> {
        self.decode(token, TokenKind::Access, false)?
            .value
            .as_user_id()
            .ok_or(InvalidJwt)
    }

    /// Recover the access token a refresh token was issued with.
    pub fn parse_refresh_token(&self, token: &str) -> Result<String, InvalidJwt> {
        self.parse(token, TokenKind::Refresh)?
            .into_text()
            .ok_or(InvalidJwt)
    }

    /// Recover the user id from a token of `kind` whose payload is a user id.
    pub fn parse_user_token(&self, token: &str, kind: TokenKind) -> Result<i64, InvalidJwt> {
        self.parse(token, kind)?.as_user_id().ok_or(InvalidJwt)
    }

    pub const fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    pub const fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }
}
