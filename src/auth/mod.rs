//! Access/refresh credential pair (HS256 JWT) and password hashing.

mod middleware;
mod password;

pub use middleware::{require_bearer, AuthUser};
pub use password::{PasswordError, PasswordHasher};

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Access credential lifetime.
pub const ACCESS_TTL_SECS: i64 = 60 * 60;
/// Refresh credential lifetime.
pub const REFRESH_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    #[serde(rename = "userID")]
    pub user_id: i64,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshClaims {
    #[serde(rename = "userID")]
    pub user_id: i64,
    #[serde(rename = "accessToken")]
    pub access_token: String,
    pub iat: i64,
    pub exp: i64,
}

/// Login response body. Neither token is stored server-side.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Access token is missing.")]
    Missing,
    #[error("Invalid access token.")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Signing secrets for both credentials.
pub struct TokenKeys {
    access_enc: EncodingKey,
    access_dec: DecodingKey,
    refresh_enc: EncodingKey,
}

impl TokenKeys {
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access_enc: EncodingKey::from_secret(access_secret.as_bytes()),
            access_dec: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_enc: EncodingKey::from_secret(refresh_secret.as_bytes()),
        }
    }

    /// Mint an access credential and a refresh credential that embeds it.
    pub fn issue_pair(&self, user_id: i64) -> Result<TokenPair, AuthError> {
        let now = Utc::now();
        let access = AccessClaims {
            user_id,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ACCESS_TTL_SECS)).timestamp(),
        };
        let access_token =
            encode(&Header::default(), &access, &self.access_enc).map_err(AuthError::Signing)?;
        let refresh = RefreshClaims {
            user_id,
            access_token: access_token.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(REFRESH_TTL_SECS)).timestamp(),
        };
        let refresh_token =
            encode(&Header::default(), &refresh, &self.refresh_enc).map_err(AuthError::Signing)?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Check signature and expiry of an access credential.
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        decode::<AccessClaims>(token, &self.access_dec, &Validation::default())
            .map(|data| data.claims)
            .map_err(AuthError::Invalid)
    }
}
