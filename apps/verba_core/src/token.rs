//! Signed, time-limited bearer tokens.
//!
//! A token is an HS256 JWT carrying the username as `sub`. It is accepted
//! while the signature checks out and the current time is strictly before
//! `exp_ms`; there is no server-side revocation. The standard `exp` claim is
//! also set, in whole seconds, for other JWT consumers.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header as JwtHeader, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::serializers::user_auth::Claims;

/// Lifetime of every issued token.
pub const TOKEN_TTL_SECS: i64 = 3600;

const ISSUER: &str = "verba";
const AUDIENCE: &str = "verba-app";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    /// Signature mismatch, but also any token that does not decode.
    #[error("invalid token signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
}

#[derive(Clone)]
pub struct TokenCodec {
    enc: Arc<EncodingKey>,
    dec: Arc<DecodingKey>,
    ttl: ChronoDuration,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            enc: Arc::new(EncodingKey::from_secret(secret)),
            dec: Arc::new(DecodingKey::from_secret(secret)),
            ttl: ChronoDuration::seconds(TOKEN_TTL_SECS),
        }
    }

    pub fn issue(&self, username: &str) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(username, Utc::now())
    }

    pub fn issue_at(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            sub: username.to_string(),
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            exp_ms: (now + self.ttl).timestamp_millis(),
            iss: ISSUER.into(),
            aud: AUDIENCE.into(),
        };
        jsonwebtoken::encode(&JwtHeader::new(Algorithm::HS256), &claims, &self.enc)
    }

    /// Returns the username bound to `token`.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        // expiry is checked below at millisecond precision, `exp` is whole seconds
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = false;
        v.leeway = 0;
        v.set_audience(&[AUDIENCE]);
        v.set_issuer(&[ISSUER]);
        v.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let claims = jsonwebtoken::decode::<Claims>(token, &self.dec, &v)
            .map_err(|_| AuthError::InvalidSignature)?
            .claims;

        if now.timestamp_millis() >= claims.exp_ms {
            return Err(AuthError::Expired);
        }
        Ok(claims.sub)
    }
}
