use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of both signup and login. Fields are optional so that a missing
/// field reports the same validation message as an empty one.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CredentialsReq {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub type SignupReq = CredentialsReq;
pub type LoginReq = CredentialsReq;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UserPublic {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResp {
    pub success: bool,
    pub message: String,
    /// bearer token, valid for one hour
    pub token: String,
    pub user: UserPublic,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResp {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // username
    pub jti: Uuid,
    pub iat: i64,
    pub exp: i64,
    /// expiry in unix milliseconds; the one that is enforced
    pub exp_ms: i64,
    pub iss: String,
    pub aud: String,
}

/// Inserted into request extensions once the bearer token checks out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub username: String,
}
