use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
    body::Body,
    Json,
};
use chrono::Utc;
use rand::rngs::OsRng;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, SqlErr};
use tracing::{info, warn};

use crate::error::{json_body, ApiError};
use crate::models::user::{self, Column as UserCol, Entity as User};
use crate::serializers::user_auth::{
    AuthResp, AuthUser, LoginReq, MessageResp, SignupReq, UserPublic,
};
use crate::token::{AuthError, TokenCodec};
use crate::{AppState, AuthCfg};

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm as ArgonAlgorithm, Argon2, Version,
};

const MSG_MISSING_CREDENTIALS: &str = "Username and password are required";
const MSG_USERNAME_TAKEN: &str = "Username already exists";
const MSG_BAD_CREDENTIALS: &str = "Invalid username or password";

// ---------- handlers ----------
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupReq>, JsonRejection>,
) -> Result<Json<AuthResp>, ApiError> {
    let req = json_body(body)?;
    let (username, password) = required_credentials(req.username, req.password)?;

    if User::find()
        .filter(UserCol::Username.eq(&username))
        .one(&state.db)
        .await
        .map_err(ApiError::internal)?
        .is_some()
    {
        return Err(ApiError::Conflict(MSG_USERNAME_TAKEN.into()));
    }

    let hash = hash_off_thread(password, state.auth_cfg.clone())
        .await
        .map_err(ApiError::internal)?;

    // a concurrent signup can still win the race; the unique index decides
    user::ActiveModel {
        id: NotSet,
        username: Set(username.clone()),
        password_hash: Set(hash),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await
    .map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ApiError::Conflict(MSG_USERNAME_TAKEN.into()),
        _ => ApiError::internal(e),
    })?;

    let token = state.tokens.issue(&username).map_err(ApiError::internal)?;
    info!(%username, "user signed up");

    Ok(Json(AuthResp {
        success: true,
        message: "Signup successful".into(),
        token,
        user: UserPublic { username },
    }))
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginReq>, JsonRejection>,
) -> Result<Json<AuthResp>, ApiError> {
    let req = json_body(body)?;
    let (username, password) = required_credentials(req.username, req.password)?;

    let Some(found) = User::find()
        .filter(UserCol::Username.eq(&username))
        .one(&state.db)
        .await
        .map_err(ApiError::internal)?
    else {
        return Err(ApiError::Unauthorized(MSG_BAD_CREDENTIALS.into()));
    };

    if !verify_off_thread(found.password_hash.clone(), password, state.auth_cfg.clone())
        .await
        .map_err(ApiError::internal)?
    {
        return Err(ApiError::Unauthorized(MSG_BAD_CREDENTIALS.into()));
    }

    let token = state.tokens.issue(&found.username).map_err(ApiError::internal)?;
    info!(username = %found.username, "user logged in");

    Ok(Json(AuthResp {
        success: true,
        message: "Login successful".into(),
        token,
        user: UserPublic {
            username: found.username,
        },
    }))
}

/// Tokens are not revoked; they stay valid until they expire.
pub async fn logout() -> Json<MessageResp> {
    Json(MessageResp {
        success: true,
        message: "Logged out successfully".into(),
    })
}

// ---------- bearer auth ----------
pub fn authenticate(tokens: &TokenCodec, headers: &HeaderMap) -> Result<String, AuthError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;
    tokens.verify(token)
}

/// Middleware for protected routes: rejects the request before the handler
/// runs unless it carries a valid bearer token.
pub async fn require_bearer(
    State(tokens): State<TokenCodec>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    match authenticate(&tokens, req.headers()) {
        Ok(username) => {
            req.extensions_mut().insert(AuthUser { username });
            Ok(next.run(req).await)
        }
        Err(err) => {
            warn!(path = %req.uri().path(), reason = %err, "bearer auth failed");
            Err(ApiError::Auth(err))
        }
    }
}

fn required_credentials(
    username: Option<String>,
    password: Option<String>,
) -> Result<(String, String), ApiError> {
    match (username, password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Ok((u, p)),
        _ => Err(ApiError::Validation(MSG_MISSING_CREDENTIALS.into())),
    }
}

// ---------- password hashing ----------
// Argon2 is CPU- and memory-heavy; keep it off the async workers.
async fn hash_off_thread(password: String, cfg: AuthCfg) -> Result<String, anyhow::Error> {
    tokio::task::spawn_blocking(move || hash_password(&password, &cfg)).await?
}

async fn verify_off_thread(
    phc: String,
    password: String,
    cfg: AuthCfg,
) -> Result<bool, anyhow::Error> {
    tokio::task::spawn_blocking(move || verify_password(&phc, &password, &cfg)).await?
}

fn argon(cfg: &AuthCfg) -> Result<Argon2<'static>, anyhow::Error> {
    let params = cfg.argon_params()?;
    Ok(Argon2::new(ArgonAlgorithm::Argon2id, Version::V0x13, params))
}

fn hash_password(password: &str, cfg: &AuthCfg) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon(cfg)?
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify_password(phc: &str, password: &str, cfg: &AuthCfg) -> Result<bool, anyhow::Error> {
    let parsed = PasswordHash::new(phc)?;
    Ok(argon(cfg)?
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
