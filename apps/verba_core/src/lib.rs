pub mod error;
pub mod models;
pub mod serializers;
pub mod token;
pub mod urls;
pub mod views;

use anyhow::{Context, Result};
use sea_orm::DatabaseConnection;
use tracing::info;

pub use error::ApiError;
pub use token::{AuthError, TokenCodec};

#[derive(Clone)]
pub struct AuthCfg {
    /// HMAC secret for bearer tokens. Set with JWT_SECRET.
    pub jwt_secret: String,
    /// Argon2id memory cost in KiB (default 19456). Override with ARGON2_M_COST.
    pub argon_m_cost: u32,
    /// Argon2id passes (default 2). Override with ARGON2_T_COST.
    pub argon_t_cost: u32,
}

impl AuthCfg {
    pub fn from_env() -> Result<Self> {
        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }
        let argon_m_cost = std::env::var("ARGON2_M_COST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(19_456); // ~19MB
        let argon_t_cost = std::env::var("ARGON2_T_COST")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(2);

        let cfg = Self {
            jwt_secret,
            argon_m_cost,
            argon_t_cost,
        };
        cfg.argon_params()
            .context("invalid ARGON2_M_COST / ARGON2_T_COST")?;
        Ok(cfg)
    }

    /// Argon2id parameters, single lane.
    pub fn argon_params(&self) -> Result<argon2::Params, argon2::Error> {
        argon2::Params::new(self.argon_m_cost, self.argon_t_cost, 1, None)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub tokens: TokenCodec,
    pub auth_cfg: AuthCfg,
}

impl AppState {
    pub fn new(db: DatabaseConnection, auth_cfg: AuthCfg) -> Self {
        let tokens = TokenCodec::new(auth_cfg.jwt_secret.as_bytes());
        Self {
            db,
            tokens,
            auth_cfg,
        }
    }
}

/// Ensure DB schema is up-to-date (calls migration crate).
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<()> {
    use migration::Migrator;
    use sea_orm_migration::MigratorTrait;
    Migrator::up(db, None).await?;
    info!("database schema is up to date");
    Ok(())
}
