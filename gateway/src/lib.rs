use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, Router};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use verba_ai::{CompletionCfg, CompletionClient, GrammarState};
use verba_core::{AppState, AuthCfg};

/// Requests carry short texts; anything bigger is refused up front.
const BODY_LIMIT: usize = 1024 * 1024;

pub struct GatewayCfg {
    pub port: u16,
    pub database_url: String,
    pub auth: AuthCfg,
    pub completion: CompletionCfg,
}

impl GatewayCfg {
    pub fn from_env() -> Result<Self> {
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or("sqlite://verba.db?mode=rwc".into());

        Ok(Self {
            port,
            database_url,
            auth: AuthCfg::from_env()?,
            completion: CompletionCfg::from_env()?,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(database_url);
    opt.sqlx_logging(false);
    Database::connect(opt)
        .await
        .with_context(|| format!("connecting to {}", redact(database_url)))
}

/// Builds the full HTTP surface from the two apps.
pub fn app(core: AppState, completion: CompletionClient) -> Router {
    let grammar = GrammarState {
        tokens: core.tokens.clone(),
        completion,
    };

    verba_core::urls::router(core)
        .nest("/api/grammar", verba_ai::urls::router(grammar))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

// keep credentials in the URL out of logs
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme), Some(at)) if at > scheme => format!("{}://***{}", &url[..scheme], &url[at..]),
        _ => url.to_string(),
    }
}
