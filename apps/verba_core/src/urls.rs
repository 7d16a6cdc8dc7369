use axum::{
    routing::{get, post},
    Router,
};

use crate::views::{
    user_auth::{login, logout, signup},
    verba_health::{health, index},
};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    let auth = Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout));

    Router::new()
        .route("/", get(index))
        .route("/healthz", get(health))
        .nest("/api/auth", auth)
        .with_state(state)
}
