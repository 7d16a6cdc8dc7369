use axum::{middleware, routing::post, Router};
use verba_core::views::user_auth::require_bearer;

use crate::views::grammar_check::check;
use crate::GrammarState;

pub fn router(state: GrammarState) -> Router {
    Router::new()
        .route("/check", post(check))
        .route_layer(middleware::from_fn_with_state(
            state.tokens.clone(),
            require_bearer,
        ))
        .with_state(state)
}
