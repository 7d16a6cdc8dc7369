use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use tracing::info;
use verba_core::serializers::user_auth::AuthUser;
use verba_core::error::json_body;
use verba_core::ApiError;

use crate::correction::reconcile;
use crate::serializers::grammar_check::{GrammarCheckIn, GrammarCheckResp, GrammarCheckResult};
use crate::upstream::CompletionClient;
use crate::GrammarState;

const MSG_TEXT_REQUIRED: &str = "Text is required";

pub async fn check(
    State(state): State<GrammarState>,
    Extension(user): Extension<AuthUser>,
    body: Result<Json<GrammarCheckIn>, JsonRejection>,
) -> Result<Json<GrammarCheckResp>, ApiError> {
    let req = json_body(body)?;
    let result = check_grammar(&state.completion, &user.username, req.text).await?;
    Ok(Json(GrammarCheckResp {
        success: true,
        result,
    }))
}

/// Validates `text`, asks the provider for corrections and normalizes the
/// answer. Blank input never reaches the provider.
pub async fn check_grammar(
    client: &CompletionClient,
    username: &str,
    text: Option<String>,
) -> Result<GrammarCheckResult, ApiError> {
    let text = text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::Validation(MSG_TEXT_REQUIRED.into()))?;

    info!(%username, chars = text.chars().count(), "checking grammar");
    let raw = client.complete(&text).await?;
    let result = reconcile(&text, &raw);
    info!(%username, corrections = result.errors.len(), "grammar check done");
    Ok(result)
}
