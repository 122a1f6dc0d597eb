//! Dry-run validation endpoint.

use std::time::Instant;

use axum::Json;
use axum::extract::State;

use primus_types::character::CharacterDraft;
use primus_types::rules::ValidationReport;

use crate::http::extractors::auth::Authenticated;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/rules/validate - Validate a draft without saving it.
///
/// Always 200: an invalid draft is a normal outcome reported in the body.
pub async fn validate_draft(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(draft): Json<CharacterDraft>,
) -> Json<ApiResponse<ValidationReport>> {
    let start = Instant::now();
    let report = state.character_service.validate(&draft);
    Json(ApiResponse::success(report, start))
}
