//! Game catalog endpoint.
//!
//! GET /api/v1/catalog - Roles, archetypes, skills and the active point-buy
//! parameters. Public: clients need it to render a character builder before
//! the user has a key.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde_json::json;

use primus_types::catalog::SkillTier;

use crate::http::response::ApiResponse;
use crate::state::AppState;

pub async fn get_catalog(State(state): State<AppState>) -> Json<ApiResponse<serde_json::Value>> {
    let start = Instant::now();
    let rules = state.rules();
    let catalog = rules.catalog();
    let point_buy = rules.point_buy();
    let (min_level, max_level) = rules.level_range();

    let tiers: Vec<_> = SkillTier::ALL
        .iter()
        .map(|tier| json!({"tier": tier, "unlock_level": tier.unlock_level()}))
        .collect();

    let body = json!({
        "roles": catalog.roles(),
        "archetypes": catalog.archetypes(),
        "skills": catalog.skills(),
        "tiers": tiers,
        "point_buy": {
            "budget": point_buy.budget,
            "schedule": point_buy.schedule,
            "score_floor": point_buy.floor,
            "score_ceiling": point_buy.ceiling,
        },
        "levels": {"min": min_level, "max": max_level},
        "enforcement": state.character_service.enforcement(),
    });

    Json(
        ApiResponse::success(body, start)
            .with_link("self", "/api/v1/catalog")
            .with_link("validate", "/api/v1/rules/validate"),
    )
}
