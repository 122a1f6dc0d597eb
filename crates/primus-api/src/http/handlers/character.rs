//! Character CRUD handlers for the REST API.
//!
//! Every handler is scoped to the authenticated owner; another owner's
//! character is indistinguishable from a missing one.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use primus_core::sheet::CharacterSheet;
use primus_types::character::{
    Character, CharacterId, CharacterStats, CreateCharacterRequest, UpdateCharacterRequest,
};
use primus_types::error::CharacterError;

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::extractors::query::CharacterListQuery;
use crate::http::response::ApiResponse;
use crate::state::AppState;

fn parse_id(raw: &str) -> Result<CharacterId, AppError> {
    raw.parse()
        .map_err(|_| CharacterError::InvalidId(raw.to_string()).into())
}

fn character_href(id: &CharacterId) -> String {
    format!("/api/v1/characters/{id}")
}

/// POST /api/v1/characters - Create a new character.
pub async fn create_character(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Json(body): Json<CreateCharacterRequest>,
) -> Result<ApiResponse<Character>, AppError> {
    let start = Instant::now();
    let character = state
        .character_service
        .create(&principal.owner_id, body)
        .await?;

    let href = character_href(&character.id);
    Ok(ApiResponse::success(character, start)
        .with_status(StatusCode::CREATED)
        .with_link("sheet", format!("{href}/sheet"))
        .with_link("self", href))
}

/// GET /api/v1/characters - List the caller's characters.
pub async fn list_characters(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Query(query): Query<CharacterListQuery>,
) -> Result<ApiResponse<Vec<Character>>, AppError> {
    let start = Instant::now();
    let filter = query.into_filter()?;
    let characters = state
        .character_service
        .list(&principal.owner_id, &filter)
        .await?;

    Ok(ApiResponse::success(characters, start)
        .with_link("self", "/api/v1/characters")
        .with_link("stats", "/api/v1/characters/stats"))
}

/// GET /api/v1/characters/stats - Count, mean level and role breakdown.
pub async fn character_stats(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> Result<ApiResponse<CharacterStats>, AppError> {
    let start = Instant::now();
    let stats = state.character_service.stats(&principal.owner_id).await?;
    Ok(ApiResponse::success(stats, start))
}

/// GET /api/v1/characters/{id}
pub async fn get_character(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> Result<ApiResponse<Character>, AppError> {
    let start = Instant::now();
    let id = parse_id(&id)?;
    let character = state.character_service.get(&principal.owner_id, &id).await?;

    let href = character_href(&character.id);
    Ok(ApiResponse::success(character, start)
        .with_link("sheet", format!("{href}/sheet"))
        .with_link("self", href))
}

/// GET /api/v1/characters/{id}/sheet - Derived, printable view.
pub async fn get_character_sheet(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> Result<ApiResponse<CharacterSheet>, AppError> {
    let start = Instant::now();
    let id = parse_id(&id)?;
    let sheet = state.character_service.sheet(&principal.owner_id, &id).await?;
    Ok(ApiResponse::success(sheet, start).with_link("character", character_href(&id)))
}

/// PUT /api/v1/characters/{id} - Partial update; the result is re-validated.
pub async fn update_character(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
    Json(body): Json<UpdateCharacterRequest>,
) -> Result<ApiResponse<Character>, AppError> {
    let start = Instant::now();
    let id = parse_id(&id)?;
    let character = state
        .character_service
        .update(&principal.owner_id, &id, body)
        .await?;

    let href = character_href(&character.id);
    Ok(ApiResponse::success(character, start).with_link("self", href))
}

/// DELETE /api/v1/characters/{id} - Delete permanently.
pub async fn delete_character(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> Result<ApiResponse<serde_json::Value>, AppError> {
    let start = Instant::now();
    let id = parse_id(&id)?;
    let deleted = state
        .character_service
        .delete(&principal.owner_id, &id)
        .await?;

    Ok(ApiResponse::success(
        serde_json::json!({"deleted": true, "id": deleted.id, "name": deleted.name}),
        start,
    ))
}
