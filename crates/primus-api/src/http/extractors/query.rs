//! Query parameter extractors for list endpoints.

use serde::Deserialize;

use primus_core::repository::SortOrder;
use primus_core::repository::character::{CharacterFilter, CharacterSort};

use crate::http::error::AppError;

/// Query parameters for the character list endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct CharacterListQuery {
    /// Filter by role id.
    pub role: Option<String>,
    /// Filter by exact level.
    pub level: Option<u32>,
    /// Sort by field (created_at, updated_at, name, level).
    pub sort: Option<String>,
    /// Sort order (asc, desc).
    pub order: Option<String>,
    /// Maximum results.
    pub limit: Option<i64>,
    /// Offset for pagination.
    pub offset: Option<i64>,
}

impl CharacterListQuery {
    pub fn into_filter(self) -> Result<CharacterFilter, AppError> {
        let sort_by = self
            .sort
            .as_deref()
            .map(str::parse::<CharacterSort>)
            .transpose()
            .map_err(AppError::BadRequest)?;
        let sort_order = self
            .order
            .as_deref()
            .map(str::parse::<SortOrder>)
            .transpose()
            .map_err(AppError::BadRequest)?;

        if self.limit.is_some_and(|limit| limit < 0) {
            return Err(AppError::BadRequest("limit must not be negative".to_string()));
        }
        if self.offset.is_some_and(|offset| offset < 0) {
            return Err(AppError::BadRequest("offset must not be negative".to_string()));
        }

        Ok(CharacterFilter {
            role: self.role,
            level: self.level,
            sort_by,
            sort_order,
            limit: self.limit,
            offset: self.offset,
        })
    }
}
