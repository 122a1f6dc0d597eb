use thiserror::Error;

use crate::rules::ValidationReport;

/// Errors related to character operations.
#[derive(Debug, Error)]
pub enum CharacterError {
    #[error("character not found")]
    NotFound,

    #[error("invalid character id: '{0}'")]
    InvalidId(String),

    #[error("character failed validation: {}", .0.summary())]
    Invalid(Box<ValidationReport>),

    #[error("storage error: {0}")]
    StorageError(String),
}

/// Errors from repository operations (used by trait definitions in primus-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors raised while resolving a bearer credential.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing credential")]
    Missing,

    #[error("invalid or unknown credential")]
    Invalid,

    #[error("credential store error: {0}")]
    StorageError(String),
}

/// Errors raised while building the game catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate {kind} id '{id}'")]
    DuplicateId { kind: &'static str, id: String },

    #[error("archetype '{archetype}' references unknown role '{role}'")]
    UnknownArchetypeRole { archetype: String, role: String },

    #[error("skill '{skill}' references unknown role '{role}'")]
    UnknownSkillRole { skill: String, role: String },

    #[error("failed to parse catalog: {0}")]
    Parse(String),
}

/// Errors in semantically invalid configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("score floor {floor} is above the ceiling {ceiling}")]
    InvertedScoreRange { floor: u8, ceiling: u8 },

    #[error("stepped point-buy scores must lie within [8, 15], got [{floor}, {ceiling}]")]
    SteppedRangeOutOfDomain { floor: u8, ceiling: u8 },

    #[error("minimum level {min} is above the maximum {max}")]
    InvertedLevelRange { min: u32, max: u32 },

    #[error("minimum level must be at least 1")]
    ZeroMinimumLevel,
}
