//! Shared domain types for Primus.
//!
//! This crate contains the core domain types used across the Primus
//! character manager: Character, the ability score model, the game catalog
//! tables, rule-engine reports, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod auth;
pub mod catalog;
pub mod character;
pub mod config;
pub mod error;
pub mod rules;
