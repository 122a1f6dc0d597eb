//! Infrastructure layer for Primus.
//!
//! Contains implementations of the ports defined in `primus-core`: the three
//! character stores (SQLite, in-memory, JSON file), API key verifiers, the
//! configuration and catalog loaders, and data directory resolution.

pub mod auth;
pub mod config;
pub mod file;
pub mod filesystem;
pub mod memory;
pub mod sqlite;
