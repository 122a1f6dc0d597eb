//! Progression rules, game catalog, and port definitions for Primus.
//!
//! This crate defines the "ports" (repository and auth traits) that the
//! infrastructure layer implements, plus the rule engine every character
//! write passes through. It depends only on `primus-types` -- never on
//! `primus-infra` or any database/IO crate.

pub mod auth;
pub mod catalog;
pub mod repository;
pub mod rules;
pub mod service;
pub mod sheet;
