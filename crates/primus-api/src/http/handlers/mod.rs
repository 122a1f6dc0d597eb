//! HTTP request handlers for the REST API.

pub mod catalog;
pub mod character;
pub mod rules;
