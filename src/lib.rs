//! Forum backend: posts, comments, categories and likes behind a JSON API.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
