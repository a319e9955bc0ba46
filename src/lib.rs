pub mod analytics;
pub mod app;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod queries;
pub mod sessions;
pub mod sse;
pub mod state;
pub mod stats;
pub mod store;
pub mod validation;
pub mod workout_types;
