//! Shared types and models for the Farm Operations Metrics Platform
//!
//! This crate holds the canonical record types, the per-source field tables
//! used to normalize raw rows, and the projection arithmetic shared between
//! the backend and the dashboard (via WASM).

pub mod models;
pub mod normalize;
pub mod projection;
pub mod types;
pub mod validation;

pub use models::*;
pub use normalize::*;
pub use projection::*;
pub use types::*;
pub use validation::*;
