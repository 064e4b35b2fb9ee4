//! HTTP handlers for the Farm Operations Metrics Platform

pub mod dashboard;
pub mod health;
pub mod production_report;

pub use dashboard::*;
pub use health::*;
pub use production_report::*;
