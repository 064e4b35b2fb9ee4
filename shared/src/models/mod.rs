//! Canonical record models for the Farm Operations Metrics Platform
//!
//! Every source row, whatever its table, is mapped into one of these shapes
//! before any metric is derived from it.

mod fattening;
mod metrics;
mod production;
mod quality;
mod sales;
mod staffing;

pub use fattening::*;
pub use metrics::*;
pub use production::*;
pub use quality::*;
pub use sales::*;
pub use staffing::*;
