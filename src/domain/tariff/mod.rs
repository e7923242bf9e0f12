//! Tariff aggregate
//!
//! Contains the rate table and the tiered fee calculator.

pub mod calculator;
pub mod model;

pub use calculator::FeeCalculator;
pub use model::{RateTable, RateTier};
