//! Statistics module - aggregates and the printed report

mod calculator;
mod report;

pub use calculator::{StatsCalculator, StatsError};
pub use report::GroupReport;
