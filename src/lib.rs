//! groupstats - monthly statistics over a chat group CSV export.
//!
//! Load with [`data::DataLoader`], narrow to one month with
//! [`data::DataProcessor::filter_by_month`], and reduce with
//! [`stats::StatsCalculator`].

pub mod config;
pub mod data;
pub mod stats;
