//! Statistics Calculator Module
//! Aggregates over the group table. An empty input yields `None`, never an error.

use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use super::GroupReport;
use crate::data::{DataProcessor, ProcessorError, PARTICIPANT_COUNT, TOTAL_MESSAGES};

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error(transparent)]
    Processor(#[from] ProcessorError),
}

/// Handles the group statistics.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Largest participant count.
    pub fn max_participants(df: &DataFrame) -> Result<Option<i64>, StatsError> {
        let max = df
            .column(PARTICIPANT_COUNT)?
            .as_materialized_series()
            .max::<i64>()?;
        Ok(max)
    }

    /// Mean participant count.
    pub fn avg_participants(df: &DataFrame) -> Result<Option<f64>, StatsError> {
        Ok(df.column(PARTICIPANT_COUNT)?.as_materialized_series().mean())
    }

    /// Mean message count over groups with more than `min_size` participants.
    pub fn avg_messages(df: &DataFrame, min_size: i64) -> Result<Option<f64>, StatsError> {
        let large = DataProcessor::filter_min_size(df, min_size)?;
        Ok(large.column(TOTAL_MESSAGES)?.as_materialized_series().mean())
    }

    /// Filter to one calendar month and compute all three statistics.
    pub fn compute_report(
        df: &DataFrame,
        year: i32,
        month: u32,
        min_size: i64,
    ) -> Result<GroupReport, StatsError> {
        let groups = DataProcessor::filter_by_month(df, year, month)?;

        let report = GroupReport {
            year,
            month,
            min_size,
            groups: groups.height(),
            max_participants: Self::max_participants(&groups)?,
            avg_participants: Self::avg_participants(&groups)?,
            avg_messages: Self::avg_messages(&groups, min_size)?,
        };

        debug!(?report, "computed group report");
        Ok(report)
    }
}
