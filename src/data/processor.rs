//! Data Processor Module
//! Row filters over the loaded group table.

use chrono::NaiveDate;
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

use super::{CREATED_DATE, PARTICIPANT_COUNT};

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Invalid calendar month {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },
}

/// Handles row selection on the group table.
pub struct DataProcessor;

impl DataProcessor {
    /// First day of the month and first day of the following month.
    pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), ProcessorError> {
        let invalid = || ProcessorError::InvalidMonth { year, month };

        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let (next_year, next_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        let end = NaiveDate::from_ymd_opt(next_year, next_month, 1).ok_or_else(invalid)?;

        Ok((start, end))
    }

    /// Keep groups created within the given calendar month.
    ///
    /// Rows with a null `created_date` never match.
    pub fn filter_by_month(
        df: &DataFrame,
        year: i32,
        month: u32,
    ) -> Result<DataFrame, ProcessorError> {
        let (start, end) = Self::month_bounds(year, month)?;

        let filtered = df
            .clone()
            .lazy()
            .filter(
                col(CREATED_DATE)
                    .gt_eq(lit(start))
                    .and(col(CREATED_DATE).lt(lit(end))),
            )
            .collect()?;

        debug!(year, month, rows = filtered.height(), "filtered groups by month");
        Ok(filtered)
    }

    /// Keep groups with strictly more than `min_size` participants.
    pub fn filter_min_size(df: &DataFrame, min_size: i64) -> Result<DataFrame, ProcessorError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(col(PARTICIPANT_COUNT).gt(lit(min_size)))
            .collect()?;

        debug!(min_size, rows = filtered.height(), "filtered groups by size");
        Ok(filtered)
    }
}
