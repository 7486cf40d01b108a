//! CSV Data Loader Module
//! Reads the group export with Polars and normalizes the typed columns.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::{CREATED_DATE, PARTICIPANT_COUNT, REQUIRED_COLUMNS, TOTAL_MESSAGES};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("Unparseable created_date on line {line}: '{value}'")]
    InvalidDate { line: usize, value: String },
    #[error("Non-integral {column} on line {line}: {value}")]
    InvalidCount {
        column: &'static str,
        line: usize,
        value: f64,
    },
}

/// Days between 0001-01-01 and 1970-01-01, the physical origin of a Polars `Date`.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S%.f",
];

const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Parse the calendar date out of an ISO-like date or timestamp.
///
/// Time of day and UTC offsets are dropped; the date is the one written in
/// the text, not the one it would map to in UTC.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local().date());
    }
    if let Some(dt) = OFFSET_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
    {
        return Some(dt.naive_local().date());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        })
}

/// Loads the group export into a `DataFrame`.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file and normalize its group columns.
    pub fn load(path: impl AsRef<Path>) -> Result<DataFrame, LoaderError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(LoaderError::NotFound(path.to_path_buf()));
        }

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()?;

        let df = Self::normalize(df)?;
        info!(path = %path.display(), rows = df.height(), "loaded group export");
        Ok(df)
    }

    /// Check the required columns and convert them to their working types:
    /// `created_date` to `Date`, the two counts to `Int64`.
    pub fn normalize(mut df: DataFrame) -> Result<DataFrame, LoaderError> {
        for name in REQUIRED_COLUMNS {
            if df.get_column_index(name).is_none() {
                return Err(LoaderError::MissingColumn(name));
            }
        }

        let dates = Self::parse_created_dates(&df)?;
        df.with_column(dates)?;

        for name in [PARTICIPANT_COUNT, TOTAL_MESSAGES] {
            let counts = Self::integral_counts(df.column(name)?, name)?;
            df.with_column(counts)?;
        }

        Ok(df)
    }

    /// Cast a count column to `Int64`, refusing fractional values that a
    /// plain cast would truncate.
    fn integral_counts(column: &Column, name: &'static str) -> Result<Column, LoaderError> {
        if column.dtype().is_float() {
            let values = column.cast(&DataType::Float64)?;
            if let Some((row, value)) = values
                .f64()?
                .into_iter()
                .enumerate()
                .find_map(|(row, v)| {
                    v.filter(|v| v.fract() != 0.0 || !v.is_finite())
                        .map(|v| (row, v))
                })
            {
                return Err(LoaderError::InvalidCount {
                    column: name,
                    line: row + 2,
                    value,
                });
            };
        }
        Ok(column.strict_cast(&DataType::Int64)?)
    }

    /// Build a `Date` column from the textual `created_date` column.
    ///
    /// Blank cells become null. Any other value that does not parse fails the
    /// whole load.
    fn parse_created_dates(df: &DataFrame) -> Result<Column, LoaderError> {
        let raw = df.column(CREATED_DATE)?.cast(&DataType::String)?;
        let text = raw.str()?;

        let days = text
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(v) if v.trim().is_empty() => Ok(None),
                Some(v) => parse_date(v)
                    .map(|date| Some(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE))
                    .ok_or_else(|| LoaderError::InvalidDate {
                        // header is line 1
                        line: row + 2,
                        value: v.to_string(),
                    }),
            })
            .collect::<Result<Vec<Option<i32>>, _>>()?;

        debug!(rows = days.len(), "parsed created_date column");
        Ok(Column::new(CREATED_DATE.into(), days).cast(&DataType::Date)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("dim_groups.csv");
        fs::write(&path, body).unwrap();
        path
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_date_accepts_iso_variants() {
        assert_eq!(parse_date("2024-10-05"), Some(ymd(2024, 10, 5)));
        assert_eq!(parse_date("2024/10/05"), Some(ymd(2024, 10, 5)));
        assert_eq!(parse_date("2024-10-05 13:45:10"), Some(ymd(2024, 10, 5)));
        assert_eq!(parse_date("2024-10-05 13:45"), Some(ymd(2024, 10, 5)));
        assert_eq!(parse_date("2024-10-05T13:45:10.250"), Some(ymd(2024, 10, 5)));
        assert_eq!(parse_date("2024-10-31T23:30:00Z"), Some(ymd(2024, 10, 31)));
        assert_eq!(
            parse_date("2024-11-01 00:30:00+02:00"),
            Some(ymd(2024, 11, 1))
        );
        assert_eq!(parse_date("  2024-10-05  "), Some(ymd(2024, 10, 5)));
    }

    #[test]
    fn parse_date_accepts_compact_offset_with_t_separator() {
        assert_eq!(
            parse_date("2024-10-05T10:00:00+0200"),
            Some(ymd(2024, 10, 5))
        );
        assert_eq!(
            parse_date("2024-10-31T23:15:00.5-0700"),
            Some(ymd(2024, 10, 31))
        );
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2024-13-01"), None);
        assert_eq!(parse_date("2024-02-30"), None);
    }

    #[test]
    fn load_parses_dates_and_counts() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "group_id,created_date,participant_count,total_messages\n\
             a,2024-10-05,40,100\n\
             b,2024-10-20 08:00:00,60,200\n\
             c,2024-11-01,90,300\n",
        );

        let df = DataLoader::load(&path).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.column(CREATED_DATE).unwrap().dtype(), &DataType::Date);
        assert_eq!(
            df.column(PARTICIPANT_COUNT).unwrap().dtype(),
            &DataType::Int64
        );
        assert_eq!(df.column(TOTAL_MESSAGES).unwrap().dtype(), &DataType::Int64);
        // untouched extra column
        assert!(df.column("group_id").is_ok());
    }

    #[test]
    fn load_keeps_blank_dates_as_null() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "created_date,participant_count,total_messages\n\
             2024-10-05,40,100\n\
             ,60,200\n",
        );

        let df = DataLoader::load(&path).unwrap();
        assert_eq!(df.column(CREATED_DATE).unwrap().null_count(), 1);
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = DataLoader::load(dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }

    #[test]
    fn load_rejects_missing_column() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "created_date,participant_count\n2024-10-05,40\n");

        let err = DataLoader::load(&path).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(TOTAL_MESSAGES)));
    }

    #[test]
    fn load_rejects_unparseable_date() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "created_date,participant_count,total_messages\n\
             2024-10-05,40,100\n\
             not-a-date,60,200\n",
        );

        match DataLoader::load(&path).unwrap_err() {
            LoaderError::InvalidDate { line, value } => {
                assert_eq!(line, 3);
                assert_eq!(value, "not-a-date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_rejects_fractional_count() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "created_date,participant_count,total_messages\n\
             2024-10-05,40.7,100\n\
             2024-10-06,60.9,201\n",
        );

        match DataLoader::load(&path).unwrap_err() {
            LoaderError::InvalidCount {
                column,
                line,
                value,
            } => {
                assert_eq!(column, PARTICIPANT_COUNT);
                assert_eq!(line, 2);
                assert_eq!(value, 40.7);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn load_accepts_whole_float_counts() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "created_date,participant_count,total_messages\n\
             2024-10-05,40.0,100\n\
             2024-10-06,60.0,201.0\n",
        );

        let df = DataLoader::load(&path).unwrap();
        let counts: Vec<Option<i64>> = df
            .column(PARTICIPANT_COUNT)
            .unwrap()
            .i64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(counts, vec![Some(40), Some(60)]);
    }

    #[test]
    fn load_header_only_file_yields_empty_frame() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "created_date,participant_count,total_messages\n");

        let df = DataLoader::load(&path).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.column(CREATED_DATE).unwrap().dtype(), &DataType::Date);
    }
}
