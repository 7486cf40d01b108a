//! Data module - CSV loading and month filtering

mod loader;
mod processor;

pub use loader::{parse_date, DataLoader, LoaderError};
pub use processor::{DataProcessor, ProcessorError};

/// Creation date of a group.
pub const CREATED_DATE: &str = "created_date";
/// Number of members in a group.
pub const PARTICIPANT_COUNT: &str = "participant_count";
/// Cumulative message count of a group.
pub const TOTAL_MESSAGES: &str = "total_messages";

/// Columns every input file must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = [CREATED_DATE, PARTICIPANT_COUNT, TOTAL_MESSAGES];
