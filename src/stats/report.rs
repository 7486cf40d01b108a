//! Report of the three group statistics for one month.

use serde::Serialize;

/// Printed in place of a statistic with no rows to reduce.
const MISSING: &str = "nan";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupReport {
    pub year: i32,
    pub month: u32,
    pub min_size: i64,
    /// Rows created in the month.
    pub groups: usize,
    pub max_participants: Option<i64>,
    pub avg_participants: Option<f64>,
    pub avg_messages: Option<f64>,
}

impl GroupReport {
    /// Three `Q1`..`Q3` lines, newline terminated.
    pub fn render_text(&self) -> String {
        format!(
            "Q1: Max participants: {}\n\
             Q2: Average participants: {}\n\
             Q3: Average messages in large groups: {}\n",
            fmt_int(self.max_participants),
            fmt_float(self.avg_participants),
            fmt_float(self.avg_messages),
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn fmt_int(value: Option<i64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| v.to_string())
}

// Debug keeps the trailing ".0" on whole floats.
fn fmt_float(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{v:?}"))
}
