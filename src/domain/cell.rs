//! # Cell Values
//!
//! A `CellValue` is one decoded field of a result row. The pipeline renders
//! every cell to text exactly once, here, with a fixed locale-independent
//! form: period decimal separator, ISO-style dates, empty string for NULL.
//! The rendering never consults the process locale, so two machines with
//! different regional settings produce byte-identical artifacts.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;

/// One typed field of a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Arbitrary-precision NUMERIC values; kept exact rather than widened to f64.
    Decimal(Decimal),
    Date(NaiveDate),
    Time(NaiveTime),
    Timestamp(NaiveDateTime),
    /// Timezone-aware timestamps are normalized to UTC at decode time.
    TimestampTz(DateTime<Utc>),
    Text(String),
}

impl CellValue {
    /// Renders the cell to its canonical textual form.
    ///
    /// NULL renders as the empty string. Numbers always use a period as the
    /// decimal separator and carry no grouping separators. Temporal values
    /// use fixed layouts (`%Y-%m-%d`, `%H:%M:%S`, fractional seconds only
    /// when non-zero); timezone-aware timestamps render in UTC with a `Z`
    /// suffix. Text passes through verbatim — CSV quoting is the writer's
    /// concern, not the cell's.
    pub fn render(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::Decimal(d) => d.to_string(),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::Time(t) => t.format("%H:%M:%S%.f").to_string(),
            CellValue::Timestamp(ts) => ts.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
            CellValue::TimestampTz(ts) => ts.format("%Y-%m-%dT%H:%M:%S%.fZ").to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}
