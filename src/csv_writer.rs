//! # CSV Writer
//!
//! Streams a header and a lazy sequence of rows into the canonical CSV
//! encoding: UTF-8 without a byte-order mark, comma-separated fields, fields
//! containing a comma, double quote, CR or LF wrapped in double quotes with
//! internal quotes doubled, every line terminated by a single `\n`.
//!
//! The writer pulls one row at a time and never collects the result set.
//! On a mid-stream fault it fails fast, leaving the partially written file
//! behind; a failed run means the destination must not be trusted.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::cell::CellValue;
use crate::domain::errors::Result;

/// Counters for one written artifact.
#[derive(Debug, Default, Clone)]
pub struct CsvStats {
    /// Data rows written, excluding the header.
    pub rows: u64,
    /// Approximate uncompressed payload bytes (field text plus separators).
    pub bytes: u64,
}

/// Writes the header and all rows to `out`, flushing before returning.
///
/// `rows` is a lazy, forward-only, finite sequence; each item is a full row
/// in column order. A row whose field count differs from the header is a
/// programming error upstream and surfaces as a write failure.
pub fn write_csv<W, I>(columns: &[String], rows: I, out: W) -> Result<CsvStats>
where
    W: Write,
    I: IntoIterator<Item = Result<Vec<CellValue>>>,
{
    // csv defaults are exactly the canonical profile: comma delimiter,
    // quote-on-demand with doubled quotes, `\n` record terminator.
    let mut wtr = csv::WriterBuilder::new().from_writer(out);

    wtr.write_record(columns)?;

    let mut stats = CsvStats::default();
    for row in rows {
        let cells = row?;
        let mut record = Vec::with_capacity(cells.len());
        for cell in &cells {
            let field = cell.render();
            stats.bytes += field.len() as u64;
            record.push(field);
        }
        // one separator between fields, one newline per row
        stats.bytes += record.len().saturating_sub(1) as u64 + 1;
        wtr.write_record(&record)?;
        stats.rows += 1;
    }

    wtr.flush()?;
    Ok(stats)
}

/// Creates (or truncates) `dest` and writes the full artifact to it.
pub fn write_csv_file<I>(columns: &[String], rows: I, dest: &Path) -> Result<CsvStats>
where
    I: IntoIterator<Item = Result<Vec<CellValue>>>,
{
    let file = File::create(dest)?;
    let out = BufWriter::with_capacity(128 * 1024, file);
    write_csv(columns, rows, out)
}
