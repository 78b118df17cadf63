//! Infrastructure adapter for executing the configured query against
//! PostgreSQL and streaming the result set into a CSV artifact.
//!
//! The query is prepared first so column names and types are known even for
//! an empty result, then executed once with `query_raw`, which yields rows
//! lazily off the wire. Each row is decoded into typed cells and handed to
//! the CSV writer; nothing is buffered beyond the row in flight.

use std::path::Path;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use fallible_iterator::FallibleIterator;
use log::info;
use postgres::types::{FromSqlOwned, ToSql, Type};
use postgres::{Client, NoTls, Row};
use rust_decimal::Decimal;

use crate::csv_writer;
use crate::domain::cell::CellValue;
use crate::domain::errors::{ExportError, Result};
use crate::ports::extraction::{ExtractionPort, ExtractionStats};

/// Concrete implementation of `ExtractionPort` for PostgreSQL.
pub struct PostgresExtractionAdapter {
    conn_str: String,
    command_timeout_secs: u64,
}

impl PostgresExtractionAdapter {
    pub fn new(conn_str: String, command_timeout_secs: u64) -> Self {
        Self {
            conn_str,
            command_timeout_secs,
        }
    }

    /// Establishes a fresh session for this run: read-only, with the
    /// configured statement timeout.
    fn connect(&self) -> Result<Client> {
        let mut client = Client::connect(&self.conn_str, NoTls)?;
        client.batch_execute(&format!(
            "SET default_transaction_read_only = on; SET statement_timeout = '{}s'",
            self.command_timeout_secs
        ))?;
        Ok(client)
    }
}

impl ExtractionPort for PostgresExtractionAdapter {
    fn extract(&self, query: &str, dest: &Path) -> Result<ExtractionStats> {
        let start = Instant::now();
        let mut client = self.connect()?;

        let stmt = client.prepare(query)?;
        let columns: Vec<String> = stmt.columns().iter().map(|c| c.name().to_string()).collect();
        let types: Vec<Type> = stmt.columns().iter().map(|c| c.type_().clone()).collect();

        info!("Executing query ({} columns)", columns.len());
        let params: Vec<&(dyn ToSql + Sync)> = Vec::new();
        let row_iter = client.query_raw(&stmt, params)?;

        let rows = row_iter
            .iterator()
            .map(|res| res.map_err(ExportError::from).and_then(|row| decode_row(&row, &types)));

        let stats = csv_writer::write_csv_file(&columns, rows, dest)?;

        Ok(ExtractionStats {
            rows: stats.rows,
            bytes: stats.bytes,
            duration_secs: start.elapsed().as_secs_f64(),
        })
    }
}

fn decode_row(row: &Row, types: &[Type]) -> Result<Vec<CellValue>> {
    let mut cells = Vec::with_capacity(types.len());
    for (i, ty) in types.iter().enumerate() {
        cells.push(decode_cell(row, i, ty)?);
    }
    Ok(cells)
}

fn decode_cell(row: &Row, i: usize, ty: &Type) -> Result<CellValue> {
    let cell = if *ty == Type::BOOL {
        get::<bool>(row, i)?.map(CellValue::Bool)
    } else if *ty == Type::INT2 {
        get::<i16>(row, i)?.map(|v| CellValue::Int(v as i64))
    } else if *ty == Type::INT4 {
        get::<i32>(row, i)?.map(|v| CellValue::Int(v as i64))
    } else if *ty == Type::INT8 {
        get::<i64>(row, i)?.map(CellValue::Int)
    } else if *ty == Type::FLOAT4 {
        get::<f32>(row, i)?.map(|v| CellValue::Float(v as f64))
    } else if *ty == Type::FLOAT8 {
        get::<f64>(row, i)?.map(CellValue::Float)
    } else if *ty == Type::NUMERIC {
        get::<Decimal>(row, i)?.map(CellValue::Decimal)
    } else if *ty == Type::DATE {
        get::<NaiveDate>(row, i)?.map(CellValue::Date)
    } else if *ty == Type::TIME {
        get::<NaiveTime>(row, i)?.map(CellValue::Time)
    } else if *ty == Type::TIMESTAMP {
        get::<NaiveDateTime>(row, i)?.map(CellValue::Timestamp)
    } else if *ty == Type::TIMESTAMPTZ {
        get::<DateTime<Utc>>(row, i)?.map(CellValue::TimestampTz)
    } else if *ty == Type::BPCHAR {
        // CHAR(n) arrives space-padded; trailing pad is noise in an export
        get::<String>(row, i)?.map(|v| CellValue::Text(v.trim_end().to_string()))
    } else if *ty == Type::TEXT || *ty == Type::VARCHAR || *ty == Type::NAME {
        get::<String>(row, i)?.map(CellValue::Text)
    } else {
        return Err(ExportError::DataSource(format!(
            "column \"{}\" has unsupported type {}; cast it to text in the query",
            row.columns()[i].name(),
            ty.name()
        )));
    };
    Ok(cell.unwrap_or(CellValue::Null))
}

fn get<T: FromSqlOwned>(row: &Row, i: usize) -> Result<Option<T>> {
    row.try_get::<_, Option<T>>(i).map_err(|e| {
        ExportError::DataSource(format!("column \"{}\": {}", row.columns()[i].name(), e))
    })
}
