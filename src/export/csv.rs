//! CSV encoding of fused records
//!
//! Format: UTF-8, `\n` line endings, one header line, then one row per record
//! in buffer order. The timestamp column is milliseconds with 3 decimals and
//! every axis has 6 decimals. Rust float formatting never uses locale
//! separators, so the decimal point is always `.`.

use std::fmt::{self, Write as FmtWrite};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;

use crate::error::{ImuError, Result};
use crate::types::{FusedRecord, Vec3, NANOS_PER_MILLI};

/// Header line of every export
pub const CSV_HEADER: &str = "timestamp_ms,acc_x,acc_y,acc_z,gyro_x,gyro_y,gyro_z";

/// Number of columns per row
pub const CSV_COLUMNS: usize = 7;

/// Rows are ~70 bytes
const ROW_CAPACITY: usize = 72;

/// Format a single data row, without the line terminator
pub fn format_row(record: &FusedRecord) -> String {
    let mut row = String::with_capacity(ROW_CAPACITY);
    let written = write_fields(&mut row, record);
    debug_assert!(written.is_ok(), "writing to a String cannot fail");
    row
}

fn write_fields<W: FmtWrite>(out: &mut W, record: &FusedRecord) -> fmt::Result {
    let [ax, ay, az] = record.acc;
    let [gx, gy, gz] = record.gyro;
    write!(
        out,
        "{:.3},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6}",
        record.timestamp_ms(),
        ax,
        ay,
        az,
        gx,
        gy,
        gz
    )
}

/// Encode records as a complete CSV document
pub fn encode(records: &[FusedRecord]) -> Vec<u8> {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + records.len() * ROW_CAPACITY);
    out.push_str(CSV_HEADER);
    out.push('\n');
    let written = records.iter().try_for_each(|record| {
        write_fields(&mut out, record)?;
        out.write_char('\n')
    });
    debug_assert!(written.is_ok(), "writing to a String cannot fail");
    out.into_bytes()
}

/// Decode a CSV document produced by [`encode`]
///
/// Timestamps come back rounded to the microsecond precision of the file.
pub fn decode(bytes: &[u8]) -> Result<Vec<FusedRecord>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(bytes);

    let header = reader
        .headers()
        .map_err(|e| ImuError::parse(1, format!("unreadable header: {}", e)))?;
    if !header.iter().eq(CSV_HEADER.split(',')) {
        return Err(ImuError::parse(
            1,
            format!("unexpected header {:?}", header.iter().collect::<Vec<_>>()),
        ));
    }

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        // Header is line 1
        let fallback_line = idx + 2;
        let row = row.map_err(|e| {
            let line = e
                .position()
                .map_or(fallback_line, |p| p.line() as usize);
            ImuError::parse(line, format!("CSV error: {}", e))
        })?;
        let line = row
            .position()
            .map_or(fallback_line, |p| p.line() as usize);
        records.push(parse_row(&row, line)?);
    }
    Ok(records)
}

fn parse_row(row: &StringRecord, line_no: usize) -> Result<FusedRecord> {
    if row.len() != CSV_COLUMNS {
        return Err(ImuError::parse(
            line_no,
            format!("expected {} fields, found {}", CSV_COLUMNS, row.len()),
        ));
    }

    let timestamp_ms: f64 = row[0]
        .parse()
        .map_err(|e| ImuError::parse(line_no, format!("timestamp {:?}: {}", &row[0], e)))?;

    let mut axes = [0.0f32; 6];
    for (slot, field) in axes.iter_mut().zip(row.iter().skip(1)) {
        *slot = field
            .parse()
            .map_err(|e| ImuError::parse(line_no, format!("value {:?}: {}", field, e)))?;
    }

    let acc: Vec3 = [axes[0], axes[1], axes[2]];
    let gyro: Vec3 = [axes[3], axes[4], axes[5]];
    Ok(FusedRecord::new(
        (timestamp_ms * NANOS_PER_MILLI).round() as i64,
        acc,
        gyro,
    ))
}

/// Overview of a decoded export
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CsvSummary {
    /// Number of data rows
    pub record_count: usize,
    /// First row timestamp (ms)
    pub first_ms: f64,
    /// Last row timestamp (ms)
    pub last_ms: f64,
    /// Span between first and last row (ms)
    pub duration_ms: f64,
}

impl CsvSummary {
    /// Summarize a record sequence
    pub fn from_records(records: &[FusedRecord]) -> Self {
        let first_ms = records.first().map(|r| r.timestamp_ms()).unwrap_or(0.0);
        let last_ms = records.last().map(|r| r.timestamp_ms()).unwrap_or(0.0);
        Self {
            record_count: records.len(),
            first_ms,
            last_ms,
            duration_ms: last_ms - first_ms,
        }
    }
}
