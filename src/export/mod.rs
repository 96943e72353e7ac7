//! Session export
//!
//! Encoding is a pure function of the record buffer ([`encode`]); writing
//! the bytes somewhere durable is delegated to a [`ByteSink`].
//!
//! Files are named `IMU_Data_<YYYYMMDD_HHmmss>.csv` after the moment of export
//! and placed in the configured export directory (`IMUData` by default).

pub mod csv;
pub mod sink;

pub use self::csv::{decode, encode, format_row, CsvSummary, CSV_HEADER};
pub use sink::{export_file_name, ByteSink, FsSink};
