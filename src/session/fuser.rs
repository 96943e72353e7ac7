//! Sample fuser: combines single-sensor readings into dual-sensor records
//!
//! Every raw event produces exactly one [`FusedRecord`]. The sensor that did
//! not report keeps its previous value (hold-last-value), so the output rate
//! is the sum of both input rates and repeated axis groups are expected.

use crate::types::{FusedRecord, RawEvent, SensorKind};

use super::types::Session;

/// Fold one event into the session's last-known-value cache and return the fused record
///
/// `event.timestamp` must already be relative to `session.start_time`. Only the
/// cache entries for `event.kind` change. The record is not appended to the
/// buffer; that is the recorder's job.
pub fn ingest(event: &RawEvent, session: &mut Session) -> FusedRecord {
    match event.kind {
        SensorKind::Accelerometer => {
            session.last_acc = event.values;
            session.last_acc_ts = event.timestamp;
        }
        SensorKind::Gyroscope => {
            session.last_gyro = event.values;
            session.last_gyro_ts = event.timestamp;
        }
    }

    FusedRecord {
        timestamp: session.last_acc_ts.max(session.last_gyro_ts),
        acc: session.last_acc,
        gyro: session.last_gyro,
    }
}
