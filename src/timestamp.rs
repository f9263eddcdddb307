use crate::error::TelemetryError;
use std::time::{SystemTime, UNIX_EPOCH};

// Inclusive [1971, 2100] epoch bounds, one pair per unit. The daemon relies
// on these exact constants, do not "fix" them.
const SECS_1971: i64 = 31_536_000;
const SECS_2100: i64 = 4_102_444_800;
const MILLI_SECS_1971: i64 = 31_536_000_000;
const MILLI_SECS_2100: i64 = 4_102_444_800_000;
const MICRO_SECS_1971: i64 = 31_536_000_000_000;
const MICRO_SECS_2100: i64 = 4_102_444_800_000_000;
const NANO_SECS_1971: i64 = 31_536_000_000_000_000;
const NANO_SECS_2100: i64 = 4_102_444_800_000_000_000;

/// Converts a raw epoch timestamp of *unknown* unit into microseconds.
///
/// The unit is guessed by checking which of the four ranges the value falls
/// into, in order: seconds, milliseconds, microseconds, nanoseconds.
///
/// Known limitation: the guess is inherently ambiguous near range
/// boundaries. A value that is numerically valid in two units is always
/// interpreted as the coarser one. This matches the daemon's expectations
/// and is intentionally not special-cased.
pub fn normalize(raw: i64) -> Result<i64, TelemetryError> {
    if (SECS_1971..=SECS_2100).contains(&raw) {
        Ok(raw * 1_000_000)
    } else if (MILLI_SECS_1971..=MILLI_SECS_2100).contains(&raw) {
        Ok(raw * 1_000)
    } else if (MICRO_SECS_1971..=MICRO_SECS_2100).contains(&raw) {
        Ok(raw)
    } else if (NANO_SECS_1971..=NANO_SECS_2100).contains(&raw) {
        Ok(raw / 1_000)
    } else {
        Err(TelemetryError::InvalidTimestamp(raw))
    }
}

/// Current wall clock in epoch microseconds. Already canonical, so callers
/// that default to "now" skip range validation entirely.
pub fn now_micros() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as i64)
        .unwrap_or(0)
}

/// Current wall clock in epoch milliseconds. Used by the scheduler's
/// last-fired bookkeeping.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
