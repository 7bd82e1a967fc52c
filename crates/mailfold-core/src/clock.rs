//! Wall-clock source for message timestamping.

use chrono::Utc;

/// Current time as epoch milliseconds.
///
/// Message timestamps are set once at creation from this clock and never
/// mutated afterwards.
#[must_use]
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
