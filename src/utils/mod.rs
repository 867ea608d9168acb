pub mod phone;

use chrono::Utc;

/// Current wall clock time in Unix epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
