use std::time::{SystemTime, UNIX_EPOCH};

/// Unix milliseconds, the timestamp unit used in every stored record.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
