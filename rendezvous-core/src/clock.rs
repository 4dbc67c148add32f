use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock time in epoch milliseconds, as carried in chat timestamps.
/// A clock set before the epoch reads as `0`; one past `u64::MAX` ms
/// saturates.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}
