use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as Unix epoch seconds (spec §6: "Timestamps are Unix epoch
/// seconds"). Saturates to `0` if the system clock is set before 1970,
/// which should never happen outside of a misconfigured test environment.
pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
