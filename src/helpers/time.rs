use chrono::{DateTime, TimeDelta, Utc};

use crate::utils::constants::MAX_TOKEN_TTL_SECS;

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// `now + seconds`, keeping sub-second precision of fractional TTLs.
///
/// The TTL is clamped to `[0, MAX_TOKEN_TTL_SECS]`; NaN counts as zero.
pub fn expiry_after_secs(seconds: f64) -> DateTime<Utc> {
    let millis = (seconds.clamp(0.0, MAX_TOKEN_TTL_SECS) * 1000.0).round() as i64;
    let start = now();
    TimeDelta::try_milliseconds(millis)
        .and_then(|ttl| start.checked_add_signed(ttl))
        .unwrap_or(start)
}
