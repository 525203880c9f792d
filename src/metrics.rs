use std::time::{Duration, Instant};

/// Substituted for any elapsed interval that is zero or negative.
pub const MIN_ELAPSED_SECS: f64 = 0.1;

pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Seconds between two instants, floored at [`MIN_ELAPSED_SECS`].
pub fn elapsed_secs(earlier: Instant, later: Instant) -> f64 {
    match later.checked_duration_since(earlier) {
        // clock went backwards
        None => MIN_ELAPSED_SECS,
        Some(d) => floor_elapsed(d),
    }
}

pub fn floor_elapsed(d: Duration) -> f64 {
    if d.is_zero() {
        return MIN_ELAPSED_SECS;
    }
    d.as_secs_f64()
}

/// Bytes per second over `elapsed` seconds.
///
/// A counter that reads lower than `prev_bytes` yields a zero delta, and a
/// non-positive or non-finite elapsed is replaced by the floor, so the
/// result is always finite and non-negative.
pub fn rate_bps(prev_bytes: u64, bytes: u64, elapsed: f64) -> f64 {
    let dt = if elapsed.is_finite() && elapsed > 0.0 { elapsed } else { MIN_ELAPSED_SECS };
    bytes.saturating_sub(prev_bytes) as f64 / dt
}

pub fn to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

pub fn bps_to_mbps(bps: f64) -> f64 {
    bps / BYTES_PER_MB
}
