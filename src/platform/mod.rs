//! Platform abstraction layer
//!
//! Handles browser/native differences for wall-clock time.

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_millis() -> u64 {
    js_sys::Date::now() as u64
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Seed for a fresh run RNG
pub fn random_seed() -> u64 {
    now_millis().wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407)
}
