//! Wall clock

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Seed for a new run
pub fn run_seed() -> u64 {
    let ms = now_ms() as u64;
    // Spread consecutive millisecond values across the seed space
    ms.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ (ms >> 29)
}
