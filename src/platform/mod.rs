//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, in-memory natively)
//! - Haptics (navigator.vibrate)
//! - Wall clock and URL query parameters

pub mod haptics;
pub mod storage;
pub mod time;

/// Read a query string parameter from the page URL (WASM only)
#[cfg(target_arch = "wasm32")]
pub fn query_param(name: &str) -> Option<String> {
    let search = web_sys::window()?.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    params.get(name).filter(|v| !v.trim().is_empty())
}

/// Native builds read `BITJUMPER_<NAME>` from the environment instead
#[cfg(not(target_arch = "wasm32"))]
pub fn query_param(name: &str) -> Option<String> {
    let key = format!("BITJUMPER_{}", name.to_uppercase());
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
