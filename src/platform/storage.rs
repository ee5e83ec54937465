//! Key/value storage
//!
//! LocalStorage in the browser. Native builds keep a per-thread map so the
//! persistence code paths still run in tests and headless runs.

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok()).flatten()
}

/// Read a value, `None` if missing or storage is unavailable
#[cfg(target_arch = "wasm32")]
pub fn get_item(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

/// Write a value. Failures (quota, private mode) are logged and dropped.
#[cfg(target_arch = "wasm32")]
pub fn set_item(key: &str, value: &str) {
    match local_storage() {
        Some(storage) => {
            if storage.set_item(key, value).is_err() {
                log::warn!("LocalStorage write failed for {}", key);
            }
        }
        None => log::warn!("LocalStorage unavailable, {} not saved", key),
    }
}

#[cfg(target_arch = "wasm32")]
pub fn remove_item(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

#[cfg(not(target_arch = "wasm32"))]
thread_local! {
    static MEMORY: std::cell::RefCell<std::collections::HashMap<String, String>> =
        std::cell::RefCell::new(std::collections::HashMap::new());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn get_item(key: &str) -> Option<String> {
    MEMORY.with(|m| m.borrow().get(key).cloned())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn set_item(key: &str, value: &str) {
    MEMORY.with(|m| {
        m.borrow_mut().insert(key.to_string(), value.to_string());
    });
}

#[cfg(not(target_arch = "wasm32"))]
pub fn remove_item(key: &str) {
    MEMORY.with(|m| {
        m.borrow_mut().remove(key);
    });
}

/// Read a value with surrounding whitespace removed, `None` if blank
pub fn get_trimmed(key: &str) -> Option<String> {
    get_item(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        set_item("storage_test_key", "value");
        assert_eq!(get_item("storage_test_key").as_deref(), Some("value"));
        remove_item("storage_test_key");
        assert_eq!(get_item("storage_test_key"), None);
    }

    #[test]
    fn test_blank_values_read_as_missing() {
        set_item("storage_test_blank", "   ");
        assert_eq!(get_trimmed("storage_test_blank"), None);
        set_item("storage_test_blank", " abc ");
        assert_eq!(get_trimmed("storage_test_blank").as_deref(), Some("abc"));
    }
}
