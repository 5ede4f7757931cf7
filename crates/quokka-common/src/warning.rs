//! Renderer warnings routed through the `log` facade.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the HTML, CSS, and layout components to report unsupported features
//! and recoverable anomalies.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// A poisoned lock only means another thread panicked mid-insert; the set
/// itself is still usable.
fn warned() -> MutexGuard<'static, Option<HashSet<String>>> {
    WARNED.lock().unwrap_or_else(PoisonError::into_inner)
}

fn key(component: &str, message: &str) -> String {
    format!("[{component}] {message}")
}

/// Warn about an unsupported feature (emits once per unique message)
///
/// # Example
/// ```ignore
/// warn_once("CSS", "unsupported property 'float'");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let first_time = warned()
        .get_or_insert_with(HashSet::new)
        .insert(key(component, message));

    if first_time {
        log::warn!(target: "quokka", "[{component}] {message}");
    }
}

/// Whether `warn_once` has already emitted this exact warning.
#[must_use]
pub fn has_warned(component: &str, message: &str) -> bool {
    warned()
        .as_ref()
        .is_some_and(|set| set.contains(&key(component, message)))
}

/// Clear all recorded warnings (call when rendering a new document)
pub fn clear_warnings() {
    if let Some(set) = warned().as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_once_records_message() {
        let message = "test_warn_once_records_message";
        assert!(!has_warned("Test", message));
        warn_once("Test", message);
        warn_once("Test", message);
        assert!(has_warned("Test", message));
        assert!(!has_warned("Other", message));
    }
}
