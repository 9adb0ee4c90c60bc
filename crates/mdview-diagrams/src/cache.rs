//! In-memory render cache.
//!
//! Provides [`RenderCache`], the process-wide map from diagram
//! [`Fingerprint`] to base64-encoded rendered output.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::fingerprint::Fingerprint;

/// Map from diagram fingerprint to base64-encoded rendered image.
///
/// Shared across concurrent requests behind an `Arc`. Every access takes a
/// single mutex for the duration of the map operation only; callers never
/// hold the lock while talking to the rendering service.
///
/// Entries are never evicted. Only successful renders are stored.
///
/// # Example
///
/// ```
/// use mdview_diagrams::{Fingerprint, RenderCache};
///
/// let cache = RenderCache::new();
/// let key = Fingerprint::of("A --> B");
///
/// assert_eq!(cache.get(&key), None);
/// cache.put(key, "PHN2Zy8+".to_owned());
/// assert_eq!(cache.get(&key).as_deref(), Some("PHN2Zy8+"));
/// ```
#[derive(Debug, Default)]
pub struct RenderCache {
    entries: Mutex<HashMap<Fingerprint, String>>,
}

impl RenderCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the rendered output for a fingerprint.
    #[must_use]
    pub fn get(&self, key: &Fingerprint) -> Option<String> {
        self.entries().get(key).cloned()
    }

    /// Store rendered output for a fingerprint, replacing any previous value.
    pub fn put(&self, key: Fingerprint, value: String) {
        self.entries().insert(key, value);
    }

    /// Number of cached diagrams.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether the cache holds no diagrams.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    // A panic while holding the lock cannot leave a half-written entry, so a
    // poisoned map is still consistent.
    fn entries(&self) -> MutexGuard<'_, HashMap<Fingerprint, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_new_cache_is_empty() {
        let cache = RenderCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.get(&Fingerprint::of("anything")), None);
    }

    #[test]
    fn test_put_after_miss_makes_get_hit() {
        let cache = RenderCache::new();
        let key = Fingerprint::of("graph TD\n  A --> B\n");

        assert_eq!(cache.get(&key), None);
        cache.put(key, "encoded".to_owned());

        assert_eq!(cache.get(&key), Some("encoded".to_owned()));
        assert_eq!(cache.get(&key), Some("encoded".to_owned()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_put_overwrites() {
        let cache = RenderCache::new();
        let key = Fingerprint::of("source");

        cache.put(key, "first".to_owned());
        cache.put(key, "second".to_owned());

        assert_eq!(cache.get(&key), Some("second".to_owned()));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let cache = RenderCache::new();
        cache.put(Fingerprint::of("a"), "A".to_owned());
        cache.put(Fingerprint::of("b"), "B".to_owned());

        assert_eq!(cache.get(&Fingerprint::of("a")), Some("A".to_owned()));
        assert_eq!(cache.get(&Fingerprint::of("b")), Some("B".to_owned()));
        assert_eq!(cache.get(&Fingerprint::of("c")), None);
    }

    #[test]
    fn test_concurrent_access() {
        let cache = Arc::new(RenderCache::new());

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..100 {
                        let key = Fingerprint::of(&format!("diagram {i}"));
                        if cache.get(&key).is_none() {
                            cache.put(key, format!("value {i}"));
                        }
                        let _ = cache.get(&Fingerprint::of(&format!("thread {t}")));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 100);
        assert_eq!(
            cache.get(&Fingerprint::of("diagram 42")),
            Some("value 42".to_owned())
        );
    }
}
